// build.rs

use chrono::Utc;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

fn main() -> io::Result<()> {
    // Get the output directory set by Cargo
    let out_dir = env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR is not set"))?;
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    // available to the crate as BUILD_DATE
    fs::write(
        &dest_path,
        format!("pub const BUILD_DATE: &str = \"{}\";", build_date),
    )?;

    // Tell Cargo to re-run this build script only if build.rs itself changes
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
