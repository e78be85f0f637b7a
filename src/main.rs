/*
 *  main.rs
 *
 *  constatus - console status dashboard
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::fs::OpenOptions;
use std::process::ExitCode;
use anyhow::{bail, Context};
use clap::Parser;
use env_logger::{Env, Target};
use log::{error, info};

use constatus::config::{self, Cli, Config};
use constatus::dashboard::drivers::{TerminalInput, TerminalScreen, TerminalSession};
use constatus::dashboard::{Dashboard, EventLoop, ModuleSearch, Registry};
use constatus::timespec::MonotonicClock;
use constatus::BUILD_DATE;

// Raw mode owns the terminal, so logging goes to a file or nowhere
fn init_logging(cfg: &Config) -> anyhow::Result<()> {
    let level = match cfg.log_file {
        Some(_) => cfg.log_level.as_deref().unwrap_or("info"),
        None => "off",
    };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    if let Some(path) = cfg.log_file.as_ref() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("cannot initialize logging")?;
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = config::load(cli).context("error loading configuration")?;

    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    init_logging(&cfg)?;
    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);
    if let Some(source) = cfg.source.as_ref() {
        info!("config from {}", source.display());
    }

    let mut registry = Registry::new(ModuleSearch::from_home(cfg.module_dir.clone()));
    for name in cfg.modules() {
        registry.load(name)?;
    }
    if registry.is_empty() {
        bail!("no gadgets loaded; list modules under `load:` in the config file");
    }

    let session = TerminalSession::new().context("error initializing the terminal")?;

    let dashboard = Dashboard::new(TerminalScreen::new(), registry);
    let mut event_loop = EventLoop::new(dashboard, TerminalInput, MonotonicClock);
    let outcome = event_loop.run();

    // restore the terminal before anything is printed
    let restored = session.finish();
    if let Err(e) = &outcome {
        error!("fatal: {}", e);
    }
    outcome.context("dashboard stopped")?;
    restored.context("error restoring the terminal")?;

    info!("bye");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("constatus: {e:#}");
            ExitCode::FAILURE
        }
    }
}
