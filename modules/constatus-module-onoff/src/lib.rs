/*
 *  constatus on/off module
 *
 *  A one-cell gadget for the constatus dashboard that blinks a star once
 *  a second. Built as a shared library loaded through the module ABI.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

//! # constatus on/off module
//!
//! The smallest useful module: 1x1, alternating `*` and blank every second.
//!
//! ## Usage
//!
//! Install the built library as `onoff.so` in `~/.constatus/modules/` (or
//! the directory given with `--module-dir`) and list it in the config:
//!
//! ```yaml
//! load: [clock, onoff]
//! ```

pub mod ffi;
mod plugin;

// Re-export the module entry points
pub use plugin::{constatus_module_abi_version, constatus_module_register};
