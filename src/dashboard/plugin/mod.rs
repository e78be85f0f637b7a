/*
 *  dashboard/plugin/mod.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dynamically loaded gadget modules
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Dynamic module system
//!
//! Gadget modules can be shipped as shared libraries implementing a small C
//! ABI, loaded at startup by name.
//!
//! ## Architecture
//!
//! 1. **FFI Layer** (`ffi.rs`) - C ABI types for the module contract
//! 2. **Loader** (`loader.rs`) - opens a library and validates its table
//! 3. **Adapter** (`adapter.rs`) - wraps the table as a `Module` trait object
//!
//! ## Module Discovery
//!
//! Discovery lives in the registry: `--module-dir` if given, else
//! `~/.constatus/modules/` then `/usr/lib/constatus/modules/`, looking for
//! `<name>.so` (`<name>.dylib`, `<name>.dll` elsewhere).

pub mod ffi;
pub mod loader;
pub mod adapter;

pub use ffi::{
    ConstatusDelay,
    ConstatusHost,
    ConstatusInstance,
    ConstatusModuleTable,
    ConstatusSurface,
    CONSTATUS_MODULE_ABI_VERSION,
};

pub use loader::{LoadedPlugin, PluginError, PluginLoader};
pub use adapter::PluginModule;
