/*
 *  dashboard/plugin/ffi.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  C ABI types for the module interface
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

//! FFI types for constatus modules
//!
//! A module library exports two symbols:
//!
//! - `constatus_module_abi_version() -> u32`
//! - `constatus_module_register() -> *const ConstatusModuleTable`
//!
//! The table is static data owned by the library. All types use `#[repr(C)]`
//! and the field order of [`ConstatusModuleTable`] is part of the ABI.
//! Module crates carry their own copy of this file.

use std::ffi::{c_char, c_int, c_void};

/// Bumped on any incompatible change to the types below
pub const CONSTATUS_MODULE_ABI_VERSION: u32 = 1;

pub const CONSTATUS_ABI_VERSION_SYMBOL: &[u8] = b"constatus_module_abi_version\0";
pub const CONSTATUS_REGISTER_SYMBOL: &[u8] = b"constatus_module_register\0";

/// Attribute bits for `put_str`
pub const CONSTATUS_ATTR_NORMAL: u32 = 0;
pub const CONSTATUS_ATTR_REVERSE: u32 = 1 << 0;
pub const CONSTATUS_ATTR_BOLD: u32 = 1 << 1;

/// Message kinds for `report`
pub const CONSTATUS_MSG_ERROR: u32 = 0;
pub const CONSTATUS_MSG_INFO: u32 = 1;

/// Opaque per-gadget state owned by the module
#[repr(C)]
pub struct ConstatusInstance {
    _private: [u8; 0],
}

/// Relative delay until the next callback
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstatusDelay {
    pub secs: u64,
    /// May exceed one second; the host carries it
    pub nanos: u32,
}

/// Capabilities available to module code for the duration of one call
#[repr(C)]
pub struct ConstatusHost {
    pub ctx: *mut c_void,

    /// Show `text` on the banner, attributed to the calling gadget
    pub report: extern "C" fn(ctx: *mut c_void, kind: u32, text: *const c_char, len: usize),

    /// Ask for a new size; 0 on success, -1 when refused
    pub resize: extern "C" fn(ctx: *mut c_void, height: c_int, width: c_int) -> c_int,
}

/// The gadget's window for the duration of one display or callback
#[repr(C)]
pub struct ConstatusSurface {
    pub ctx: *mut c_void,
    pub height: c_int,
    pub width: c_int,
    pub erase: extern "C" fn(ctx: *mut c_void),
    /// Write `len` bytes of UTF-8 at (y, x); clipped, never wrapped
    pub put_str: extern "C" fn(ctx: *mut c_void, y: c_int, x: c_int, text: *const c_char, len: usize, attr: u32),
}

/// Returns null on failure, after reporting why
pub type ConstatusInitFn = extern "C" fn(host: *const ConstatusHost) -> *mut ConstatusInstance;

pub type ConstatusDisplayFn = extern "C" fn(
    instance: *mut ConstatusInstance,
    host: *const ConstatusHost,
    surface: *const ConstatusSurface,
);

pub type ConstatusCallbackFn = extern "C" fn(
    instance: *mut ConstatusInstance,
    host: *const ConstatusHost,
    surface: *const ConstatusSurface,
) -> ConstatusDelay;

pub type ConstatusResizeFn = extern "C" fn(
    instance: *mut ConstatusInstance,
    host: *const ConstatusHost,
    screen_height: c_int,
    screen_width: c_int,
);

/// The module contract. `resize` may be null.
#[repr(C)]
pub struct ConstatusModuleTable {
    pub height: c_int,
    pub width: c_int,
    pub init: Option<ConstatusInitFn>,
    pub display: Option<ConstatusDisplayFn>,
    pub callback: Option<ConstatusCallbackFn>,
    pub resize: Option<ConstatusResizeFn>,
}

pub type ConstatusAbiVersionFn = extern "C" fn() -> u32;
pub type ConstatusRegisterFn = extern "C" fn() -> *const ConstatusModuleTable;
