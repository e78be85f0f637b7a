/*
 *  constatus module ABI
 *
 *  C ABI types shared with the host; must match the host's
 *  dashboard/plugin/ffi.rs field for field.
 */

use std::ffi::{c_char, c_int, c_void};

pub const CONSTATUS_MODULE_ABI_VERSION: u32 = 1;

pub const CONSTATUS_ATTR_NORMAL: u32 = 0;
pub const CONSTATUS_ATTR_REVERSE: u32 = 1 << 0;
pub const CONSTATUS_ATTR_BOLD: u32 = 1 << 1;

pub const CONSTATUS_MSG_ERROR: u32 = 0;
pub const CONSTATUS_MSG_INFO: u32 = 1;

#[repr(C)]
pub struct ConstatusInstance {
    _private: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstatusDelay {
    pub secs: u64,
    pub nanos: u32,
}

#[repr(C)]
pub struct ConstatusHost {
    pub ctx: *mut c_void,
    pub report: extern "C" fn(ctx: *mut c_void, kind: u32, text: *const c_char, len: usize),
    pub resize: extern "C" fn(ctx: *mut c_void, height: c_int, width: c_int) -> c_int,
}

#[repr(C)]
pub struct ConstatusSurface {
    pub ctx: *mut c_void,
    pub height: c_int,
    pub width: c_int,
    pub erase: extern "C" fn(ctx: *mut c_void),
    pub put_str: extern "C" fn(ctx: *mut c_void, y: c_int, x: c_int, text: *const c_char, len: usize, attr: u32),
}

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

#[repr(C)]
pub struct ConstatusModuleTable {
    pub height: c_int,
    pub width: c_int,
    pub init: Option<ConstatusInitFn>,
    pub display: Option<ConstatusDisplayFn>,
    pub callback: Option<ConstatusCallbackFn>,
    pub resize: Option<ConstatusResizeFn>,
}

impl ConstatusHost {
    /// Report a message through the host
    pub fn report(&self, kind: u32, text: &str) {
        (self.report)(self.ctx, kind, text.as_ptr().cast(), text.len());
    }
}

impl ConstatusSurface {
    pub fn put_str(&self, y: c_int, x: c_int, text: &str, attr: u32) {
        (self.put_str)(self.ctx, y, x, text.as_ptr().cast(), text.len(), attr);
    }
}
