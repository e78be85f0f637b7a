/*
 *  dashboard/plugin/adapter.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Plugin adapter - wraps C ABI modules as Module/Instance trait objects
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

//! Bridge between the C ABI and the [`Module`]/[`Instance`] traits.
//!
//! Every call into module code is bound: the host and surface handed across
//! the boundary point at a [`Binding`] on the caller's stack, and a
//! thread-local records which binding is live. Callbacks arriving with any
//! other context pointer (a module that kept the host pointer after its call
//! returned, say) are logged and dropped without touching the pointer.

use std::borrow::Cow;
use std::cell::Cell;
use std::ffi::{c_char, c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use log::{debug, error};

use super::ffi::{
    ConstatusDelay,
    ConstatusHost,
    ConstatusInstance,
    ConstatusModuleTable,
    ConstatusSurface,
    CONSTATUS_ATTR_BOLD,
    CONSTATUS_ATTR_REVERSE,
    CONSTATUS_MSG_INFO,
};
use super::loader::{validate_table, LoadedPlugin, PluginError};
use crate::dashboard::error::InitError;
use crate::dashboard::surface::{Attr, Surface};
use crate::dashboard::traits::{Host, Instance, MessageKind, Module, ModuleDescriptor};

/// Delay used when a callback cannot report one
const FALLBACK_DELAY: Duration = Duration::from_secs(1);

thread_local! {
    // address of the live Binding, 0 when no module call is running
    static BOUND: Cell<usize> = const { Cell::new(0) };
}

struct Binding<'a> {
    host: &'a mut (dyn Host + 'a),
    surface: Option<&'a mut (dyn Surface + 'a)>,
}

struct BindGuard {
    previous: usize,
}

impl BindGuard {
    fn bind(ctx: *mut c_void) -> Self {
        let previous = BOUND.with(|b| b.replace(ctx as usize));
        Self { previous }
    }
}

impl Drop for BindGuard {
    fn drop(&mut self) {
        BOUND.with(|b| b.set(self.previous));
    }
}

fn with_binding<R>(ctx: *mut c_void, what: &str, f: impl FnOnce(&mut Binding<'_>) -> R) -> Option<R> {
    let live = BOUND.with(Cell::get);
    if ctx.is_null() || ctx as usize != live {
        error!("internal error: {} called from a non-gadget context; ignored", what);
        return None;
    }
    // SAFETY: ctx is the address of the Binding bound for the call in progress,
    // which outlives this callback
    let binding = unsafe { &mut *ctx.cast::<Binding<'static>>() };
    Some(f(binding))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning a panic into an error message
fn catch_ffi_call<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        error!("caught panic in module call: {}", message);
        message
    })
}

// SAFETY: callers pass either null or `len` readable bytes
unsafe fn ffi_text<'t>(text: *const c_char, len: usize) -> Cow<'t, str> {
    if text.is_null() || len == 0 {
        return Cow::Borrowed("");
    }
    let bytes = unsafe { std::slice::from_raw_parts(text.cast::<u8>(), len) };
    String::from_utf8_lossy(bytes)
}

fn attr_from_bits(bits: u32) -> Attr {
    Attr {
        reverse: bits & CONSTATUS_ATTR_REVERSE != 0,
        bold: bits & CONSTATUS_ATTR_BOLD != 0,
    }
}

extern "C" fn host_report(ctx: *mut c_void, kind: u32, text: *const c_char, len: usize) {
    let _ = catch_ffi_call(|| {
        // SAFETY: the ABI requires `len` readable bytes at `text`
        let text = unsafe { ffi_text(text, len) };
        let kind = if kind == CONSTATUS_MSG_INFO { MessageKind::Info } else { MessageKind::Error };
        with_binding(ctx, "report", |b| b.host.report(kind, &text));
    });
}

extern "C" fn host_resize(ctx: *mut c_void, height: c_int, width: c_int) -> c_int {
    let outcome = catch_ffi_call(|| {
        with_binding(ctx, "resize", |b| {
            let (Ok(h), Ok(w)) = (u16::try_from(height), u16::try_from(width)) else {
                b.host.err(&format!("tried to attain invalid size {}x{}", height, width));
                return false;
            };
            b.host.request_resize(h, w).is_ok()
        })
    });
    match outcome {
        Ok(Some(true)) => 0,
        _ => -1,
    }
}

extern "C" fn surface_erase(ctx: *mut c_void) {
    let _ = catch_ffi_call(|| {
        with_binding(ctx, "erase", |b| {
            if let Some(surface) = b.surface.as_deref_mut() {
                surface.erase();
            }
        });
    });
}

extern "C" fn surface_put_str(ctx: *mut c_void, y: c_int, x: c_int, text: *const c_char, len: usize, attr: u32) {
    let _ = catch_ffi_call(|| {
        let (Ok(y), Ok(x)) = (u16::try_from(y), u16::try_from(x)) else {
            return;
        };
        // SAFETY: the ABI requires `len` readable bytes at `text`
        let text = unsafe { ffi_text(text, len) };
        with_binding(ctx, "put_str", |b| {
            if let Some(surface) = b.surface.as_deref_mut() {
                surface.put_str(y, x, &text, attr_from_bits(attr));
            }
        });
    });
}

// Bind `host` (and `surface`) for the duration of `f`
fn bound_call<'a, R>(
    host: &'a mut dyn Host,
    surface: Option<&'a mut dyn Surface>,
    f: impl FnOnce(*const ConstatusHost, *const ConstatusSurface) -> R,
) -> Result<R, String> {
    let (height, width) = surface
        .as_ref()
        .map_or((0, 0), |s| (c_int::from(s.height()), c_int::from(s.width())));

    let mut binding = Binding { host, surface };
    let ctx = std::ptr::addr_of_mut!(binding).cast::<c_void>();

    let ffi_host = ConstatusHost { ctx, report: host_report, resize: host_resize };
    let ffi_surface = ConstatusSurface {
        ctx,
        height,
        width,
        erase: surface_erase,
        put_str: surface_put_str,
    };

    let _guard = BindGuard::bind(ctx);
    catch_ffi_call(|| f(&ffi_host, &ffi_surface))
}

fn delay_from_ffi(delay: ConstatusDelay) -> Duration {
    Duration::from_secs(delay.secs).saturating_add(Duration::from_nanos(u64::from(delay.nanos)))
}

enum TableSource {
    Library(LoadedPlugin),
    Static(&'static ConstatusModuleTable),
}

impl TableSource {
    fn table(&self) -> &ConstatusModuleTable {
        match self {
            TableSource::Library(plugin) => plugin.table(),
            TableSource::Static(table) => *table,
        }
    }
}

/// A C ABI module as a [`Module`]
pub struct PluginModule {
    source: Rc<TableSource>,
    descriptor: ModuleDescriptor,
}

impl PluginModule {
    pub fn new(plugin: LoadedPlugin) -> Self {
        let descriptor = plugin.descriptor();
        Self { source: Rc::new(TableSource::Library(plugin)), descriptor }
    }

    /// Wrap a table linked into the host rather than loaded from a file
    pub fn from_static(table: &'static ConstatusModuleTable) -> Result<Self, PluginError> {
        let descriptor = validate_table(table)?;
        Ok(Self { source: Rc::new(TableSource::Static(table)), descriptor })
    }

    /// Library the module came from, if any
    pub fn path(&self) -> Option<&Path> {
        match self.source.as_ref() {
            TableSource::Library(plugin) => Some(plugin.path()),
            TableSource::Static(_) => None,
        }
    }
}

impl Module for PluginModule {
    fn descriptor(&self) -> ModuleDescriptor {
        self.descriptor
    }

    fn init(&self, host: &mut dyn Host) -> Result<Box<dyn Instance>, InitError> {
        let Some(init) = self.source.table().init else {
            return Err(InitError::Failed);
        };

        let handle = bound_call(host, None, |h, _| init(h)).map_err(InitError::Panicked)?;
        if handle.is_null() {
            return Err(InitError::Failed);
        }
        debug!("module instance {:p}", handle);

        Ok(Box::new(PluginInstance { source: Rc::clone(&self.source), handle }))
    }
}

// No destructor exists in the ABI; the handle is abandoned with the instance.
// The library outlives every instance through `source`.
struct PluginInstance {
    source: Rc<TableSource>,
    handle: *mut ConstatusInstance,
}

impl Instance for PluginInstance {
    fn display(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) {
        let Some(display) = self.source.table().display else {
            return;
        };
        let handle = self.handle;
        if let Err(e) = bound_call(host, Some(surface), |h, s| display(handle, h, s)) {
            error!("module display failed: {}", e);
        }
    }

    fn callback(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) -> Duration {
        let Some(callback) = self.source.table().callback else {
            return FALLBACK_DELAY;
        };
        let handle = self.handle;
        match bound_call(host, Some(surface), |h, s| callback(handle, h, s)) {
            Ok(delay) => delay_from_ffi(delay),
            Err(e) => {
                error!("module callback failed: {}", e);
                FALLBACK_DELAY
            }
        }
    }

    fn resize(&mut self, host: &mut dyn Host, screen_height: u16, screen_width: u16) {
        let Some(resize) = self.source.table().resize else {
            return;
        };
        let handle = self.handle;
        let outcome = bound_call(host, None, |h, _| {
            resize(handle, h, c_int::from(screen_height), c_int::from(screen_width))
        });
        if let Err(e) = outcome {
            error!("module resize failed: {}", e);
        }
    }
}
