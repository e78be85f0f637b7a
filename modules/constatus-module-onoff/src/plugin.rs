/*
 *  constatus on/off module - implementation
 */

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::ffi::*;

const BLINK: ConstatusDelay = ConstatusDelay { secs: 1, nanos: 0 };

/// Module state behind the opaque instance pointer
struct OnOff {
    is_on: bool,
}

impl OnOff {
    fn draw(&self, surface: *const ConstatusSurface) {
        if surface.is_null() {
            return;
        }
        let surface = unsafe { &*surface };
        surface.put_str(0, 0, if self.is_on { "*" } else { " " }, CONSTATUS_ATTR_NORMAL);
    }
}

/// Macro to catch panics in FFI functions
macro_rules! catch_panic {
    ($fallback:expr, $code:block) => {
        match catch_unwind(AssertUnwindSafe(|| $code)) {
            Ok(result) => result,
            Err(_) => {
                #[cfg(feature = "debug-logging")]
                log::error!("onoff: panic in module call");
                $fallback
            }
        }
    };
}

// ============================================================================
// Module table
// ============================================================================

extern "C" fn init(_host: *const ConstatusHost) -> *mut ConstatusInstance {
    catch_panic!(std::ptr::null_mut(), {
        Box::into_raw(Box::new(OnOff { is_on: true })).cast::<ConstatusInstance>()
    })
}

extern "C" fn display(instance: *mut ConstatusInstance, _host: *const ConstatusHost, surface: *const ConstatusSurface) {
    catch_panic!((), {
        if instance.is_null() {
            return;
        }
        let ctx = unsafe { &*instance.cast::<OnOff>() };
        ctx.draw(surface);
    })
}

extern "C" fn callback(
    instance: *mut ConstatusInstance,
    _host: *const ConstatusHost,
    surface: *const ConstatusSurface,
) -> ConstatusDelay {
    catch_panic!(BLINK, {
        if instance.is_null() {
            return BLINK;
        }
        let ctx = unsafe { &mut *instance.cast::<OnOff>() };
        ctx.draw(surface);
        ctx.is_on = !ctx.is_on;

        #[cfg(feature = "debug-logging")]
        log::debug!("onoff: now {}", ctx.is_on);
        BLINK
    })
}

/// Static module table
static TABLE: ConstatusModuleTable = ConstatusModuleTable {
    height: 1,
    width: 1,
    init: Some(init),
    display: Some(display),
    callback: Some(callback),
    resize: None,
};

// ============================================================================
// Module Registration
// ============================================================================

#[no_mangle]
pub extern "C" fn constatus_module_abi_version() -> u32 {
    CONSTATUS_MODULE_ABI_VERSION
}

/// Module entry point - returns the table
#[no_mangle]
pub extern "C" fn constatus_module_register() -> *const ConstatusModuleTable {
    &TABLE
}
