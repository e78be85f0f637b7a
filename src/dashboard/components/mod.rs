/*
 *  dashboard/components/mod.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Gadget modules linked into the host
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

use std::rc::Rc;

use crate::dashboard::traits::Module;

pub mod clock;
pub mod battery;

// Re-exports
pub use clock::ClockModule;
pub use battery::BatteryModule;

/// Names of the built-in modules
pub const BUILTIN_MODULES: &[&str] = &["clock", "linux_battery"];

/// Look up a built-in module by name
pub fn builtin(name: &str) -> Option<Rc<dyn Module>> {
    match name {
        "clock" => Some(Rc::new(ClockModule::default())),
        "linux_battery" => Some(Rc::new(BatteryModule::default())),
        _ => None,
    }
}
