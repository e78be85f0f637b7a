/*
 *  dashboard/components/clock.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock gadget - local time, ticking on the second
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

use std::time::Duration;
use chrono::{DateTime, Local, TimeDelta, Timelike};

use crate::dashboard::error::InitError;
use crate::dashboard::surface::{Attr, Surface};
use crate::dashboard::traits::{Host, Instance, Module, ModuleDescriptor};

/// Width of `HH:MM:SS`
pub const CLOCK_SIZE: u16 = 8;

const PLACEHOLDER: &str = "--:--:--";

/// Clock module
#[derive(Debug, Clone, Copy)]
pub struct ClockModule {
    now: fn() -> DateTime<Local>,
}

impl ClockModule {
    /// A clock reading time from `now` instead of the system
    pub fn with_time_source(now: fn() -> DateTime<Local>) -> Self {
        Self { now }
    }
}

impl Default for ClockModule {
    fn default() -> Self {
        Self { now: Local::now }
    }
}

fn format_time(time: &DateTime<Local>) -> String {
    let text = time.format("%T").to_string();
    if text.len() == usize::from(CLOCK_SIZE) { text } else { PLACEHOLDER.to_string() }
}

impl Module for ClockModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor { height: 1, width: CLOCK_SIZE }
    }

    fn init(&self, _host: &mut dyn Host) -> Result<Box<dyn Instance>, InitError> {
        let next = format_time(&(self.now)());
        // display may come before the first callback
        Ok(Box::new(ClockInstance {
            now: self.now,
            current: next.clone(),
            next,
        }))
    }
}

struct ClockInstance {
    now: fn() -> DateTime<Local>,
    current: String,
    // precomputed for the next second boundary
    next: String,
}

impl Instance for ClockInstance {
    fn display(&mut self, _host: &mut dyn Host, surface: &mut dyn Surface) {
        surface.put_str(0, 0, &self.current, Attr::NORMAL);
    }

    fn callback(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) -> Duration {
        self.current = std::mem::take(&mut self.next);
        self.display(host, surface);

        let upcoming = (self.now)() + TimeDelta::seconds(1);
        self.next = format_time(&upcoming);

        match upcoming.nanosecond() {
            0 => Duration::from_secs(1),
            // leap seconds report nanos past one second
            nanos if nanos >= 1_000_000_000 => Duration::from_secs(1),
            nanos => Duration::from_nanos(u64::from(1_000_000_000 - nanos)),
        }
    }
}
