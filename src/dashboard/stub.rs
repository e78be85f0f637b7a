/*
 *  dashboard/stub.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scriptable in-process module for unit tests
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

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::dashboard::error::InitError;
use crate::dashboard::surface::{Attr, Surface};
use crate::dashboard::traits::{Host, Instance, Module, ModuleDescriptor};

/// Shared record of everything stub instances were asked to do
pub type Events = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone)]
pub struct Script {
    pub delay: Duration,
    pub fail_init: bool,
    pub init_message: Option<&'static str>,
    pub resize_in_init: bool,
    pub resize_on_callback: Option<(u16, u16)>,
    pub message_on_callback: Option<&'static str>,
    pub fill: char,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            fail_init: false,
            init_message: None,
            resize_in_init: false,
            resize_on_callback: None,
            message_on_callback: None,
            fill: '#',
        }
    }
}

pub struct StubModule {
    name: &'static str,
    height: u16,
    width: u16,
    script: Script,
    events: Events,
}

impl StubModule {
    pub fn new(name: &'static str, height: u16, width: u16, events: &Events) -> Self {
        Self::scripted(name, height, width, Script::default(), events)
    }

    pub fn scripted(name: &'static str, height: u16, width: u16, script: Script, events: &Events) -> Self {
        Self { name, height, width, script, events: Rc::clone(events) }
    }
}

impl Module for StubModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor { height: self.height, width: self.width }
    }

    fn init(&self, host: &mut dyn Host) -> Result<Box<dyn Instance>, InitError> {
        self.events.borrow_mut().push(format!("{}:init", self.name));
        if let Some(msg) = self.script.init_message {
            host.info(msg);
        }
        if self.script.resize_in_init {
            let outcome = host.request_resize(3, 3);
            self.events.borrow_mut().push(format!("{}:init-resize {}", self.name, outcome.is_ok()));
        }
        if self.script.fail_init {
            return Err(InitError::Failed);
        }
        Ok(Box::new(StubInstance {
            name: self.name,
            script: self.script.clone(),
            events: Rc::clone(&self.events),
            resized: false,
        }))
    }
}

struct StubInstance {
    name: &'static str,
    script: Script,
    events: Events,
    resized: bool,
}

impl Instance for StubInstance {
    fn display(&mut self, _host: &mut dyn Host, surface: &mut dyn Surface) {
        self.events.borrow_mut().push(format!("{}:display", self.name));
        for y in 0..surface.height() {
            surface.fill(y, 0, surface.width(), self.script.fill, Attr::NORMAL);
        }
    }

    fn callback(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) -> Duration {
        self.events.borrow_mut().push(format!("{}:callback", self.name));
        if let Some(msg) = self.script.message_on_callback {
            host.err(msg);
        }
        if let (Some((h, w)), false) = (self.script.resize_on_callback, self.resized) {
            self.resized = true;
            let outcome = host.request_resize(h, w);
            self.events.borrow_mut().push(format!("{}:resize-request {}", self.name, outcome.is_ok()));
            if let Err(e) = outcome {
                self.events.borrow_mut().push(format!("{}:resize-error {}", self.name, e));
            }
        }
        self.display(host, surface);
        self.script.delay
    }

    fn resize(&mut self, _host: &mut dyn Host, screen_height: u16, screen_width: u16) {
        self.events.borrow_mut().push(format!("{}:resize {}x{}", self.name, screen_height, screen_width));
    }
}
