/*
 *  dashboard/traits.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Module contract and rendering-surface traits
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

use crate::dashboard::banner::Banner;
use crate::dashboard::error::{InitError, ResizeError, ScreenError};
use crate::dashboard::surface::{Rect, Size, Surface, Window};

/// Severity of a gadget-reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Info,
}

/// Geometry a module asks for when it is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub height: u16,
    pub width: u16,
}

/// Capability handed to gadget code for the duration of one call.
///
/// Everything reported through it is attributed to the gadget being called.
pub trait Host {
    fn report(&mut self, kind: MessageKind, text: &str);

    /// Change this gadget's size and re-layout the dashboard before returning
    fn request_resize(&mut self, height: u16, width: u16) -> Result<(), ResizeError>;

    fn err(&mut self, text: &str) {
        self.report(MessageKind::Error, text);
    }

    fn info(&mut self, text: &str) {
        self.report(MessageKind::Info, text);
    }
}

/// A loadable gadget implementation
pub trait Module {
    fn descriptor(&self) -> ModuleDescriptor;

    /// Create a new instance. Called once per gadget.
    fn init(&self, host: &mut dyn Host) -> Result<Box<dyn Instance>, InitError>;
}

/// Per-gadget state produced by [`Module::init`]
pub trait Instance {
    /// Redraw from current state
    fn display(&mut self, host: &mut dyn Host, surface: &mut dyn Surface);

    /// Periodic update. Redraws and returns how long until the next call.
    fn callback(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) -> Duration;

    /// Told the usable screen size on startup and whenever the terminal changes
    fn resize(&mut self, _host: &mut dyn Host, _screen_height: u16, _screen_width: u16) {}
}

/// Rendering collaborator: windows, panels and compositing
pub trait Screen {
    /// Current full-screen size, banner row included
    fn size(&mut self) -> Result<Size, ScreenError>;

    /// Allocate a hidden window at `rect`
    fn new_window(&mut self, rect: Rect) -> Result<Window, ScreenError>;

    fn show_panel(&mut self, window: &mut Window) -> Result<(), ScreenError> {
        window.set_visible(true);
        Ok(())
    }

    fn hide_panel(&mut self, window: &mut Window) -> Result<(), ScreenError> {
        window.set_visible(false);
        Ok(())
    }

    /// Blank the whole screen on the next present
    fn clear(&mut self) -> Result<(), ScreenError>;

    /// Composite the banner and visible windows and flush
    fn present(&mut self, banner: &Banner, windows: &[&Window]) -> Result<(), ScreenError>;
}
