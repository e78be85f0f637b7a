/*
 *  dashboard/mod.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Gadget dashboard - layout, pages, modules and the event loop
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod surface;
pub mod banner;

// Layout and pages
pub mod layout;
pub mod page;

// Module resolution and gadget records
pub mod registry;

// Dashboard manager
pub mod manager;

// Input + wakeup dispatch
pub mod event_loop;

// Screen backends
pub mod drivers;

// Plugin system (conditionally compiled with plugin-system feature)
#[cfg(feature = "plugin-system")]
pub mod plugin;

// Built-in gadgets
pub mod components;

#[cfg(test)]
mod stub;

// Re-exports for convenience
pub use traits::{Host, Instance, MessageKind, Module, ModuleDescriptor, Screen};
pub use error::{InitError, LayoutError, RegistryError, ResizeError, RuntimeError, ScreenError};
pub use surface::{Attr, Cell, Rect, Size, Surface, Window};
pub use banner::{Banner, BannerStyle, BANNER_ROWS, BANNER_TEXT};
pub use layout::{place, Placement, GADGET_GAP};
pub use page::{Direction, Page, PageSet};
pub use registry::{Gadget, ModuleSearch, Registry};
pub use manager::Dashboard;
pub use event_loop::{EventLoop, InputSource, Key, LoopState};
