/*
 *  dashboard/error.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the dashboard subsystem
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

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::wakeup::ScheduleError;
#[cfg(feature = "plugin-system")]
use crate::dashboard::plugin::PluginError;

/// Failures of the rendering surface
#[derive(Debug, Error)]
pub enum ScreenError {
    /// A window would extend past the edge of the screen
    #[error("window {height}x{width} at ({y},{x}) does not fit a {screen_height}x{screen_width} screen")]
    OutOfBounds {
        y: u16,
        x: u16,
        height: u16,
        width: u16,
        screen_height: u16,
        screen_width: u16,
    },

    /// Showing or hiding a panel failed
    #[error("panel operation failed: {0}")]
    Panel(String),

    /// Terminal I/O error
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Recoverable layout failures; the message is what the error banner shows
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("unable to place gadget: too large for screen")]
    TooLarge { gadget: usize, height: u16, width: u16 },

    #[error("cannot allocate windows for gadgets")]
    Allocation(#[source] ScreenError),

    #[error("error showing active gadget set")]
    Show(#[source] ScreenError),
}

/// A gadget's request to change its own size was refused
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("tried to attain invalid height {0}")]
    InvalidHeight(u16),

    #[error("tried to attain invalid width {0}")]
    InvalidWidth(u16),

    /// Resizing is only possible once the gadget is on a screen
    #[error("cannot resize before the dashboard is running")]
    NotRunning,

    #[error("layout failed after resize: {0}")]
    Layout(#[from] LayoutError),
}

/// A module's init entry point declined to produce an instance
#[derive(Debug, Error)]
pub enum InitError {
    #[error("module initialization failed")]
    Failed,

    #[error("module panicked during initialization: {0}")]
    Panicked(String),
}

/// Fatal startup errors while resolving and instantiating modules
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("error loading module: cannot find {file} in: {}", display_dirs(.dirs))]
    NotFound { file: String, dirs: Vec<PathBuf> },

    #[error("invalid module name '{0}': names must be plain file stems")]
    InvalidName(String),

    #[cfg(feature = "plugin-system")]
    #[error("error loading module {name}: {source}")]
    Plugin {
        name: String,
        #[source]
        source: PluginError,
    },

    #[error("error adding module {name}: {source}")]
    Init {
        name: String,
        #[source]
        source: InitError,
    },
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fatal errors once the event loop is running
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("error getting current time: {0}")]
    Clock(#[source] io::Error),

    #[error("error polling the input sources: {0}")]
    Poll(#[source] io::Error),

    #[error("error reading input: {0}")]
    Input(#[source] io::Error),

    #[error("no pending wakeups; every gadget must always be scheduled")]
    NoPendingWakeups,

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("screen update failed: {0}")]
    Screen(#[from] ScreenError),
}
