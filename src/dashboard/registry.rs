/*
 *  dashboard/registry.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Module discovery, instantiation and gadget records
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

use std::path::{Path, PathBuf};
use std::rc::Rc;
use log::{debug, info, warn};

use crate::dashboard::banner::Banner;
use crate::dashboard::components;
use crate::dashboard::error::{RegistryError, ResizeError};
use crate::dashboard::surface::{Size, Window};
use crate::dashboard::traits::{Host, Instance, MessageKind, Module, ModuleDescriptor};
#[cfg(feature = "plugin-system")]
use crate::dashboard::plugin::{PluginLoader, PluginModule};

/// Per-user module directory, relative to the home directory
pub const USER_MODULE_DIR: &str = ".constatus/modules";

pub const SYSTEM_MODULE_DIR: &str = "/usr/lib/constatus/modules";

/// One module instance placed on screen
pub struct Gadget {
    name: String,
    pub(crate) height: u16,
    pub(crate) width: u16,
    pub(crate) x: u16,
    pub(crate) y: u16,
    module: Rc<dyn Module>,
    // taken out for the duration of a bound call
    pub(crate) instance: Option<Box<dyn Instance>>,
    pub(crate) window: Option<Window>,
}

impl Gadget {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn size(&self) -> Size {
        Size::new(self.height, self.width)
    }

    pub fn x(&self) -> u16 {
        self.x
    }

    pub fn y(&self) -> u16 {
        self.y
    }

    /// Geometry the module originally declared
    pub fn descriptor(&self) -> ModuleDescriptor {
        self.module.descriptor()
    }

    /// Window from the last successful layout
    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

impl std::fmt::Debug for Gadget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gadget")
            .field("name", &self.name)
            .field("height", &self.height)
            .field("width", &self.width)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("window", &self.window.as_ref().map(Window::rect))
            .finish()
    }
}

/// Ordered list of directories searched for module files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSearch {
    dirs: Vec<PathBuf>,
}

impl ModuleSearch {
    /// An explicit override replaces the defaults. Otherwise the per-user
    /// directory (when a home is known) is searched before the system one.
    pub fn new(override_dir: Option<PathBuf>, home: Option<&Path>) -> Self {
        let dirs = match override_dir {
            Some(dir) => vec![dir],
            None => {
                let mut dirs = Vec::with_capacity(2);
                if let Some(home) = home {
                    dirs.push(home.join(USER_MODULE_DIR));
                }
                dirs.push(PathBuf::from(SYSTEM_MODULE_DIR));
                dirs
            }
        };
        Self { dirs }
    }

    /// Search rooted at the current user's home directory
    pub fn from_home(override_dir: Option<PathBuf>) -> Self {
        Self::new(override_dir, dirs_next::home_dir().as_deref())
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Platform file name of module `name`, e.g. `clock.so`
    pub fn file_name(name: &str) -> String {
        format!("{}{}", name, std::env::consts::DLL_SUFFIX)
    }

    /// First existing module file for `name`
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let file = Self::file_name(name);
        let found = self.dirs.iter().map(|d| d.join(&file)).find(|p| p.is_file());
        match &found {
            Some(path) => debug!("found module {} at {}", name, path.display()),
            None => debug!("no module file {} in {:?}", file, self.dirs),
        }
        found
    }
}

/// Module names are bare file stems
pub fn validate_name(name: &str) -> Result<(), RegistryError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

// host capability during init, before any screen exists
struct InitHost<'a> {
    name: &'a str,
    last: Option<Banner>,
}

impl Host for InitHost<'_> {
    fn report(&mut self, kind: MessageKind, text: &str) {
        self.last = Some(Banner::gadget_message(self.name, kind, text));
    }

    fn request_resize(&mut self, height: u16, width: u16) -> Result<(), ResizeError> {
        warn!("{}: resize to {}x{} requested during init; refused", self.name, height, width);
        Err(ResizeError::NotRunning)
    }
}

/// Loads modules and owns the resulting gadgets until the dashboard starts
pub struct Registry {
    search: ModuleSearch,
    gadgets: Vec<Gadget>,
    pending: Option<Banner>,
}

impl Registry {
    pub fn new(search: ModuleSearch) -> Self {
        Self {
            search,
            gadgets: Vec::new(),
            pending: None,
        }
    }

    pub fn search(&self) -> &ModuleSearch {
        &self.search
    }

    /// Resolve `name` and add a gadget for it.
    ///
    /// A module file in the search path wins over a built-in of the same
    /// name. Every failure here is fatal to startup.
    pub fn load(&mut self, name: &str) -> Result<(), RegistryError> {
        validate_name(name)?;
        let module = self.resolve(name)?;
        self.load_module(name, module)
    }

    fn resolve(&self, name: &str) -> Result<Rc<dyn Module>, RegistryError> {
        #[cfg(feature = "plugin-system")]
        if let Some(path) = self.search.find(name) {
            let plugin = PluginLoader::load_plugin(&path).map_err(|source| RegistryError::Plugin {
                name: name.to_string(),
                source,
            })?;
            return Ok(Rc::new(PluginModule::new(plugin)));
        }

        if let Some(module) = components::builtin(name) {
            debug!("using built-in module {}", name);
            return Ok(module);
        }

        Err(RegistryError::NotFound {
            file: ModuleSearch::file_name(name),
            dirs: self.search.dirs.clone(),
        })
    }

    /// Instantiate an already resolved module as a new gadget
    pub fn load_module(&mut self, name: &str, module: Rc<dyn Module>) -> Result<(), RegistryError> {
        let desc = module.descriptor();
        let mut host = InitHost { name, last: None };

        let outcome = module.init(&mut host);
        if host.last.is_some() {
            self.pending = host.last;
        }
        let instance = outcome.map_err(|source| RegistryError::Init {
            name: name.to_string(),
            source,
        })?;

        info!("loaded module {} ({}x{})", name, desc.height, desc.width);
        self.gadgets.push(Gadget {
            name: name.to_string(),
            height: desc.height,
            width: desc.width,
            x: 0,
            y: 0,
            module,
            instance: Some(instance),
            window: None,
        });
        Ok(())
    }

    pub fn gadgets(&self) -> &[Gadget] {
        &self.gadgets
    }

    pub fn len(&self) -> usize {
        self.gadgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gadgets.is_empty()
    }

    /// Last message reported during init, shown once the dashboard starts
    pub fn pending_message(&self) -> Option<&Banner> {
        self.pending.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Vec<Gadget>, Option<Banner>) {
        (self.gadgets, self.pending)
    }
}
