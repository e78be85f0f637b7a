/*
 *  dashboard/plugin/loader.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Module loader - opens shared libraries and validates their contract
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
use log::{debug, info};
use libloading::{Library, Symbol};
use thiserror::Error;

use super::ffi::{
    ConstatusAbiVersionFn,
    ConstatusModuleTable,
    ConstatusRegisterFn,
    CONSTATUS_ABI_VERSION_SYMBOL,
    CONSTATUS_MODULE_ABI_VERSION,
    CONSTATUS_REGISTER_SYMBOL,
};
use crate::dashboard::traits::ModuleDescriptor;

/// Why a module library could not be used
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("cannot open {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("missing symbol {symbol}: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("module registration returned a null table")]
    NullTable,

    #[error("ABI version mismatch: module {module}, host {host}")]
    AbiMismatch { module: u32, host: u32 },

    #[error("module does not implement {0}")]
    IncompleteContract(&'static str),

    #[error("invalid module geometry {height}x{width}")]
    InvalidGeometry { height: i32, width: i32 },
}

/// A loaded module library and its contract table
pub struct LoadedPlugin {
    // points into `library`'s static data
    table: *const ConstatusModuleTable,
    descriptor: ModuleDescriptor,
    path: PathBuf,
    // dropped last; unloads the code behind `table`
    _library: Library,
}

impl LoadedPlugin {
    pub fn table(&self) -> &ConstatusModuleTable {
        // SAFETY: checked non-null at load; the library stays loaded as long as self
        unsafe { &*self.table }
    }

    pub fn descriptor(&self) -> ModuleDescriptor {
        self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("path", &self.path)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

pub struct PluginLoader;

impl PluginLoader {
    /// Load a module library from `path`
    ///
    /// 1. open the shared library
    /// 2. check the ABI version
    /// 3. fetch the contract table
    /// 4. verify the required entry points and geometry
    pub fn load_plugin<P: AsRef<Path>>(path: P) -> Result<LoadedPlugin, PluginError> {
        let path = path.as_ref();
        info!("loading module from {}", path.display());

        // SAFETY: running the library's initialisers is the point of loading it
        let library = unsafe { Library::new(path) }.map_err(|source| PluginError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let version = {
            // SAFETY: the symbol type is fixed by the module ABI
            let abi_version: Symbol<ConstatusAbiVersionFn> = unsafe { library.get(CONSTATUS_ABI_VERSION_SYMBOL) }
                .map_err(|source| PluginError::MissingSymbol { symbol: "constatus_module_abi_version", source })?;
            abi_version()
        };
        check_abi(version)?;

        let table = {
            // SAFETY: as above
            let register: Symbol<ConstatusRegisterFn> = unsafe { library.get(CONSTATUS_REGISTER_SYMBOL) }
                .map_err(|source| PluginError::MissingSymbol { symbol: "constatus_module_register", source })?;
            register()
        };
        if table.is_null() {
            return Err(PluginError::NullTable);
        }

        // SAFETY: non-null and owned by `library`, which is still loaded
        let descriptor = validate_table(unsafe { &*table })?;
        debug!("{}: {}x{}", path.display(), descriptor.height, descriptor.width);

        Ok(LoadedPlugin {
            table,
            descriptor,
            path: path.to_path_buf(),
            _library: library,
        })
    }
}

/// Accept only modules built against this host's ABI version
pub fn check_abi(version: u32) -> Result<(), PluginError> {
    debug!("module ABI {}, host ABI {}", version, CONSTATUS_MODULE_ABI_VERSION);
    if version != CONSTATUS_MODULE_ABI_VERSION {
        return Err(PluginError::AbiMismatch { module: version, host: CONSTATUS_MODULE_ABI_VERSION });
    }
    Ok(())
}

/// Check the required entry points and the declared size
pub fn validate_table(table: &ConstatusModuleTable) -> Result<ModuleDescriptor, PluginError> {
    if table.init.is_none() {
        return Err(PluginError::IncompleteContract("init"));
    }
    if table.display.is_none() {
        return Err(PluginError::IncompleteContract("display"));
    }
    if table.callback.is_none() {
        return Err(PluginError::IncompleteContract("callback"));
    }

    let invalid = || PluginError::InvalidGeometry { height: table.height, width: table.width };
    let height = u16::try_from(table.height).map_err(|_| invalid())?;
    let width = u16::try_from(table.width).map_err(|_| invalid())?;
    Ok(ModuleDescriptor { height, width })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::dashboard::plugin::ffi::{ConstatusDelay, ConstatusHost, ConstatusInstance, ConstatusSurface};

    extern "C" fn init(_host: *const ConstatusHost) -> *mut ConstatusInstance {
        std::ptr::null_mut()
    }

    extern "C" fn display(_i: *mut ConstatusInstance, _h: *const ConstatusHost, _s: *const ConstatusSurface) {}

    extern "C" fn callback(_i: *mut ConstatusInstance, _h: *const ConstatusHost, _s: *const ConstatusSurface) -> ConstatusDelay {
        ConstatusDelay { secs: 1, nanos: 0 }
    }

    fn table(height: i32, width: i32) -> ConstatusModuleTable {
        ConstatusModuleTable {
            height,
            width,
            init: Some(init),
            display: Some(display),
            callback: Some(callback),
            resize: None,
        }
    }

    #[test]
    fn test_complete_table_is_accepted() {
        let desc = validate_table(&table(1, 8)).unwrap();
        assert_eq!(desc, ModuleDescriptor { height: 1, width: 8 });
    }

    #[test]
    fn test_missing_entry_points_rejected() {
        let mut t = table(1, 1);
        t.callback = None;
        assert!(matches!(validate_table(&t), Err(PluginError::IncompleteContract("callback"))));

        let mut t = table(1, 1);
        t.init = None;
        assert!(matches!(validate_table(&t), Err(PluginError::IncompleteContract("init"))));
    }

    #[test]
    fn test_negative_geometry_rejected() {
        assert!(matches!(
            validate_table(&table(-1, 4)),
            Err(PluginError::InvalidGeometry { height: -1, width: 4 })
        ));
    }

    #[test]
    fn test_abi_version_must_match() {
        assert!(check_abi(CONSTATUS_MODULE_ABI_VERSION).is_ok());

        let err = check_abi(CONSTATUS_MODULE_ABI_VERSION + 1).unwrap_err();
        assert!(matches!(err, PluginError::AbiMismatch { module: 2, host: 1 }));
        assert_eq!(err.to_string(), "ABI version mismatch: module 2, host 1");
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = PluginLoader::load_plugin(dir.path().join("nothing.so")).unwrap_err();
        assert!(matches!(err, PluginError::Load { .. }));
    }

    #[test]
    fn test_non_library_fails_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a shared object").unwrap();
        let err = PluginLoader::load_plugin(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("cannot open"));
    }
}
