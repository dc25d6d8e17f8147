//! Name to CMap resolution.
//!
//! Parsing code only talks to [`CMapRegistry`]. [`get_cmap`] layers the two
//! reserved identity names on top of any registry, and [`CMapDb`] bundles
//! that with a concrete registry for callers that want a single entry point.

use crate::error::CMapNotFound;
use crate::load_options::LoadOptions;
use crate::{AnyCMap, CMap, IdentityCMap, UnicodeMap};

use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type LookupResult<T> = std::result::Result<T, CMapNotFound>;

pub trait CMapRegistry {
    /// Looks up a predefined or previously loaded CMap.
    fn get_cmap(&self, name: &str) -> LookupResult<Arc<CMap>>;

    /// Looks up the unicode map of a character collection for one writing mode.
    fn get_unicode_map(&self, name: &str, vertical: bool) -> LookupResult<Arc<UnicodeMap>>;
}

impl<R: CMapRegistry + ?Sized> CMapRegistry for &R {
    fn get_cmap(&self, name: &str) -> LookupResult<Arc<CMap>> {
        (**self).get_cmap(name)
    }

    fn get_unicode_map(&self, name: &str, vertical: bool) -> LookupResult<Arc<UnicodeMap>> {
        (**self).get_unicode_map(name, vertical)
    }
}

/// Resolves `name`, answering `Identity-H` and `Identity-V` without asking `registry`.
pub fn get_cmap(registry: &dyn CMapRegistry, name: &str) -> LookupResult<AnyCMap> {
    match name {
        "Identity-H" => Ok(AnyCMap::Identity(IdentityCMap::HORIZONTAL)),
        "Identity-V" => Ok(AnyCMap::Identity(IdentityCMap::VERTICAL)),
        _ => registry.get_cmap(name).map(AnyCMap::Trie),
    }
}

/// Entry point pairing a registry with the identity names.
#[derive(Debug, Clone, Default)]
pub struct CMapDb<R> {
    registry: R,
}

impl<R: CMapRegistry> CMapDb<R> {
    pub fn new(registry: R) -> CMapDb<R> {
        CMapDb { registry }
    }

    pub fn get_cmap(&self, name: &str) -> LookupResult<AnyCMap> {
        get_cmap(&self.registry, name)
    }

    pub fn get_unicode_map(&self, name: &str, vertical: bool) -> LookupResult<Arc<UnicodeMap>> {
        self.registry.get_unicode_map(name, vertical)
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }
}

/// Registry filled programmatically, e.g. from a bundled dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    cmaps: HashMap<String, Arc<CMap>>,
    unicode_maps: HashMap<(String, bool), Arc<UnicodeMap>>,
}

impl MemoryRegistry {
    pub fn new() -> MemoryRegistry {
        MemoryRegistry::default()
    }

    pub fn add_cmap(&mut self, name: impl Into<String>, cmap: impl Into<Arc<CMap>>) {
        self.cmaps.insert(name.into(), cmap.into());
    }

    pub fn add_unicode_map(&mut self, name: impl Into<String>, vertical: bool, map: impl Into<Arc<UnicodeMap>>) {
        self.unicode_maps.insert((name.into(), vertical), map.into());
    }

    pub fn len(&self) -> usize {
        self.cmaps.len() + self.unicode_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmaps.is_empty() && self.unicode_maps.is_empty()
    }
}

impl CMapRegistry for MemoryRegistry {
    fn get_cmap(&self, name: &str) -> LookupResult<Arc<CMap>> {
        self.cmaps.get(name).cloned().ok_or_else(|| CMapNotFound::new(name))
    }

    fn get_unicode_map(&self, name: &str, vertical: bool) -> LookupResult<Arc<UnicodeMap>> {
        self.unicode_maps
            .get(&(name.to_owned(), vertical))
            .cloned()
            .ok_or_else(|| CMapNotFound::new(name))
    }
}

/// Loads CMap resource files from a directory, one file per name.
///
/// `usecmap` inside a loaded file is resolved against the same directory.
/// Unicode maps are looked up as `<name>-V` or `<name>-H` first and then as
/// plain `<name>`.
#[derive(Debug)]
pub struct DirectoryRegistry {
    dir: PathBuf,
    options: LoadOptions,
    cmaps: RefCell<HashMap<String, Arc<CMap>>>,
    unicode_maps: RefCell<HashMap<String, Arc<UnicodeMap>>>,
    loading: RefCell<Vec<String>>,
    refusals: Cell<usize>,
}

impl DirectoryRegistry {
    pub fn new<P: Into<PathBuf>>(dir: P) -> DirectoryRegistry {
        DirectoryRegistry::with_options(dir, LoadOptions::default())
    }

    pub fn with_options<P: Into<PathBuf>>(dir: P, options: LoadOptions) -> DirectoryRegistry {
        DirectoryRegistry {
            dir: dir.into(),
            options,
            cmaps: RefCell::new(HashMap::new()),
            unicode_maps: RefCell::new(HashMap::new()),
            loading: RefCell::new(Vec::new()),
            refusals: Cell::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    fn read(&self, name: &str) -> LookupResult<Vec<u8>> {
        if !is_plain_name(name) {
            debug!("refusing to load cmap {:?} outside {}", name, self.dir.display());
            return Err(CMapNotFound::new(name));
        }
        let path = self.dir.join(name);
        fs::read(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                debug!("no cmap file {}", path.display());
            } else {
                warn!("cannot read cmap file {}: {}", path.display(), err);
            }
            CMapNotFound::new(name)
        })
    }

    /// Runs `load` with `name` on the loading stack, refusing cycles and
    /// nesting beyond the configured depth.
    ///
    /// Alongside the value, reports whether the load was complete: no nested
    /// `usecmap` below it was refused. Incomplete results are not cached.
    fn guarded<T>(&self, name: &str, load: impl FnOnce() -> LookupResult<T>) -> LookupResult<(T, bool)> {
        {
            let mut loading = self.loading.borrow_mut();
            if loading.iter().any(|pending| pending == name) {
                warn!("usecmap cycle through {}: {:?}", name, loading);
                self.refusals.set(self.refusals.get() + 1);
                return Err(CMapNotFound::new(name));
            }
            if loading.len() > self.options.max_usecmap_depth {
                warn!("usecmap nesting deeper than {} at {}", self.options.max_usecmap_depth, name);
                self.refusals.set(self.refusals.get() + 1);
                return Err(CMapNotFound::new(name));
            }
            loading.push(name.to_owned());
        }
        let refusals = self.refusals.get();
        let result = load();
        self.loading.borrow_mut().pop();
        let complete = self.refusals.get() == refusals;
        result.map(|value| (value, complete))
    }

    fn load_cmap(&self, name: &str) -> LookupResult<Arc<CMap>> {
        let content = self.read(name)?;
        let cmap = CMap::parse(&content, self).map_err(|err| {
            warn!("cannot parse cmap {}: {}", name, err);
            CMapNotFound::new(name)
        })?;
        Ok(Arc::new(cmap))
    }

    fn load_unicode_map(&self, file: &str) -> LookupResult<Arc<UnicodeMap>> {
        let content = self.read(file)?;
        let map = UnicodeMap::parse(&content, self).map_err(|err| {
            warn!("cannot parse unicode map {}: {}", file, err);
            CMapNotFound::new(file)
        })?;
        Ok(Arc::new(map))
    }

    fn unicode_map_file(&self, file: &str) -> LookupResult<Arc<UnicodeMap>> {
        if let Some(map) = self.unicode_maps.borrow().get(file) {
            return Ok(map.clone());
        }
        let (map, complete) = self.guarded(file, || self.load_unicode_map(file))?;
        if self.options.cache && complete {
            self.unicode_maps.borrow_mut().insert(file.to_owned(), map.clone());
        }
        Ok(map)
    }
}

impl CMapRegistry for DirectoryRegistry {
    fn get_cmap(&self, name: &str) -> LookupResult<Arc<CMap>> {
        if let Some(cmap) = self.cmaps.borrow().get(name) {
            return Ok(cmap.clone());
        }
        let (cmap, complete) = self.guarded(name, || self.load_cmap(name))?;
        if self.options.cache && complete {
            self.cmaps.borrow_mut().insert(name.to_owned(), cmap.clone());
        }
        Ok(cmap)
    }

    fn get_unicode_map(&self, name: &str, vertical: bool) -> LookupResult<Arc<UnicodeMap>> {
        let suffix = if vertical { "V" } else { "H" };
        self.unicode_map_file(&format!("{}-{}", name, suffix))
            .or_else(|_| self.unicode_map_file(name))
            .map_err(|_| CMapNotFound::new(name))
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}
