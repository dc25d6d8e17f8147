use crate::cmap_parser::{CMapBuilder, CMapParser};
use crate::glyphnames::{AdobeGlyphList, GlyphNameLookup};
use crate::parser::Lexer;
use crate::registry::CMapRegistry;
use crate::trie::{Cid, CodeTrie, Decode, Mappings};
use crate::{Object, Result};

use indexmap::IndexMap;
use log::debug;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Byte code to CID map backed by a [`CodeTrie`].
///
/// Covers both CMaps parsed from resource files and predefined ones built
/// programmatically; attributes hold whatever `/Key value def` pairs were
/// declared inside `begincmap ... endcmap`.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CMap {
    code2cid: CodeTrie,
    attrs: IndexMap<String, Object>,
}

impl CMap {
    pub fn new() -> CMap {
        CMap::default()
    }

    /// A predefined CMap with its name and writing mode set.
    pub fn with_trie(name: &str, code2cid: CodeTrie, vertical: bool) -> CMap {
        let mut cmap = CMap { code2cid, attrs: IndexMap::new() };
        cmap.set_attr("CMapName", Object::from(name));
        cmap.set_attr("WMode", Object::Integer(i64::from(vertical)));
        cmap
    }

    /// Parses a CMap resource, resolving `usecmap` through `registry`.
    pub fn parse(content: &[u8], registry: &dyn CMapRegistry) -> Result<CMap> {
        let mut cmap = CMap::new();
        CMapParser::new(&mut cmap, Lexer::new(content), registry, &AdobeGlyphList).run()?;
        Ok(cmap)
    }

    /// Reads and parses a CMap resource file.
    pub fn load<P: AsRef<Path>>(path: P, registry: &dyn CMapRegistry) -> Result<CMap> {
        let content = fs::read(path)?;
        CMap::parse(&content, registry)
    }

    pub fn insert(&mut self, code: &[u8], cid: Cid) {
        self.code2cid.insert(code, cid);
    }

    pub fn get(&self, code: &[u8]) -> Option<Cid> {
        self.code2cid.get(code)
    }

    /// Copies all mappings of `other` into this CMap, `other` winning on conflicts.
    pub fn use_cmap(&mut self, other: &CMap) {
        self.code2cid.merge(&other.code2cid);
    }

    pub fn decode<'a>(&'a self, code: &'a [u8]) -> Decode<'a> {
        self.code2cid.decode(code)
    }

    /// `true` when `/WMode` is a non-zero integer.
    pub fn is_vertical(&self) -> bool {
        matches!(self.attr("WMode"), Some(Object::Integer(mode)) if *mode != 0)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: Object) {
        self.attrs.insert(key.into(), value);
    }

    pub fn attr(&self, key: &str) -> Option<&Object> {
        self.attrs.get(key)
    }

    pub fn attrs(&self) -> indexmap::map::Iter<'_, String, Object> {
        self.attrs.iter()
    }

    /// The `/CMapName` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attr("CMapName").and_then(|name| name.as_name_str().ok())
    }

    pub fn iter(&self) -> Mappings<'_> {
        self.code2cid.iter()
    }

    pub fn len(&self) -> usize {
        self.code2cid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code2cid.is_empty()
    }
}

impl fmt::Debug for CMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // mappings omitted to not bloat debug log
        f.debug_struct("CMap")
            .field("name", &self.name())
            .field("vertical", &self.is_vertical())
            .finish()
    }
}

impl CMapBuilder for CMap {
    fn set_attr(&mut self, key: String, value: Object) {
        CMap::set_attr(self, key, value);
    }

    fn add_code2cid(&mut self, code: &[u8], cid: Cid) {
        self.insert(code, cid);
    }

    fn add_cid2unicode(&mut self, cid: Cid, value: &Object, _glyphs: &dyn GlyphNameLookup) -> Result<()> {
        debug!("cmap {:?} ignores unicode mapping {} -> {:?}", self.name(), cid, value);
        Ok(())
    }

    fn use_cmap(&mut self, cmap: &CMap) {
        CMap::use_cmap(self, cmap);
    }
}

/// Fixed two byte, big-endian code to CID decoding (`Identity-H`, `Identity-V`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdentityCMap {
    vertical: bool,
}

impl IdentityCMap {
    pub const HORIZONTAL: IdentityCMap = IdentityCMap { vertical: false };
    pub const VERTICAL: IdentityCMap = IdentityCMap { vertical: true };

    pub fn name(&self) -> &'static str {
        if self.vertical { "Identity-V" } else { "Identity-H" }
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    /// A trailing odd byte is ignored.
    pub fn decode<'a>(&self, code: &'a [u8]) -> IdentityDecode<'a> {
        IdentityDecode {
            chunks: code.chunks_exact(2),
        }
    }
}

pub struct IdentityDecode<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
}

impl Iterator for IdentityDecode<'_> {
    type Item = Cid;

    fn next(&mut self) -> Option<Cid> {
        self.chunks
            .next()
            .map(|chunk| Cid::from(u16::from_be_bytes([chunk[0], chunk[1]])))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

/// Anything a registry can hand out for a CMap name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyCMap {
    Identity(IdentityCMap),
    Trie(Arc<CMap>),
}

impl AnyCMap {
    pub fn decode<'a>(&'a self, code: &'a [u8]) -> CidIter<'a> {
        match self {
            AnyCMap::Identity(identity) => CidIter::Identity(identity.decode(code)),
            AnyCMap::Trie(cmap) => CidIter::Trie(cmap.decode(code)),
        }
    }

    pub fn is_vertical(&self) -> bool {
        match self {
            AnyCMap::Identity(identity) => identity.is_vertical(),
            AnyCMap::Trie(cmap) => cmap.is_vertical(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            AnyCMap::Identity(identity) => Some(identity.name()),
            AnyCMap::Trie(cmap) => cmap.name(),
        }
    }
}

impl From<CMap> for AnyCMap {
    fn from(cmap: CMap) -> Self {
        AnyCMap::Trie(Arc::new(cmap))
    }
}

impl From<Arc<CMap>> for AnyCMap {
    fn from(cmap: Arc<CMap>) -> Self {
        AnyCMap::Trie(cmap)
    }
}

impl From<IdentityCMap> for AnyCMap {
    fn from(identity: IdentityCMap) -> Self {
        AnyCMap::Identity(identity)
    }
}

pub enum CidIter<'a> {
    Identity(IdentityDecode<'a>),
    Trie(Decode<'a>),
}

impl Iterator for CidIter<'_> {
    type Item = Cid;

    fn next(&mut self) -> Option<Cid> {
        match self {
            CidIter::Identity(iter) => iter.next(),
            CidIter::Trie(iter) => iter.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_decodes_big_endian_pairs() {
        let h = IdentityCMap::HORIZONTAL;
        let v = IdentityCMap::VERTICAL;
        let input = [0x00, 0x41, 0x00, 0x42];

        assert_eq!(h.decode(&input).collect::<Vec<_>>(), vec![0x0041, 0x0042]);
        assert_eq!(v.decode(&input).collect::<Vec<_>>(), vec![0x0041, 0x0042]);
        assert!(!h.is_vertical());
        assert!(v.is_vertical());
    }

    #[test]
    fn identity_drops_odd_byte() {
        let decoded: Vec<_> = IdentityCMap::HORIZONTAL.decode(&[0x12, 0x34, 0x56]).collect();
        assert_eq!(decoded, vec![0x1234]);
    }

    #[test]
    fn merge_source_wins() {
        let mut a = CMap::new();
        a.insert(b"\x41", 1);
        let mut b = CMap::new();
        b.insert(b"\x41", 2);

        a.use_cmap(&b);
        assert_eq!(a.decode(b"\x41").collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn writing_mode_defaults_to_horizontal() {
        let mut cmap = CMap::new();
        assert!(!cmap.is_vertical());
        cmap.set_attr("WMode", Object::Integer(1));
        assert!(cmap.is_vertical());
        cmap.set_attr("WMode", Object::from("bogus"));
        assert!(!cmap.is_vertical());
    }

    #[test]
    fn predefined_cmap_attributes() {
        let mut trie = CodeTrie::new();
        trie.insert(b"\x81\x40", 633);
        let cmap = CMap::with_trie("90ms-RKSJ-V", trie, true);

        assert_eq!(cmap.name(), Some("90ms-RKSJ-V"));
        assert!(cmap.is_vertical());
        assert_eq!(cmap.get(b"\x81\x40"), Some(633));
        assert_eq!(cmap.len(), 1);
    }

    #[test]
    fn any_cmap_dispatches() {
        let identity = AnyCMap::from(IdentityCMap::VERTICAL);
        assert_eq!(identity.decode(b"\x00\x01").collect::<Vec<_>>(), vec![1]);
        assert_eq!(identity.name(), Some("Identity-V"));
        assert!(identity.is_vertical());

        let mut cmap = CMap::new();
        cmap.insert(b"\x01", 9);
        let trie = AnyCMap::from(cmap);
        assert_eq!(trie.decode(b"\x00\x01").collect::<Vec<_>>(), vec![9]);
        assert!(!trie.is_vertical());
    }
}
