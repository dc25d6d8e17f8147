use crate::cmap_parser::{CMapBuilder, CMapParser};
use crate::glyphnames::{AdobeGlyphList, GlyphNameLookup};
use crate::parser::Lexer;
use crate::registry::CMapRegistry;
use crate::trie::Cid;
use crate::{CMap, Error, Object, Result};

use encoding_rs::UTF_16BE;
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

const REPLACEMENT_CHAR: char = '\u{fffd}';

/// What a CID maps to.
///
/// Values are kept as raw `u32` so that lone UTF-16 units from two byte
/// destinations survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnicodeValue {
    Single(u32),
    /// Ligatures and other multi code point substitutions.
    Sequence(Vec<u32>),
}

impl UnicodeValue {
    fn from_chars(chars: impl IntoIterator<Item = char>) -> UnicodeValue {
        let mut points: Vec<u32> = chars.into_iter().map(u32::from).collect();
        if points.len() == 1 {
            UnicodeValue::Single(points.remove(0))
        } else {
            UnicodeValue::Sequence(points)
        }
    }

    /// Decodes a UTF-16BE destination string.
    ///
    /// A two byte string is taken as one code unit as is; longer strings are
    /// decoded with unpaired surrogates replaced by U+FFFD.
    pub fn from_utf16be(bytes: &[u8]) -> UnicodeValue {
        if let [hi, lo] = *bytes {
            return UnicodeValue::Single(u32::from(u16::from_be_bytes([hi, lo])));
        }
        let (text, _) = UTF_16BE.decode_without_bom_handling(bytes);
        UnicodeValue::from_chars(text.chars())
    }

    pub fn code_points(&self) -> &[u32] {
        match self {
            UnicodeValue::Single(cp) => std::slice::from_ref(cp),
            UnicodeValue::Sequence(cps) => cps,
        }
    }

    /// Renders the value, substituting U+FFFD for anything that is not a scalar value.
    pub fn to_string_lossy(&self) -> String {
        self.code_points()
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or(REPLACEMENT_CHAR))
            .collect()
    }
}

impl From<char> for UnicodeValue {
    fn from(c: char) -> Self {
        UnicodeValue::Single(u32::from(c))
    }
}

impl From<&str> for UnicodeValue {
    fn from(s: &str) -> Self {
        UnicodeValue::from_chars(s.chars())
    }
}

impl fmt::Display for UnicodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// CID to Unicode map, as found in ToUnicode CMaps and predefined
/// `UniXXX` resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnicodeMap {
    cid2unicode: HashMap<Cid, UnicodeValue>,
    attrs: IndexMap<String, Object>,
}

impl UnicodeMap {
    pub fn new() -> UnicodeMap {
        UnicodeMap::default()
    }

    /// Parses a CMap resource into a unicode map, resolving glyph names
    /// with the bundled Adobe Glyph List.
    pub fn parse(content: &[u8], registry: &dyn CMapRegistry) -> Result<UnicodeMap> {
        let mut map = UnicodeMap::new();
        CMapParser::new(&mut map, Lexer::new(content), registry, &AdobeGlyphList).run()?;
        Ok(map)
    }

    pub fn load<P: AsRef<Path>>(path: P, registry: &dyn CMapRegistry) -> Result<UnicodeMap> {
        let content = fs::read(path)?;
        UnicodeMap::parse(&content, registry)
    }

    /// Maps `cid` to `value` after normalising it.
    ///
    /// * `Name`: resolved through `glyphs`; unknown names are skipped.
    /// * `String`: UTF-16BE, see [`UnicodeValue::from_utf16be`].
    /// * `Integer`: taken as a code point.
    ///
    /// Any other object is a caller error and reported as such.
    pub fn insert(&mut self, cid: Cid, value: &Object, glyphs: &dyn GlyphNameLookup) -> Result<()> {
        let value = match value {
            Object::Name(name) => {
                let name = String::from_utf8_lossy(name);
                match glyphs.lookup(&name) {
                    Some(value) => value,
                    None => {
                        warn!("unknown glyph name /{} for cid {}", name, cid);
                        return Ok(());
                    }
                }
            }
            Object::String(bytes) => UnicodeValue::from_utf16be(bytes),
            Object::Integer(cp) => UnicodeValue::Single(u32::try_from(*cp).map_err(|_| Error::InvalidCodepoint(*cp))?),
            Object::Array(_) | Object::Keyword(_) => {
                return Err(Error::UnsupportedValue {
                    found: value.enum_variant(),
                });
            }
        };
        self.cid2unicode.insert(cid, value);
        Ok(())
    }

    /// Stores an already normalised value.
    pub fn insert_value(&mut self, cid: Cid, value: UnicodeValue) {
        self.cid2unicode.insert(cid, value);
    }

    pub fn get(&self, cid: Cid) -> Option<&UnicodeValue> {
        self.cid2unicode.get(&cid)
    }

    pub fn get_or_replacement(&self, cid: Cid) -> String {
        self.get(cid)
            .map(UnicodeValue::to_string_lossy)
            .unwrap_or_else(|| REPLACEMENT_CHAR.to_string())
    }

    /// Concatenates the text of `cids`, with U+FFFD for unmapped ones.
    pub fn to_text(&self, cids: impl IntoIterator<Item = Cid>) -> String {
        cids.into_iter().map(|cid| self.get_or_replacement(cid)).collect()
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

    pub fn len(&self) -> usize {
        self.cid2unicode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cid2unicode.is_empty()
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, Cid, UnicodeValue> {
        self.cid2unicode.iter()
    }
}

impl CMapBuilder for UnicodeMap {
    fn set_attr(&mut self, key: String, value: Object) {
        UnicodeMap::set_attr(self, key, value);
    }

    fn add_code2cid(&mut self, code: &[u8], cid: Cid) {
        debug!("unicode map ignores cid mapping {:02X?} -> {}", code, cid);
    }

    fn add_cid2unicode(&mut self, cid: Cid, value: &Object, glyphs: &dyn GlyphNameLookup) -> Result<()> {
        self.insert(cid, value, glyphs)
    }

    fn use_cmap(&mut self, cmap: &CMap) {
        debug!("unicode map cannot merge cmap {:?}", cmap.name());
    }
}
