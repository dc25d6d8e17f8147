//! Keyword driven builder for CMap resources.
//!
//! Operands are pushed onto an [`OperandStack`] as they arrive; keywords
//! inside `begincmap ... endcmap` drain the stack and update the target.
//! Malformed operand groups are skipped without failing the parse. Only a
//! destination value a [`UnicodeMap`](crate::UnicodeMap) cannot represent
//! aborts [`CMapParser::run`] with an error.

use crate::glyphnames::GlyphNameLookup;
use crate::parser::TokenSource;
use crate::parser::stack::OperandStack;
use crate::range::{self, CodeRange, Template, nunpack};
use crate::registry::{self, CMapRegistry};
use crate::trie::Cid;
use crate::{AnyCMap, CMap, Object, Result};

use log::{debug, warn};

/// Receiver of everything a CMap resource declares.
///
/// [`CMap`] keeps the code to CID mappings, [`UnicodeMap`](crate::UnicodeMap)
/// the CID to Unicode ones; each ignores what it cannot hold.
pub trait CMapBuilder {
    fn set_attr(&mut self, key: String, value: Object);

    fn add_code2cid(&mut self, code: &[u8], cid: Cid);

    fn add_cid2unicode(&mut self, cid: Cid, value: &Object, glyphs: &dyn GlyphNameLookup) -> Result<()>;

    fn use_cmap(&mut self, cmap: &CMap);
}

pub struct CMapParser<'a, B: CMapBuilder + ?Sized, S: TokenSource> {
    target: &'a mut B,
    tokens: S,
    registry: &'a dyn CMapRegistry,
    glyphs: &'a dyn GlyphNameLookup,
    stack: OperandStack,
    in_cmap: bool,
}

impl<'a, B: CMapBuilder + ?Sized, S: TokenSource> CMapParser<'a, B, S> {
    pub fn new(
        target: &'a mut B, tokens: S, registry: &'a dyn CMapRegistry, glyphs: &'a dyn GlyphNameLookup,
    ) -> Self {
        CMapParser {
            target,
            tokens,
            registry,
            glyphs,
            stack: OperandStack::new(),
            in_cmap: false,
        }
    }

    /// Consumes tokens until the source is exhausted.
    pub fn run(mut self) -> Result<()> {
        while let Some((offset, token)) = self.tokens.next_token() {
            match token {
                Object::Keyword(keyword) => self.do_keyword(offset, keyword)?,
                operand => self.stack.push(offset, operand),
            }
        }
        Ok(())
    }

    fn do_keyword(&mut self, offset: usize, keyword: Vec<u8>) -> Result<()> {
        match keyword.as_slice() {
            b"begincmap" => {
                self.in_cmap = true;
                self.stack.clear();
            }
            b"endcmap" => {
                self.in_cmap = false;
                self.stack.clear();
            }
            _ if !self.in_cmap => {}
            b"def" => self.do_def(),
            b"usecmap" => self.do_usecmap(),
            b"begincodespacerange" | b"begincidrange" | b"begincidchar" | b"beginbfrange" | b"beginbfchar"
            | b"beginnotdefrange" => self.stack.clear(),
            b"endcodespacerange" | b"endnotdefrange" => {
                let drained = self.stack.popall();
                debug!("discarding {} operands of a codespace/notdef block", drained.len());
            }
            b"endcidrange" => self.end_cidrange(),
            b"endcidchar" => self.end_cidchar(),
            b"endbfrange" => return self.end_bfrange(),
            b"endbfchar" => return self.end_bfchar(),
            _ => self.stack.push(offset, Object::Keyword(keyword)),
        }
        Ok(())
    }

    fn operands(&mut self) -> Vec<Object> {
        self.stack.popall().into_iter().map(|(_, obj)| obj).collect()
    }

    fn do_def(&mut self) {
        let operands = match self.stack.pop(2) {
            Ok(operands) => operands,
            Err(err) => {
                debug!("ignoring def: {}", err);
                return;
            }
        };
        let Ok([(_, key), (_, value)]) = <[(usize, Object); 2]>::try_from(operands) else {
            return;
        };
        match key {
            Object::Name(name) => self.target.set_attr(String::from_utf8_lossy(&name).into_owned(), value),
            other => debug!("ignoring def with {} key", other.enum_variant()),
        }
    }

    fn do_usecmap(&mut self) {
        let operands = match self.stack.pop(1) {
            Ok(operands) => operands,
            Err(err) => {
                debug!("ignoring usecmap: {}", err);
                return;
            }
        };
        let Some((_, Object::Name(name))) = operands.into_iter().next() else {
            debug!("ignoring usecmap without a name operand");
            return;
        };
        let name = String::from_utf8_lossy(&name);
        match registry::get_cmap(self.registry, &name) {
            Ok(AnyCMap::Trie(cmap)) => self.target.use_cmap(&cmap),
            Ok(AnyCMap::Identity(identity)) => {
                warn!("usecmap {} has no mappings to merge", identity.name());
            }
            Err(err) => debug!("ignoring usecmap: {}", err),
        }
    }

    fn end_cidrange(&mut self) {
        for group in self.operands().chunks_exact(3) {
            let [Object::String(start), Object::String(end), Object::Integer(cid)] = group else {
                debug!("skipping malformed cidrange {:?}", group);
                continue;
            };
            let (Ok(cid), Some(range)) = (Cid::try_from(*cid), CodeRange::new(start, end)) else {
                debug!("skipping invalid cidrange {:?}", group);
                continue;
            };
            for (code, cid) in range.with_cids(cid) {
                self.target.add_code2cid(&code, cid);
            }
        }
    }

    fn end_cidchar(&mut self) {
        for group in self.operands().chunks_exact(2) {
            let [Object::String(code), Object::Integer(cid)] = group else {
                debug!("skipping malformed cidchar {:?}", group);
                continue;
            };
            match Cid::try_from(*cid) {
                Ok(cid) if !code.is_empty() => self.target.add_code2cid(code, cid),
                _ => debug!("skipping invalid cidchar {:?}", group),
            }
        }
    }

    fn end_bfrange(&mut self) -> Result<()> {
        for group in self.operands().chunks_exact(3) {
            let [Object::String(start), Object::String(end), dst] = group else {
                debug!("skipping malformed bfrange {:?}", group);
                continue;
            };
            let Some(cids) = range::source_codes(start, end) else {
                debug!("skipping bfrange with mismatched codes {:?}", group);
                continue;
            };
            match dst {
                Object::Array(values) => {
                    let count = cids.end().checked_sub(*cids.start()).map_or(0, |d| d as usize + 1);
                    if values.len() < count {
                        warn!("bfrange {:?} lists {} of {} destinations, skipping", group, values.len(), count);
                        continue;
                    }
                    for (cid, value) in cids.zip(values) {
                        self.target.add_cid2unicode(cid, value, self.glyphs)?;
                    }
                }
                Object::String(template) if !template.is_empty() => {
                    let template = Template::new(template);
                    for (cid, offset) in cids.zip(0..) {
                        self.target.add_cid2unicode(cid, &Object::String(template.nth(offset)), self.glyphs)?;
                    }
                }
                _ => debug!("skipping bfrange with {} destination", dst.enum_variant()),
            }
        }
        Ok(())
    }

    fn end_bfchar(&mut self) -> Result<()> {
        for group in self.operands().chunks_exact(2) {
            match group {
                [Object::String(code), dst @ (Object::String(_) | Object::Name(_))]
                    if (1..=4).contains(&code.len()) && dst.as_str().map_or(true, |s| !s.is_empty()) =>
                {
                    self.target.add_cid2unicode(nunpack(code), dst, self.glyphs)?;
                }
                _ => debug!("skipping malformed bfchar {:?}", group),
            }
        }
        Ok(())
    }
}
