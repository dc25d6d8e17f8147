//! Byte-keyed trie from variable length character codes to CIDs.
//!
//! Nodes live in a flat arena and refer to their children by index. The
//! root is always node `0`. A path either ends in a CID or continues into
//! a child node, never both: inserting a code that runs through an existing
//! leaf replaces the leaf, and inserting a shorter code over a subtree
//! replaces the subtree. Replaced nodes stay in the arena unreachable.

#[cfg(feature = "serde")]
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Character identifier.
pub type Cid = u32;

const ROOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Entry {
    Node(u32),
    Cid(Cid),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Node {
    entries: BTreeMap<u8, Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTrie"))]
pub struct CodeTrie {
    nodes: Vec<Node>,
}

/// Unchecked arena as read from a serialized trie.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTrie {
    nodes: Vec<Node>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTrie> for CodeTrie {
    type Error = Error;

    fn try_from(raw: RawTrie) -> Result<CodeTrie> {
        if raw.nodes.is_empty() {
            return Err(Error::InvalidTrie("missing root node"));
        }
        // children are always allocated after their parent, so a forward
        // index also rules out cycles
        for (parent, node) in raw.nodes.iter().enumerate() {
            for entry in node.entries.values() {
                if let Entry::Node(child) = *entry {
                    let child = child as usize;
                    if child <= parent || child >= raw.nodes.len() {
                        return Err(Error::InvalidTrie("child index out of range"));
                    }
                }
            }
        }
        Ok(CodeTrie { nodes: raw.nodes })
    }
}

impl Default for CodeTrie {
    fn default() -> Self {
        CodeTrie::new()
    }
}

impl CodeTrie {
    pub fn new() -> CodeTrie {
        CodeTrie {
            nodes: vec![Node::default()],
        }
    }

    fn alloc(&mut self) -> u32 {
        self.nodes.push(Node::default());
        (self.nodes.len() - 1) as u32
    }

    /// Binds `code` to `cid`, creating intermediate nodes as needed.
    ///
    /// Empty codes are ignored.
    pub fn insert(&mut self, code: &[u8], cid: Cid) {
        let Some((&last, prefix)) = code.split_last() else {
            return;
        };
        let mut node = ROOT;
        for &byte in prefix {
            node = match self.nodes[node].entries.get(&byte) {
                Some(Entry::Node(child)) => *child as usize,
                _ => {
                    let child = self.alloc();
                    self.nodes[node].entries.insert(byte, Entry::Node(child));
                    child as usize
                }
            };
        }
        self.nodes[node].entries.insert(last, Entry::Cid(cid));
    }

    /// Looks up a complete code.
    pub fn get(&self, code: &[u8]) -> Option<Cid> {
        let mut node = ROOT;
        for (i, byte) in code.iter().enumerate() {
            match self.nodes[node].entries.get(byte)? {
                Entry::Cid(cid) if i + 1 == code.len() => return Some(*cid),
                Entry::Cid(_) => return None,
                Entry::Node(child) => node = *child as usize,
            }
        }
        None
    }

    /// Copies every path of `other` into `self`.
    ///
    /// Where both tries bind the same byte at the same node, the entry of
    /// `other` wins; a subtree of `other` replaces whatever `self` held there.
    pub fn merge(&mut self, other: &CodeTrie) {
        self.copy_node(ROOT, other, ROOT);
    }

    fn copy_node(&mut self, dst: usize, other: &CodeTrie, src: usize) {
        for (&byte, entry) in &other.nodes[src].entries {
            match *entry {
                Entry::Cid(cid) => {
                    self.nodes[dst].entries.insert(byte, Entry::Cid(cid));
                }
                Entry::Node(child) => {
                    let fresh = self.alloc();
                    self.nodes[dst].entries.insert(byte, Entry::Node(fresh));
                    self.copy_node(fresh as usize, other, child as usize);
                }
            }
        }
    }

    pub fn decode<'a>(&'a self, code: &'a [u8]) -> Decode<'a> {
        Decode {
            trie: self,
            bytes: code.iter(),
            node: ROOT,
        }
    }

    /// All `(code, cid)` pairs in ascending byte order.
    pub fn iter(&self) -> Mappings<'_> {
        Mappings {
            trie: self,
            stack: vec![self.nodes[ROOT].entries.iter()],
            prefix: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].entries.is_empty()
    }
}

/// Lazy code to CID decoder.
///
/// A byte with no entry at the current node is dropped and the walk
/// restarts at the root with the following byte.
pub struct Decode<'a> {
    trie: &'a CodeTrie,
    bytes: std::slice::Iter<'a, u8>,
    node: usize,
}

impl Iterator for Decode<'_> {
    type Item = Cid;

    fn next(&mut self) -> Option<Cid> {
        for byte in self.bytes.by_ref() {
            match self.trie.nodes[self.node].entries.get(byte) {
                Some(Entry::Cid(cid)) => {
                    self.node = ROOT;
                    return Some(*cid);
                }
                Some(Entry::Node(child)) => self.node = *child as usize,
                None => self.node = ROOT,
            }
        }
        None
    }
}

pub struct Mappings<'a> {
    trie: &'a CodeTrie,
    stack: Vec<btree_map::Iter<'a, u8, Entry>>,
    prefix: Vec<u8>,
}

impl Iterator for Mappings<'_> {
    type Item = (Vec<u8>, Cid);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some((&byte, &Entry::Cid(cid))) => {
                    let mut code = self.prefix.clone();
                    code.push(byte);
                    return Some((code, cid));
                }
                Some((&byte, &Entry::Node(child))) => {
                    self.prefix.push(byte);
                    self.stack.push(self.trie.nodes[child as usize].entries.iter());
                }
                None => {
                    self.stack.pop();
                    self.prefix.pop();
                }
            }
        }
        None
    }
}
