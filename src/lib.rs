mod object;
pub use object::Object;

mod cmap;
pub use cmap::{AnyCMap, CMap, CidIter, IdentityCMap, IdentityDecode};

mod unicode_map;
pub use unicode_map::{UnicodeMap, UnicodeValue};

mod cmap_parser;
pub use cmap_parser::{CMapBuilder, CMapParser};

pub mod glyphnames;
pub use glyphnames::{AdobeGlyphList, GlyphNameLookup};

pub mod parser;
pub use parser::{Lexer, TokenSource};

pub mod range;
pub mod registry;
pub use registry::{CMapDb, CMapRegistry, DirectoryRegistry, MemoryRegistry};

pub mod trie;
pub use trie::{Cid, CodeTrie};

mod load_options;
pub use load_options::{LoadOptions, LoadOptionsBuilder};

mod error;
pub use error::{CMapNotFound, Error, Result};
