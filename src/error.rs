use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An Object has the wrong type, e.g. the Object is an Array where a Name would be expected.
    #[error("object has wrong type; expected type {expected} but found type {found}")]
    ObjectType {
        expected: &'static str,
        found: &'static str,
    },
    /// A value handed to a UnicodeMap is neither a glyph name, a byte string nor an integer.
    #[error("unsupported unicode map value; expected Name, String or Integer but found {found}")]
    UnsupportedValue { found: &'static str },
    /// A numeric code point does not fit into `u32`.
    #[error("invalid code point {0}")]
    InvalidCodepoint(i64),
    /// More operands were requested than the stack holds.
    #[error("operand stack underflow; requested {requested} but only {available} available")]
    StackUnderflow { requested: usize, available: usize },
    /// A deserialized trie arena has no root or a child index that does not point forward.
    #[error("invalid code trie: {0}")]
    InvalidTrie(&'static str),
    /// A named CMap could not be resolved.
    #[error(transparent)]
    CMapNotFound(#[from] CMapNotFound),
    /// IO error
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

/// Registry lookup miss.
///
/// Kept apart from [`Error`] so callers can decide on a fallback
/// (typically `Identity-H`) without matching the whole error enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cmap not found: {0}")]
pub struct CMapNotFound(pub String);

impl CMapNotFound {
    pub fn new(name: impl Into<String>) -> Self {
        CMapNotFound(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_converts_into_error() {
        let err: Error = CMapNotFound::new("UniJIS-UCS2-H").into();
        assert!(matches!(err, Error::CMapNotFound(ref nf) if nf.name() == "UniJIS-UCS2-H"));
        assert_eq!(err.to_string(), "cmap not found: UniJIS-UCS2-H");
    }
}
