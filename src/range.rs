//! Expansion of `begin*range` notations into single mappings.

use crate::trie::Cid;
use std::ops::RangeInclusive;

/// Width in bytes of the part of a code that is allowed to vary in a range.
const MAX_SUFFIX: usize = 4;

/// Interprets up to four bytes as a big-endian unsigned integer.
pub(crate) fn nunpack(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

fn encode(prefix: &[u8], value: u32, width: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(prefix.len() + width);
    code.extend_from_slice(prefix);
    code.extend_from_slice(&value.to_be_bytes()[MAX_SUFFIX - width..]);
    code
}

/// A `lo hi` pair of source codes from a `cidrange` block.
///
/// Both codes have the same length. The last four bytes (all of a shorter
/// code) vary; any bytes before them must agree, so `<0000> <01FF>` is a
/// range while `<AA00000000> <AB00000001>` is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRange {
    prefix: Vec<u8>,
    start: u32,
    end: u32,
    width: usize,
}

impl CodeRange {
    /// Returns `None` for codes of different or zero length, or when the prefixes differ.
    pub fn new(start: &[u8], end: &[u8]) -> Option<CodeRange> {
        if start.len() != end.len() || start.is_empty() {
            return None;
        }
        let width = start.len().min(MAX_SUFFIX);
        let split = start.len() - width;
        let (start_prefix, start_var) = start.split_at(split);
        let (end_prefix, end_var) = end.split_at(split);
        if start_prefix != end_prefix {
            return None;
        }
        Some(CodeRange {
            prefix: start_prefix.to_vec(),
            start: nunpack(start_var),
            end: nunpack(end_var),
            width,
        })
    }

    /// Number of codes covered; zero when `hi` is below `lo`.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every code of the range in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        (self.start..=self.end).map(move |value| encode(&self.prefix, value, self.width))
    }

    /// Pairs each code with consecutive CIDs starting at `first_cid`.
    ///
    /// Stops early rather than wrapping if the CIDs would overflow.
    pub fn with_cids(&self, first_cid: Cid) -> impl Iterator<Item = (Vec<u8>, Cid)> + '_ {
        self.codes()
            .zip(0..)
            .map_while(move |(code, i)| first_cid.checked_add(i).map(|cid| (code, cid)))
    }
}

/// Source codes of a `bfrange` line read as whole big-endian integers.
///
/// Codes must have the same length of one to four bytes.
pub fn source_codes(start: &[u8], end: &[u8]) -> Option<RangeInclusive<u32>> {
    if start.len() != end.len() || start.is_empty() || start.len() > MAX_SUFFIX {
        return None;
    }
    Some(nunpack(start)..=nunpack(end))
}

/// Destination string of a `bfrange` line whose last (up to four) bytes
/// are incremented for every following source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: Vec<u8>,
    base: u32,
    width: usize,
}

impl Template {
    pub fn new(template: &[u8]) -> Template {
        let split = template.len().saturating_sub(MAX_SUFFIX);
        let (prefix, var) = template.split_at(split);
        Template {
            prefix: prefix.to_vec(),
            base: nunpack(var),
            width: var.len(),
        }
    }

    /// The destination for the `offset`-th source code of the range.
    pub fn nth(&self, offset: u32) -> Vec<u8> {
        encode(&self.prefix, self.base.wrapping_add(offset), self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_varies_last_byte() {
        let range = CodeRange::new(b"\x00\x00", b"\x00\x02").unwrap();
        let mappings: Vec<_> = range.with_cids(10).collect();

        assert_eq!(range.len(), 3);
        assert_eq!(
            mappings,
            vec![(vec![0x00, 0x00], 10), (vec![0x00, 0x01], 11), (vec![0x00, 0x02], 12)]
        );
    }

    #[test]
    fn prefix_mismatch_is_rejected() {
        assert_eq!(CodeRange::new(b"\xAA\x00\x00\x00\x00", b"\xAB\x00\x00\x00\x01"), None);
        assert_eq!(CodeRange::new(b"\x81\x40", b"\x81\x40\x00"), None);
        assert_eq!(CodeRange::new(b"", b""), None);
    }

    #[test]
    fn short_codes_vary_entirely() {
        let range = CodeRange::new(b"\x00\xFE", b"\x01\x01").unwrap();
        assert_eq!(
            range.with_cids(5).collect::<Vec<_>>(),
            vec![
                (vec![0x00, 0xFE], 5),
                (vec![0x00, 0xFF], 6),
                (vec![0x01, 0x00], 7),
                (vec![0x01, 0x01], 8),
            ]
        );

        let full = CodeRange::new(b"\x00\x00", b"\xFF\xFF").unwrap();
        assert_eq!(full.len(), 65536);
        assert_eq!(full.codes().last(), Some(vec![0xFF, 0xFF]));
    }

    #[test]
    fn long_codes_keep_four_byte_suffix() {
        let range = CodeRange::new(b"\xAA\x00\x00\x00\xFE", b"\xAA\x00\x00\x01\x01").unwrap();
        let codes: Vec<_> = range.codes().collect();

        assert_eq!(codes.len(), 4);
        assert_eq!(codes[0], b"\xAA\x00\x00\x00\xFE".to_vec());
        assert_eq!(codes[2], b"\xAA\x00\x00\x01\x00".to_vec());
    }

    #[test]
    fn single_byte_codes() {
        let range = CodeRange::new(b"\x20", b"\x7E").unwrap();
        assert_eq!(range.len(), 95);
        assert_eq!(range.codes().last(), Some(vec![0x7E]));
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = CodeRange::new(b"\x00\x05", b"\x00\x02").unwrap();
        assert!(range.is_empty());
        assert_eq!(range.codes().count(), 0);
    }

    #[test]
    fn cids_do_not_wrap() {
        let range = CodeRange::new(b"\x00", b"\x03").unwrap();
        assert_eq!(range.with_cids(u32::MAX - 1).count(), 2);
    }

    #[test]
    fn bfrange_source_codes() {
        assert_eq!(source_codes(b"\x00\x5F", b"\x00\x61"), Some(0x5F..=0x61));
        assert_eq!(source_codes(b"\x00\xFF", b"\x01\x00"), Some(0xFF..=0x100));
        assert_eq!(source_codes(b"\x00", b"\x00\x01"), None);
        assert_eq!(source_codes(b"\x00\x00\x00\x00\x00", b"\x00\x00\x00\x00\x01"), None);
    }

    #[test]
    fn template_increments_suffix() {
        let template = Template::new(b"\x00\x20");
        assert_eq!(template.nth(0), vec![0x00, 0x20]);
        assert_eq!(template.nth(2), vec![0x00, 0x22]);

        let surrogate = Template::new(b"\xD8\x3D\xDE\x00");
        assert_eq!(surrogate.nth(1), vec![0xD8, 0x3D, 0xDE, 0x01]);

        let ligature = Template::new(b"\x00\x66\x00\x66\x00\x69");
        assert_eq!(ligature.nth(1), vec![0x00, 0x66, 0x00, 0x66, 0x00, 0x6A]);
    }

    #[test]
    fn template_wraps_within_width() {
        let template = Template::new(b"\x00\xFF");
        assert_eq!(template.nth(1), vec![0x01, 0x00]);
        let byte = Template::new(b"\xFF");
        assert_eq!(byte.nth(1), vec![0x00]);
    }
}
