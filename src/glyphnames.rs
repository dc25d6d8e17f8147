//! Glyph name to Unicode resolution for `/name` destinations.
//!
//! [`AdobeGlyphList`] knows the common Latin subset of the Adobe Glyph List
//! and the algorithmic `uniXXXX` / `uXXXX[XX]` forms, and applies the AGL
//! rules for suffixes (`a.sc`) and ligature components (`f_f_i`). Callers
//! with a complete list plug it in through [`GlyphNameLookup`].

use crate::UnicodeValue;
use std::collections::HashMap;
use std::sync::LazyLock;

pub trait GlyphNameLookup {
    fn lookup(&self, name: &str) -> Option<UnicodeValue>;
}

impl<F> GlyphNameLookup for F
where
    F: Fn(&str) -> Option<UnicodeValue>,
{
    fn lookup(&self, name: &str) -> Option<UnicodeValue> {
        self(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdobeGlyphList;

impl GlyphNameLookup for AdobeGlyphList {
    fn lookup(&self, name: &str) -> Option<UnicodeValue> {
        let base = name.split('.').next().unwrap_or_default();
        if base.is_empty() {
            return None;
        }
        let mut points = Vec::new();
        for component in base.split('_') {
            points.extend(component_to_unicode(component)?);
        }
        Some(if points.len() == 1 {
            UnicodeValue::Single(points[0])
        } else {
            UnicodeValue::Sequence(points)
        })
    }
}

fn component_to_unicode(component: &str) -> Option<Vec<u32>> {
    if let Some(&c) = GLYPH_TO_UNICODE.get(component) {
        return Some(c.chars().map(u32::from).collect());
    }
    if let Some(hex) = component.strip_prefix("uni") {
        if !hex.is_empty() && hex.len() % 4 == 0 && hex.bytes().all(is_upper_hex) {
            return hex
                .as_bytes()
                .chunks(4)
                .map(|chunk| {
                    let cp = u32::from_str_radix(std::str::from_utf8(chunk).ok()?, 16).ok()?;
                    (!(0xD800..=0xDFFF).contains(&cp)).then_some(cp)
                })
                .collect();
        }
    }
    if let Some(hex) = component.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.bytes().all(is_upper_hex) {
            let cp = u32::from_str_radix(hex, 16).ok()?;
            return char::from_u32(cp).map(|c| vec![u32::from(c)]);
        }
    }
    None
}

fn is_upper_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

static GLYPH_TO_UNICODE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        // Basic Latin
        ("space", " "),
        ("exclam", "!"),
        ("quotedbl", "\""),
        ("numbersign", "#"),
        ("dollar", "$"),
        ("percent", "%"),
        ("ampersand", "&"),
        ("quotesingle", "'"),
        ("quoteright", "\u{2019}"),
        ("parenleft", "("),
        ("parenright", ")"),
        ("asterisk", "*"),
        ("plus", "+"),
        ("comma", ","),
        ("hyphen", "-"),
        ("period", "."),
        ("slash", "/"),
        ("zero", "0"),
        ("one", "1"),
        ("two", "2"),
        ("three", "3"),
        ("four", "4"),
        ("five", "5"),
        ("six", "6"),
        ("seven", "7"),
        ("eight", "8"),
        ("nine", "9"),
        ("colon", ":"),
        ("semicolon", ";"),
        ("less", "<"),
        ("equal", "="),
        ("greater", ">"),
        ("question", "?"),
        ("at", "@"),
        ("bracketleft", "["),
        ("backslash", "\\"),
        ("bracketright", "]"),
        ("asciicircum", "^"),
        ("underscore", "_"),
        ("grave", "`"),
        ("quoteleft", "\u{2018}"),
        ("braceleft", "{"),
        ("bar", "|"),
        ("braceright", "}"),
        ("asciitilde", "~"),

        // Extended Latin and punctuation
        ("exclamdown", "\u{a1}"),
        ("cent", "\u{a2}"),
        ("sterling", "\u{a3}"),
        ("currency", "\u{a4}"),
        ("yen", "\u{a5}"),
        ("brokenbar", "\u{a6}"),
        ("section", "\u{a7}"),
        ("dieresis", "\u{a8}"),
        ("copyright", "\u{a9}"),
        ("ordfeminine", "\u{aa}"),
        ("guillemotleft", "\u{ab}"),
        ("logicalnot", "\u{ac}"),
        ("registered", "\u{ae}"),
        ("macron", "\u{af}"),
        ("degree", "\u{b0}"),
        ("plusminus", "\u{b1}"),
        ("twosuperior", "\u{b2}"),
        ("threesuperior", "\u{b3}"),
        ("acute", "\u{b4}"),
        ("mu", "\u{b5}"),
        ("paragraph", "\u{b6}"),
        ("periodcentered", "\u{b7}"),
        ("cedilla", "\u{b8}"),
        ("onesuperior", "\u{b9}"),
        ("ordmasculine", "\u{ba}"),
        ("guillemotright", "\u{bb}"),
        ("onequarter", "\u{bc}"),
        ("onehalf", "\u{bd}"),
        ("threequarters", "\u{be}"),
        ("questiondown", "\u{bf}"),

        // Accented capitals
        ("Agrave", "\u{c0}"),
        ("Aacute", "\u{c1}"),
        ("Acircumflex", "\u{c2}"),
        ("Atilde", "\u{c3}"),
        ("Adieresis", "\u{c4}"),
        ("Aring", "\u{c5}"),
        ("AE", "\u{c6}"),
        ("Ccedilla", "\u{c7}"),
        ("Egrave", "\u{c8}"),
        ("Eacute", "\u{c9}"),
        ("Ecircumflex", "\u{ca}"),
        ("Edieresis", "\u{cb}"),
        ("Igrave", "\u{cc}"),
        ("Iacute", "\u{cd}"),
        ("Icircumflex", "\u{ce}"),
        ("Idieresis", "\u{cf}"),
        ("Eth", "\u{d0}"),
        ("Ntilde", "\u{d1}"),
        ("Ograve", "\u{d2}"),
        ("Oacute", "\u{d3}"),
        ("Ocircumflex", "\u{d4}"),
        ("Otilde", "\u{d5}"),
        ("Odieresis", "\u{d6}"),
        ("multiply", "\u{d7}"),
        ("Oslash", "\u{d8}"),
        ("Ugrave", "\u{d9}"),
        ("Uacute", "\u{da}"),
        ("Ucircumflex", "\u{db}"),
        ("Udieresis", "\u{dc}"),
        ("Yacute", "\u{dd}"),
        ("Thorn", "\u{de}"),
        ("germandbls", "\u{df}"),

        // Accented lowercase
        ("agrave", "\u{e0}"),
        ("aacute", "\u{e1}"),
        ("acircumflex", "\u{e2}"),
        ("atilde", "\u{e3}"),
        ("adieresis", "\u{e4}"),
        ("aring", "\u{e5}"),
        ("ae", "\u{e6}"),
        ("ccedilla", "\u{e7}"),
        ("egrave", "\u{e8}"),
        ("eacute", "\u{e9}"),
        ("ecircumflex", "\u{ea}"),
        ("edieresis", "\u{eb}"),
        ("igrave", "\u{ec}"),
        ("iacute", "\u{ed}"),
        ("icircumflex", "\u{ee}"),
        ("idieresis", "\u{ef}"),
        ("eth", "\u{f0}"),
        ("ntilde", "\u{f1}"),
        ("ograve", "\u{f2}"),
        ("oacute", "\u{f3}"),
        ("ocircumflex", "\u{f4}"),
        ("otilde", "\u{f5}"),
        ("odieresis", "\u{f6}"),
        ("divide", "\u{f7}"),
        ("oslash", "\u{f8}"),
        ("ugrave", "\u{f9}"),
        ("uacute", "\u{fa}"),
        ("ucircumflex", "\u{fb}"),
        ("udieresis", "\u{fc}"),
        ("yacute", "\u{fd}"),
        ("thorn", "\u{fe}"),
        ("ydieresis", "\u{ff}"),

        // Ligatures
        ("fi", "\u{fb01}"),
        ("fl", "\u{fb02}"),
        ("ff", "\u{fb00}"),
        ("ffi", "\u{fb03}"),
        ("ffl", "\u{fb04}"),

        // Quotes and dashes
        ("endash", "\u{2013}"),
        ("emdash", "\u{2014}"),
        ("quotedblleft", "\u{201c}"),
        ("quotedblright", "\u{201d}"),
        ("quotesinglbase", "\u{201a}"),
        ("quotedblbase", "\u{201e}"),
        ("dagger", "\u{2020}"),
        ("daggerdbl", "\u{2021}"),
        ("bullet", "\u{2022}"),
        ("ellipsis", "\u{2026}"),
        ("perthousand", "\u{2030}"),
        ("guilsinglleft", "\u{2039}"),
        ("guilsinglright", "\u{203a}"),
        ("fraction", "\u{2044}"),
        ("trademark", "\u{2122}"),
        ("minus", "\u{2212}"),

        // Math symbols
        ("infinity", "\u{221e}"),
        ("notequal", "\u{2260}"),
        ("lessequal", "\u{2264}"),
        ("greaterequal", "\u{2265}"),
        ("partialdiff", "\u{2202}"),
        ("summation", "\u{2211}"),
        ("product", "\u{220f}"),
        ("radical", "\u{221a}"),
        ("approxequal", "\u{2248}"),
        ("Delta", "\u{394}"),
        ("lozenge", "\u{25ca}"),

        // Greek letters
        ("Alpha", "\u{391}"),
        ("Beta", "\u{392}"),
        ("Gamma", "\u{393}"),
        ("Epsilon", "\u{395}"),
        ("Zeta", "\u{396}"),
        ("Eta", "\u{397}"),
        ("Theta", "\u{398}"),
        ("Iota", "\u{399}"),
        ("Kappa", "\u{39a}"),
        ("Lambda", "\u{39b}"),
        ("Mu", "\u{39c}"),
        ("Nu", "\u{39d}"),
        ("Xi", "\u{39e}"),
        ("Omicron", "\u{39f}"),
        ("Pi", "\u{3a0}"),
        ("Rho", "\u{3a1}"),
        ("Sigma", "\u{3a3}"),
        ("Tau", "\u{3a4}"),
        ("Upsilon", "\u{3a5}"),
        ("Phi", "\u{3a6}"),
        ("Chi", "\u{3a7}"),
        ("Psi", "\u{3a8}"),
        ("Omega", "\u{3a9}"),
        ("alpha", "\u{3b1}"),
        ("beta", "\u{3b2}"),
        ("gamma", "\u{3b3}"),
        ("delta", "\u{3b4}"),
        ("epsilon", "\u{3b5}"),
        ("zeta", "\u{3b6}"),
        ("eta", "\u{3b7}"),
        ("theta", "\u{3b8}"),
        ("iota", "\u{3b9}"),
        ("kappa", "\u{3ba}"),
        ("lambda", "\u{3bb}"),
        ("nu", "\u{3bd}"),
        ("xi", "\u{3be}"),
        ("omicron", "\u{3bf}"),
        ("pi", "\u{3c0}"),
        ("rho", "\u{3c1}"),
        ("sigma", "\u{3c3}"),
        ("tau", "\u{3c4}"),
        ("upsilon", "\u{3c5}"),
        ("phi", "\u{3c6}"),
        ("chi", "\u{3c7}"),
        ("psi", "\u{3c8}"),
        ("omega", "\u{3c9}"),

        // Latin Extended-A and spacing accents
        ("dotlessi", "\u{131}"),
        ("OE", "\u{152}"),
        ("oe", "\u{153}"),
        ("Euro", "\u{20ac}"),
        ("Lslash", "\u{141}"),
        ("lslash", "\u{142}"),
        ("Scaron", "\u{160}"),
        ("scaron", "\u{161}"),
        ("Zcaron", "\u{17d}"),
        ("zcaron", "\u{17e}"),
        ("Ydieresis", "\u{178}"),
        ("florin", "\u{192}"),
        ("circumflex", "\u{2c6}"),
        ("caron", "\u{2c7}"),
        ("breve", "\u{2d8}"),
        ("dotaccent", "\u{2d9}"),
        ("ring", "\u{2da}"),
        ("ogonek", "\u{2db}"),
        ("tilde", "\u{2dc}"),
        ("hungarumlaut", "\u{2dd}"),
        ("minute", "\u{2032}"),
        ("second", "\u{2033}"),
    ]
    .into_iter()
    .chain(LETTERS.iter().map(|l| (*l, *l)))
    .collect()
});

static LETTERS: [&str; 52] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W",
    "X", "Y", "Z", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t",
    "u", "v", "w", "x", "y", "z",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<UnicodeValue> {
        AdobeGlyphList.lookup(name)
    }

    #[test]
    fn table_names() {
        assert_eq!(lookup("A"), Some(UnicodeValue::Single(0x41)));
        assert_eq!(lookup("hyphen"), Some(UnicodeValue::Single(0x2D)));
        assert_eq!(lookup("fi"), Some(UnicodeValue::Single(0xFB01)));
    }

    #[test]
    fn accented_latin_names() {
        assert_eq!(lookup("Aring"), Some(UnicodeValue::Single(0xC5)));
        assert_eq!(lookup("ecircumflex"), Some(UnicodeValue::Single(0xEA)));
        assert_eq!(lookup("scaron"), Some(UnicodeValue::Single(0x161)));
        assert_eq!(lookup("Lslash.sc"), Some(UnicodeValue::Single(0x141)));
        assert!(GLYPH_TO_UNICODE.len() >= 277);
    }

    #[test]
    fn algorithmic_names() {
        assert_eq!(lookup("uni0041"), Some(UnicodeValue::Single(0x41)));
        assert_eq!(lookup("uni00660069"), Some(UnicodeValue::Sequence(vec![0x66, 0x69])));
        assert_eq!(lookup("u1F600"), Some(UnicodeValue::Single(0x1F600)));
        assert_eq!(lookup("uniD800"), None);
        assert_eq!(lookup("uni004a"), None);
    }

    #[test]
    fn suffixes_and_ligatures() {
        assert_eq!(lookup("a.sc"), Some(UnicodeValue::Single(0x61)));
        assert_eq!(lookup("f_f_i"), Some(UnicodeValue::Sequence(vec![0x66, 0x66, 0x69])));
        assert_eq!(lookup(".notdef"), None);
        assert_eq!(lookup("g123"), None);
    }

    #[test]
    fn closures_are_lookups() {
        let custom = |name: &str| (name == "smiley").then_some(UnicodeValue::Single(0x263A));
        assert_eq!(custom.lookup("smiley"), Some(UnicodeValue::Single(0x263A)));
        assert_eq!(custom.lookup("A"), None);
    }
}
