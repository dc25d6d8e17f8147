use cmapdb::{
    AnyCMap, CMapDb, CMapParser, DirectoryRegistry, Error, IdentityCMap, Lexer, MemoryRegistry, Object, UnicodeMap,
    UnicodeValue,
};
use std::fs;
use tempfile::tempdir;

// ToUnicode stream of a Type0 font whose glyphs
// <005F> <0060> <0061>
// stand for the emoji
// U+1F600 U+1F527 U+1F528
const TO_UNICODE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfrange
<0000> <005E> <0020>
<005F> <0061> [<D83DDE00> <D83DDD27> <D83DDD28>]
endbfrange
1 beginbfchar
<3A51> <D840DC3E>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn to_unicode_stream_is_read() {
    let map = UnicodeMap::parse(TO_UNICODE, &MemoryRegistry::new()).unwrap();

    assert_eq!(map.name(), Some("Adobe-Identity-UCS"));
    assert_eq!(map.len(), 0x5F + 3 + 1);
    assert_eq!(map.get(0x0000), Some(&UnicodeValue::Single(0x20)));
    assert_eq!(map.get(0x0021), Some(&UnicodeValue::Single(0x41)));
    assert_eq!(map.get(0x3A51), Some(&UnicodeValue::Single(0x2003E)));
    assert_eq!(
        map.attr("CIDSystemInfo"),
        Some(&Object::Array(vec![
            Object::from("Registry"),
            Object::String(b"Adobe".to_vec()),
            Object::from("Ordering"),
            Object::String(b"UCS".to_vec()),
            Object::from("Supplement"),
            Object::Integer(0),
        ]))
    );
}

#[test]
fn text_is_extracted_through_identity() {
    let map = UnicodeMap::parse(TO_UNICODE, &MemoryRegistry::new()).unwrap();
    let encoding = AnyCMap::from(IdentityCMap::HORIZONTAL);

    let shown = [0x00, 0x5F, 0x00, 0x60, 0x00, 0x61, 0x00, 0x00, 0x00, 0x21];
    assert_eq!(map.to_text(encoding.decode(&shown)), "😀🔧🔨 A");

    // unmapped cids become the replacement character
    assert_eq!(map.to_text(encoding.decode(&[0xFF, 0xFF])), "\u{fffd}");
}

#[test]
fn glyph_name_destinations() {
    init_logger();
    let content = b"begincmap
3 beginbfchar
<01> /f_i
<02> /uni20AC
<03> /not-a-glyph
endbfchar
1 beginbfrange
<04> <05> [/A /a.sc]
endbfrange
endcmap";
    let map = UnicodeMap::parse(content, &MemoryRegistry::new()).unwrap();

    assert_eq!(map.to_text([1, 2, 4, 5]), "fi€Aa");
    assert_eq!(map.get(1), Some(&UnicodeValue::Sequence(vec![0x66, 0x69])));
    assert_eq!(map.get(3), None);
}

#[test]
fn custom_glyph_list() {
    let content = b"begincmap 1 beginbfchar <01> /heart endbfchar endcmap";
    let glyphs = |name: &str| (name == "heart").then(|| UnicodeValue::from('\u{2665}'));

    let mut map = UnicodeMap::new();
    CMapParser::new(&mut map, Lexer::new(content), &MemoryRegistry::new(), &glyphs)
        .run()
        .unwrap();
    assert_eq!(map.get_or_replacement(1), "\u{2665}");
}

#[test]
fn unsupported_destination_aborts() {
    init_logger();
    let content = b"begincmap 1 beginbfrange <01> <02> [<0041> foo] endbfrange endcmap";
    let err = UnicodeMap::parse(content, &MemoryRegistry::new()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedValue { found: "Keyword" }));
}

#[test]
fn unicode_maps_from_directory() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("Adobe-Japan1-V"),
        b"begincmap 1 beginbfchar <1E5E> <FE35> endbfchar endcmap",
    )
    .unwrap();
    fs::write(
        dir.path().join("Adobe-Japan1-H"),
        b"begincmap 1 beginbfchar <1E5E> <0028> endbfchar endcmap",
    )
    .unwrap();

    let db = CMapDb::new(DirectoryRegistry::new(dir.path()));
    let vertical = db.get_unicode_map("Adobe-Japan1", true).unwrap();
    let horizontal = db.get_unicode_map("Adobe-Japan1", false).unwrap();
    assert_eq!(vertical.get_or_replacement(0x1E5E), "\u{fe35}");
    assert_eq!(horizontal.get_or_replacement(0x1E5E), "(");
    assert!(db.get_unicode_map("Adobe-GB1", false).is_err());
}

#[test]
fn unicode_map_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tounicode.cmap");
    fs::write(&path, TO_UNICODE).unwrap();

    let map = UnicodeMap::load(&path, &MemoryRegistry::new()).unwrap();
    assert_eq!(map.get(0x5F), Some(&UnicodeValue::Single(0x1F600)));
}
