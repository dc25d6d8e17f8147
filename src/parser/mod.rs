//! PostScript tokenizer for CMap resources.
//!
//! Turns raw CMap bytes into a stream of `(offset, Object)` tokens. The
//! grammar follows the PostScript subset that CMap files are written in;
//! bytes that cannot start any token are skipped one at a time.

use crate::Object;
use log::debug;
use std::str::{self, FromStr};

use nom::branch::alt;
use nom::bytes::complete::{tag, take, take_while, take_while1, take_while_m_n};
use nom::character::complete::{digit0, digit1, one_of};
use nom::combinator::{map, map_opt, map_res, not, opt, recognize, verify};
use nom::multi::{fold_many0, many0};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{AsChar, IResult, Input, Parser};
use nom_locate::LocatedSpan;

pub mod stack;

pub(crate) type ParserInput<'a> = LocatedSpan<&'a [u8], &'a str>;
pub(crate) type NomError<'a> = nom::error::Error<ParserInput<'a>>;

pub(crate) type NomResult<'a, O, E = NomError<'a>> = IResult<ParserInput<'a>, O, E>;

/// Maximum nesting of parentheses inside a literal string.
pub const MAX_BRACKET: usize = 100;

/// Anything that yields `(offset, Object)` tokens until the input is exhausted.
///
/// Every iterator over such pairs is a token source, so tests and callers with
/// their own tokenizer can drive a [`CMapParser`](crate::CMapParser) directly.
pub trait TokenSource {
    fn next_token(&mut self) -> Option<(usize, Object)>;
}

impl<I> TokenSource for I
where
    I: Iterator<Item = (usize, Object)>,
{
    fn next_token(&mut self) -> Option<(usize, Object)> {
        self.next()
    }
}

/// Tokenizer over an in-memory CMap resource.
pub struct Lexer<'a> {
    input: ParserInput<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Lexer<'a> {
        Lexer {
            input: LocatedSpan::new_extra(data, "cmap"),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Object);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Ok((rest, _)) = space(self.input) {
                self.input = rest;
            }
            if self.input.is_empty() {
                return None;
            }
            let offset = self.input.location_offset();
            match object(self.input) {
                Ok((rest, obj)) => {
                    self.input = rest;
                    return Some((offset, obj));
                }
                Err(_) => {
                    debug!("skipping unexpected byte {:#04x} at offset {}", self.input[0], offset);
                    self.input = self.input.take_from(1);
                }
            }
        }
    }
}

pub(crate) fn eol(input: ParserInput) -> NomResult<ParserInput> {
    alt((tag(&b"\r\n"[..]), tag(&b"\n"[..]), tag(&b"\r"[..]))).parse(input)
}

pub(crate) fn comment(input: ParserInput) -> NomResult<()> {
    map(
        (tag(&b"%"[..]), take_while(|c: u8| !b"\r\n".contains(&c)), opt(eol)),
        |_| (),
    ).parse(input)
}

#[inline]
fn is_whitespace(c: u8) -> bool {
    b" \t\n\r\0\x0C".contains(&c)
}

#[inline]
fn is_delimiter(c: u8) -> bool {
    b"()<>[]{}/%".contains(&c)
}

#[inline]
fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

#[inline]
fn is_direct_literal_string(c: u8) -> bool {
    !b"()\\\r\n".contains(&c)
}

fn white_space(input: ParserInput) -> NomResult<()> {
    map(take_while(is_whitespace), |_| ()).parse(input)
}

fn space(input: ParserInput) -> NomResult<()> {
    fold_many0(
        alt((map(take_while1(is_whitespace), |_| ()), comment)),
        || {},
        |_, _| (),
    ).parse(input)
}

/// A number must end at a delimiter, whitespace or the end of input;
/// otherwise `12abc` is a single executable name.
fn token_end(input: ParserInput) -> NomResult<()> {
    not(take_while1(is_regular)).parse(input)
}

fn integer(input: ParserInput) -> NomResult<i64> {
    terminated(
        map_opt(recognize(pair(opt(one_of("+-")), digit1)), |digits: ParserInput| {
            str::from_utf8(&digits).ok().and_then(|s| i64::from_str(s).ok())
        }),
        token_end,
    ).parse(input)
}

fn real(input: ParserInput) -> NomResult<Vec<u8>> {
    terminated(
        map(
            recognize(pair(
                opt(one_of("+-")),
                alt((
                    map((digit1, tag(&b"."[..]), digit0), |_| ()),
                    map(pair(tag(&b"."[..]), digit1), |_| ()),
                )),
            )),
            |text: ParserInput| text.to_vec(),
        ),
        token_end,
    ).parse(input)
}

pub(crate) fn hex_char(input: ParserInput) -> NomResult<u8> {
    map_res(
        verify(take(2usize), |h: &ParserInput| {
            h.iter().copied().all(AsChar::is_hex_digit)
        }),
        |x: ParserInput| u8::from_str_radix(str::from_utf8(&x).unwrap_or_default(), 16),
    ).parse(input)
}

fn oct_char(input: ParserInput) -> NomResult<u8> {
    map_res(
        take_while_m_n(1, 3, AsChar::is_oct_digit),
        // Overflow is ignored, as in PDF literal strings.
        |x: ParserInput| u16::from_str_radix(str::from_utf8(&x).unwrap_or_default(), 8).map(|o| o as u8),
    ).parse(input)
}

pub(crate) fn name(input: ParserInput) -> NomResult<Vec<u8>> {
    preceded(
        tag(&b"/"[..]),
        many0(alt((
            preceded(tag(&b"#"[..]), hex_char),
            map_opt(take(1usize), |c: ParserInput| {
                if c[0] != b'#' && is_regular(c[0]) {
                    Some(c[0])
                } else {
                    None
                }
            }),
        ))),
    ).parse(input)
}

fn escape_sequence(input: ParserInput) -> NomResult<Option<u8>> {
    preceded(
        tag(&b"\\"[..]),
        alt((
            map(oct_char, Some),
            map(eol, |_| None),
            map(tag(&b"n"[..]), |_| Some(b'\n')),
            map(tag(&b"r"[..]), |_| Some(b'\r')),
            map(tag(&b"t"[..]), |_| Some(b'\t')),
            map(tag(&b"b"[..]), |_| Some(b'\x08')),
            map(tag(&b"f"[..]), |_| Some(b'\x0C')),
            map(take(1usize), |c: ParserInput| Some(c[0])),
        )),
    ).parse(input)
}

enum InnerLiteralString<'a> {
    Direct(ParserInput<'a>),
    Escape(Option<u8>),
    Eol(ParserInput<'a>),
    Nested(Vec<u8>),
}

impl InnerLiteralString<'_> {
    fn push(&self, output: &mut Vec<u8>) {
        match self {
            InnerLiteralString::Direct(s) | InnerLiteralString::Eol(s) => output.extend_from_slice(s),
            InnerLiteralString::Escape(e) => output.extend(e),
            InnerLiteralString::Nested(n) => output.extend_from_slice(n),
        }
    }
}

fn inner_literal_string(depth: usize) -> impl Fn(ParserInput) -> NomResult<Vec<u8>> {
    move |input| {
        fold_many0(
            alt((
                map(take_while1(is_direct_literal_string), InnerLiteralString::Direct),
                map(escape_sequence, InnerLiteralString::Escape),
                map(eol, InnerLiteralString::Eol),
                map(nested_literal_string(depth), InnerLiteralString::Nested),
            )),
            Vec::new,
            |mut out: Vec<u8>, value| {
                value.push(&mut out);
                out
            },
        ).parse(input)
    }
}

fn nested_literal_string(depth: usize) -> impl Fn(ParserInput) -> NomResult<Vec<u8>> {
    move |input| {
        if depth == 0 {
            map(verify(tag(&b"too deep"[..]), |_| false), |_| vec![]).parse(input)
        } else {
            map(
                delimited(tag(&b"("[..]), inner_literal_string(depth - 1), tag(&b")"[..])),
                |mut content| {
                    content.insert(0, b'(');
                    content.push(b')');
                    content
                },
            ).parse(input)
        }
    }
}

fn literal_string(input: ParserInput) -> NomResult<Vec<u8>> {
    delimited(tag(&b"("[..]), inner_literal_string(MAX_BRACKET), tag(&b")"[..])).parse(input)
}

#[inline]
fn hex_digit(input: ParserInput) -> NomResult<u8> {
    map_opt(take(1usize), |c: ParserInput| {
        str::from_utf8(&c).ok().and_then(|c| u8::from_str_radix(c, 16).ok())
    }).parse(input)
}

fn hexadecimal_string(input: ParserInput) -> NomResult<Vec<u8>> {
    map(
        delimited(
            tag(&b"<"[..]),
            terminated(
                fold_many0(
                    preceded(white_space, hex_digit),
                    || -> (Vec<u8>, bool) { (Vec::new(), false) },
                    |state, c| match state {
                        (mut out, false) => {
                            out.push(c << 4);
                            (out, true)
                        }
                        (mut out, true) => {
                            if let Some(last) = out.last_mut() {
                                *last |= c;
                            }
                            (out, false)
                        }
                    },
                ),
                white_space,
            ),
            tag(&b">"[..]),
        ),
        |(bytes, _)| bytes,
    ).parse(input)
}

fn array(input: ParserInput) -> NomResult<Vec<Object>> {
    delimited(pair(tag(&b"["[..]), space), many0(terminated(object, space)), tag(&b"]"[..])).parse(input)
}

/// `<< ... >>` is kept as a flat array of alternating keys and values.
fn dictionary(input: ParserInput) -> NomResult<Vec<Object>> {
    delimited(pair(tag(&b"<<"[..]), space), many0(terminated(object, space)), tag(&b">>"[..])).parse(input)
}

fn brace(input: ParserInput) -> NomResult<Vec<u8>> {
    map(alt((tag(&b"{"[..]), tag(&b"}"[..]))), |b: ParserInput| b.to_vec()).parse(input)
}

fn keyword(input: ParserInput) -> NomResult<Vec<u8>> {
    map(take_while1(is_regular), |kw: ParserInput| kw.to_vec()).parse(input)
}

fn object(input: ParserInput) -> NomResult<Object> {
    alt((
        map(dictionary, Object::Array),
        map(hexadecimal_string, Object::String),
        map(literal_string, Object::String),
        map(name, Object::Name),
        map(array, Object::Array),
        map(real, Object::Keyword),
        map(integer, Object::Integer),
        map(brace, Object::Keyword),
        map(keyword, Object::Keyword),
    )).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_span(s: &'_ [u8]) -> ParserInput<'_> {
        LocatedSpan::new_extra(s, "test")
    }

    fn tstrip<O>(r: NomResult<O>) -> Option<O> {
        r.ok().and_then(|(i, o)| if !i.is_empty() { None } else { Some(o) })
    }

    fn tokens(input: &[u8]) -> Vec<Object> {
        Lexer::new(input).map(|(_, obj)| obj).collect()
    }

    #[test]
    fn parse_string() {
        let literal_string = |i| tstrip(literal_string(i));

        let data = vec![
            ("()", ""),
            ("(text())", "text()"),
            ("(text\r\n\\\\(nested\\t\\b\\f))", "text\r\n\\(nested\t\x08\x0C)"),
            ("(text\\0\\53\\053\\0053)", "text\0++\x053"),
            ("(text line\\\n())", "text line()"),
        ];

        for (input, expected) in data {
            assert_eq!(
                literal_string(test_span(input.as_bytes())),
                Some(expected.as_bytes().to_vec()),
                "input: {:?} output: {:?}",
                input,
                expected,
            );
        }
    }

    #[test]
    fn parse_name() {
        let (text, expected) = (b"/ABC#5f", b"ABC\x5F");
        let result = tstrip(name(test_span(text)));
        assert_eq!(result, Some(expected.to_vec()));
    }

    #[test]
    fn hex_partial() {
        let out = tstrip(hexadecimal_string(test_span(b"<901FA>")));
        assert_eq!(out, Some(b"\x90\x1F\xA0".to_vec()));
    }

    #[test]
    fn hex_separated() {
        let out = tstrip(hexadecimal_string(test_span(b"<9 01F A>")));
        assert_eq!(out, Some(b"\x90\x1F\xA0".to_vec()));
    }

    #[test]
    fn numbers_and_keywords() {
        assert_eq!(
            tokens(b"12 -3 1.5 12abc begincidrange"),
            vec![
                Object::Integer(12),
                Object::Integer(-3),
                Object::keyword("1.5"),
                Object::keyword("12abc"),
                Object::keyword("begincidrange"),
            ]
        );
    }

    #[test]
    fn arrays_nest_and_dicts_flatten() {
        assert_eq!(
            tokens(b"[<0041> [1 2]] << /Registry (Adobe) /Supplement 0 >>"),
            vec![
                Object::Array(vec![
                    Object::String(vec![0x00, 0x41]),
                    Object::Array(vec![Object::Integer(1), Object::Integer(2)]),
                ]),
                Object::Array(vec![
                    Object::Name(b"Registry".to_vec()),
                    Object::String(b"Adobe".to_vec()),
                    Object::Name(b"Supplement".to_vec()),
                    Object::Integer(0),
                ]),
            ]
        );
    }

    #[test]
    fn comments_and_offsets() {
        let input = b"%!PS-Adobe-3.0 Resource-CMap\n/CMapName /Test def % trailing";
        let toks: Vec<(usize, Object)> = Lexer::new(input).collect();
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[0], (29, Object::Name(b"CMapName".to_vec())));
        assert_eq!(toks[2].1, Object::keyword("def"));
    }

    #[test]
    fn stray_bytes_are_skipped() {
        assert_eq!(
            tokens(b") > endcmap"),
            vec![Object::keyword("endcmap")]
        );
    }

    #[test]
    fn braces_are_keywords() {
        assert_eq!(
            tokens(b"{currentdict}"),
            vec![Object::keyword("{"), Object::keyword("currentdict"), Object::keyword("}")]
        );
    }
}
