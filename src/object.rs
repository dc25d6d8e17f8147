use crate::{Error, Result};
use std::fmt;
use std::str;

/// Operand produced by the PostScript tokenizer.
///
/// CMap resources only need these five shapes; anything else the tokenizer
/// meets (reals, braces, operators) is passed through as a `Keyword`.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Object {
    Integer(i64),
    /// Literal `(...)` or hexadecimal `<...>` string, already decoded to bytes.
    String(Vec<u8>),
    /// Name literal, without the leading slash.
    Name(Vec<u8>),
    Array(Vec<Object>),
    /// Executable name such as `begincidrange` or `def`.
    Keyword(Vec<u8>),
}

impl From<i64> for Object {
    fn from(number: i64) -> Self {
        Object::Integer(number)
    }
}

macro_rules! from_smaller_ints {
	($( $Int: ty )+) => {
		$(
			impl From<$Int> for Object {
				fn from(number: $Int) -> Self {
					Object::Integer(i64::from(number))
				}
			}
		)+
	}
}

from_smaller_ints! {
    i8 i16 i32
    u8 u16 u32
}

impl<'a> From<&'a [u8]> for Object {
    fn from(bytes: &'a [u8]) -> Self {
        Object::String(bytes.to_vec())
    }
}

impl<'a> From<&'a str> for Object {
    fn from(name: &'a str) -> Self {
        Object::Name(name.as_bytes().to_vec())
    }
}

impl From<Vec<Object>> for Object {
    fn from(array: Vec<Object>) -> Self {
        Object::Array(array)
    }
}

impl Object {
    pub fn keyword<S: Into<Vec<u8>>>(s: S) -> Self {
        Object::Keyword(s.into())
    }

    pub fn enum_variant(&self) -> &'static str {
        match *self {
            Object::Integer(_) => "Integer",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Keyword(_) => "Keyword",
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match *self {
            Object::Integer(ref value) => Ok(*value),
            _ => Err(self.type_error("Integer")),
        }
    }

    pub fn as_str(&self) -> Result<&[u8]> {
        match self {
            Object::String(string) => Ok(string),
            _ => Err(self.type_error("String")),
        }
    }

    pub fn as_name(&self) -> Result<&[u8]> {
        match *self {
            Object::Name(ref name) => Ok(name),
            _ => Err(self.type_error("Name")),
        }
    }

    pub fn as_name_str(&self) -> Result<&str> {
        str::from_utf8(self.as_name()?).map_err(|_| Error::ObjectType {
            expected: "UTF-8 Name",
            found: "Name",
        })
    }

    pub fn as_array(&self) -> Result<&Vec<Object>> {
        match *self {
            Object::Array(ref arr) => Ok(arr),
            _ => Err(self.type_error("Array")),
        }
    }

    pub fn as_keyword(&self) -> Result<&[u8]> {
        match *self {
            Object::Keyword(ref kw) => Ok(kw),
            _ => Err(self.type_error("Keyword")),
        }
    }

    fn type_error(&self, expected: &'static str) -> Error {
        Error::ObjectType {
            expected,
            found: self.enum_variant(),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Object::Integer(ref value) => write!(f, "{}", *value),
            Object::Name(ref name) => write!(f, "/{}", String::from_utf8_lossy(name)),
            Object::String(ref bytes) => {
                f.write_str("<")?;
                for byte in bytes {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_str(">")
            }
            Object::Array(ref array) => {
                let items = array.iter().map(|item| format!("{:?}", item)).collect::<Vec<String>>();
                write!(f, "[{}]", items.join(" "))
            }
            Object::Keyword(ref kw) => f.write_str(&String::from_utf8_lossy(kw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_report_found_type() {
        let obj = Object::keyword("def");
        match obj.as_i64() {
            Err(Error::ObjectType { expected, found }) => {
                assert_eq!(expected, "Integer");
                assert_eq!(found, "Keyword");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(obj.as_keyword().unwrap(), b"def");
    }

    #[test]
    fn debug_uses_postscript_syntax() {
        let obj = Object::Array(vec![
            Object::from(&b"\x00\x41"[..]),
            Object::from("WMode"),
            Object::from(10),
            Object::keyword("usecmap"),
        ]);
        assert_eq!(format!("{:?}", obj), "[<0041> /WMode 10 usecmap]");
    }
}
