//! JSON output that is safe to embed in HTML.
//!
//! Strings are escaped like a JavaScript encoder would: `<`, `>`, `&`,
//! `'`, `+` and `` ` `` become `\u00XX` sequences. The output never
//! contains `-->` or `<!--`, so it can sit inside an HTML comment, and it
//! parses back to the same value with any JSON parser.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

#[derive(Debug, Clone, Copy, Default)]
struct HtmlSafeFormatter;

fn is_html_sensitive(byte: u8) -> bool {
    matches!(byte, b'<' | b'>' | b'&' | b'\'' | b'+' | b'`')
}

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Every sensitive character is ASCII, so byte offsets stay on
        // char boundaries.
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            if !is_html_sensitive(byte) {
                continue;
            }
            if start < i {
                writer.write_all(&bytes[start..i])?;
            }
            write!(writer, "\\u{byte:04X}")?;
            start = i + 1;
        }
        writer.write_all(&bytes[start..])
    }
}

pub(crate) fn to_vec<T>(value: &T) -> serde_json::Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, HtmlSafeFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

pub(crate) fn to_string<T>(value: &T) -> serde_json::Result<String>
where
    T: ?Sized + Serialize,
{
    String::from_utf8(to_vec(value)?).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn escapes_html_sensitive_characters() {
        let out = to_string(&json!({"text": "a<b>c&d'e+f`g"})).unwrap();
        assert_eq!(
            out,
            r#"{"text":"a\u003Cb\u003Ec\u0026d\u0027e\u002Bf\u0060g"}"#
        );
    }

    #[test]
    fn comment_delimiters_cannot_appear() {
        let out = to_string(&json!(["-->", "<!--", "--!>"])).unwrap();
        assert!(!out.contains("-->"));
        assert!(!out.contains("<!--"));
        assert!(!out.contains("--!>"));
    }

    #[test]
    fn escaped_output_parses_back_to_the_same_value() {
        let value = json!({"<key>": ["x --> y", "café & ü", "\"quoted\"\n"]});
        let parsed: Value = serde_json::from_str(&to_string(&value).unwrap()).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn plain_strings_are_unchanged() {
        let value = json!({"name": "IncrementAmount", "typeName": "i32"});
        assert_eq!(to_string(&value).unwrap(), serde_json::to_string(&value).unwrap());
    }
}
