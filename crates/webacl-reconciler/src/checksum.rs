//! Checksum of the desired WebACL definition.
//!
//! The definition is serialized in the same textual form the controller has
//! always hashed (`", "` and `": "` separators, document key order, non-ASCII
//! escaped as `\uXXXX`, floats in shortest-repr form such as `1e-05` or
//! `100.0`), so checksums stored in existing parent statuses stay comparable.
//!
//! Integers are kept verbatim only within the `i64`/`u64` range. Larger ones
//! are parsed as floats and hash differently from their historical form.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

/// Serializes `definition` in canonical form.
pub fn canonical_json(definition: &Map<String, Value>) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(256);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter);
    definition.serialize(&mut ser)?;
    Ok(buf)
}

/// CRC32 (IEEE) of the canonical serialization of `definition`.
pub fn definition_checksum(definition: &Map<String, Value>) -> Result<u32, serde_json::Error> {
    Ok(crc32fast::hash(&canonical_json(definition)?))
}

struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    #[inline]
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    #[inline]
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    #[inline]
    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(|b| b.is_ascii() && b != 0x7f) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            // DEL is ASCII but still escaped in the canonical form.
            if ch.is_ascii() && ch != '\x7f' {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Shortest round-trip digits, fixed notation for exponents in `-4..16` and
/// `d.ddde+XX` otherwise.
fn float_repr(value: f64) -> String {
    let sci = format!("{value:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        // Digits before the decimal point.
        let point = exp + 1;
        if point <= 0 {
            format!("{sign}0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else if point as usize >= digits.len() {
            format!("{sign}{digits}{}.0", "0".repeat(point as usize - digits.len()))
        } else {
            let (int, frac) = digits.split_at(point as usize);
            format!("{sign}{int}.{frac}")
        }
    } else {
        let (first, rest) = digits.split_at(1);
        let exp_sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{sign}{first}e{exp_sign}{:02}", exp.unsigned_abs())
        } else {
            format!("{sign}{first}.{rest}e{exp_sign}{:02}", exp.unsigned_abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn canonical_form_uses_spaced_separators() {
        let def = object(json!({ "Rules": [1, 2], "Name": "foo" }));
        let text = String::from_utf8(canonical_json(&def).unwrap()).unwrap();
        assert_eq!(text, r#"{"Rules": [1, 2], "Name": "foo"}"#);
    }

    #[test]
    fn checksum_matches_known_values() {
        let def = object(json!({ "Rules": [], "Name": "foo" }));
        assert_eq!(definition_checksum(&def).unwrap(), 4_069_420_096);

        let def = object(json!({ "Rules": [], "Name": "bar" }));
        assert_eq!(definition_checksum(&def).unwrap(), 4_079_979_920);
    }

    #[test]
    fn key_order_is_significant() {
        let a = object(json!({ "Rules": [], "Name": "foo" }));
        let b = object(json!({ "Name": "foo", "Rules": [] }));
        assert_eq!(definition_checksum(&b).unwrap(), 3_351_981_209);
        assert_ne!(definition_checksum(&a).unwrap(), definition_checksum(&b).unwrap());
    }

    #[test]
    fn non_ascii_is_escaped_as_utf16() {
        let def: Map<String, Value> = serde_json::from_str(
            r#"{"Description": "café 😀", "Rules": [{"Priority": 1, "Action": {"Block": {}}}], "Name": "foo"}"#,
        )
        .unwrap();
        let text = String::from_utf8(canonical_json(&def).unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"Description": "caf\u00e9 \ud83d\ude00", "Rules": [{"Priority": 1, "Action": {"Block": {}}}], "Name": "foo"}"#
        );
        assert_eq!(definition_checksum(&def).unwrap(), 2_926_400_374);
    }

    #[test]
    fn delete_control_is_escaped() {
        let def = object(json!({ "Name": "a\u{7f}b" }));
        let text = String::from_utf8(canonical_json(&def).unwrap()).unwrap();
        assert_eq!(text, r#"{"Name": "a\u007fb"}"#);
        assert_eq!(definition_checksum(&def).unwrap(), 1_276_789_545);
    }

    #[test]
    fn floats_use_shortest_repr() {
        assert_eq!(float_repr(1e-5), "1e-05");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1e15), "1000000000000000.0");
        assert_eq!(float_repr(-2.5), "-2.5");
        assert_eq!(float_repr(100.0), "100.0");
        assert_eq!(float_repr(0.0), "0.0");
        assert_eq!(float_repr(-0.0), "-0.0");
        assert_eq!(float_repr(1.5e-300), "1.5e-300");
        assert_eq!(float_repr(1.2345678901234567e23), "1.2345678901234567e+23");
    }

    #[test]
    fn float_definitions_match_known_values() {
        let def: Map<String, Value> = serde_json::from_str(
            r#"{"Rate": 1e-05, "Scale": 0.0001, "Big": 1e+16, "Mid": 1000000000000000.0, "Neg": -2.5, "Whole": 100.0, "Name": "foo"}"#,
        )
        .unwrap();
        let text = String::from_utf8(canonical_json(&def).unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"Rate": 1e-05, "Scale": 0.0001, "Big": 1e+16, "Mid": 1000000000000000.0, "Neg": -2.5, "Whole": 100.0, "Name": "foo"}"#
        );
        assert_eq!(definition_checksum(&def).unwrap(), 4_220_575_920);

        let def: Map<String, Value> = serde_json::from_str(
            r#"{"Small": 1.5e-300, "Zero": 0.0, "Frac": 123.456, "Name": "foo"}"#,
        )
        .unwrap();
        assert_eq!(definition_checksum(&def).unwrap(), 490_440_270);
    }

    #[test]
    fn checksum_is_deterministic() {
        let def = object(json!({ "Rules": [{ "Name": "r1" }], "DefaultAction": { "Allow": {} } }));
        assert_eq!(
            definition_checksum(&def).unwrap(),
            definition_checksum(&def.clone()).unwrap()
        );
    }
}
