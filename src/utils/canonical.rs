// src/utils/canonical.rs
//! Canonical serialization of certificate fields.
//!
//! Produces the exact bytes that get hashed and signed. The encoding is the
//! compact JSON emitted by Python's `json.dumps(obj, separators=(',', ':'))`
//! with ASCII escaping, so certificates issued by earlier deployments still
//! verify. Keys are sorted at every nesting level.

use crate::error::EncodingError;
use crate::models::fields::{fields_from_json, FieldMap, FieldValue};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use std::fmt;
use std::io;

/// Deterministic byte encoding of a certificate snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalizes a field map.
///
/// # Errors
/// `EncodingError::NonFiniteNumber` if any float (at any depth) is NaN or
/// infinite.
pub fn canonicalize(fields: &FieldMap) -> Result<CanonicalPayload, EncodingError> {
    check_finite("", fields)?;
    let mut out = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut out, PythonFormatter);
    // BTreeMap serializes its keys in byte order
    fields
        .serialize(&mut serializer)
        .map_err(|e| EncodingError::Emit(e.to_string()))?;
    String::from_utf8(out)
        .map(CanonicalPayload)
        .map_err(|e| EncodingError::Emit(e.to_string()))
}

/// Canonicalizes a JSON object, rejecting values outside the closed
/// [`FieldValue`] set.
pub fn canonicalize_json(value: &Value) -> Result<CanonicalPayload, EncodingError> {
    canonicalize(&fields_from_json(value)?)
}

/// serde_json writes non-finite floats as `null`; they are rejected up front.
fn check_finite(path: &str, fields: &FieldMap) -> Result<(), EncodingError> {
    for (key, value) in fields {
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        match value {
            FieldValue::Float(f) if !f.is_finite() => {
                return Err(EncodingError::NonFiniteNumber { path: child });
            }
            FieldValue::Map(nested) => check_finite(&child, nested)?,
            _ => {}
        }
    }
    Ok(())
}

/// Compact output with Python's `ensure_ascii` string escaping and `repr`
/// float formatting.
///
/// Quotes, backslashes and C0 controls still go through serde_json's own
/// escapes, which already match Python's.
struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        let mut plain = 0;
        for (i, c) in fragment.char_indices() {
            if (c as u32) < 0x7f {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[plain..i])?;
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            plain = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[plain..])
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }
}

/// Formats a finite float the way Python's `repr` does.
///
/// Rust's `Debug` output already picks the shortest round-trip digits and
/// switches to exponent form at the same thresholds (below 1e-4, at or above
/// 1e16); only the exponent needs an explicit sign and two-digit padding.
fn format_float(f: f64) -> String {
    let repr = format!("{:?}", f);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
