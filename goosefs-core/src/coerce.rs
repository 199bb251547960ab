//! Conversion of raw input into schema-conforming documents.
//!
//! [`coerce`] converts a single raw value to its declared [`FieldType`], and
//! [`validate_document`] runs it over every field of a [`Schema`], applies
//! defaults, drops undeclared input, and settles the document's `_id`.
//!
//! Coercion rules by type:
//!
//! - `String`: strings pass through; numbers and booleans are cast to their
//!   textual form. `trim` and `lowercase` are applied in that order.
//! - `Number`: parsed as an integer. Fractions are truncated and strings are
//!   read like `parseInt` (leading digits, optional sign, `0x` prefix).
//!   Input with no leading digits is a validation failure.
//! - `Boolean`: truthiness. `0`, `""` and `false` are false, everything else true.
//! - `Array` / `Object`: must already be an array / object.
//! - `Date`: RFC 3339 strings, `YYYY-MM-DD` dates and epoch milliseconds,
//!   normalized to an RFC 3339 UTC string with millisecond precision.
//!
//! A missing or `null` input yields no value; the field's default fills in when
//! declared, otherwise the field is omitted (or rejected when `required`).

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    document::{Document, ID_FIELD, kind_of},
    error::{DocumentStoreError, DocumentStoreResult},
    schema::{FieldSpec, FieldType, Schema},
};

/// Coerces one raw input value to the type declared by `spec`.
///
/// Returns `Ok(None)` when the input is absent or `null`.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Validation`] when the input cannot be
/// represented as the declared type.
pub fn coerce(spec: &FieldSpec, field: &str, raw: Option<&Value>) -> DocumentStoreResult<Option<Value>> {
    let raw = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw,
    };

    let value = match spec.field_type() {
        FieldType::String => Value::String(coerce_string(spec, field, raw)?),
        FieldType::Number => Value::from(coerce_number(field, raw)?),
        FieldType::Boolean => Value::Bool(truthy(raw)),
        FieldType::Array => match raw {
            Value::Array(_) => raw.clone(),
            other => return Err(mismatch(field, FieldType::Array, other)),
        },
        FieldType::Object => match raw {
            Value::Object(_) => raw.clone(),
            other => return Err(mismatch(field, FieldType::Object, other)),
        },
        FieldType::Date => Value::String(coerce_date(field, raw)?),
    };

    Ok(Some(value))
}

/// Builds a schema-conforming document out of raw input.
///
/// Fields not declared in `schema` are dropped. `_id` is copied from the input
/// when present, otherwise a new v4 UUID is minted.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Validation`] if any field fails coercion, a
/// default cannot be coerced, a required field has no value, or `_id` is not
/// a string or number.
pub fn validate_document(schema: &Schema, raw: &Document) -> DocumentStoreResult<Document> {
    let mut valid = Document::new();

    for (name, spec) in schema.fields() {
        if name == ID_FIELD {
            continue;
        }

        let value = match coerce(spec, name, raw.get(name))? {
            Some(value) => Some(value),
            None => match spec.default() {
                Some(default) => coerce(spec, name, Some(&default.resolve()))?,
                None => None,
            },
        };

        match value {
            Some(value) => {
                valid.set(name, value);
            }
            None if spec.is_required() => {
                return Err(DocumentStoreError::Validation(format!(
                    "field `{name}` is required"
                )));
            }
            None => {}
        }
    }

    let id = match raw.get(ID_FIELD) {
        None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        Some(other) => {
            return Err(DocumentStoreError::Validation(format!(
                "`{ID_FIELD}` must be a string, got {}",
                kind_of(other)
            )));
        }
    };
    valid.set(ID_FIELD, id);

    Ok(valid)
}

fn mismatch(field: &str, expected: FieldType, got: &Value) -> DocumentStoreError {
    DocumentStoreError::Validation(format!(
        "field `{field}`: expected {expected}, got {} {got}",
        kind_of(got)
    ))
}

fn coerce_string(spec: &FieldSpec, field: &str, raw: &Value) -> DocumentStoreResult<String> {
    let mut text = match raw {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => return Err(mismatch(field, FieldType::String, other)),
    };

    if spec.is_trim() {
        text = text.trim().to_string();
    }
    if spec.is_lowercase() {
        text = text.to_lowercase();
    }

    Ok(text)
}

fn coerce_number(field: &str, raw: &Value) -> DocumentStoreResult<i64> {
    let parsed = match raw {
        Value::Number(number) => match number.as_i64() {
            Some(int) => Some(int),
            None => number
                .as_f64()
                .map(f64::trunc)
                .filter(|float| float.is_finite() && *float >= i64::MIN as f64 && *float <= i64::MAX as f64)
                .map(|float| float as i64),
        },
        Value::String(text) => parse_int(text),
        _ => None,
    };

    parsed.ok_or_else(|| mismatch(field, FieldType::Number, raw))
}

/// Reads the leading integer of `text` the way `parseInt` does.
fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_date(field: &str, raw: &Value) -> DocumentStoreResult<String> {
    let parsed = match raw {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|date| date.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|date| date.and_utc())
            }),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };

    parsed
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| mismatch(field, FieldType::Date, raw))
}
