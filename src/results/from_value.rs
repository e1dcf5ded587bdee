use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value as JsonValue;

use crate::error::DriverError;
use crate::types::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT, Value};

/// Conversion from a row [`Value`] into a Rust type, used by the cursor's typed getters.
///
/// Backends disagree on storage (`SQLite` keeps dates as text, Postgres has real date
/// types), so conversions accept every representation a backend can hand back for the
/// target type. NULL only converts into `Option<T>` and [`Value`].
pub trait FromValue: Sized {
    /// # Errors
    /// Returns [`DriverError::Conversion`] if the value can't represent `Self`.
    fn from_value(value: &Value) -> Result<Self, DriverError>;
}

fn mismatch(value: &Value, target: &str) -> DriverError {
    match value {
        Value::Null => DriverError::Conversion(format!("NULL can't be read as non-optional {target}")),
        other => DriverError::Conversion(format!("can't read {} value as {target}", other.kind())),
    }
}

fn unparsable(text: &str, target: &str, reason: impl std::fmt::Display) -> DriverError {
    DriverError::Conversion(format!("text `{text}` is not a valid {target}: {reason}"))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        Ok(match value {
            Value::Text(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::Time(t) => t.format(TIME_FORMAT).to_string(),
            Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Value::Json(j) => j.to_string(),
            Value::Blob(bytes) => String::from_utf8(bytes.clone())
                .map_err(|e| DriverError::Conversion(format!("blob is not UTF-8 text: {e}")))?,
            Value::Null => return Err(mismatch(value, "string")),
        })
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64().ok_or_else(|| {
                DriverError::Conversion(format!("decimal {d} is out of range for i64"))
            }),
            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
            Value::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                Ok(*f as i64)
            }
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| unparsable(s, "integer", e)),
            other => Err(mismatch(other, "integer")),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, DriverError> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        DriverError::Conversion(format!(
                            "{wide} is out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )+
    };
}

narrow_int!(i8, i16, i32);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(*i as f64),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| DriverError::Conversion(format!("decimal {d} doesn't fit f64"))),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| unparsable(s, "floating point number", e)),
            other => Err(mismatch(other, "floating point number")),
        }
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Decimal(d) => Ok(*d),
            Value::Int(i) => Ok(Decimal::from(*i)),
            // through the shortest round-trip text so 0.1 stays 0.1
            Value::Float(f) => parse_decimal(&f.to_string()),
            Value::Text(s) => parse_decimal(s),
            other => Err(mismatch(other, "decimal")),
        }
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, DriverError> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| unparsable(text, "decimal", e))
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "t" | "true" | "y" | "yes" => Ok(true),
                "0" | "f" | "false" | "n" | "no" => Ok(false),
                _ => Err(unparsable(s, "boolean", "expected true/false or 1/0")),
            },
            other => Err(mismatch(other, "boolean")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Blob(bytes) => Ok(bytes.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch(other, "blob")),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::Timestamp(ts) => Ok(ts.date()),
            Value::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .or_else(|_| parse_timestamp(s).map(|ts| ts.date()))
                .map_err(|e| unparsable(s, "date", e)),
            other => Err(mismatch(other, "date")),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Time(t) => Ok(*t),
            Value::Timestamp(ts) => Ok(ts.time()),
            Value::Text(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M"))
                .map_err(|e| unparsable(s, "time", e)),
            other => Err(mismatch(other, "time")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Value::Text(s) => parse_timestamp(s)
                .or_else(|_| {
                    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .map_err(|e| unparsable(s, "timestamp", e)),
            other => Err(mismatch(other, "timestamp")),
        }
    }
}

fn parse_timestamp(text: &str) -> chrono::ParseResult<NaiveDateTime> {
    let trimmed = text.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
}

impl FromValue for JsonValue {
    fn from_value(value: &Value) -> Result<Self, DriverError> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            Value::Text(s) => serde_json::from_str(s).map_err(|e| unparsable(s, "JSON document", e)),
            other => Err(mismatch(other, "JSON document")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_only_converts_into_options() {
        assert_eq!(Option::<i32>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(&Value::Int(4)).unwrap(), Some(4));
        let err = i32::from_value(&Value::Null).unwrap_err();
        assert!(err.to_string().contains("NULL"));
    }

    #[test]
    fn narrow_integers_are_range_checked() {
        assert_eq!(i8::from_value(&Value::Int(-128)).unwrap(), -128);
        assert!(i8::from_value(&Value::Int(128)).is_err());
        assert!(i32::from_value(&Value::Int(i64::from(i32::MAX) + 1)).is_err());
    }

    #[test]
    fn float_to_decimal_keeps_short_representation() {
        let d = Decimal::from_value(&Value::Float(0.1)).unwrap();
        assert_eq!(d.to_string(), "0.1");
    }

    #[test]
    fn text_is_parsed_for_temporal_targets() {
        let ts = NaiveDateTime::from_value(&Value::Text("2023-07-01 08:30:00.5".into())).unwrap();
        assert_eq!(ts.format("%H:%M:%S%.3f").to_string(), "08:30:00.500");
        let date = NaiveDate::from_value(&Value::Text("2023-07-01".into())).unwrap();
        assert_eq!(date, ts.date());
        let time = NaiveTime::from_value(&Value::Text("08:30:00.5".into())).unwrap();
        assert_eq!(time, ts.time());
    }

    #[test]
    fn integer_flags_read_as_bool() {
        assert!(bool::from_value(&Value::Int(1)).unwrap());
        assert!(!bool::from_value(&Value::Int(0)).unwrap());
        assert!(bool::from_value(&Value::Int(2)).is_err());
    }

    #[test]
    fn json_text_is_parsed() {
        let json = JsonValue::from_value(&Value::Text(r#"{"a":[1,2]}"#.into())).unwrap();
        assert_eq!(json["a"][1], 2);
    }
}
