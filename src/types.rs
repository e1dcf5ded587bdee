use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

/// Values bound as statement parameters and read back from result rows.
///
/// Every backend converts its native representation to and from this enum, so the cursor's
/// typed getters never branch on driver types:
/// ```rust
/// use sql_wrapper::prelude::*;
///
/// let params = params![1, "alice", true, None::<i32>];
/// assert_eq!(params[1], Value::Text("alice".into()));
/// assert!(params[3].is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit); narrower widths widen into it
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Fixed-point decimal value
    Decimal(Decimal),
    /// Text/string value (also used for character large objects)
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in conversion error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
        }
    }
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.f";
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

macro_rules! value_from {
    ($variant:ident => $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )+
    };
}

value_from!(Int => i8, i16, i32, i64, u8, u16, u32);
value_from!(Float => f32, f64);
value_from!(Bool => bool);
value_from!(Text => String, &str);
value_from!(Blob => Vec<u8>, &[u8]);
value_from!(Decimal => Decimal);
value_from!(Date => NaiveDate);
value_from!(Time => NaiveTime);
value_from!(Timestamp => NaiveDateTime);
value_from!(Json => JsonValue);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```rust
/// use sql_wrapper::{params, Value};
///
/// let values = params![7, "x", 2.5];
/// assert_eq!(values, vec![Value::Int(7), Value::Text("x".into()), Value::Float(2.5)]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_integers_widen_to_int() {
        assert_eq!(Value::from(7_i8), Value::Int(7));
        assert_eq!(Value::from(-300_i16), Value::Int(-300));
        assert_eq!(Value::from(u32::MAX), Value::Int(i64::from(u32::MAX)));
    }

    #[test]
    fn options_map_none_to_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn f32_widens_exactly() {
        assert_eq!(Value::from(1.5_f32), Value::Float(1.5));
    }
}
