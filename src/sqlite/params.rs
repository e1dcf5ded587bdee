use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};

use crate::types::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT, Value};

// SQLite has no native date, decimal or JSON storage: those bind as text, booleans as 0/1.
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            Value::Decimal(d) => ToSqlOutput::Owned(SqliteValue::Text(d.to_string())),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Date(d) => text(d.format(DATE_FORMAT)),
            Value::Time(t) => text(t.format(TIME_FORMAT)),
            Value::Timestamp(ts) => text(ts.format(TIMESTAMP_FORMAT)),
            Value::Json(j) => ToSqlOutput::Owned(SqliteValue::Text(j.to_string())),
        })
    }
}

fn text(formatted: impl std::fmt::Display) -> ToSqlOutput<'static> {
    ToSqlOutput::Owned(SqliteValue::Text(formatted.to_string()))
}
