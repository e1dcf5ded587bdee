use rusqlite::Row;
use rusqlite::types::ValueRef;

use crate::types::Value;

/// Read column `idx` of a `SQLite` row into a [`Value`].
///
/// `SQLite` only stores integers, reals, text and blobs; richer types come back as one of
/// those and are converted by the cursor's typed getters.
pub(crate) fn extract_value(row: &Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(rusqlite::Error::Utf8Error)?
                .to_owned(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

/// Read every column of the current row.
pub(crate) fn extract_row(row: &Row<'_>, width: usize) -> rusqlite::Result<Vec<Value>> {
    (0..width).map(|idx| extract_value(row, idx)).collect()
}
