use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

#[cfg(feature = "postgres")]
use std::{marker::PhantomData, pin::Pin};

#[cfg(feature = "postgres")]
use futures_util::StreamExt;
#[cfg(feature = "postgres")]
use tokio::runtime::Handle;
#[cfg(feature = "postgres")]
use tokio_postgres::RowStream;

use super::FromValue;
use crate::error::{DatabaseError, DriverError};
use crate::schema::ColumnName;
use crate::types::Value;

enum RowSource<'a> {
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Rows<'a>),
    #[cfg(feature = "postgres")]
    Postgres {
        stream: Pin<Box<RowStream>>,
        handle: Handle,
        // rows are tied to the borrowed connection even though the stream owns its data
        scope: PhantomData<&'a mut ()>,
    },
}

/// Forward-only view over the rows of an executing query.
///
/// Only handed to the consumer passed to
/// [`Statement::execute_query`](crate::Statement::execute_query); the lifetime keeps it
/// from escaping, so the driver cursor and connection are always released afterwards.
///
/// ```rust,no_run
/// # use sql_wrapper::prelude::*;
/// # fn demo(db: &Database) -> Result<(), DatabaseError> {
/// let names = Statement::new()
///     .select_from(&TableSchema::new("users"), &["name", "age"])
///     .execute_query(db, |cursor| {
///         let mut names = Vec::new();
///         while cursor.next()? {
///             let age: Option<i32> = cursor.get("age")?;
///             names.push((cursor.get_string("name")?, age));
///         }
///         Ok(names)
///     })?;
/// # Ok(()) }
/// ```
pub struct ResultCursor<'a> {
    columns: Arc<[String]>,
    current: Option<Vec<Value>>,
    // first row, stepped before the consumer runs
    primed: Option<Option<Vec<Value>>>,
    source: RowSource<'a>,
}

impl fmt::Debug for ResultCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCursor")
            .field("columns", &self.columns)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<'a> ResultCursor<'a> {
    #[cfg(feature = "sqlite")]
    pub(crate) fn from_sqlite(columns: Arc<[String]>, rows: rusqlite::Rows<'a>) -> Self {
        Self {
            columns,
            current: None,
            primed: None,
            source: RowSource::Sqlite(rows),
        }
    }

    #[cfg(feature = "postgres")]
    pub(crate) fn from_postgres(columns: Arc<[String]>, stream: RowStream, handle: Handle) -> Self {
        Self {
            columns,
            current: None,
            primed: None,
            source: RowSource::Postgres {
                stream: Box::pin(stream),
                handle,
                scope: PhantomData,
            },
        }
    }

    /// Step to the first row before the consumer sees the cursor, so a statement that fails
    /// while producing rows fails its execution even if the consumer never reads.
    pub(crate) fn prime(&mut self, sql: &str) -> Result<(), DatabaseError> {
        let first = self.fetch(|e| DatabaseError::execution(sql, e))?;
        self.primed = Some(first);
        Ok(())
    }

    /// Advance to the next row. Returns `Ok(false)` once the rows are exhausted.
    ///
    /// # Errors
    /// Returns [`DatabaseError::CursorRead`] if the driver fails to produce the row.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<bool, DatabaseError> {
        let row = match self.primed.take() {
            Some(row) => row,
            None => self.fetch(|e| DatabaseError::cursor(e))?,
        };
        let advanced = row.is_some();
        self.current = row;
        Ok(advanced)
    }

    fn fetch(
        &mut self,
        on_error: impl Fn(DriverError) -> DatabaseError,
    ) -> Result<Option<Vec<Value>>, DatabaseError> {
        match &mut self.source {
            #[cfg(feature = "sqlite")]
            RowSource::Sqlite(rows) => {
                let width = self.columns.len();
                let row = rows.next().map_err(|e| on_error(e.into()))?;
                row.map(|row| crate::sqlite::query::extract_row(row, width))
                    .transpose()
                    .map_err(|e| on_error(e.into()))
            }
            #[cfg(feature = "postgres")]
            RowSource::Postgres { stream, handle, .. } => {
                crate::worker::block_on(handle, stream.next())?
                    .map(|row| row.and_then(|row| crate::postgres::query::extract_row(&row)))
                    .transpose()
                    .map_err(|e| on_error(e.into()))
            }
        }
    }

    /// Column names in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `next()` has positioned the cursor on a row.
    #[must_use]
    pub fn has_row(&self) -> bool {
        self.current.is_some()
    }

    /// Read a column of the current row as `T`.
    ///
    /// Names match exactly first, then ignoring ASCII case.
    ///
    /// # Errors
    /// Returns [`DatabaseError::CursorRead`] naming the column if it doesn't exist, no row is
    /// current, or the value can't be converted (including NULL into a non-`Option` type).
    pub fn get<T: FromValue>(&self, column: impl ColumnName) -> Result<T, DatabaseError> {
        let name = column.column_name();
        let value = self.value_ref(name)?;
        T::from_value(value).map_err(|e| DatabaseError::column(name, e))
    }

    fn value_ref(&self, name: &str) -> Result<&Value, DatabaseError> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| DatabaseError::column(name, DriverError::NoCurrentRow))?;
        self.index_of(name)
            .and_then(|idx| row.get(idx))
            .ok_or_else(|| DatabaseError::column(name, DriverError::UnknownColumn(name.to_string())))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_value(&self, column: impl ColumnName) -> Result<Value, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_string(&self, column: impl ColumnName) -> Result<String, DatabaseError> {
        self.get(column)
    }

    /// Character large object; stored as text by both backends.
    ///
    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_clob(&self, column: impl ColumnName) -> Result<String, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_i8(&self, column: impl ColumnName) -> Result<i8, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_i16(&self, column: impl ColumnName) -> Result<i16, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_i32(&self, column: impl ColumnName) -> Result<i32, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_i64(&self, column: impl ColumnName) -> Result<i64, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_f32(&self, column: impl ColumnName) -> Result<f32, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_f64(&self, column: impl ColumnName) -> Result<f64, DatabaseError> {
        self.get(column)
    }

    /// Exact for Postgres `NUMERIC`. SQLite stores bound decimals as text, but a column
    /// declared `DECIMAL`/`NUMERIC` converts them to a REAL when they fit, keeping about 15
    /// significant digits; declare the column `TEXT` when every digit matters.
    ///
    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_decimal(&self, column: impl ColumnName) -> Result<Decimal, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_bool(&self, column: impl ColumnName) -> Result<bool, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_blob(&self, column: impl ColumnName) -> Result<Vec<u8>, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_date(&self, column: impl ColumnName) -> Result<NaiveDate, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_time(&self, column: impl ColumnName) -> Result<NaiveTime, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_timestamp(&self, column: impl ColumnName) -> Result<NaiveDateTime, DatabaseError> {
        self.get(column)
    }

    /// # Errors
    /// See [`ResultCursor::get`].
    pub fn get_json(&self, column: impl ColumnName) -> Result<JsonValue, DatabaseError> {
        self.get(column)
    }
}
