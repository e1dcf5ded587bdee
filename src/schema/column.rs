use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

/// Declared SQL type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Char,
    Varchar,
    Binary,
    Varbinary,
    Tinyblob,
    Tinytext,
    Text,
    Blob,
    Mediumtext,
    Mediumblob,
    Longtext,
    Longblob,
    Enum,
    Set,

    Bit,
    Tinyint,
    Boolean,
    Smallint,
    Mediumint,
    Integer,
    Bigint,
    Float,
    Double,
    DoublePrecision,
    Decimal,

    Date,
    Datetime,
    Timestamp,
    Time,
    Year,
}

impl ColumnType {
    /// SQL keyword for this type.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Char => "CHAR",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Binary => "BINARY",
            ColumnType::Varbinary => "VARBINARY",
            ColumnType::Tinyblob => "TINYBLOB",
            ColumnType::Tinytext => "TINYTEXT",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Mediumtext => "MEDIUMTEXT",
            ColumnType::Mediumblob => "MEDIUMBLOB",
            ColumnType::Longtext => "LONGTEXT",
            ColumnType::Longblob => "LONGBLOB",
            ColumnType::Enum => "ENUM",
            ColumnType::Set => "SET",
            ColumnType::Bit => "BIT",
            ColumnType::Tinyint => "TINYINT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Smallint => "SMALLINT",
            ColumnType::Mediumint => "MEDIUMINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Bigint => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::DoublePrecision => "DOUBLE PRECISION",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Date => "DATE",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Time => "TIME",
            ColumnType::Year => "YEAR",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A table column: name, declared type and optional constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    type_data: Option<Vec<String>>,
    not_null: bool,
    default_value: Option<String>,
}

impl Column {
    /// Start a column from its two required parts.
    #[must_use]
    pub fn builder(name: impl Into<String>, column_type: ColumnType) -> ColumnBuilder {
        ColumnBuilder {
            column: Column {
                name: name.into(),
                column_type,
                type_data: None,
                not_null: false,
                default_value: None,
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    #[must_use]
    pub fn type_data(&self) -> Option<&[String]> {
        self.type_data.as_deref()
    }

    #[must_use]
    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Column definition as used inside `CREATE TABLE`:
    /// `name TYPE(data) NOT NULL DEFAULT value`, each clause only when configured.
    #[must_use]
    pub fn definition(&self) -> String {
        let mut out = format!("{} {}", self.name, self.column_type);
        if let Some(data) = &self.type_data {
            out.push('(');
            out.push_str(&data.join(", "));
            out.push(')');
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default_value {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        out
    }
}

/// Builder returned by [`Column::builder`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    column: Column,
}

impl ColumnBuilder {
    /// Extra type data such as a `VARCHAR` length or `DECIMAL` precision, without parentheses.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] if `data` is empty.
    pub fn type_data<I, S>(mut self, data: I) -> Result<Self, DatabaseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data: Vec<String> = data.into_iter().map(Into::into).collect();
        if data.is_empty() {
            return Err(DatabaseError::Validation(format!(
                "type data for column `{}` can't be empty",
                self.column.name
            )));
        }
        self.column.type_data = Some(data);
        Ok(self)
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.column.not_null = true;
        self
    }

    /// Raw SQL literal used as the column default, e.g. `'n/a'` or `0`.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.column.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Column {
        self.column
    }
}

/// Anything that names a column: a [`Column`] descriptor or a plain string.
pub trait ColumnName {
    fn column_name(&self) -> &str;
}

impl ColumnName for Column {
    fn column_name(&self) -> &str {
        &self.name
    }
}

impl ColumnName for str {
    fn column_name(&self) -> &str {
        self
    }
}

impl ColumnName for String {
    fn column_name(&self) -> &str {
        self
    }
}

impl<T: ColumnName + ?Sized> ColumnName for &T {
    fn column_name(&self) -> &str {
        (**self).column_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_renders_only_configured_clauses() {
        let plain = Column::builder("id", ColumnType::Integer).build();
        assert_eq!(plain.definition(), "id INTEGER");

        let full = Column::builder("price", ColumnType::Decimal)
            .type_data(["10", "2"])
            .unwrap()
            .not_null()
            .default_value("0")
            .build();
        assert_eq!(full.definition(), "price DECIMAL(10, 2) NOT NULL DEFAULT 0");
    }

    #[test]
    fn empty_type_data_is_rejected() {
        let err = Column::builder("name", ColumnType::Varchar)
            .type_data(Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[test]
    fn double_precision_renders_with_space() {
        assert_eq!(ColumnType::DoublePrecision.to_string(), "DOUBLE PRECISION");
    }

    #[test]
    fn column_name_accepts_descriptors_and_strings() {
        let col = Column::builder("email", ColumnType::Text).build();
        let owned = String::from("email");
        assert_eq!((&col).column_name(), "email");
        assert_eq!("email".column_name(), "email");
        assert_eq!(owned.column_name(), "email");
    }
}
