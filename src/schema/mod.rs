//! Table and column descriptors used as input to statement text.

mod column;

pub use column::{Column, ColumnBuilder, ColumnName, ColumnType};

/// A table the statement builder can target.
///
/// Implement it on your own types, or use [`TableSchema`].
pub trait Table {
    fn name(&self) -> &str;

    fn columns(&self) -> &[Column];

    /// Raw trailing definitions appended after the columns, e.g. `PRIMARY KEY (id)`.
    fn options(&self) -> &[String];
}

/// Owned [`Table`] implementation built fluently.
///
/// ```rust
/// use sql_wrapper::schema::{Column, ColumnType, Table, TableSchema};
///
/// let users = TableSchema::new("users")
///     .column(Column::builder("id", ColumnType::Integer).not_null().build())
///     .column(Column::builder("email", ColumnType::Varchar).type_data(["255"]).unwrap().build())
///     .option("PRIMARY KEY (id)");
/// assert_eq!(users.columns().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
    options: Vec<String>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Look up a column descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }
}

impl Table for TableSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn options(&self) -> &[String] {
        &self.options
    }
}

/// `CREATE TABLE IF NOT EXISTS` text for a table descriptor.
#[must_use]
pub fn create_table_sql<T: Table + ?Sized>(table: &T) -> String {
    let parts: Vec<String> = table
        .columns()
        .iter()
        .map(Column::definition)
        .chain(table.options().iter().cloned())
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {}({});",
        table.name(),
        parts.join(", ")
    )
}
