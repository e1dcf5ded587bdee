use super::Statement;
use crate::schema::{ColumnName, Table};

impl Statement {
    pub fn insert_into<T: Table + ?Sized>(self, table: &T) -> Self {
        self.push(&format!("INSERT INTO {}", table.name()))
    }

    pub fn delete_from<T: Table + ?Sized>(self, table: &T) -> Self {
        self.push(&format!("DELETE FROM {}", table.name()))
    }

    pub fn update<T: Table + ?Sized>(self, table: &T) -> Self {
        self.push(&format!("UPDATE {}", table.name()))
    }

    /// ` SET column = literal`; the literal is inserted verbatim.
    pub fn set_literal(self, column: impl ColumnName, literal: impl AsRef<str>) -> Self {
        self.push(&format!(" SET {} = {}", column.column_name(), literal.as_ref()))
    }

    /// ` SET a = ?, b = ?` with one bound placeholder per column.
    pub fn set<C: ColumnName>(self, columns: &[C]) -> Self {
        let assignments = columns
            .iter()
            .map(|c| format!("{} = ?", c.column_name()))
            .collect::<Vec<_>>()
            .join(", ");
        self.push(&format!(" SET {assignments}")).bound()
    }

    /// ` VALUES tuple`; the tuple is inserted verbatim.
    pub fn values_literal(self, tuple: impl AsRef<str>) -> Self {
        self.push(&format!(" VALUES {}", tuple.as_ref()))
    }

    /// ` VALUES (?, ?, ...)` with `count` bound placeholders.
    pub fn values(self, count: usize) -> Self {
        let placeholders = vec!["?"; count].join(", ");
        self.values_literal(format!("({placeholders})")).bound()
    }
}
