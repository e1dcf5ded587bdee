use super::Statement;
use crate::schema::{Column, ColumnName, Table};

impl Statement {
    /// `SELECT a, b FROM table`, names unquoted.
    pub fn select_from<T, C>(self, table: &T, columns: &[C]) -> Self
    where
        T: Table + ?Sized,
        C: ColumnName,
    {
        let list = columns
            .iter()
            .map(ColumnName::column_name)
            .collect::<Vec<_>>()
            .join(", ");
        self.select(&list, table)
    }

    /// `SELECT 'a', 'b' FROM table`: the descriptor form quotes each column name.
    pub fn select_columns_from<T: Table + ?Sized>(self, table: &T, columns: &[&Column]) -> Self {
        let list = columns
            .iter()
            .map(|c| format!("'{}'", c.name()))
            .collect::<Vec<_>>()
            .join(", ");
        self.select(&list, table)
    }

    /// `SELECT <count> FROM table`, where `-1` selects `*`.
    pub fn select_count_from<T: Table + ?Sized>(self, table: &T, count: i32) -> Self {
        if count == -1 {
            self.select("*", table)
        } else {
            self.select(&count.to_string(), table)
        }
    }

    /// `SELECT * FROM table`
    pub fn select_all_from<T: Table + ?Sized>(self, table: &T) -> Self {
        self.select_count_from(table, -1)
    }

    fn select<T: Table + ?Sized>(self, list: &str, table: &T) -> Self {
        self.push(&format!("SELECT {list} FROM {}", table.name()))
    }
}
