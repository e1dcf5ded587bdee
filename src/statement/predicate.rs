use super::Statement;
use crate::schema::{ColumnName, Table};

impl Statement {
    /// ` WHERE`
    pub fn where_clause(self) -> Self {
        self.push(" WHERE")
    }

    /// ` AND`
    pub fn and(self) -> Self {
        self.push(" AND")
    }

    /// ` OR`
    pub fn or(self) -> Self {
        self.push(" OR")
    }

    /// ` ON`
    pub fn on(self) -> Self {
        self.push(" ON")
    }

    pub fn equals_literal(self, column: impl ColumnName, literal: impl AsRef<str>) -> Self {
        self.compare(column.column_name(), "=", literal.as_ref())
    }

    pub fn lower_than_literal(self, column: impl ColumnName, literal: impl AsRef<str>) -> Self {
        self.compare(column.column_name(), "<", literal.as_ref())
    }

    pub fn greater_than_literal(self, column: impl ColumnName, literal: impl AsRef<str>) -> Self {
        self.compare(column.column_name(), ">", literal.as_ref())
    }

    /// ` column IN set`, e.g. `is_in("id", "(1, 2, 3)")`.
    pub fn is_in(self, column: impl ColumnName, set: impl AsRef<str>) -> Self {
        self.compare(column.column_name(), "IN", set.as_ref())
    }

    /// ` column = ?`
    pub fn equals(self, column: impl ColumnName) -> Self {
        self.compare(column.column_name(), "=", "?").bound()
    }

    /// ` column < ?`
    pub fn lower_than(self, column: impl ColumnName) -> Self {
        self.compare(column.column_name(), "<", "?").bound()
    }

    /// Renders ` column < ?`, the same comparison as [`lower_than`](Self::lower_than).
    ///
    /// Existing statements depend on this rendering. For a bound `>` use
    /// `greater_than_literal(column, "?")` followed by
    /// [`with_placeholders`](Self::with_placeholders).
    pub fn greater_than(self, column: impl ColumnName) -> Self {
        self.compare(column.column_name(), "<", "?").bound()
    }

    /// ` AS label`
    pub fn alias(self, label: impl AsRef<str>) -> Self {
        self.push(&format!(" AS {}", label.as_ref()))
    }

    /// ` JOIN table`
    pub fn join<T: Table + ?Sized>(self, table: &T) -> Self {
        self.push(&format!(" JOIN {}", table.name()))
    }

    fn compare(self, column: &str, operator: &str, rhs: &str) -> Self {
        self.push(&format!(" {column} {operator} {rhs}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType, TableSchema};

    #[test]
    fn keywords_carry_a_leading_space() {
        let stmt = Statement::new().where_clause().and().or().on();
        assert_eq!(stmt.sql(), " WHERE AND OR ON");
    }

    #[test]
    fn literal_comparisons() {
        let stmt = Statement::raw("SELECT * FROM t")
            .where_clause()
            .equals_literal("a", "1")
            .and()
            .lower_than_literal("b", "2")
            .or()
            .greater_than_literal("c", "3")
            .and()
            .is_in("d", "(4, 5)");
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM t WHERE a = 1 AND b < 2 OR c > 3 AND d IN (4, 5)"
        );
        assert!(!stmt.needs_binding());
    }

    #[test]
    fn bound_greater_than_renders_lower_than() {
        let stmt = Statement::new().greater_than("age");
        assert_eq!(stmt.sql(), " age < ?");
        assert!(stmt.needs_binding());
        let stmt = Statement::new().greater_than_literal("age", "?").with_placeholders();
        assert_eq!(stmt.sql(), " age > ?");
        assert!(stmt.needs_binding());
    }

    #[test]
    fn joins_and_aliases() {
        let users = TableSchema::new("users");
        let orders = TableSchema::new("orders");
        let user_id = Column::builder("users.id", ColumnType::Integer).build();
        let stmt = Statement::new()
            .select_all_from(&users)
            .alias("u")
            .join(&orders)
            .on()
            .equals_literal(&user_id, "orders.user_id");
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users AS u JOIN orders ON users.id = orders.user_id"
        );
    }
}
