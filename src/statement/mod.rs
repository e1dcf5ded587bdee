//! Fluent statement builder.
//!
//! A [`Statement`] accumulates text fragment by fragment, remembers whether its `?`
//! placeholders must be bound, and holds the values to bind. Nothing is validated: the text
//! is handed to the driver as assembled.
//!
//! ```rust
//! use sql_wrapper::prelude::*;
//!
//! let users = TableSchema::new("users");
//! let stmt = Statement::new()
//!     .update(&users)
//!     .set(&["name", "email"])
//!     .where_clause()
//!     .equals("id")
//!     .replacements(params!["ada", "ada@example.com", 7]);
//! assert_eq!(stmt.sql(), "UPDATE users SET name = ?, email = ? WHERE id = ?");
//! assert!(stmt.needs_binding());
//! assert_eq!(stmt.parameters().len(), 3);
//! ```

mod dml;
mod execute;
mod predicate;
mod select;

use std::fmt;

use crate::types::Value;

/// A statement under construction. Each method consumes the builder and returns it.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Statement {
    sql: String,
    needs_binding: bool,
    params: Vec<Value>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// A statement starting from raw text.
    pub fn raw(text: impl AsRef<str>) -> Self {
        Self::new().of(text)
    }

    /// Append raw text verbatim.
    pub fn of(mut self, text: impl AsRef<str>) -> Self {
        self.sql.push_str(text.as_ref());
        self
    }

    /// Bind [`replacements`](Self::replacements) even though no binding clause was used,
    /// for raw text that carries its own `?` placeholders.
    pub fn with_placeholders(mut self) -> Self {
        self.needs_binding = true;
        self
    }

    /// Values bound positionally, in order, to the `?` placeholders. Replaces any values
    /// stored earlier.
    pub fn replacements<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.params = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn parameters(&self) -> &[Value] {
        &self.params
    }

    /// Whether execution binds the parameters.
    #[must_use]
    pub fn needs_binding(&self) -> bool {
        self.needs_binding
    }

    fn push(mut self, fragment: &str) -> Self {
        self.sql.push_str(fragment);
        self
    }

    fn bound(mut self) -> Self {
        self.needs_binding = true;
        self
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
