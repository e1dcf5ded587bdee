use std::borrow::Cow;

mod scanner;

use scanner::{scan_digits, skip_opaque};

/// Rewrite `?` placeholders into Postgres-style `$N`.
///
/// A bare `?` takes the next position (`$1`, `$2`, ...); an explicit `?N` becomes `$N`.
/// Quoted strings, quoted identifiers, comments and dollar-quoted blocks are copied as is.
///
/// Warning: this is a lexical scan, not a parser. Postgres operators spelled with `?`
/// (such as the jsonb `?|` and `?&`) are rewritten too; write those statements with `$N`
/// placeholders and no `?`.
///
/// Borrows the input when it contains no placeholder.
#[must_use]
pub fn to_postgres_placeholders(sql: &str) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let mut rewritten: Option<String> = None;
    let mut copied_to = 0;
    let mut next_position = 1_usize;
    let mut idx = 0;

    while idx < bytes.len() {
        if let Some(end) = skip_opaque(bytes, idx) {
            idx = end;
            continue;
        }
        if bytes[idx] != b'?' {
            idx += 1;
            continue;
        }
        let buf = rewritten.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
        buf.push_str(&sql[copied_to..idx]);
        buf.push('$');
        idx = match scan_digits(bytes, idx + 1) {
            Some((end, digits)) => {
                buf.push_str(digits);
                end
            }
            None => {
                buf.push_str(&next_position.to_string());
                next_position += 1;
                idx + 1
            }
        };
        copied_to = idx;
    }

    match rewritten {
        Some(mut buf) => {
            buf.push_str(&sql[copied_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_bare_placeholders_in_order() {
        let sql = "UPDATE t SET a = ?, b = ? WHERE id = ?";
        assert_eq!(
            to_postgres_placeholders(sql),
            "UPDATE t SET a = $1, b = $2 WHERE id = $3"
        );
    }

    #[test]
    fn keeps_explicit_positions() {
        let sql = "select * from t where a = ?2 and b = ?1";
        assert_eq!(
            to_postgres_placeholders(sql),
            "select * from t where a = $2 and b = $1"
        );
    }

    #[test]
    fn leaves_literals_and_comments_alone() {
        let sql = "select '?', \"q?\" -- ?\n/* ? /* ? */ ? */ from t where a = ?";
        assert_eq!(
            to_postgres_placeholders(sql),
            "select '?', \"q?\" -- ?\n/* ? /* ? */ ? */ from t where a = $1"
        );
    }

    #[test]
    fn leaves_dollar_quoted_bodies_alone() {
        let sql = "$body$ select ? $body$ where a = ?";
        assert_eq!(to_postgres_placeholders(sql), "$body$ select ? $body$ where a = $1");
    }

    #[test]
    fn borrows_when_nothing_changes() {
        let sql = "SELECT * FROM t WHERE name = 'it''s?'";
        let translated = to_postgres_placeholders(sql);
        assert!(matches!(translated, Cow::Borrowed(_)));
        assert_eq!(translated, sql);
    }

    #[test]
    fn preserves_multibyte_text() {
        let sql = "INSERT INTO t VALUES ('héllo', ?)";
        assert_eq!(to_postgres_placeholders(sql), "INSERT INTO t VALUES ('héllo', $1)");
    }
}
