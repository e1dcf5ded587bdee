//! Byte-level helpers that find where SQL regions without placeholders end.
//!
//! Every index is a byte offset into the statement text; regions always end right after an
//! ASCII delimiter (or at the end of input), so the offsets are valid `str` boundaries.

/// If quoted text, a comment or a dollar-quoted block opens at `start`, the index one past
/// its end. Unterminated regions run to the end of the input.
pub(super) fn skip_opaque(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = bytes.get(start..)?;
    match rest.first()? {
        b'\'' | b'"' => Some(skip_quoted(bytes, start)),
        b'-' if rest.starts_with(b"--") => Some(skip_line_comment(bytes, start)),
        b'/' if rest.starts_with(b"/*") => Some(skip_block_comment(bytes, start)),
        b'$' => skip_dollar_quoted(bytes, start),
        _ => None,
    }
}

/// Digits starting at `start`, with the index one past the last digit.
pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let len = bytes
        .get(start..)?
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let end = start + len;
    std::str::from_utf8(&bytes[start..end])
        .ok()
        .map(|digits| (end, digits))
}

// 'it''s' and "a""b": a doubled delimiter stays inside the literal
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut idx = start + 1;
    while idx < bytes.len() {
        if bytes[idx] == quote {
            if bytes.get(idx + 1) == Some(&quote) {
                idx += 2;
                continue;
            }
            return idx + 1;
        }
        idx += 1;
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

// Postgres block comments nest.
fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0_u32;
    let mut idx = start;
    while idx < bytes.len() {
        let rest = &bytes[idx..];
        if rest.starts_with(b"/*") {
            depth += 1;
            idx += 2;
        } else if rest.starts_with(b"*/") {
            depth -= 1;
            idx += 2;
            if depth == 0 {
                return idx;
            }
        } else {
            idx += 1;
        }
    }
    bytes.len()
}

// `$tag$ ... $tag$`; a tag never starts with a digit, so `$1` stays a parameter.
fn skip_dollar_quoted(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = bytes.get(start + 1..)?;
    if rest.first().is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let tag_len = rest
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if rest.get(tag_len) != Some(&b'$') {
        return None;
    }
    let delimiter = &bytes[start..start + tag_len + 2];
    let body = start + delimiter.len();
    Some(
        bytes[body..]
            .windows(delimiter.len())
            .position(|window| window == delimiter)
            .map_or(bytes.len(), |offset| body + offset + delimiter.len()),
    )
}
