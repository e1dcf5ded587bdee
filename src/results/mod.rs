//! Reading rows back: the forward-only [`ResultCursor`] and the [`FromValue`] conversions
//! behind its typed getters.

mod cursor;
mod from_value;

pub use cursor::ResultCursor;
pub use from_value::FromValue;
