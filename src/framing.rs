//! Colon delimited token framing.
//!
//! Fields are positional and never escaped, so a field that contains the delimiter shifts every
//! field after it. Splitting always checks the field count before anything is indexed.

use crate::error::InvalidTokenKind;
use itertools::Itertools;

/// The field delimiter.
pub const DELIMITER: &str = ":";

/// Join fields using the delimiter.
pub(crate) fn join<I>(fields: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fields.into_iter().map(|field| field.as_ref().to_owned()).join(DELIMITER)
}

/// Split a token into exactly `N` fields.
pub(crate) fn split_exact<const N: usize>(token: &str) -> Result<[&str; N], InvalidTokenKind> {
    let fields: Vec<&str> = token.split(DELIMITER).collect();
    fields.try_into().map_err(|_| InvalidTokenKind::Malformed)
}

/// Split a token into exactly `count` fields.
pub(crate) fn split_n(token: &str, count: usize) -> Result<Vec<&str>, InvalidTokenKind> {
    let fields: Vec<&str> = token.split(DELIMITER).collect();
    if fields.len() == count { Ok(fields) } else { Err(InvalidTokenKind::Malformed) }
}

/// The first field of a token, if there's more than one.
pub(crate) fn leading_field(token: &str) -> Option<&str> {
    token.split_once(DELIMITER).map(|(first, _)| first)
}
