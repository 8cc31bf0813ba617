//! Trigram Similarity and Case Folding
//!
//! The approximate-matching primitive installed into every store connection as
//! the SQL function `similarity(a, b)`, next to `fold(text)`, the Unicode-aware
//! lowercase used for case-insensitive name matching. SQLite's own `lower()`
//! only folds ASCII.
//!
//! Both inputs are lowercased and split into words of alphanumeric characters.
//! Each word is padded with two spaces in front and one behind, and every window
//! of three characters becomes a trigram. The score is the size of the
//! intersection of the two trigram sets over the size of their union, so it lies
//! in `[0, 1]` and is symmetric.

use rusqlite::Connection;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use std::collections::HashSet;

pub const FUNCTION_NAME: &str = "similarity";
pub const FOLD_FUNCTION_NAME: &str = "fold";

type Trigram = [char; 3];

pub fn trigrams(text: &str) -> HashSet<Trigram> {
    let lowered = text.to_lowercase();
    let mut set = HashSet::new();

    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }

    set
}

pub fn similarity(left: &str, right: &str) -> f64 {
    let left = trigrams(left);
    let right = trigrams(right);

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f64 / union as f64
}

/// Full Unicode lowercase. Matching compares `fold(name)` against `fold(query)`.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Registers `similarity(text, text) -> real` and `fold(text) -> text` on the
/// connection. NULL in, NULL out.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8
        | FunctionFlags::SQLITE_DETERMINISTIC
        | FunctionFlags::SQLITE_INNOCUOUS;

    conn.create_scalar_function(FUNCTION_NAME, 2, flags, |ctx| {
        let left = text_arg(ctx, 0);
        let right = text_arg(ctx, 1);
        Ok(match (left, right) {
            (Some(left), Some(right)) => Some(similarity(&left, &right)),
            _ => None,
        })
    })?;

    // Expression indexes on `fold(name)` need this on every connection that writes.
    conn.create_scalar_function(FOLD_FUNCTION_NAME, 1, flags, |ctx| {
        Ok(text_arg(ctx, 0).map(|text| fold(&text)))
    })
}

fn text_arg(ctx: &Context<'_>, idx: usize) -> Option<String> {
    match ctx.get_raw(idx) {
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}
