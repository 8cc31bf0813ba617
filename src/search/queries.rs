//! Query Planning
//!
//! Translates a [`SearchRequest`] into exactly one parameterized statement
//! against the record store. Every plan binds the caller's text and the limit as
//! parameters; the SQL text itself is a constant per strategy.
//!
//! ## Ordering
//! | strategy    | primary key                     | tie-break |
//! |-------------|---------------------------------|-----------|
//! | `prefix`    | `fold(name)` ascending          | `id`      |
//! | `substring` | `similarity(name, q)` desc      | `id`      |
//! | `fulltext`  | `-bm25` relevance desc          | `id`      |
//! | `fuzzy`     | prefix flag desc, similarity desc | `id`    |

use super::tokenizer::{fulltext_match_expression, normalize_search_text};
use super::types::{SearchRequest, Strategy};
use crate::store::rows::collect_rows;
use crate::store::trigram::fold;
use crate::store::types::ResultSet;

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

/// Record columns returned by every strategy. `search_name` is internal.
macro_rules! record_columns {
    () => {
        "id, sku_id, name, manufacturer_name, marketer_name, type, price, \
         pack_size_label, short_composition, is_discontinued, available, slug, image_url"
    };
}

const PREFIX_SQL: &str = concat!(
    "SELECT ",
    record_columns!(),
    r#"
    FROM medicines
    WHERE fold(name) LIKE ?1 ESCAPE '\'
    ORDER BY fold(name) ASC, id ASC
    LIMIT ?2"#
);

const SUBSTRING_SQL: &str = concat!(
    "SELECT ",
    record_columns!(),
    r#", similarity(name, ?1) AS sim
    FROM medicines
    WHERE instr(fold(name), ?2) > 0
    ORDER BY sim DESC, id ASC
    LIMIT ?3"#
);

const FULLTEXT_SQL: &str = concat!(
    "SELECT ",
    record_columns!(),
    r#", relevance
    FROM medicines
    JOIN (
        SELECT rowid AS hit_rowid, -bm25(medicines_fts) AS relevance
        FROM medicines_fts
        WHERE medicines_fts MATCH ?1
    ) ON medicines.rowid = hit_rowid
    ORDER BY relevance DESC, id ASC
    LIMIT ?2"#
);

const FUZZY_SQL: &str = concat!(
    "SELECT ",
    record_columns!(),
    ", sim, prefix_match FROM (SELECT ",
    record_columns!(),
    r#",
        similarity(search_name, ?1) AS sim,
        CASE WHEN search_name LIKE ?2 ESCAPE '\' THEN 1 ELSE 0 END AS prefix_match
      FROM medicines
    )
    WHERE sim > ?3
    ORDER BY prefix_match DESC, sim DESC, id ASC
    LIMIT ?4"#
);

/// A ready-to-run statement and its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub strategy: Strategy,
    pub sql: &'static str,
    pub params: Vec<Value>,
}

impl QueryPlan {
    /// Builds the plan for `request`.
    ///
    /// Returns `None` when the request can match nothing, i.e. a full-text query
    /// made only of stopwords and punctuation. Such requests never reach the store.
    pub fn build(request: &SearchRequest, fuzzy_threshold: f64) -> Option<Self> {
        let limit = Value::Integer(request.limit);

        let (sql, params) = match request.strategy {
            Strategy::Prefix => {
                let pattern = format!("{}%", escape_like(&fold(&request.text)));
                (PREFIX_SQL, vec![Value::Text(pattern), limit])
            }
            Strategy::Substring => (
                SUBSTRING_SQL,
                vec![
                    Value::Text(request.text.clone()),
                    Value::Text(fold(&request.text)),
                    limit,
                ],
            ),
            Strategy::Fulltext => {
                let expression = fulltext_match_expression(&request.text)?;
                (FULLTEXT_SQL, vec![Value::Text(expression), limit])
            }
            Strategy::Fuzzy => {
                let normalized = normalize_search_text(&request.text);
                let pattern = format!("{}%", escape_like(&normalized));
                (
                    FUZZY_SQL,
                    vec![
                        Value::Text(normalized),
                        Value::Text(pattern),
                        Value::Real(fuzzy_threshold),
                        limit,
                    ],
                )
            }
        };

        Some(Self {
            strategy: request.strategy,
            sql,
            params,
        })
    }

    pub fn execute(&self, conn: &Connection) -> rusqlite::Result<ResultSet> {
        let mut stmt = conn.prepare_cached(self.sql)?;
        collect_rows(&mut stmt, params_from_iter(self.params.iter()))
    }
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
