//! Candidate retrieval strategies.
//!
//! One strategy object is constructed at startup and used for every
//! query. The full-text strategy ranks exact and prefix name matches
//! above plain full-text hits; the token-index strategy matches tokens
//! only and carries no ranking tiers. Both degrade to plain substring
//! containment if their index table is missing, rather than failing the
//! query.

use rusqlite::Connection;
use tracing::warn;

use super::text::SearchText;
use super::{SearchBackend, SearchError};

/// A candidate retrieval strategy.
///
/// Returns card identifiers in strategy order; the caller applies the
/// post-filter on top without re-sorting.
pub trait CandidateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn candidates(
        &self,
        conn: &Connection,
        text: &SearchText,
        limit: u32,
    ) -> Result<Vec<String>, SearchError>;
}

/// Select the strategy for the configured backend.
pub fn strategy_for(backend: SearchBackend) -> Box<dyn CandidateStrategy> {
    match backend {
        SearchBackend::FullText => Box::new(FullTextStrategy),
        SearchBackend::TokenIndex => Box::new(TokenIndexStrategy),
    }
}

/// FTS5-backed retrieval with ranking tiers: exact primary name, exact
/// localized name, prefix on either, then full-text match recency.
pub struct FullTextStrategy;

impl CandidateStrategy for FullTextStrategy {
    fn name(&self) -> &'static str {
        "full_text"
    }

    fn candidates(
        &self,
        conn: &Connection,
        text: &SearchText,
        limit: u32,
    ) -> Result<Vec<String>, SearchError> {
        if text.terms.is_empty() {
            return Ok(Vec::new());
        }

        let result = ranked_fts_candidates(conn, text, limit);

        match result {
            Ok(ids) => Ok(ids),
            Err(e) if is_missing_index(&e) => {
                // The full-text table can be absent when the SQLite build
                // lacks FTS5. Degrade to substring containment instead of
                // surfacing an error to the caller.
                warn!("Full-text index unavailable, falling back to substring search");
                crate::metrics::SEARCH_FALLBACKS.inc();
                like_candidates(conn, text, limit)
            }
            Err(e) => Err(SearchError::Database(e.to_string())),
        }
    }
}

fn ranked_fts_candidates(
    conn: &Connection,
    text: &SearchText,
    limit: u32,
) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT c.scryfall_id
         FROM card_fts
         JOIN cards c ON c.scryfall_id = card_fts.card_id
         WHERE card_fts MATCH ?1
         ORDER BY (lower(c.name) = ?2) DESC,
                  (lower(coalesce(c.printed_name, '')) = ?2) DESC,
                  (lower(c.name) LIKE ?3) DESC,
                  (lower(coalesce(c.printed_name, '')) LIKE ?3) DESC,
                  c.released_at DESC
         LIMIT ?4",
    )?;

    let rows = stmt.query_map(
        rusqlite::params![
            text.fts_match_expr(),
            text.lower,
            text.prefix_pattern(),
            limit,
        ],
        |row| row.get::<_, String>(0),
    )?;

    rows.collect()
}

/// Inverted-index retrieval: every query token must be present.
///
/// No ranking tiers; ordering by identifier keeps repeated queries
/// deterministic.
pub struct TokenIndexStrategy;

impl CandidateStrategy for TokenIndexStrategy {
    fn name(&self) -> &'static str {
        "token_index"
    }

    fn candidates(
        &self,
        conn: &Connection,
        text: &SearchText,
        limit: u32,
    ) -> Result<Vec<String>, SearchError> {
        if text.terms.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; text.terms.len()].join(", ");
        let sql = format!(
            "SELECT c.scryfall_id
             FROM cards c
             JOIN card_tokens t ON t.card_id = c.scryfall_id
             WHERE t.token IN ({})
             GROUP BY c.scryfall_id
             HAVING COUNT(DISTINCT t.token) = ?
             ORDER BY c.scryfall_id
             LIMIT ?",
            placeholders
        );

        let result = (|| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;

            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            for term in &text.terms {
                params.push(Box::new(term.clone()));
            }
            params.push(Box::new(text.terms.len() as i64));
            params.push(Box::new(limit));

            let param_refs: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();

            let rows = stmt.query_map(param_refs.as_slice(), |row| row.get::<_, String>(0))?;
            rows.collect()
        })();

        match result {
            Ok(ids) => Ok(ids),
            Err(e) if is_missing_index(&e) => {
                warn!("Token index unavailable, falling back to substring search");
                crate::metrics::SEARCH_FALLBACKS.inc();
                like_candidates(conn, text, limit)
            }
            Err(e) => Err(SearchError::Database(e.to_string())),
        }
    }
}

/// Substring containment fallback over the text fields, ordered by
/// release date descending then collector number ascending.
fn like_candidates(
    conn: &Connection,
    text: &SearchText,
    limit: u32,
) -> Result<Vec<String>, SearchError> {
    let mut stmt = conn
        .prepare(
            "SELECT scryfall_id FROM cards
             WHERE lower(name) LIKE ?1
                OR lower(coalesce(printed_name, '')) LIKE ?1
                OR lower(coalesce(type_line, '')) LIKE ?1
                OR lower(coalesce(printed_type_line, '')) LIKE ?1
                OR lower(coalesce(oracle_text, '')) LIKE ?1
             ORDER BY released_at DESC, collector_number ASC
             LIMIT ?2",
        )
        .map_err(|e| SearchError::Database(e.to_string()))?;

    let rows = stmt
        .query_map(
            rusqlite::params![text.contains_pattern(), limit],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| SearchError::Database(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| SearchError::Database(e.to_string()))
}

/// Match the specific "missing table" failure that triggers the fallback.
/// Anything else still propagates.
fn is_missing_index(err: &rusqlite::Error) -> bool {
    err.to_string().contains("no such table")
}
