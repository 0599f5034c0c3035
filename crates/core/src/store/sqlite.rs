//! SQLite-backed card catalog implementation.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::warn;

use super::{
    Card, CardPrices, CardSet, CardStore, CardTranslation, CatalogStats, Color, Rarity,
    StoreError, TranslationOutcome, UpsertOutcome,
};
use crate::classifier::is_extra_flags;
use crate::config::SearchConfig;
use crate::search::{tokenize, CandidateStrategy, CardSearchQuery, SearchError, SearchText};

/// SQLite-backed card catalog.
///
/// The retrieval strategy is constructed once here, not chosen per query.
pub struct SqliteCardStore {
    conn: Mutex<Connection>,
    strategy: Box<dyn CandidateStrategy>,
    default_limit: u32,
    max_limit: u32,
    fts_enabled: bool,
}

impl SqliteCardStore {
    /// Create a new SQLite catalog, creating the database file and tables
    /// if needed.
    pub fn new(path: &Path, search: &SearchConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn, search)
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory(search: &SearchConfig) -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn, search)
    }

    fn with_connection(conn: Connection, search: &SearchConfig) -> Result<Self, StoreError> {
        Self::initialize_schema(&conn)?;
        let fts_enabled = Self::initialize_fts(&conn);

        Ok(Self {
            conn: Mutex::new(conn),
            strategy: crate::search::strategy_for(search.backend),
            default_limit: search.default_limit,
            max_limit: search.max_limit,
            fts_enabled,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sets (
                scryfall_id TEXT PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                localized_name TEXT,
                released_at TEXT,
                card_count INTEGER NOT NULL DEFAULT 0,
                set_type TEXT NOT NULL DEFAULT '',
                digital INTEGER NOT NULL DEFAULT 0,
                icon_svg_uri TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sets_released ON sets(released_at);

            CREATE TABLE IF NOT EXISTS cards (
                scryfall_id TEXT PRIMARY KEY,
                oracle_id TEXT,
                name TEXT NOT NULL,
                printed_name TEXT,
                lang TEXT NOT NULL DEFAULT 'en',
                released_at TEXT,
                mana_cost TEXT,
                cmc REAL NOT NULL DEFAULT 0,
                type_line TEXT,
                printed_type_line TEXT,
                oracle_text TEXT,
                printed_text TEXT,
                power TEXT,
                toughness TEXT,
                loyalty TEXT,
                colors TEXT NOT NULL DEFAULT '[]',
                color_identity TEXT NOT NULL DEFAULT '[]',
                rarity TEXT NOT NULL DEFAULT 'common',
                collector_number TEXT NOT NULL DEFAULT '',
                set_id TEXT NOT NULL REFERENCES sets(scryfall_id),
                set_code TEXT NOT NULL,
                image_uris TEXT,
                prices TEXT,
                price_eur REAL,
                price_eur_foil REAL,
                legalities TEXT,
                booster INTEGER NOT NULL DEFAULT 1,
                promo INTEGER NOT NULL DEFAULT 0,
                variation INTEGER NOT NULL DEFAULT 0,
                border_color TEXT,
                frame_effects TEXT NOT NULL DEFAULT '[]',
                promo_types TEXT NOT NULL DEFAULT '[]',
                is_extra INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cards_oracle ON cards(oracle_id);
            CREATE INDEX IF NOT EXISTS idx_cards_set_code ON cards(set_code);
            CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(name);
            CREATE INDEX IF NOT EXISTS idx_cards_price_eur ON cards(price_eur);
            CREATE INDEX IF NOT EXISTS idx_cards_set_collector ON cards(set_code, collector_number);

            -- Inverted index over the card text fields, maintained on
            -- every card write.
            CREATE TABLE IF NOT EXISTS card_tokens (
                token TEXT NOT NULL,
                card_id TEXT NOT NULL REFERENCES cards(scryfall_id) ON DELETE CASCADE,
                PRIMARY KEY (token, card_id)
            ) WITHOUT ROWID;

            CREATE INDEX IF NOT EXISTS idx_card_tokens_card ON card_tokens(card_id);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Create the FTS5 table. Some SQLite builds lack FTS5; the store
    /// still works then, search degrades to the substring fallback.
    fn initialize_fts(conn: &Connection) -> bool {
        let result = conn.execute_batch(
            "CREATE VIRTUAL TABLE IF NOT EXISTS card_fts USING fts5(
                card_id UNINDEXED,
                name,
                printed_name,
                type_line,
                printed_type_line,
                oracle_text,
                printed_text
            );",
        );

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("FTS5 unavailable, full-text search disabled: {}", e);
                false
            }
        }
    }

    /// Rewrite the search structures for one card.
    fn index_card(conn: &Connection, card: &Card, fts_enabled: bool) -> rusqlite::Result<()> {
        conn.execute(
            "DELETE FROM card_tokens WHERE card_id = ?",
            params![&card.scryfall_id],
        )?;

        let mut text = String::new();
        for field in [
            Some(card.name.as_str()),
            card.printed_name.as_deref(),
            card.type_line.as_deref(),
            card.printed_type_line.as_deref(),
            card.oracle_text.as_deref(),
            card.printed_text.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            text.push_str(field);
            text.push(' ');
        }

        for token in tokenize(&text) {
            conn.execute(
                "INSERT OR IGNORE INTO card_tokens (token, card_id) VALUES (?, ?)",
                params![&token, &card.scryfall_id],
            )?;
        }

        if fts_enabled {
            conn.execute(
                "DELETE FROM card_fts WHERE card_id = ?",
                params![&card.scryfall_id],
            )?;
            conn.execute(
                "INSERT INTO card_fts (card_id, name, printed_name, type_line, printed_type_line, oracle_text, printed_text)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    &card.scryfall_id,
                    &card.name,
                    &card.printed_name,
                    &card.type_line,
                    &card.printed_type_line,
                    &card.oracle_text,
                    &card.printed_text,
                ],
            )?;
        }

        Ok(())
    }

    fn row_to_set(row: &rusqlite::Row) -> rusqlite::Result<CardSet> {
        let released_at: Option<String> = row.get(4)?;

        Ok(CardSet {
            scryfall_id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            localized_name: row.get(3)?,
            released_at: released_at
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            card_count: row.get(5)?,
            set_type: row.get(6)?,
            digital: row.get(7)?,
            icon_svg_uri: row.get(8)?,
        })
    }

    const CARD_COLUMNS: &'static str = "scryfall_id, oracle_id, name, printed_name, lang, released_at, mana_cost, cmc, \
         type_line, printed_type_line, oracle_text, printed_text, power, toughness, loyalty, \
         colors, color_identity, rarity, collector_number, set_id, set_code, image_uris, \
         prices, price_eur, price_eur_foil, legalities, booster, promo, variation, \
         border_color, frame_effects, promo_types, is_extra";

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let released_at: Option<String> = row.get(5)?;
        let colors: String = row.get(15)?;
        let color_identity: String = row.get(16)?;
        let rarity: String = row.get(17)?;
        let image_uris: Option<String> = row.get(21)?;
        let prices_raw: Option<String> = row.get(22)?;
        let legalities: Option<String> = row.get(25)?;
        let frame_effects: String = row.get(30)?;
        let promo_types: String = row.get(31)?;

        Ok(Card {
            scryfall_id: row.get(0)?,
            oracle_id: row.get(1)?,
            name: row.get(2)?,
            printed_name: row.get(3)?,
            lang: row.get(4)?,
            released_at: released_at
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            mana_cost: row.get(6)?,
            cmc: row.get(7)?,
            type_line: row.get(8)?,
            printed_type_line: row.get(9)?,
            oracle_text: row.get(10)?,
            printed_text: row.get(11)?,
            power: row.get(12)?,
            toughness: row.get(13)?,
            loyalty: row.get(14)?,
            colors: parse_color_json(&colors),
            color_identity: parse_color_json(&color_identity),
            rarity: Rarity::parse(&rarity).unwrap_or(Rarity::Special),
            collector_number: row.get(18)?,
            set_id: row.get(19)?,
            set_code: row.get(20)?,
            image_uris: image_uris.as_deref().and_then(|s| serde_json::from_str(s).ok()),
            prices: CardPrices {
                eur: row.get(23)?,
                eur_foil: row.get(24)?,
                raw: prices_raw.as_deref().and_then(|s| serde_json::from_str(s).ok()),
            },
            legalities: legalities.as_deref().and_then(|s| serde_json::from_str(s).ok()),
            booster: row.get(26)?,
            promo: row.get(27)?,
            variation: row.get(28)?,
            border_color: row.get(29)?,
            frame_effects: parse_string_json(&frame_effects),
            promo_types: parse_string_json(&promo_types),
            is_extra: row.get(32)?,
        })
    }

    fn load_cards_ordered(
        conn: &Connection,
        ids: &[String],
    ) -> Result<Vec<Card>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM cards WHERE scryfall_id IN ({})",
            Self::CARD_COLUMNS,
            placeholders
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_card)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut by_id: HashMap<String, Card> = HashMap::new();
        for row in rows {
            let card = row.map_err(|e| StoreError::Database(e.to_string()))?;
            by_id.insert(card.scryfall_id.clone(), card);
        }

        // The IN fetch is unordered; reapply the requested order.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

fn parse_color_json(json: &str) -> Vec<Color> {
    let letters: Vec<String> = serde_json::from_str(json).unwrap_or_default();
    Color::parse_list(&letters)
}

fn parse_string_json(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn color_letters_json(colors: &[Color]) -> String {
    let letters: Vec<&str> = colors.iter().map(|c| c.as_str()).collect();
    serde_json::to_string(&letters).unwrap_or_else(|_| "[]".to_string())
}

fn json_or_null(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

impl CardStore for SqliteCardStore {
    fn upsert_set(&self, set: &CardSet, force: bool) -> Result<UpsertOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM sets WHERE scryfall_id = ?",
                params![&set.scryfall_id],
                |_| Ok(true),
            )
            .unwrap_or(false);

        if exists && !force {
            return Ok(UpsertOutcome::Skipped);
        }

        conn.execute(
            "INSERT INTO sets (scryfall_id, code, name, localized_name, released_at, card_count, set_type, digital, icon_svg_uri, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(scryfall_id) DO UPDATE SET
                code = excluded.code,
                name = excluded.name,
                localized_name = excluded.localized_name,
                released_at = excluded.released_at,
                card_count = excluded.card_count,
                set_type = excluded.set_type,
                digital = excluded.digital,
                icon_svg_uri = excluded.icon_svg_uri,
                updated_at = excluded.updated_at",
            params![
                &set.scryfall_id,
                &set.code,
                &set.name,
                &set.localized_name,
                set.released_at.map(|d| d.to_string()),
                set.card_count,
                &set.set_type,
                set.digital,
                &set.icon_svg_uri,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    fn upsert_card(&self, card: &Card, force: bool) -> Result<UpsertOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();

        let set_exists: bool = conn
            .query_row(
                "SELECT 1 FROM sets WHERE scryfall_id = ?",
                params![&card.set_id],
                |_| Ok(true),
            )
            .unwrap_or(false);

        if !set_exists {
            return Err(StoreError::MissingSetReference(card.set_code.clone()));
        }

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM cards WHERE scryfall_id = ?",
                params![&card.scryfall_id],
                |_| Ok(true),
            )
            .unwrap_or(false);

        if exists && !force {
            return Ok(UpsertOutcome::Skipped);
        }

        // The stored flag is always derived from the provenance flags,
        // never taken from the caller.
        let is_extra = is_extra_flags(
            card.promo,
            card.variation,
            &card.frame_effects,
            card.booster,
        );

        conn.execute(
            "INSERT INTO cards (scryfall_id, oracle_id, name, printed_name, lang, released_at, mana_cost, cmc,
                                type_line, printed_type_line, oracle_text, printed_text, power, toughness, loyalty,
                                colors, color_identity, rarity, collector_number, set_id, set_code, image_uris,
                                prices, price_eur, price_eur_foil, legalities, booster, promo, variation,
                                border_color, frame_effects, promo_types, is_extra, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(scryfall_id) DO UPDATE SET
                oracle_id = excluded.oracle_id,
                name = excluded.name,
                printed_name = excluded.printed_name,
                lang = excluded.lang,
                released_at = excluded.released_at,
                mana_cost = excluded.mana_cost,
                cmc = excluded.cmc,
                type_line = excluded.type_line,
                printed_type_line = excluded.printed_type_line,
                oracle_text = excluded.oracle_text,
                printed_text = excluded.printed_text,
                power = excluded.power,
                toughness = excluded.toughness,
                loyalty = excluded.loyalty,
                colors = excluded.colors,
                color_identity = excluded.color_identity,
                rarity = excluded.rarity,
                collector_number = excluded.collector_number,
                set_id = excluded.set_id,
                set_code = excluded.set_code,
                image_uris = excluded.image_uris,
                prices = excluded.prices,
                price_eur = excluded.price_eur,
                price_eur_foil = excluded.price_eur_foil,
                legalities = excluded.legalities,
                booster = excluded.booster,
                promo = excluded.promo,
                variation = excluded.variation,
                border_color = excluded.border_color,
                frame_effects = excluded.frame_effects,
                promo_types = excluded.promo_types,
                is_extra = excluded.is_extra,
                updated_at = excluded.updated_at",
            params![
                &card.scryfall_id,
                &card.oracle_id,
                &card.name,
                &card.printed_name,
                &card.lang,
                card.released_at.map(|d| d.to_string()),
                &card.mana_cost,
                card.cmc,
                &card.type_line,
                &card.printed_type_line,
                &card.oracle_text,
                &card.printed_text,
                &card.power,
                &card.toughness,
                &card.loyalty,
                color_letters_json(&card.colors),
                color_letters_json(&card.color_identity),
                card.rarity.as_str(),
                &card.collector_number,
                &card.set_id,
                &card.set_code,
                json_or_null(&card.image_uris),
                json_or_null(&card.prices.raw),
                card.prices.eur,
                card.prices.eur_foil,
                json_or_null(&card.legalities),
                card.booster,
                card.promo,
                card.variation,
                &card.border_color,
                serde_json::to_string(&card.frame_effects).unwrap_or_else(|_| "[]".to_string()),
                serde_json::to_string(&card.promo_types).unwrap_or_else(|_| "[]".to_string()),
                is_extra,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Self::index_card(&conn, card, self.fts_enabled)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    fn merge_translation(
        &self,
        translation: &CardTranslation,
        force: bool,
    ) -> Result<TranslationOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();

        let found: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT scryfall_id, printed_name FROM cards
                 WHERE set_code = ? AND collector_number = ?
                 LIMIT 1",
                params![&translation.set_code, &translation.collector_number],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .ok();

        let Some((card_id, existing_printed_name)) = found else {
            return Ok(TranslationOutcome::NotFound);
        };

        if existing_printed_name.is_some() && !force {
            return Ok(TranslationOutcome::Skipped);
        }

        conn.execute(
            "UPDATE cards SET printed_name = ?, printed_type_line = ?, printed_text = ?, updated_at = ?
             WHERE scryfall_id = ?",
            params![
                &translation.printed_name,
                &translation.printed_type_line,
                &translation.printed_text,
                chrono::Utc::now().to_rfc3339(),
                &card_id,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        // Localized fields feed the search structures; reindex the card.
        let sql = format!(
            "SELECT {} FROM cards WHERE scryfall_id = ?",
            Self::CARD_COLUMNS
        );
        let card = conn
            .query_row(&sql, params![&card_id], Self::row_to_card)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::index_card(&conn, &card, self.fts_enabled)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(TranslationOutcome::Updated)
    }

    fn get_set(&self, code: &str) -> Result<CardSet, StoreError> {
        let conn = self.conn.lock().unwrap();
        let code = code.to_uppercase();

        conn.query_row(
            "SELECT scryfall_id, code, name, localized_name, released_at, card_count, set_type, digital, icon_svg_uri
             FROM sets WHERE code = ?",
            params![&code],
            Self::row_to_set,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(code.clone()),
            _ => StoreError::Database(e.to_string()),
        })
    }

    fn list_sets(&self) -> Result<Vec<CardSet>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT scryfall_id, code, name, localized_name, released_at, card_count, set_type, digital, icon_svg_uri
                 FROM sets ORDER BY released_at DESC, code ASC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_set)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut sets = Vec::new();
        for row in rows {
            sets.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(sets)
    }

    fn set_ids(&self) -> Result<HashSet<String>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT scryfall_id FROM sets")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(ids)
    }

    fn get_card(&self, scryfall_id: &str) -> Result<Card, StoreError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {} FROM cards WHERE scryfall_id = ?",
            Self::CARD_COLUMNS
        );

        conn.query_row(&sql, params![scryfall_id], Self::row_to_card)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(scryfall_id.to_string())
                }
                _ => StoreError::Database(e.to_string()),
            })
    }

    fn cards_by_ids(&self, ids: &[String]) -> Result<Vec<Card>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::load_cards_ordered(&conn, ids)
    }

    fn search_card_ids(&self, query: &CardSearchQuery) -> Result<Vec<String>, SearchError> {
        let trimmed = query.query.trim();

        // Too-short queries are an expected input, not an error.
        if trimmed.chars().count() < crate::search::MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let limit = query
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit);
        let text = SearchText::new(trimmed);

        crate::metrics::SEARCH_QUERIES.inc();

        let conn = self.conn.lock().unwrap();
        let candidate_ids = self.strategy.candidates(&conn, &text, limit)?;

        let ids = if query.filters.is_empty() {
            candidate_ids
        } else {
            let cards = Self::load_cards_ordered(&conn, &candidate_ids)
                .map_err(|e| SearchError::Database(e.to_string()))?;

            cards
                .iter()
                .filter(|card| crate::search::matches_filters(card, &query.filters))
                .map(|card| card.scryfall_id.clone())
                .take(limit as usize)
                .collect()
        };

        crate::metrics::SEARCH_RESULTS.observe(ids.len() as f64);

        Ok(ids)
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        let conn = self.conn.lock().unwrap();

        let total_sets: u64 = conn
            .query_row("SELECT COUNT(*) FROM sets", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let total_cards: u64 = conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let extra_cards: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM cards WHERE is_extra = 1",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let newest_release: Option<NaiveDate> = conn
            .query_row("SELECT MAX(released_at) FROM sets", [], |row| {
                let s: Option<String> = row.get(0)?;
                Ok(s)
            })
            .map_err(|e| StoreError::Database(e.to_string()))?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());

        Ok(CatalogStats {
            total_sets,
            total_cards,
            extra_cards,
            newest_release,
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "DELETE FROM card_tokens;
             DELETE FROM cards;
             DELETE FROM sets;",
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if self.fts_enabled {
            conn.execute_batch("DELETE FROM card_fts;")
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        Ok(())
    }
}
