//! Types for the local card catalog.
//!
//! Upstream records carry list/map fields as loosely typed JSON; this is
//! where they become typed domain values, parsed once at the storage
//! boundary instead of per filter predicate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::{ScryfallCard, ScryfallSet};

/// A mana color, plus `C` for colorless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
    C,
}

impl Color {
    /// Parse a single-letter color code, case-insensitive.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'W' => Some(Color::W),
            'U' => Some(Color::U),
            'B' => Some(Color::B),
            'R' => Some(Color::R),
            'G' => Some(Color::G),
            'C' => Some(Color::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::W => "W",
            Color::U => "U",
            Color::B => "B",
            Color::R => "R",
            Color::G => "G",
            Color::C => "C",
        }
    }

    /// Parse a list of upstream letter codes, dropping anything unknown.
    pub fn parse_list(letters: &[String]) -> Vec<Color> {
        letters
            .iter()
            .filter_map(|s| s.chars().next().and_then(Color::from_letter))
            .collect()
    }
}

/// Card rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Special,
    Bonus,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
            Rarity::Special => "special",
            Rarity::Bonus => "bonus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "mythic" => Some(Rarity::Mythic),
            "special" => Some(Rarity::Special),
            "bonus" => Some(Rarity::Bonus),
            _ => None,
        }
    }
}

/// A catalog set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardSet {
    /// Stable upstream identifier (upsert key).
    pub scryfall_id: String,
    /// Short code, upper-cased for display and lookups.
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<NaiveDate>,
    pub card_count: u32,
    /// Set type classification, used to exclude non-physical sets.
    pub set_type: String,
    pub digital: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_svg_uri: Option<String>,
}

impl From<ScryfallSet> for CardSet {
    fn from(raw: ScryfallSet) -> Self {
        Self {
            scryfall_id: raw.id,
            code: raw.code.to_uppercase(),
            name: raw.name,
            localized_name: raw.printed_name,
            released_at: raw
                .released_at
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            card_count: raw.card_count,
            set_type: raw.set_type,
            digital: raw.digital,
            icon_svg_uri: raw.icon_svg_uri,
        }
    }
}

/// Numeric EUR prices extracted for range queries, plus the raw bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardPrices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eur_foil: Option<f64>,
    /// Raw upstream price strings, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Parse one upstream price string. Malformed values are treated as
/// absent, never as an error.
pub fn parse_price(value: Option<&str>) -> Option<f64> {
    value.and_then(|s| s.trim().parse::<f64>().ok())
}

/// A single card printing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    /// Stable upstream identifier (upsert key).
    pub scryfall_id: String,
    /// Shared identifier linking all printings of the same card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_name: Option<String>,
    pub lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    pub cmc: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_type_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toughness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<String>,
    pub colors: Vec<Color>,
    pub color_identity: Vec<Color>,
    pub rarity: Rarity,
    pub collector_number: String,
    /// Stable identifier of the owning set.
    pub set_id: String,
    /// Upper-cased code of the owning set.
    pub set_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<serde_json::Value>,
    pub prices: CardPrices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legalities: Option<serde_json::Value>,
    // Provenance flags, kept only for classification.
    pub booster: bool,
    pub promo: bool,
    pub variation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    pub frame_effects: Vec<String>,
    pub promo_types: Vec<String>,
    /// Derived from the provenance flags on every write, never hand-edited.
    pub is_extra: bool,
}

impl Card {
    /// Type line preferred for display and matching: localized when
    /// present, else primary.
    pub fn display_type_line(&self) -> Option<&str> {
        self.printed_type_line
            .as_deref()
            .or(self.type_line.as_deref())
    }
}

impl From<ScryfallCard> for Card {
    fn from(raw: ScryfallCard) -> Self {
        let is_extra = crate::classifier::compute_is_extra(&raw);

        let eur = parse_price(raw.prices.get("eur").and_then(|p| p.as_deref()));
        let eur_foil = parse_price(raw.prices.get("eur_foil").and_then(|p| p.as_deref()));
        let raw_prices = if raw.prices.is_empty() {
            None
        } else {
            serde_json::to_value(&raw.prices).ok()
        };

        Self {
            scryfall_id: raw.id,
            oracle_id: raw.oracle_id,
            name: raw.name,
            printed_name: raw.printed_name,
            lang: raw.lang,
            released_at: raw
                .released_at
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            mana_cost: raw.mana_cost,
            cmc: raw.cmc,
            type_line: raw.type_line,
            printed_type_line: raw.printed_type_line,
            oracle_text: raw.oracle_text,
            printed_text: raw.printed_text,
            power: raw.power,
            toughness: raw.toughness,
            loyalty: raw.loyalty,
            colors: Color::parse_list(&raw.colors),
            color_identity: Color::parse_list(&raw.color_identity),
            rarity: Rarity::parse(&raw.rarity).unwrap_or(Rarity::Special),
            collector_number: raw.collector_number,
            set_id: raw.set_id,
            set_code: raw.set_code.to_uppercase(),
            image_uris: raw.image_uris,
            prices: CardPrices {
                eur,
                eur_foil,
                raw: raw_prices,
            },
            legalities: raw.legalities,
            booster: raw.booster,
            promo: raw.promo,
            variation: raw.variation,
            border_color: raw.border_color,
            frame_effects: raw.frame_effects,
            promo_types: raw.promo_types,
            is_extra,
        }
    }
}

/// Outcome of a single keyed upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// Record already present and `force` was not set.
    Skipped,
}

/// Localized fields of one printing, to be merged into the matching
/// local card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTranslation {
    pub set_code: String,
    pub collector_number: String,
    pub printed_name: Option<String>,
    pub printed_type_line: Option<String>,
    pub printed_text: Option<String>,
}

impl From<&ScryfallCard> for CardTranslation {
    fn from(raw: &ScryfallCard) -> Self {
        Self {
            set_code: raw.set_code.to_uppercase(),
            collector_number: raw.collector_number.clone(),
            printed_name: raw.printed_name.clone(),
            printed_type_line: raw.printed_type_line.clone(),
            printed_text: raw.printed_text.clone(),
        }
    }
}

/// Outcome of merging localized fields into an existing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    Updated,
    /// Localized fields already present and `force` was not set.
    Skipped,
    /// No local card matched the printing.
    NotFound,
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_sets: u64,
    pub total_cards: u64,
    pub extra_cards: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_release: Option<NaiveDate>,
}

/// Errors for catalog store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown set reference: {0}")]
    MissingSetReference(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_list_drops_unknown() {
        let letters = vec!["W".to_string(), "X".to_string(), "u".to_string()];
        assert_eq!(Color::parse_list(&letters), vec![Color::W, Color::U]);
    }

    #[test]
    fn test_rarity_round_trip() {
        for rarity in [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Mythic,
            Rarity::Special,
            Rarity::Bonus,
        ] {
            assert_eq!(Rarity::parse(rarity.as_str()), Some(rarity));
        }
        assert_eq!(Rarity::parse("land"), None);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some("1.50")), Some(1.5));
        assert_eq!(parse_price(Some(" 0.25 ")), Some(0.25));
        // Malformed values are treated as absent.
        assert_eq!(parse_price(Some("n/a")), None);
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(None), None);
    }

    #[test]
    fn test_set_conversion_uppercases_code() {
        let raw: ScryfallSet = serde_json::from_str(
            r#"{"id": "s1", "code": "dom", "name": "Dominaria", "released_at": "2018-04-27"}"#,
        )
        .unwrap();
        let set = CardSet::from(raw);
        assert_eq!(set.code, "DOM");
        assert_eq!(
            set.released_at,
            Some(NaiveDate::from_ymd_opt(2018, 4, 27).unwrap())
        );
    }

    #[test]
    fn test_card_conversion_extracts_prices_and_extra_flag() {
        let raw: ScryfallCard = serde_json::from_str(
            r#"{
                "id": "c1", "name": "Llanowar Elves", "set": "dom", "set_id": "s1",
                "rarity": "common", "color_identity": ["G"],
                "prices": {"eur": "0.10", "eur_foil": "broken", "usd": "0.15"},
                "promo": true
            }"#,
        )
        .unwrap();
        let card = Card::from(raw);
        assert_eq!(card.prices.eur, Some(0.10));
        assert_eq!(card.prices.eur_foil, None);
        assert!(card.prices.raw.is_some());
        assert_eq!(card.rarity, Rarity::Common);
        assert_eq!(card.color_identity, vec![Color::G]);
        assert_eq!(card.set_code, "DOM");
        assert!(card.is_extra);
    }

    #[test]
    fn test_unknown_rarity_falls_back_to_special() {
        let raw: ScryfallCard = serde_json::from_str(
            r#"{"id": "c1", "name": "Oddity", "set": "dom", "set_id": "s1", "rarity": "weird"}"#,
        )
        .unwrap();
        assert_eq!(Card::from(raw).rarity, Rarity::Special);
    }

    #[test]
    fn test_display_type_line_prefers_localized() {
        let raw: ScryfallCard = serde_json::from_str(
            r#"{
                "id": "c1", "name": "Serra Angel", "set": "dom", "set_id": "s1",
                "type_line": "Creature - Angel",
                "printed_type_line": "Kreatur - Engel"
            }"#,
        )
        .unwrap();
        let card = Card::from(raw);
        assert_eq!(card.display_type_line(), Some("Kreatur - Engel"));
    }
}
