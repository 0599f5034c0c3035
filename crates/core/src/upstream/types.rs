//! Types for upstream catalog API responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A set as returned by the upstream catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScryfallSet {
    /// Stable upstream identifier. Upserts key on this, never on `code`,
    /// because codes can be reassigned upstream.
    pub id: String,
    /// Short set code (e.g. "dom"). Unique but mutable upstream.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Localized display name, when the upstream provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed_name: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<String>,
    /// Declared number of cards in the set.
    #[serde(default)]
    pub card_count: u32,
    /// Set type classification (e.g. "expansion", "promo", "memorabilia").
    #[serde(default)]
    pub set_type: String,
    /// Whether the set exists only in digital form.
    #[serde(default)]
    pub digital: bool,
    /// Set icon URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_svg_uri: Option<String>,
}

/// A card printing as returned by the upstream catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScryfallCard {
    /// Stable upstream identifier, unique per printing.
    pub id: String,
    /// Identifier shared by every printing of the same named card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_id: Option<String>,
    /// Canonical (English) name.
    pub name: String,
    /// Localized name for non-English printings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed_name: Option<String>,
    /// Language code of this printing.
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Release date of the printing (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<String>,
    /// Mana cost string (e.g. "{1}{G}").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    /// Numeric mana value.
    #[serde(default)]
    pub cmc: f64,
    /// Type line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    /// Localized type line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed_type_line: Option<String>,
    /// Rules text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_text: Option<String>,
    /// Localized rules text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toughness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<String>,
    /// Colors of the card face.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Color identity (colors plus costs in rules text).
    #[serde(default)]
    pub color_identity: Vec<String>,
    /// Rarity string ("common", "uncommon", "rare", "mythic", ...).
    #[serde(default)]
    pub rarity: String,
    /// Collector number within the set (not always numeric).
    #[serde(default)]
    pub collector_number: String,
    /// Code of the owning set.
    #[serde(rename = "set")]
    pub set_code: String,
    /// Stable identifier of the owning set.
    pub set_id: String,
    /// Image URI bundle, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<serde_json::Value>,
    /// Price strings keyed by market ("eur", "eur_foil", "usd", ...).
    #[serde(default)]
    pub prices: HashMap<String, Option<String>>,
    /// Format legality map, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legalities: Option<serde_json::Value>,
    /// Whether this printing is obtainable in standard boosters.
    #[serde(default = "default_true")]
    pub booster: bool,
    /// Explicit promo flag.
    #[serde(default)]
    pub promo: bool,
    /// Explicit variation flag.
    #[serde(default)]
    pub variation: bool,
    /// Whether the art covers the full card face.
    #[serde(default)]
    pub full_art: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Cosmetic frame treatment tags.
    #[serde(default)]
    pub frame_effects: Vec<String>,
    /// Promo treatment tags.
    #[serde(default)]
    pub promo_types: Vec<String>,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

/// One page of card search results plus the continuation for the next.
#[derive(Debug, Clone, Default)]
pub struct CardPage {
    pub cards: Vec<ScryfallCard>,
    /// Opaque URL of the next page, `None` when the traversal is done.
    pub next_page: Option<String>,
    /// Total matching cards as reported by the upstream, when known.
    pub total_cards: Option<u64>,
}

/// A card search request against the upstream search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSearch {
    /// Set code to restrict to.
    pub set_code: String,
    /// Language filter (`lang:<code>`), when set.
    pub language: Option<String>,
}

impl CardSearch {
    pub fn for_set(set_code: impl Into<String>) -> Self {
        Self {
            set_code: set_code.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Render the upstream query string (e.g. `set:dom lang:de`).
    pub fn to_query(&self) -> String {
        match &self.language {
            Some(lang) => format!("set:{} lang:{}", self.set_code, lang),
            None => format!("set:{}", self.set_code),
        }
    }
}
