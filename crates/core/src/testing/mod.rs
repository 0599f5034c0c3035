//! Test doubles and fixtures for core components.

mod mock_source;

pub use mock_source::MockCardSource;

/// Builders for upstream records used across tests.
pub mod fixtures {
    use crate::upstream::{ScryfallCard, ScryfallSet};

    /// A physical expansion set.
    pub fn set(id: &str, code: &str, name: &str) -> ScryfallSet {
        serde_json::from_str(&format!(
            r#"{{
                "id": "{}",
                "code": "{}",
                "name": "{}",
                "released_at": "2018-04-27",
                "card_count": 3,
                "set_type": "expansion",
                "digital": false
            }}"#,
            id, code, name
        ))
        .unwrap()
    }

    /// A plain booster common.
    pub fn card(id: &str, name: &str, set_code: &str, set_id: &str) -> ScryfallCard {
        serde_json::from_str(&format!(
            r#"{{
                "id": "{}",
                "name": "{}",
                "set": "{}",
                "set_id": "{}",
                "rarity": "common",
                "collector_number": "{}",
                "type_line": "Creature - Elf",
                "oracle_text": "T: Add G.",
                "color_identity": ["G"],
                "released_at": "2018-04-27",
                "prices": {{"eur": "0.10"}}
            }}"#,
            id, name, set_code, set_id, id
        ))
        .unwrap()
    }
}
