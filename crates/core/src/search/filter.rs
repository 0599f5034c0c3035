//! In-process post-filter.
//!
//! Applied to candidate rows after either retrieval strategy, because not
//! every predicate pushes down to every strategy. The filter only drops
//! rows; candidate order is preserved.

use crate::store::{Card, Color};

use super::CardFilters;

/// Whether a card satisfies every supplied filter.
pub fn matches_filters(card: &Card, filters: &CardFilters) -> bool {
    if let Some(extras) = filters.extras {
        if card.is_extra != extras {
            return false;
        }
    }

    if let Some(rarity) = filters.rarity {
        if card.rarity != rarity {
            return false;
        }
    }

    if filters.price_min.is_some() || filters.price_max.is_some() {
        // A missing price fails any bound that is set.
        let Some(eur) = card.prices.eur else {
            return false;
        };
        if let Some(min) = filters.price_min {
            if eur < min {
                return false;
            }
        }
        if let Some(max) = filters.price_max {
            if eur > max {
                return false;
            }
        }
    }

    if let Some(ref fragment) = filters.type_contains {
        let type_line = card.display_type_line().unwrap_or("").to_lowercase();
        if !type_line.contains(&fragment.to_lowercase()) {
            return false;
        }
    }

    if let Some(ref colors) = filters.colors {
        // AND semantics: every requested color must be satisfied.
        // Requested C matches an empty identity or an explicit C.
        for color in colors {
            let satisfied = match color {
                Color::C => {
                    card.color_identity.is_empty() || card.color_identity.contains(&Color::C)
                }
                other => card.color_identity.contains(other),
            };
            if !satisfied {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CardPrices, Rarity};

    fn test_card() -> Card {
        let raw: crate::upstream::ScryfallCard = serde_json::from_str(
            r#"{
                "id": "c1", "name": "Serra Angel", "set": "dom", "set_id": "s1",
                "rarity": "uncommon",
                "type_line": "Creature - Angel",
                "printed_type_line": "Kreatur - Engel",
                "color_identity": ["W"],
                "prices": {"eur": "0.25"}
            }"#,
        )
        .unwrap();
        Card::from(raw)
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert!(matches_filters(&test_card(), &CardFilters::default()));
    }

    #[test]
    fn test_rarity_filter() {
        let card = test_card();
        let mut filters = CardFilters {
            rarity: Some(Rarity::Uncommon),
            ..Default::default()
        };
        assert!(matches_filters(&card, &filters));

        filters.rarity = Some(Rarity::Rare);
        assert!(!matches_filters(&card, &filters));
    }

    #[test]
    fn test_extras_filter() {
        let mut card = test_card();
        let filters = CardFilters {
            extras: Some(true),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &filters));

        card.is_extra = true;
        assert!(matches_filters(&card, &filters));

        let filters = CardFilters {
            extras: Some(false),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &filters));
    }

    #[test]
    fn test_price_range() {
        let card = test_card(); // eur = 0.25
        let in_range = CardFilters {
            price_min: Some(0.10),
            price_max: Some(0.50),
            ..Default::default()
        };
        assert!(matches_filters(&card, &in_range));

        let below = CardFilters {
            price_min: Some(0.50),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &below));

        let above = CardFilters {
            price_max: Some(0.10),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &above));
    }

    #[test]
    fn test_missing_price_fails_set_bounds() {
        let mut card = test_card();
        card.prices = CardPrices::default();

        let filters = CardFilters {
            price_min: Some(0.01),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &filters));

        // No bounds set: missing price is fine.
        assert!(matches_filters(&card, &CardFilters::default()));
    }

    #[test]
    fn test_type_contains_prefers_localized() {
        let card = test_card();
        let localized = CardFilters {
            type_contains: Some("engel".to_string()),
            ..Default::default()
        };
        assert!(matches_filters(&card, &localized));

        // Primary type line is shadowed by the localized one.
        let primary = CardFilters {
            type_contains: Some("angel".to_string()),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &primary));
    }

    #[test]
    fn test_type_contains_falls_back_to_primary() {
        let mut card = test_card();
        card.printed_type_line = None;
        let filters = CardFilters {
            type_contains: Some("ANGEL".to_string()),
            ..Default::default()
        };
        assert!(matches_filters(&card, &filters));
    }

    #[test]
    fn test_colorless_request_matches_empty_identity() {
        let mut card = test_card();
        card.color_identity = vec![];

        let colorless = CardFilters {
            colors: Some(vec![Color::C]),
            ..Default::default()
        };
        assert!(matches_filters(&card, &colorless));

        let white = CardFilters {
            colors: Some(vec![Color::W]),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &white));
    }

    #[test]
    fn test_color_and_semantics() {
        let mut card = test_card();
        card.color_identity = vec![Color::W, Color::U];

        let single = CardFilters {
            colors: Some(vec![Color::W]),
            ..Default::default()
        };
        assert!(matches_filters(&card, &single));

        let both = CardFilters {
            colors: Some(vec![Color::W, Color::U]),
            ..Default::default()
        };
        assert!(matches_filters(&card, &both));

        let mismatch = CardFilters {
            colors: Some(vec![Color::W, Color::B]),
            ..Default::default()
        };
        assert!(!matches_filters(&card, &mismatch));
    }

    #[test]
    fn test_explicit_colorless_identity() {
        let mut card = test_card();
        card.color_identity = vec![Color::C];

        let colorless = CardFilters {
            colors: Some(vec![Color::C]),
            ..Default::default()
        };
        assert!(matches_filters(&card, &colorless));
    }
}
