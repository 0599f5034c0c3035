//! Extras classification.
//!
//! A printing is an "extra" when it cannot be pulled from a standard
//! randomized booster: promos, explicit variations, cosmetic frame
//! treatments, or anything flagged as not booster-available. This is the
//! only implementation of the rule; the sync path and any backfill tooling
//! must call it rather than re-deriving the flag.

use crate::upstream::ScryfallCard;

/// Frame treatments that mark a printing as an extra.
///
/// Full-art on its own is deliberately not in this list: basic lands are
/// commonly full-art in normal boosters.
pub const EXTRA_FRAME_EFFECTS: [&str; 8] = [
    "extendedart",
    "showcase",
    "borderless",
    "etched",
    "inverted",
    "shatteredglass",
    "textless",
    "fullartdfc",
];

/// Classify from the raw provenance flags.
pub fn is_extra_flags(promo: bool, variation: bool, frame_effects: &[String], booster: bool) -> bool {
    if promo || variation || !booster {
        return true;
    }

    frame_effects
        .iter()
        .any(|effect| EXTRA_FRAME_EFFECTS.contains(&effect.as_str()))
}

/// Classify an upstream card record.
pub fn compute_is_extra(card: &ScryfallCard) -> bool {
    is_extra_flags(
        card.promo,
        card.variation,
        &card.frame_effects,
        card.booster,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_card() -> ScryfallCard {
        serde_json::from_str(
            r#"{"id": "c1", "name": "Grizzly Bears", "set": "dom", "set_id": "s1"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_plain_booster_card_is_not_extra() {
        assert!(!compute_is_extra(&plain_card()));
    }

    #[test]
    fn test_promo_flag() {
        let mut card = plain_card();
        card.promo = true;
        assert!(compute_is_extra(&card));
    }

    #[test]
    fn test_variation_flag() {
        let mut card = plain_card();
        card.variation = true;
        assert!(compute_is_extra(&card));
    }

    #[test]
    fn test_non_booster_printing() {
        let mut card = plain_card();
        card.booster = false;
        assert!(compute_is_extra(&card));
    }

    #[test]
    fn test_cosmetic_frame_effects() {
        for effect in EXTRA_FRAME_EFFECTS {
            let mut card = plain_card();
            card.frame_effects = vec![effect.to_string()];
            assert!(compute_is_extra(&card), "{} should classify as extra", effect);
        }
    }

    #[test]
    fn test_unlisted_frame_effect_is_not_extra() {
        let mut card = plain_card();
        card.frame_effects = vec!["legendary".to_string()];
        assert!(!compute_is_extra(&card));
    }

    #[test]
    fn test_full_art_alone_is_not_extra() {
        // Full-art basics come out of normal boosters.
        let mut card = plain_card();
        card.full_art = true;
        assert!(!compute_is_extra(&card));
    }

    #[test]
    fn test_mixed_effects_with_one_match() {
        let mut card = plain_card();
        card.frame_effects = vec!["legendary".to_string(), "showcase".to_string()];
        assert!(compute_is_extra(&card));
    }
}
