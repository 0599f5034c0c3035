//! End-to-end sync runs against a mock upstream and in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use binder_core::testing::{fixtures, MockCardSource};
use binder_core::{
    is_extra_flags, CardSearchQuery, CardStore, SearchConfig, SqliteCardStore,
    SqliteSyncRunStore, SyncConfig, SyncError, SyncRequest, SyncRunStore, SyncRunner, SyncStatus,
    SyncTrigger, SyncType, UpstreamError,
};

struct Harness {
    source: Arc<MockCardSource>,
    store: Arc<SqliteCardStore>,
    ledger: Arc<SqliteSyncRunStore>,
    runner: SyncRunner,
}

fn harness() -> Harness {
    harness_with_config(SyncConfig {
        batch_pause_ms: 0,
        ..SyncConfig::default()
    })
}

fn harness_with_config(config: SyncConfig) -> Harness {
    let source = Arc::new(MockCardSource::new());
    let store = Arc::new(SqliteCardStore::in_memory(&SearchConfig::default()).unwrap());
    let ledger = Arc::new(SqliteSyncRunStore::in_memory().unwrap());

    let runner = SyncRunner::new(
        config,
        Arc::clone(&source) as Arc<dyn binder_core::CardSource>,
        Arc::clone(&store) as Arc<dyn CardStore>,
        Arc::clone(&ledger) as Arc<dyn SyncRunStore>,
    );

    Harness {
        source,
        store,
        ledger,
        runner,
    }
}

/// One set with three cards, one of them a promo.
fn seed_dominaria(source: &MockCardSource) {
    source.set_sets(vec![fixtures::set("s1", "dom", "Dominaria")]);

    let mut promo = fixtures::card("c3", "Promo Elf", "dom", "s1");
    promo.promo = true;

    source.set_cards(
        "set:dom",
        vec![
            fixtures::card("c1", "Llanowar Elves", "dom", "s1"),
            fixtures::card("c2", "Llanowar Tribe", "dom", "s1"),
            promo,
        ],
    );
}

#[tokio::test]
async fn test_full_sync_end_to_end() {
    let h = harness();
    seed_dominaria(&h.source);

    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Full))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].sync_type, SyncType::Sets);
    assert_eq!(outcomes[1].sync_type, SyncType::Cards);
    assert_eq!(outcomes[1].report.created, 3);

    let stats = h.store.stats().unwrap();
    assert_eq!(stats.total_sets, 1);
    assert_eq!(stats.total_cards, 3);
    assert_eq!(stats.extra_cards, 1);

    // Ledger rows: one per phase, both successful, with processed counts.
    let cards_run = h.ledger.latest(SyncType::Cards).unwrap().unwrap();
    assert_eq!(cards_run.status, SyncStatus::Success);
    assert_eq!(cards_run.records_processed, 3);
    assert!(cards_run.finished_at.is_some());

    let sets_run = h.ledger.latest(SyncType::Sets).unwrap().unwrap();
    assert_eq!(sets_run.status, SyncStatus::Success);
    assert_eq!(sets_run.records_processed, 1);
}

#[tokio::test]
async fn test_classifier_never_stale_after_sync() {
    let h = harness();
    seed_dominaria(&h.source);

    h.runner
        .run(&SyncRequest::new(SyncTrigger::Full))
        .await
        .unwrap();

    for id in ["c1", "c2", "c3"] {
        let card = h.store.get_card(id).unwrap();
        assert_eq!(
            card.is_extra,
            is_extra_flags(card.promo, card.variation, &card.frame_effects, card.booster),
        );
    }
}

#[tokio::test]
async fn test_resync_is_idempotent() {
    let h = harness();
    seed_dominaria(&h.source);

    h.runner
        .run(&SyncRequest::new(SyncTrigger::Full))
        .await
        .unwrap();
    let before: Vec<_> = ["c1", "c2", "c3"]
        .iter()
        .map(|id| h.store.get_card(id).unwrap())
        .collect();

    // Without force everything is skipped.
    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Cards))
        .await
        .unwrap();
    assert_eq!(outcomes[0].report.skipped, 3);
    assert_eq!(outcomes[0].report.created, 0);

    // With force everything is rewritten to an identical state.
    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Cards).with_force(true))
        .await
        .unwrap();
    assert_eq!(outcomes[0].report.updated, 3);

    let after: Vec<_> = ["c1", "c2", "c3"]
        .iter()
        .map(|id| h.store.get_card(id).unwrap())
        .collect();
    assert_eq!(before, after);
    assert_eq!(h.store.stats().unwrap().total_cards, 3);
}

#[tokio::test]
async fn test_card_with_unknown_set_is_skipped() {
    let h = harness();
    seed_dominaria(&h.source);
    h.source.set_cards(
        "set:dom",
        vec![
            fixtures::card("c1", "Llanowar Elves", "dom", "s1"),
            fixtures::card("c9", "Lost Card", "xyz", "unknown-set"),
        ],
    );

    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Full))
        .await
        .unwrap();

    // The run continues and succeeds; the orphan is counted as skipped.
    let report = &outcomes[1].report;
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        h.ledger.latest(SyncType::Cards).unwrap().unwrap().status,
        SyncStatus::Success
    );
    assert_eq!(h.store.stats().unwrap().total_cards, 1);
}

#[tokio::test]
async fn test_concurrent_sync_fails_fast() {
    let h = harness();
    seed_dominaria(&h.source);
    h.runner
        .run(&SyncRequest::new(SyncTrigger::Sets))
        .await
        .unwrap();

    // Slow the mock down so the two runs overlap.
    h.source.set_delay(Duration::from_millis(100));

    let request = SyncRequest::new(SyncTrigger::Cards);
    let (first, second) = tokio::join!(h.runner.run(&request), h.runner.run(&request));

    let results = [first, second];
    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    let busy_count = results
        .iter()
        .filter(|r| matches!(r, Err(SyncError::AlreadyRunning(SyncType::Cards))))
        .count();

    assert_eq!(ok_count, 1);
    assert_eq!(busy_count, 1);

    // Exactly one RUNNING -> terminal sequence was recorded.
    let runs = h
        .ledger
        .query(&binder_core::SyncRunFilter::new().with_type(SyncType::Cards))
        .unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, SyncStatus::Success);
}

#[tokio::test]
async fn test_stale_running_record_is_swept() {
    // Zero staleness: any RUNNING row is already stale.
    let h = harness_with_config(SyncConfig {
        staleness_timeout_mins: 0,
        batch_pause_ms: 0,
        ..SyncConfig::default()
    });
    seed_dominaria(&h.source);
    h.runner
        .run(&SyncRequest::new(SyncTrigger::Sets))
        .await
        .unwrap();

    // A crashed run left a RUNNING row behind.
    let abandoned = h.ledger.create(SyncType::Cards).unwrap();

    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Cards))
        .await
        .unwrap();
    assert_eq!(outcomes[0].report.created, 3);

    // The abandoned row was force-failed before the new run started.
    let runs = h
        .ledger
        .query(&binder_core::SyncRunFilter::new().with_type(SyncType::Cards))
        .unwrap();
    assert_eq!(runs.len(), 2);
    let swept = runs.iter().find(|r| r.id == abandoned.id).unwrap();
    assert_eq!(swept.status, SyncStatus::Failed);
    assert!(swept.message.as_deref().unwrap().contains("Timed out"));
}

#[tokio::test]
async fn test_young_running_record_blocks_new_run() {
    let h = harness(); // default 30 minute staleness
    seed_dominaria(&h.source);
    h.runner
        .run(&SyncRequest::new(SyncTrigger::Sets))
        .await
        .unwrap();

    // Another process holds a fresh RUNNING row.
    h.ledger.create(SyncType::Cards).unwrap();

    let result = h.runner.run(&SyncRequest::new(SyncTrigger::Cards)).await;
    assert!(matches!(
        result,
        Err(SyncError::AlreadyRunning(SyncType::Cards))
    ));
}

#[tokio::test]
async fn test_upstream_failure_marks_run_failed() {
    let h = harness();
    seed_dominaria(&h.source);
    h.source
        .fail_next(UpstreamError::RateLimitExceeded { attempts: 5 });

    let result = h.runner.run(&SyncRequest::new(SyncTrigger::Sets)).await;
    assert!(matches!(result, Err(SyncError::Upstream(_))));

    let run = h.ledger.latest(SyncType::Sets).unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Failed);
    assert!(run.message.as_deref().unwrap().contains("rate limit"));

    // The in-process flag was released; the next run succeeds.
    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Sets))
        .await
        .unwrap();
    assert_eq!(outcomes[0].status, SyncStatus::Success);
}

#[tokio::test]
async fn test_full_sync_aborts_after_sets_failure() {
    let h = harness();
    seed_dominaria(&h.source);
    h.source.fail_next(UpstreamError::Unavailable {
        attempts: 5,
        message: "HTTP 503".to_string(),
    });

    let result = h.runner.run(&SyncRequest::new(SyncTrigger::Full)).await;
    assert!(result.is_err());

    // The cards phase never started.
    assert!(h.ledger.latest(SyncType::Cards).unwrap().is_none());
}

#[tokio::test]
async fn test_single_set_sync() {
    let h = harness();
    h.source.set_sets(vec![
        fixtures::set("s1", "dom", "Dominaria"),
        fixtures::set("s2", "grn", "Guilds of Ravnica"),
    ]);
    h.source.set_cards(
        "set:dom",
        vec![fixtures::card("c1", "Llanowar Elves", "dom", "s1")],
    );
    h.source.set_cards(
        "set:grn",
        vec![fixtures::card("c2", "Guildgate", "grn", "s2")],
    );

    h.runner
        .run(&SyncRequest::new(SyncTrigger::Sets))
        .await
        .unwrap();
    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Cards).with_set_code("dom"))
        .await
        .unwrap();

    assert_eq!(outcomes[0].report.created, 1);
    assert!(h.store.get_card("c1").is_ok());
    assert!(h.store.get_card("c2").is_err());

    let result = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Cards).with_set_code("nope"))
        .await;
    assert!(matches!(result, Err(SyncError::UnknownSet(_))));
}

#[tokio::test]
async fn test_paginated_card_sync() {
    let h = harness();
    h.source.set_sets(vec![fixtures::set("s1", "dom", "Dominaria")]);
    let cards: Vec<_> = (0..7)
        .map(|i| fixtures::card(&format!("c{}", i), &format!("Card {}", i), "dom", "s1"))
        .collect();
    h.source.set_cards("set:dom", cards);
    h.source.set_page_size(3);

    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Full))
        .await
        .unwrap();

    assert_eq!(outcomes[1].report.created, 7);
    assert_eq!(h.store.stats().unwrap().total_cards, 7);

    // Three pages were fetched for the cards phase.
    let card_fetches = h
        .source
        .recorded_queries()
        .iter()
        .filter(|q| q.as_str() == "set:dom")
        .count();
    assert_eq!(card_fetches, 3);
}

#[tokio::test]
async fn test_translation_backfill() {
    let h = harness();
    seed_dominaria(&h.source);
    h.runner
        .run(&SyncRequest::new(SyncTrigger::Full))
        .await
        .unwrap();

    let mut localized = fixtures::card("c1-de", "Llanowar Elves", "dom", "s1");
    localized.printed_name = Some("Llanowarelfen".to_string());
    localized.printed_type_line = Some("Kreatur - Elf, Druide".to_string());
    localized.lang = "de".to_string();
    localized.collector_number = "c1".to_string(); // matches the en printing
    h.source.set_cards("set:dom lang:de", vec![localized]);

    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Translations).with_language("de"))
        .await
        .unwrap();
    assert_eq!(outcomes[0].sync_type, SyncType::Translations);
    assert_eq!(outcomes[0].report.updated, 1);

    let card = h.store.get_card("c1").unwrap();
    assert_eq!(card.printed_name.as_deref(), Some("Llanowarelfen"));

    // Localized names are searchable after the backfill.
    let ids = h
        .store
        .search_card_ids(&CardSearchQuery::new("Llanowarelfen"))
        .unwrap();
    assert_eq!(ids, vec!["c1".to_string()]);

    // Re-running skips cards that already carry translations.
    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Translations).with_language("de"))
        .await
        .unwrap();
    assert_eq!(outcomes[0].report.updated, 0);
    assert!(outcomes[0].report.skipped >= 1);
}

#[tokio::test]
async fn test_translations_require_language() {
    let h = harness();
    let result = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Translations))
        .await;
    assert!(matches!(result, Err(SyncError::MissingLanguage)));
}

#[tokio::test]
async fn test_digital_sets_are_excluded() {
    let h = harness();
    let mut digital = fixtures::set("s2", "mtga", "Arena Only");
    digital.digital = true;
    h.source
        .set_sets(vec![fixtures::set("s1", "dom", "Dominaria"), digital]);

    let outcomes = h
        .runner
        .run(&SyncRequest::new(SyncTrigger::Sets))
        .await
        .unwrap();
    assert_eq!(outcomes[0].report.created, 1);
    assert!(h.store.get_set("mtga").is_err());
}
