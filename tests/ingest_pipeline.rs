//! Catalog pagination and detail-stage behavior against a fake provider.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use alpaca::error::PipelineError;
use alpaca::ingest::{DetailFetcher, HotelCatalogFetcher};
use alpaca::models::{Hotel, RatingSource};
use alpaca::pipeline::Pipeline;
use alpaca::repository::DbContext;
use alpaca::upstream::{HotelApi, PageRequest, PaginationStyle, StageToken, TokenProvider};

use common::{
    fast_config, temp_db, FakeHotelApi, FixtureStyle, RejectingTokens, ScriptedLlm, StaticTokens,
};

async fn stage_token() -> StageToken {
    StageToken::acquire(StaticTokens::new()).await.unwrap()
}

async fn seed(ctx: &DbContext, ids: &[&str]) {
    for id in ids {
        ctx.hotels()
            .upsert(&Hotel::new(*id, "amadeus", format!("Hotel {id}")))
            .await
            .unwrap();
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_catalog_follows_next_links_to_the_end() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![50, 50, 7]));
    let fetcher = HotelCatalogFetcher::new(
        api.clone(),
        ctx.hotels(),
        PaginationStyle::NextLink,
        50,
        Duration::ZERO,
    );

    let summary = fetcher
        .fetch_all(&CancellationToken::new(), "AUS", &stage_token().await)
        .await
        .unwrap();

    assert_eq!(summary.fetched(), 107);
    assert_eq!(summary.upserted, 107);
    assert_eq!(summary.pages, 3);
    assert_eq!(api.catalog_request_count(), 3);
    assert_eq!(ctx.hotels().count().await.unwrap(), 107);

    let requests = api.catalog_requests.lock().unwrap().clone();
    assert_eq!(requests[0], PageRequest::First);
    assert!(matches!(&requests[2], PageRequest::Link(l) if l.ends_with("page=2")));
}

#[tokio::test]
async fn test_catalog_offset_stops_after_short_page() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Offsets, vec![50, 50, 7]));
    let fetcher = HotelCatalogFetcher::new(
        api.clone(),
        ctx.hotels(),
        PaginationStyle::Offset,
        50,
        Duration::ZERO,
    );

    let summary = fetcher
        .fetch_all(&CancellationToken::new(), "AUS", &stage_token().await)
        .await
        .unwrap();

    assert_eq!(summary.upserted, 107);
    assert_eq!(api.catalog_request_count(), 3);
    let requests = api.catalog_requests.lock().unwrap().clone();
    assert_eq!(
        requests[2],
        PageRequest::Offset {
            offset: 100,
            limit: 50
        }
    );
}

#[tokio::test]
async fn test_catalog_offset_confirms_end_after_full_page() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Offsets, vec![50, 50]));
    let fetcher = HotelCatalogFetcher::new(
        api.clone(),
        ctx.hotels(),
        PaginationStyle::Offset,
        50,
        Duration::ZERO,
    );

    let summary = fetcher
        .fetch_all(&CancellationToken::new(), "AUS", &stage_token().await)
        .await
        .unwrap();

    assert_eq!(summary.fetched(), 100);
    // The third request comes back empty and ends the listing.
    assert_eq!(api.catalog_request_count(), 3);
}

#[tokio::test]
async fn test_catalog_refetch_is_idempotent() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![50, 7]));
    let fetcher = HotelCatalogFetcher::new(
        api,
        ctx.hotels(),
        PaginationStyle::NextLink,
        50,
        Duration::ZERO,
    );
    let token = stage_token().await;
    let cancel = CancellationToken::new();

    fetcher.fetch_all(&cancel, "AUS", &token).await.unwrap();
    fetcher.fetch_all(&cancel, "AUS", &token).await.unwrap();

    assert_eq!(ctx.hotels().count().await.unwrap(), 57);
}

#[tokio::test]
async fn test_cancelled_catalog_reports_cancellation() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![50, 50, 7]));
    let fetcher = HotelCatalogFetcher::new(
        api.clone(),
        ctx.hotels(),
        PaginationStyle::NextLink,
        50,
        Duration::from_secs(60),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = fetcher
        .fetch_all(&cancel, "AUS", &stage_token().await)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(api.catalog_request_count(), 1);
}

#[tokio::test]
async fn test_search_denylist_is_never_refetched() {
    let (ctx, _dir) = temp_db().await;
    seed(&ctx, &["GOOD1", "GOOD2", "BADID"]).await;
    let api = Arc::new(
        FakeHotelApi::new(FixtureStyle::Links, vec![]).unsupported_for_search(&["BADID"]),
    );
    let cancel = CancellationToken::new();

    // Two separate runs, each with a fresh fetcher and token.
    for _ in 0..2 {
        let fetcher = DetailFetcher::new(api.clone(), ctx.hotels(), Duration::ZERO, 5, 1);
        fetcher
            .fetch_search_all(&cancel, ids(&["GOOD1", "GOOD2", "BADID"]), &stage_token().await)
            .await
            .unwrap();
    }

    assert_eq!(api.search_calls_for("BADID"), 1);
    assert_eq!(api.search_calls_for("GOOD1"), 2);
    assert!(ctx.hotels().is_invalid_for_search("BADID").await.unwrap());
    assert!(!ctx.hotels().is_invalid_for_search("GOOD1").await.unwrap());
    assert_eq!(ctx.hotels().list_invalid_for_search().await.unwrap(), vec!["BADID"]);
    assert!(ctx.hotels().has_search_data("GOOD2").await.unwrap());
}

#[tokio::test]
async fn test_search_summary_counts() {
    let (ctx, _dir) = temp_db().await;
    ctx.hotels().mark_invalid_for_search("OLD").await.unwrap();
    let api = Arc::new(
        FakeHotelApi::new(FixtureStyle::Links, vec![]).unsupported_for_search(&["NEW"]),
    );
    let fetcher = DetailFetcher::new(api.clone(), ctx.hotels(), Duration::ZERO, 3, 1);

    let summary = fetcher
        .fetch_search_all(
            &CancellationToken::new(),
            ids(&["A", "B", "OLD", "NEW"]),
            &stage_token().await,
        )
        .await
        .unwrap();

    assert_eq!(summary.saved, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.denylisted, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(api.search_calls_for("OLD"), 0);
}

#[tokio::test]
async fn test_search_auth_failure_aborts_without_denylisting() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(
        FakeHotelApi::new(FixtureStyle::Links, vec![]).unauthorized_for_search(&["A"]),
    );
    let fetcher = DetailFetcher::new(api, ctx.hotels(), Duration::ZERO, 1, 1);

    let err = fetcher
        .fetch_search_all(&CancellationToken::new(), ids(&["A"]), &stage_token().await)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Auth(_)));
    assert!(!ctx.hotels().is_invalid_for_search("A").await.unwrap());
}

#[tokio::test]
async fn test_ratings_failure_is_not_denylisted() {
    let (ctx, _dir) = temp_db().await;
    seed(&ctx, &["RATED", "FLAKY"]).await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![]).failing_ratings(&["FLAKY"]));
    let fetcher = DetailFetcher::new(api.clone(), ctx.hotels(), Duration::ZERO, 5, 2);

    let summary = fetcher
        .fetch_ratings_all(
            &CancellationToken::new(),
            ids(&["RATED", "FLAKY"]),
            &stage_token().await,
        )
        .await
        .unwrap();

    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failed, 1);
    assert!(!ctx.hotels().is_invalid_for_search("FLAKY").await.unwrap());
    assert_eq!(ctx.hotels().overall_sentiment("RATED").await.unwrap(), Some(87));

    let rated = ctx.hotels().get("RATED").await.unwrap().unwrap();
    assert_eq!(rated.rating(RatingSource::Amadeus), Some(87.0));
    let flaky = ctx.hotels().get("FLAKY").await.unwrap().unwrap();
    assert_eq!(flaky.rating(RatingSource::Amadeus), None);
}

#[tokio::test]
async fn test_token_failure_aborts_stage() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![50]));
    let pipeline = Pipeline::new(
        fast_config(),
        ctx,
        api.clone() as Arc<dyn HotelApi>,
        Some(Arc::new(RejectingTokens) as Arc<dyn TokenProvider>),
        Arc::new(ScriptedLlm::new(0.9, true, 0.9, true)),
        Vec::new(),
    );

    let err = pipeline
        .run_catalog(&CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Auth(_)));
    assert_eq!(api.catalog_request_count(), 0);
}

#[tokio::test]
async fn test_missing_credentials_is_auth_error() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![50]));
    let pipeline = Pipeline::new(
        fast_config(),
        ctx,
        api,
        None,
        Arc::new(ScriptedLlm::new(0.9, true, 0.9, true)),
        Vec::new(),
    );

    let err = pipeline
        .run_search(&CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Auth(_)));
}

#[tokio::test]
async fn test_ratings_stage_uses_configured_ids() {
    let (ctx, _dir) = temp_db().await;
    seed(&ctx, &["A", "B", "C"]).await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![]));
    let tokens = StaticTokens::new();
    let mut config = fast_config();
    config.ratings_hotel_ids = ids(&["B"]);

    let pipeline = Pipeline::new(
        config,
        ctx,
        api.clone(),
        Some(tokens.clone() as Arc<dyn TokenProvider>),
        Arc::new(ScriptedLlm::new(0.9, true, 0.9, true)),
        Vec::new(),
    );

    let summary = pipeline
        .run_ratings(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.saved, 1);
    assert_eq!(api.ratings_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_city_does_not_stop_other_cities() {
    let (ctx, _dir) = temp_db().await;
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![4]).failing_cities(&["BAD"]));
    let mut config = fast_config();
    config.city_codes = ids(&["AUS", "BAD", "SFO"]);
    let pipeline = Pipeline::new(
        config,
        ctx.clone(),
        api.clone() as Arc<dyn HotelApi>,
        Some(StaticTokens::new() as Arc<dyn TokenProvider>),
        Arc::new(ScriptedLlm::new(0.9, true, 0.9, true)),
        Vec::new(),
    );

    let run = pipeline
        .run_catalog(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.fetched, 8);
    assert_eq!(run.failed_cities.len(), 1);
    assert_eq!(run.failed_cities[0].0, "BAD");
    assert_eq!(*api.catalog_cities.lock().unwrap(), vec!["AUS", "BAD", "SFO"]);
    assert_eq!(ctx.hotels().count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_search_pool_bounds_calls_in_flight() {
    let (ctx, _dir) = temp_db().await;
    let hotel_ids: Vec<String> = (0..20).map(|i| format!("H{i:02}")).collect();
    let api = Arc::new(
        FakeHotelApi::new(FixtureStyle::Links, vec![]).with_latency(Duration::from_millis(20)),
    );
    let fetcher = DetailFetcher::new(api.clone(), ctx.hotels(), Duration::ZERO, 3, 1);

    let summary = fetcher
        .fetch_search_all(&CancellationToken::new(), hotel_ids, &stage_token().await)
        .await
        .unwrap();

    assert_eq!(summary.saved, 20);
    assert!(api.peak() <= 3, "peak in flight was {}", api.peak());
    assert!(api.peak() > 1, "calls never overlapped");
}

#[tokio::test]
async fn test_ratings_pool_of_one_is_sequential() {
    let (ctx, _dir) = temp_db().await;
    let hotel_ids: Vec<String> = (0..6).map(|i| format!("H{i:02}")).collect();
    let api = Arc::new(
        FakeHotelApi::new(FixtureStyle::Links, vec![]).with_latency(Duration::from_millis(10)),
    );
    let fetcher = DetailFetcher::new(api.clone(), ctx.hotels(), Duration::ZERO, 5, 1);

    let summary = fetcher
        .fetch_ratings_all(&CancellationToken::new(), hotel_ids, &stage_token().await)
        .await
        .unwrap();

    assert_eq!(summary.saved, 6);
    assert_eq!(api.peak(), 1);
}

#[tokio::test]
async fn test_worker_holds_slot_through_delay() {
    let (ctx, _dir) = temp_db().await;
    let hotel_ids: Vec<String> = (0..6).map(|i| format!("H{i:02}")).collect();
    let api = Arc::new(FakeHotelApi::new(FixtureStyle::Links, vec![]));
    let fetcher = DetailFetcher::new(api.clone(), ctx.hotels(), Duration::from_millis(50), 2, 1);

    let started = Instant::now();
    let summary = fetcher
        .fetch_search_all(&CancellationToken::new(), hotel_ids, &stage_token().await)
        .await
        .unwrap();

    // Six hotels through two slots is three rounds of the delay.
    assert_eq!(summary.saved, 6);
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert!(api.peak() <= 2);
}
