//! In-memory fakes for the provider, review source and LLM boundaries.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use alpaca::config::Config;
use alpaca::llm::{LlmError, LlmProvider, QualityAnalysis, QuietAnalysis};
use alpaca::models::{Hotel, HotelReview, ReviewSourceKind};
use alpaca::repository::DbContext;
use alpaca::reviews::{ReviewSource, ReviewSourceError};
use alpaca::upstream::{
    AccessToken, CatalogPage, HotelApi, HotelRatingsData, HotelSearchData, PageRequest,
    TokenProvider, UpstreamError,
};

pub async fn temp_db() -> (DbContext, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ctx = DbContext::new(&dir.path().join("alpaca.db"));
    ctx.init_schema().await.unwrap();
    (ctx, dir)
}

/// Config with every pacing delay removed.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.city_codes = vec!["AUS".to_string()];
    config.throttle.catalog_page_delay_ms = 0;
    config.throttle.detail_delay_ms = 0;
    config.throttle.review_source_delay_ms = 0;
    config
}

pub struct StaticTokens {
    pub calls: AtomicUsize,
}

impl StaticTokens {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn get_token(&self) -> Result<AccessToken, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("test-token", None))
    }
}

pub struct RejectingTokens;

#[async_trait]
impl TokenProvider for RejectingTokens {
    async fn get_token(&self) -> Result<AccessToken, UpstreamError> {
        Err(UpstreamError::Auth("HTTP 401: invalid_client".into()))
    }
}

fn stubs(prefix: &str, start: usize, len: usize) -> Vec<serde_json::Value> {
    (start..start + len)
        .map(|i| {
            json!({
                "type": "location",
                "hotelId": format!("{prefix}{i:04}"),
                "name": format!("Hotel {i}"),
                "address": {"cityName": "AUSTIN", "countryCode": "US"},
                "geoCode": {"latitude": 30.26, "longitude": -97.74}
            })
        })
        .collect()
}

/// How the fake catalog signals the next page.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FixtureStyle {
    Links,
    Offsets,
}

/// Provider fake with a fixed catalog and scripted detail failures.
pub struct FakeHotelApi {
    style: FixtureStyle,
    page_sizes: Vec<usize>,
    search_unsupported: HashSet<String>,
    search_unauthorized: HashSet<String>,
    ratings_failing: HashSet<String>,
    cities_failing: HashSet<String>,
    latency: Duration,
    in_flight: AtomicUsize,
    /// Most detail calls ever running at once.
    pub peak_in_flight: AtomicUsize,
    pub catalog_requests: Mutex<Vec<PageRequest>>,
    pub catalog_cities: Mutex<Vec<String>>,
    pub search_calls: Mutex<HashMap<String, usize>>,
    pub ratings_calls: AtomicUsize,
}

impl FakeHotelApi {
    pub fn new(style: FixtureStyle, page_sizes: Vec<usize>) -> Self {
        Self {
            style,
            page_sizes,
            search_unsupported: HashSet::new(),
            search_unauthorized: HashSet::new(),
            ratings_failing: HashSet::new(),
            cities_failing: HashSet::new(),
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            catalog_requests: Mutex::new(Vec::new()),
            catalog_cities: Mutex::new(Vec::new()),
            search_calls: Mutex::new(HashMap::new()),
            ratings_calls: AtomicUsize::new(0),
        }
    }

    pub fn unsupported_for_search(mut self, ids: &[&str]) -> Self {
        self.search_unsupported = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn unauthorized_for_search(mut self, ids: &[&str]) -> Self {
        self.search_unauthorized = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_ratings(mut self, ids: &[&str]) -> Self {
        self.ratings_failing = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Catalog pages for these cities come back undecodable.
    pub fn failing_cities(mut self, cities: &[&str]) -> Self {
        self.cities_failing = cities.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Every detail call takes this long.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter_call(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn leave_call(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn catalog_request_count(&self) -> usize {
        self.catalog_requests.lock().unwrap().len()
    }

    pub fn search_calls_for(&self, id: &str) -> usize {
        self.search_calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    fn page_index(&self, request: &PageRequest) -> usize {
        match request {
            PageRequest::First => 0,
            PageRequest::Link(link) => link
                .rsplit('=')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(usize::MAX),
            PageRequest::Offset { offset, .. } => {
                let mut seen = 0;
                for (idx, size) in self.page_sizes.iter().enumerate() {
                    if seen == *offset {
                        return idx;
                    }
                    seen += size;
                }
                usize::MAX
            }
        }
    }
}

#[async_trait]
impl HotelApi for FakeHotelApi {
    async fn fetch_catalog_page(
        &self,
        _token: &AccessToken,
        city_code: &str,
        request: &PageRequest,
    ) -> Result<CatalogPage, UpstreamError> {
        self.catalog_requests.lock().unwrap().push(request.clone());
        self.catalog_cities.lock().unwrap().push(city_code.to_string());
        if self.cities_failing.contains(city_code) {
            return Err(UpstreamError::Decode("expected value at line 1 column 1".into()));
        }

        let idx = self.page_index(request);
        let Some(size) = self.page_sizes.get(idx).copied() else {
            return Ok(serde_json::from_value(json!({"data": []})).unwrap());
        };
        let start: usize = self.page_sizes[..idx].iter().sum();
        let data = stubs("HT", start, size);

        let body = match self.style {
            FixtureStyle::Links if idx + 1 < self.page_sizes.len() => json!({
                "data": data,
                "meta": {"links": {"next": format!("https://fake/hotels?page={}", idx + 1)}}
            }),
            _ => json!({"data": data}),
        };
        serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    async fn fetch_search_detail(
        &self,
        _token: &AccessToken,
        hotel_id: &str,
    ) -> Result<HotelSearchData, UpstreamError> {
        self.enter_call().await;
        let result = self.search_result(hotel_id);
        self.leave_call();
        result
    }

    async fn fetch_ratings_detail(
        &self,
        _token: &AccessToken,
        hotel_id: &str,
    ) -> Result<HotelRatingsData, UpstreamError> {
        self.enter_call().await;
        let result = self.ratings_result(hotel_id);
        self.leave_call();
        result
    }
}

impl FakeHotelApi {
    fn search_result(&self, hotel_id: &str) -> Result<HotelSearchData, UpstreamError> {
        *self
            .search_calls
            .lock()
            .unwrap()
            .entry(hotel_id.to_string())
            .or_default() += 1;

        if self.search_unauthorized.contains(hotel_id) {
            return Err(UpstreamError::Auth("HTTP 401".into()));
        }
        if self.search_unsupported.contains(hotel_id) {
            return Err(UpstreamError::Status {
                status: 400,
                body: "INVALID PROPERTY CODE".into(),
            });
        }
        serde_json::from_value(json!({
            "type": "hotel-offers",
            "hotelId": hotel_id,
            "name": "Fake",
            "rating": "4",
            "available": true,
            "amenities": ["WIFI"]
        }))
        .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    fn ratings_result(&self, hotel_id: &str) -> Result<HotelRatingsData, UpstreamError> {
        self.ratings_calls.fetch_add(1, Ordering::SeqCst);
        if self.ratings_failing.contains(hotel_id) {
            return Err(UpstreamError::Status {
                status: 500,
                body: "upstream timeout".into(),
            });
        }
        serde_json::from_value(json!({
            "type": "hotelSentiment",
            "hotelId": hotel_id,
            "overallRating": 87,
            "numberOfReviews": 120,
            "numberOfRatings": 240,
            "sentiments": {"sleepQuality": 82, "service": 90}
        }))
        .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Review source returning fixed texts for every hotel.
pub struct FixedReviews {
    kind: ReviewSourceKind,
    texts: Vec<String>,
    pub calls: AtomicUsize,
}

impl FixedReviews {
    pub fn new(kind: ReviewSourceKind, texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            kind,
            texts: texts.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReviewSource for FixedReviews {
    fn kind(&self) -> ReviewSourceKind {
        self.kind
    }

    async fn crawl(&self, hotel: &Hotel) -> Result<Vec<HotelReview>, ReviewSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                HotelReview::new(&hotel.hotel_id, self.kind, format!("r{i}"), text.as_str())
            })
            .collect())
    }
}

/// LLM fake with fixed answers and optional failure or delay.
pub struct ScriptedLlm {
    pub quality: QualityAnalysis,
    pub quiet: QuietAnalysis,
    pub fail_quality: bool,
    pub quiet_delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(quality_score: f64, recommended: bool, quiet_score: f64, is_quiet: bool) -> Self {
        Self {
            quality: QualityAnalysis {
                score: quality_score,
                confidence: 0.9,
                reasoning: "spotless rooms".into(),
                recommended,
            },
            quiet: QuietAnalysis {
                score: quiet_score,
                confidence: 0.8,
                reasoning: "some hallway noise".into(),
                is_quiet,
            },
            fail_quality: false,
            quiet_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail_quality = true;
        self
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn analyze_quality(&self, _reviews: &[String]) -> Result<QualityAnalysis, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_quality {
            return Err(LlmError::Parse("expected value at line 1 column 1".into()));
        }
        Ok(self.quality.clone())
    }

    async fn analyze_quiet(&self, _reviews: &[String]) -> Result<QuietAnalysis, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.quiet_delay).await;
        Ok(self.quiet.clone())
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}
