//! Stage wiring: catalog, then details, then recommendations.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::analysis::AnalysisEngine;
use crate::config::Config;
use crate::error::PipelineError;
use crate::ingest::{DetailFetcher, HotelCatalogFetcher, StageSummary};
use crate::llm::{build_provider, LlmProvider};
use crate::recommend::{BatchSummary, RecommendationOrchestrator};
use crate::repository::DbContext;
use crate::reviews::{default_sources, ReviewAggregator, ReviewSource};
use crate::upstream::{AmadeusClient, HotelApi, StageToken, TokenProvider};
use crate::utils::until_cancelled;

/// Catalog stage totals across every configured city.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogRun {
    pub fetched: usize,
    /// Cities whose fetch was abandoned, with the reason.
    pub failed_cities: Vec<(String, String)>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub hotels_fetched: usize,
    pub failed_cities: Vec<(String, String)>,
    pub search: StageSummary,
    pub ratings: StageSummary,
    pub recommendations: BatchSummary,
    /// Stages that aborted, with the reason.
    pub failed_stages: Vec<(&'static str, String)>,
}

/// Everything a run needs, with the external collaborators injected.
pub struct Pipeline {
    config: Config,
    db: DbContext,
    api: Arc<dyn HotelApi>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    llm: Arc<dyn LlmProvider>,
    sources: Vec<Arc<dyn ReviewSource>>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        db: DbContext,
        api: Arc<dyn HotelApi>,
        token_provider: Option<Arc<dyn TokenProvider>>,
        llm: Arc<dyn LlmProvider>,
        sources: Vec<Arc<dyn ReviewSource>>,
    ) -> Self {
        Self {
            config,
            db,
            api,
            token_provider,
            llm,
            sources,
        }
    }

    /// Wire the HTTP provider, the configured LLM and the registered sources.
    pub fn from_config(config: Config, db: DbContext) -> Self {
        let client = AmadeusClient::new(config.upstream.clone());
        let token_provider = client
            .token_provider()
            .map(|p| Arc::new(p) as Arc<dyn TokenProvider>);
        let llm = build_provider(&config.llm);
        Self::new(
            config,
            db,
            Arc::new(client),
            token_provider,
            llm,
            default_sources(),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &DbContext {
        &self.db
    }

    async fn stage_token(&self, cancel: &CancellationToken) -> Result<StageToken, PipelineError> {
        let provider = self.token_provider.clone().ok_or_else(|| {
            PipelineError::Auth("no client credentials configured (set AMD and AMS)".to_string())
        })?;
        Ok(until_cancelled(cancel, StageToken::acquire(provider))
            .await
            .ok_or(PipelineError::Cancelled)??)
    }

    /// Fetch the catalog for every configured city.
    ///
    /// A city whose fetch fails is recorded and the next city still runs.
    /// Authentication failure and cancellation end the stage.
    pub async fn run_catalog(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CatalogRun, PipelineError> {
        let token = self.stage_token(cancel).await?;
        let fetcher = HotelCatalogFetcher::new(
            self.api.clone(),
            self.db.hotels(),
            self.config.upstream.pagination,
            self.config.upstream.page_size,
            self.config.throttle.catalog_page_delay(),
        );

        let mut run = CatalogRun::default();
        for city in &self.config.city_codes {
            match fetcher.fetch_all(cancel, city, &token).await {
                Ok(summary) => run.fetched += summary.fetched(),
                Err(e @ (PipelineError::Auth(_) | PipelineError::Cancelled)) => return Err(e),
                Err(e) => {
                    error!("Catalog fetch for {} abandoned: {}", city, e);
                    run.failed_cities.push((city.clone(), e.to_string()));
                }
            }
        }
        Ok(run)
    }

    fn detail_fetcher(&self) -> DetailFetcher {
        DetailFetcher::new(
            self.api.clone(),
            self.db.hotels(),
            self.config.throttle.detail_delay(),
            self.config.throttle.search_concurrency(),
            self.config.throttle.ratings_concurrency(),
        )
    }

    /// Search detail for every stored hotel.
    pub async fn run_search(
        &self,
        cancel: &CancellationToken,
    ) -> Result<StageSummary, PipelineError> {
        let token = self.stage_token(cancel).await?;
        let ids = self.db.hotels().list_ids().await?;
        self.detail_fetcher().fetch_search_all(cancel, ids, &token).await
    }

    /// Ratings detail for the configured IDs, or every stored hotel.
    pub async fn run_ratings(
        &self,
        cancel: &CancellationToken,
    ) -> Result<StageSummary, PipelineError> {
        let token = self.stage_token(cancel).await?;
        let ids = if self.config.ratings_hotel_ids.is_empty() {
            self.db.hotels().list_ids().await?
        } else {
            self.config.ratings_hotel_ids.clone()
        };
        self.detail_fetcher().fetch_ratings_all(cancel, ids, &token).await
    }

    pub fn orchestrator(&self) -> RecommendationOrchestrator {
        let aggregator = ReviewAggregator::new(
            self.sources.clone(),
            self.db.reviews(),
            self.config.throttle.review_source_delay(),
        );
        let engine = AnalysisEngine::new(
            self.llm.clone(),
            self.config.throttle.max_reviews_per_analysis,
        );
        RecommendationOrchestrator::new(
            self.db.hotels(),
            self.db.recommendations(),
            aggregator,
            engine,
            self.config.throttle.recommend_threshold,
        )
    }

    pub async fn run_recommendations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, PipelineError> {
        self.orchestrator().process_all(cancel).await
    }

    /// Run every stage in order.
    ///
    /// A stage that aborts is recorded and the next stage still runs.
    /// Cancellation ends the run.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();

        match self.run_catalog(cancel).await {
            Ok(catalog) => {
                summary.hotels_fetched = catalog.fetched;
                summary.failed_cities = catalog.failed_cities;
            }
            Err(e) => record_failure(&mut summary, "catalog", e)?,
        }
        match self.run_search(cancel).await {
            Ok(s) => summary.search = s,
            Err(e) => record_failure(&mut summary, "search", e)?,
        }
        match self.run_ratings(cancel).await {
            Ok(s) => summary.ratings = s,
            Err(e) => record_failure(&mut summary, "ratings", e)?,
        }
        match self.run_recommendations(cancel).await {
            Ok(s) => summary.recommendations = s,
            Err(e) => record_failure(&mut summary, "recommendations", e)?,
        }

        info!("Hotels fetched: {}", summary.hotels_fetched);
        if !summary.failed_cities.is_empty() {
            info!("Cities abandoned: {}", summary.failed_cities.len());
        }
        info!("Search data fetched: {}", summary.search.saved);
        info!("Ratings data fetched: {}", summary.ratings.saved);
        info!(
            "Recommendations completed: {}, skipped: {}, failed: {}",
            summary.recommendations.completed,
            summary.recommendations.skipped,
            summary.recommendations.failed
        );
        Ok(summary)
    }
}

fn record_failure(
    summary: &mut RunSummary,
    stage: &'static str,
    err: PipelineError,
) -> Result<(), PipelineError> {
    if err.is_cancelled() {
        return Err(err);
    }
    error!("Stage {} aborted: {}", stage, err);
    summary.failed_stages.push((stage, err.to_string()));
    Ok(())
}
