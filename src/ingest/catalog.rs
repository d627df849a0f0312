//! Paginated catalog-by-city fetch.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::repository::DieselHotelRepository;
use crate::upstream::{next_page, HotelApi, HotelStub, PageRequest, PaginationStyle, StageToken};
use crate::utils::{sleep_or_cancel, until_cancelled};

/// Result of one city's catalog fetch.
#[derive(Debug, Default)]
pub struct CatalogSummary {
    pub pages: usize,
    /// Every stub received, in page order.
    pub stubs: Vec<HotelStub>,
    pub upserted: usize,
    /// Stubs whose upsert failed and was skipped.
    pub failed: usize,
}

impl CatalogSummary {
    pub fn fetched(&self) -> usize {
        self.stubs.len()
    }
}

/// Walks the catalog pages for a city, upserting each stub as it arrives.
pub struct HotelCatalogFetcher {
    api: Arc<dyn HotelApi>,
    hotels: DieselHotelRepository,
    style: PaginationStyle,
    page_size: usize,
    page_delay: Duration,
}

impl HotelCatalogFetcher {
    pub fn new(
        api: Arc<dyn HotelApi>,
        hotels: DieselHotelRepository,
        style: PaginationStyle,
        page_size: usize,
        page_delay: Duration,
    ) -> Self {
        Self {
            api,
            hotels,
            style,
            page_size: page_size.max(1),
            page_delay,
        }
    }

    /// Fetch every page for `city_code`.
    ///
    /// A page that fails to arrive or decode ends the fetch with an error,
    /// since the position in the listing is lost. Upsert failures for single
    /// stubs are logged and counted.
    pub async fn fetch_all(
        &self,
        cancel: &CancellationToken,
        city_code: &str,
        token: &StageToken,
    ) -> Result<CatalogSummary, PipelineError> {
        let mut summary = CatalogSummary::default();
        let mut request = PageRequest::first(self.style, self.page_size);

        loop {
            let access = until_cancelled(cancel, token.get())
                .await
                .ok_or(PipelineError::Cancelled)??;
            let page = until_cancelled(
                cancel,
                self.api.fetch_catalog_page(&access, city_code, &request),
            )
            .await
            .ok_or(PipelineError::Cancelled)??;
            summary.pages += 1;

            debug!(
                "{} page {}: {} hotels",
                city_code,
                summary.pages,
                page.data.len()
            );

            for stub in &page.data {
                match self.hotels.upsert(&stub.to_hotel()).await {
                    Ok(()) => summary.upserted += 1,
                    Err(e) => {
                        warn!("Failed to upsert hotel {}: {}", stub.hotel_id, e);
                        summary.failed += 1;
                    }
                }
            }

            let fetched = summary.stubs.len() + page.data.len();
            let next = next_page(self.style, self.page_size, &page, fetched);
            summary.stubs.extend(page.data);

            match next {
                Some(next) => request = next,
                None => break,
            }

            if !sleep_or_cancel(cancel, self.page_delay).await {
                return Err(PipelineError::Cancelled);
            }
        }

        info!(
            "Catalog {}: {} hotels over {} pages ({} upserted, {} failed)",
            city_code,
            summary.fetched(),
            summary.pages,
            summary.upserted,
            summary.failed
        );
        Ok(summary)
    }
}
