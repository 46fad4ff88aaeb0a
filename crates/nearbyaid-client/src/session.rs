//! One open map view: where it is centred, what was fetched, what is shown.

use nearbyaid_shared::protocol::HelpPointView;
use nearbyaid_shared::{CategoryFilter, GeoPoint};
use tracing::{debug, info};

use crate::api::{AidClient, RequestContext};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::fetch::{FetchSequencer, FetchTicket};
use crate::geolocation::{locate_with_fallback, LocationProvider, LocationSource};
use crate::overlay::OverlayState;

pub struct MapSession {
    client: AidClient,
    ctx: RequestContext,
    overlay: OverlayState,
    sequencer: FetchSequencer,
    center: GeoPoint,
    results: Vec<HelpPointView>,
    status: Option<String>,
    loading: bool,
}

/// A nearby query that has been triggered but not yet answered.
pub struct PendingFetch {
    client: AidClient,
    ctx: RequestContext,
    ticket: FetchTicket,
    center: GeoPoint,
    radius_m: f64,
}

pub struct FetchOutcome {
    ticket: FetchTicket,
    result: Result<Vec<HelpPointView>, ClientError>,
}

impl PendingFetch {
    pub async fn run(self) -> FetchOutcome {
        let result = self
            .client
            .nearby(&self.ctx, &self.center, self.radius_m)
            .await
            .map(|resp| resp.data);
        FetchOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

impl MapSession {
    pub fn new(client: AidClient, ctx: RequestContext, center: GeoPoint) -> Self {
        Self {
            client,
            ctx,
            overlay: OverlayState::default(),
            sequencer: FetchSequencer::new(),
            center,
            results: Vec::new(),
            status: None,
            loading: false,
        }
    }

    /// Centre the session on the device, or on the configured fallback.
    pub async fn locate(
        &mut self,
        provider: &dyn LocationProvider,
        config: &ClientConfig,
    ) -> LocationSource {
        let located = locate_with_fallback(
            provider,
            config.geolocation_timeout,
            config.fallback_location,
        )
        .await;
        self.center = located.point;
        located.source
    }

    /// Swap the credential used for later calls, e.g. after login.
    pub fn set_context(&mut self, ctx: RequestContext) {
        self.ctx = ctx;
    }

    pub fn select_category(&mut self, filter: CategoryFilter) -> bool {
        self.overlay.select_category(filter)
    }

    pub fn press_sos(&mut self) -> bool {
        self.overlay.press_sos()
    }

    /// Trigger a fetch for the current centre and radius. Any fetch started
    /// earlier is superseded.
    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.loading = true;
        PendingFetch {
            client: self.client.clone(),
            ctx: self.ctx.clone(),
            ticket: self.sequencer.begin(),
            center: self.center,
            radius_m: self.overlay.effective_radius(),
        }
    }

    /// Apply a finished fetch. Returns `false` if a newer fetch was started
    /// in the meantime and the outcome was discarded.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if !self.sequencer.is_current(&outcome.ticket) {
            debug!("Discarding superseded nearby response");
            return false;
        }
        self.loading = false;
        match outcome.result {
            Ok(data) => {
                info!(count = data.len(), "Nearby help points loaded");
                self.results = data;
                self.status = None;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
        true
    }

    pub async fn refresh(&mut self) -> bool {
        let outcome = self.begin_fetch().run().await;
        self.apply(outcome)
    }

    pub fn visible(&self) -> Vec<&HelpPointView> {
        self.overlay.visible(&self.results)
    }

    pub fn results(&self) -> &[HelpPointView] {
        &self.results
    }

    pub fn overlay(&self) -> OverlayState {
        self.overlay
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Last server or transport error, worded as received.
    pub fn status_line(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::spawn_mock_api;
    use crate::geolocation::FixedLocation;
    use nearbyaid_shared::Category;

    async fn session(base: &str) -> MapSession {
        let config = ClientConfig::default().with_base_url(base);
        let client = AidClient::new(&config).unwrap();
        MapSession::new(
            client,
            RequestContext::anonymous(),
            GeoPoint::from_lat_lng(25.30, 82.97),
        )
    }

    #[tokio::test]
    async fn test_refresh_and_filter_locally() {
        let base = spawn_mock_api().await;
        let mut session = session(&base).await;

        assert!(session.refresh().await);
        assert!(!session.is_loading());
        assert_eq!(session.visible().len(), 1);

        assert!(!session.select_category(CategoryFilter::Only(Category::Food)));
        assert!(session.visible().is_empty());
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn test_sos_refetch_widens_results() {
        let base = spawn_mock_api().await;
        let mut session = session(&base).await;
        session.refresh().await;

        assert!(session.press_sos());
        session.refresh().await;
        let titles: Vec<_> = session.visible().iter().map(|p| p.title.clone()).collect();
        assert_eq!(titles, ["Clinic", "Far shelter"]);
    }

    #[tokio::test]
    async fn test_superseded_fetch_is_discarded() {
        let base = spawn_mock_api().await;
        let mut session = session(&base).await;

        let old = session.begin_fetch();
        session.press_sos();
        let new = session.begin_fetch();

        let new_outcome = new.run().await;
        let old_outcome = old.run().await;
        assert!(session.apply(new_outcome));
        assert!(!session.apply(old_outcome));
        assert_eq!(session.results().len(), 2);
    }

    #[tokio::test]
    async fn test_error_lands_in_status_line() {
        let base = spawn_mock_api().await;
        let mut session = session(&format!("{base}/missing")).await;
        assert!(session.refresh().await);
        assert_eq!(session.status_line(), Some("Not Found"));
        assert!(session.results().is_empty());
    }

    #[tokio::test]
    async fn test_locate_uses_device_fix() {
        let base = spawn_mock_api().await;
        let mut session = session(&base).await;
        let here = GeoPoint::from_lat_lng(28.61, 77.21);
        let source = session
            .locate(&FixedLocation(here), &ClientConfig::default())
            .await;
        assert_eq!(source, LocationSource::Device);
        assert_eq!(session.center(), here);
    }
}
