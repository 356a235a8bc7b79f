use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::FetchError;
use crate::fetch::WeatherApiClient;
use crate::location::LocationQuery;
use crate::model::ForecastSnapshot;

/// Single-writer forecast state for observer UIs.
///
/// Each successful refresh publishes one [`ForecastSnapshot`] into a watch
/// channel, so the day list and the current record always change together.
/// Overlapping refreshes are resolved with a generation counter: a completion
/// that is no longer the most recent request is discarded, never published.
#[derive(Debug)]
pub struct ForecastService {
    client: WeatherApiClient,
    state: watch::Sender<Option<Arc<ForecastSnapshot>>>,
    // Guards both the request counter and the publish that checks it.
    generation: Mutex<u64>,
}

impl ForecastService {
    pub fn new(client: WeatherApiClient) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            client,
            state,
            generation: Mutex::new(0),
        }
    }

    /// Subscribe to published snapshots. `None` until the first successful
    /// refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ForecastSnapshot>>> {
        self.state.subscribe()
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<ForecastSnapshot>> {
        self.state.borrow().clone()
    }

    /// Fetch the forecast for `query` and publish it.
    ///
    /// Returns `Ok(None)` when a newer refresh started while this one was in
    /// flight; the stale result is dropped and observers keep the newer
    /// state. Failures are logged and published state is left untouched.
    pub async fn refresh(
        &self,
        query: &LocationQuery,
    ) -> Result<Option<Arc<ForecastSnapshot>>, FetchError> {
        let generation = self.next_generation();

        let snapshot = match self.client.fetch(&query.as_query()).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                warn!("forecast refresh for {query} failed: {err}");
                return Err(err);
            }
        };

        if !self.publish_if_latest(generation, snapshot.clone()) {
            debug!("discarding superseded forecast for {query} (generation {generation})");
            return Ok(None);
        }

        Ok(Some(snapshot))
    }

    fn next_generation(&self) -> u64 {
        let mut generation = self.generation.lock();
        *generation += 1;
        *generation
    }

    fn publish_if_latest(&self, generation: u64, snapshot: Arc<ForecastSnapshot>) -> bool {
        // The lock is held across the send, so between "still the latest"
        // and the publish no newer refresh can start or publish.
        let latest = self.generation.lock();
        if *latest != generation {
            return false;
        }
        self.state.send_replace(Some(snapshot));
        true
    }
}
