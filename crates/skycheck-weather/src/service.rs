//! Read-through weather lookups and the two request surfaces built on them.
//!
//! `WeatherCall` blocks the calling thread; `WeatherRequest` runs the lookup
//! on the runtime and hands the results to a callback. Both share one cache.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cache::WeatherCache;
use crate::provider::WeatherFetcher;
use crate::types::WeatherRecord;

/// Cache-first lookup over a fetcher.
pub struct WeatherService {
    cache: Arc<WeatherCache>,
    fetcher: Arc<dyn WeatherFetcher>,
}

impl WeatherService {
    pub fn new(cache: Arc<WeatherCache>, fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    /// Current weather for `location`, from cache when fresh.
    ///
    /// Fetch failures and empty results are not cached and come back as an
    /// empty list, so the next call fetches again. An empty location is never
    /// fetched.
    pub async fn current_weather(&self, location: &str) -> Vec<WeatherRecord> {
        if location.is_empty() {
            return Vec::new();
        }
        if let Some(records) = self.cache.get(location) {
            return records;
        }

        match self.fetcher.fetch(location).await {
            Ok(records) if records.is_empty() => {
                tracing::debug!("No weather data returned for {}", location);
                records
            }
            Ok(records) => {
                tracing::debug!("Fetched {} record(s) for {}", records.len(), location);
                self.cache.put(location, records.clone());
                records
            }
            Err(e) => {
                tracing::warn!("Weather fetch for {} failed: {}", location, e);
                Vec::new()
            }
        }
    }
}

/// Synchronous request surface.
///
/// Must be called from a thread that is not driving the runtime.
#[derive(Clone)]
pub struct WeatherCall {
    handle: Handle,
    service: Arc<WeatherService>,
}

impl WeatherCall {
    pub fn new(handle: Handle, service: Arc<WeatherService>) -> Self {
        Self { handle, service }
    }

    pub fn get_current_weather(&self, location: &str) -> Vec<WeatherRecord> {
        tracing::debug!("Blocking weather lookup for {}", location);
        self.handle.block_on(self.service.current_weather(location))
    }
}

/// Receiver for results of an asynchronous lookup.
pub trait WeatherResults: Send + Sync {
    fn send_results(&self, location: &str, records: Vec<WeatherRecord>);
}

/// Messages delivered over a channel by the asynchronous surface
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherServiceMessage {
    /// Result of looking up a location; empty when nothing was found
    LookupDone {
        location: String,
        records: Vec<WeatherRecord>,
    },
}

impl WeatherResults for std::sync::mpsc::Sender<WeatherServiceMessage> {
    fn send_results(&self, location: &str, records: Vec<WeatherRecord>) {
        let message = WeatherServiceMessage::LookupDone {
            location: location.to_string(),
            records,
        };
        if self.send(message).is_err() {
            tracing::debug!("Weather results receiver dropped for {}", location);
        }
    }
}

/// Asynchronous request surface.
#[derive(Clone)]
pub struct WeatherRequest {
    handle: Handle,
    service: Arc<WeatherService>,
}

impl WeatherRequest {
    pub fn new(handle: Handle, service: Arc<WeatherService>) -> Self {
        Self { handle, service }
    }

    /// Start a lookup off the caller's thread. The callback always fires once.
    pub fn get_current_weather(
        &self,
        location: String,
        callback: Arc<dyn WeatherResults>,
    ) -> JoinHandle<()> {
        tracing::debug!("Queued weather lookup for {}", location);
        let service = self.service.clone();
        self.handle.spawn(async move {
            let records = service.current_weather(&location).await;
            callback.send_results(&location, records);
        })
    }

    /// Start a lookup for every location, delivering results on the returned
    /// channel in completion order.
    ///
    /// The channel closes once every lookup has finished, including ones
    /// whose task panicked, so draining it never blocks forever.
    pub fn get_current_weather_all<I>(&self, locations: I) -> Receiver<WeatherServiceMessage>
    where
        I: IntoIterator<Item = String>,
    {
        let (tx, rx) = mpsc::channel::<WeatherServiceMessage>();
        let tx = Arc::new(tx);
        for location in locations {
            self.get_current_weather(location, tx.clone());
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::cache::DEFAULT_MAX_AGE_MS;
    use crate::clock::ManualClock;
    use crate::provider::FetchFuture;
    use crate::types::WeatherError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(name: &str) -> WeatherRecord {
        WeatherRecord {
            name: name.to_string(),
            speed: 1.0,
            deg: 0.0,
            temp: 60.0,
            humidity: 40,
            sunrise: 0,
            sunset: 0,
            description: "overcast clouds".to_string(),
            country: "GB".to_string(),
        }
    }

    /// Fetcher that replays canned outcomes and counts calls.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        outcomes: Mutex<Vec<Result<Vec<WeatherRecord>, WeatherError>>>,
    }

    impl ScriptedFetcher {
        fn with(outcomes: Vec<Result<Vec<WeatherRecord>, WeatherError>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcomes: Mutex::new(outcomes.into_iter().rev().collect()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WeatherFetcher for ScriptedFetcher {
        fn fetch<'a>(&'a self, location: &'a str) -> FetchFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self
                .outcomes
                .lock()
                .pop()
                .unwrap_or_else(|| Ok(vec![record(location)]));
            Box::pin(async move { outcome })
        }
    }

    fn service_with(fetcher: Arc<ScriptedFetcher>) -> (Arc<WeatherService>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let cache = Arc::new(WeatherCache::with_clock(clock.clone(), DEFAULT_MAX_AGE_MS));
        (Arc::new(WeatherService::new(cache, fetcher)), clock)
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, _) = service_with(fetcher.clone());

        let first = service.current_weather("London").await;
        let second = service.current_weather("London").await;

        assert_eq!(first, vec![record("London")]);
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_different_locations_each_fetch() {
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, _) = service_with(fetcher.clone());

        service.current_weather("London").await;
        service.current_weather("Paris").await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let fetcher = ScriptedFetcher::with(vec![
            Err(WeatherError::Api {
                status: 503,
                message: "down".into(),
            }),
            Err(WeatherError::LocationNotFound("Leeds".into())),
        ]);
        let (service, _) = service_with(fetcher.clone());

        assert!(service.current_weather("Leeds").await.is_empty());
        assert!(service.current_weather("Leeds").await.is_empty());
        assert!(service.cache().is_empty());

        assert_eq!(service.current_weather("Leeds").await, vec![record("Leeds")]);
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_fetch_is_not_cached() {
        let fetcher = ScriptedFetcher::with(vec![Ok(Vec::new())]);
        let (service, _) = service_with(fetcher.clone());

        assert!(service.current_weather("Atlantis").await.is_empty());
        assert!(service.cache().is_empty());
        service.current_weather("Atlantis").await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_location_is_never_fetched() {
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, _) = service_with(fetcher.clone());

        assert!(service.current_weather("").await.is_empty());
        assert!(service.current_weather("").await.is_empty());
        assert_eq!(fetcher.calls(), 0);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, clock) = service_with(fetcher.clone());

        service.current_weather("Nashville").await;
        clock.set(DEFAULT_MAX_AGE_MS);
        service.current_weather("Nashville").await;
        assert_eq!(fetcher.calls(), 1);

        clock.set(DEFAULT_MAX_AGE_MS + 1);
        service.current_weather("Nashville").await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_sync_and_async_surfaces_share_cache() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, _) = service_with(fetcher.clone());

        let call = WeatherCall::new(runtime.handle().clone(), service.clone());
        let request = WeatherRequest::new(runtime.handle().clone(), service);

        assert_eq!(call.get_current_weather("Cork"), vec![record("Cork")]);

        let (tx, rx) = std::sync::mpsc::channel::<WeatherServiceMessage>();
        let task = request.get_current_weather("Cork".to_string(), Arc::new(tx));
        runtime.block_on(task).unwrap();

        assert_eq!(
            rx.recv().unwrap(),
            WeatherServiceMessage::LookupDone {
                location: "Cork".to_string(),
                records: vec![record("Cork")],
            }
        );
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_async_surface_delivers_empty_results() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let fetcher = ScriptedFetcher::with(vec![Err(WeatherError::InvalidApiKey)]);
        let (service, _) = service_with(fetcher);
        let request = WeatherRequest::new(runtime.handle().clone(), service);

        let (tx, rx) = std::sync::mpsc::channel::<WeatherServiceMessage>();
        runtime
            .block_on(request.get_current_weather("Bree".to_string(), Arc::new(tx)))
            .unwrap();

        match rx.recv().unwrap() {
            WeatherServiceMessage::LookupDone { location, records } => {
                assert_eq!(location, "Bree");
                assert!(records.is_empty());
            }
        }
    }

    #[test]
    fn test_lookup_all_delivers_every_location() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, _) = service_with(fetcher.clone());
        let request = WeatherRequest::new(runtime.handle().clone(), service);

        let rx = request.get_current_weather_all(["Oslo".to_string(), "Bergen".to_string()]);
        let mut locations: Vec<String> = rx
            .iter()
            .map(|WeatherServiceMessage::LookupDone { location, .. }| location)
            .collect();
        locations.sort();

        assert_eq!(locations, vec!["Bergen".to_string(), "Oslo".to_string()]);
        assert_eq!(fetcher.calls(), 2);
    }

    /// Fetcher whose lookups for one location panic.
    struct PanickingFetcher;

    impl WeatherFetcher for PanickingFetcher {
        fn fetch<'a>(&'a self, location: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                if location == "Kaboom" {
                    panic!("lookup for {location} blew up");
                }
                Ok(vec![record(location)])
            })
        }
    }

    #[test]
    fn test_lookup_all_closes_channel_when_a_task_panics() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let cache = Arc::new(WeatherCache::new());
        let service = Arc::new(WeatherService::new(cache, Arc::new(PanickingFetcher)));
        let request = WeatherRequest::new(runtime.handle().clone(), service);

        let rx = request.get_current_weather_all(["Kaboom".to_string(), "Turku".to_string()]);
        let messages: Vec<_> = rx.iter().collect();

        assert_eq!(
            messages,
            vec![WeatherServiceMessage::LookupDone {
                location: "Turku".to_string(),
                records: vec![record("Turku")],
            }]
        );
    }

    #[test]
    fn test_sync_surface_from_many_threads() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let fetcher = ScriptedFetcher::with(vec![]);
        let (service, _) = service_with(fetcher);
        let call = WeatherCall::new(runtime.handle().clone(), service.clone());

        let handles: Vec<_> = ["Lima", "Quito", "Lima", "Quito"]
            .into_iter()
            .map(|loc| {
                let call = call.clone();
                std::thread::spawn(move || call.get_current_weather(loc))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
        assert_eq!(service.cache().len(), 2);
    }
}
