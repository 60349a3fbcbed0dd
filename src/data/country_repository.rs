//! Country data: cache-then-refresh merge over a local and a remote source
//!
//! `get_countries` emits the best-effort cached result for a query first,
//! then refreshes from the remote source; a successful refresh is written
//! through to the cache in full, so substring queries that follow hit fresh
//! data immediately. A failed refresh leaves the cache emission standing and
//! surfaces the error as the final emission.
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use tokio::sync::{mpsc, RwLock};
use tokio::time::Duration;

use crate::domain::Country;
use crate::error::CountryError;

/// Local country cache: filtered reads plus full write-through.
#[async_trait]
pub trait CountryLocalSource: Send + Sync {
    /// Countries whose name, ISO code or dial code matches `query`.
    /// An empty query matches everything.
    async fn countries(&self, query: &str) -> Vec<Country>;

    async fn country(&self, code: &str) -> Option<Country>;

    /// Replace the entire cached set with a fresh remote result.
    async fn replace_all(&self, countries: Vec<Country>);
}

/// Remote country directory.
#[async_trait]
pub trait CountryRemoteSource: Send + Sync {
    /// The full country set; filtering happens against the cache.
    async fn fetch_countries(&self) -> Result<Vec<Country>, CountryError>;
}

fn matches(country: &Country, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    country.name.to_lowercase().contains(&query)
        || country.iso_code.to_lowercase().contains(&query)
        || country.dial_code.contains(query.trim_start_matches('+'))
}

/// In-memory implementation of the local cache.
pub struct InMemoryCountryCache {
    entries: RwLock<Vec<Country>>,
}

impl InMemoryCountryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn seeded(countries: Vec<Country>) -> Self {
        Self {
            entries: RwLock::new(countries),
        }
    }
}

impl Default for InMemoryCountryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CountryLocalSource for InMemoryCountryCache {
    async fn countries(&self, query: &str) -> Vec<Country> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|country| matches(country, query))
            .cloned()
            .collect()
    }

    async fn country(&self, code: &str) -> Option<Country> {
        self.entries
            .read()
            .await
            .iter()
            .find(|country| country.iso_code == code)
            .cloned()
    }

    async fn replace_all(&self, countries: Vec<Country>) {
        *self.entries.write().await = countries;
    }
}

static COUNTRY_DIRECTORY: Lazy<Vec<Country>> = Lazy::new(|| {
    vec![
        Country::new("Egypt", "+20", "EG", "🇪🇬"),
        Country::new("United States", "+1", "US", "🇺🇸"),
        Country::new("United Kingdom", "+44", "GB", "🇬🇧"),
        Country::new("Germany", "+49", "DE", "🇩🇪"),
        Country::new("France", "+33", "FR", "🇫🇷"),
        Country::new("India", "+91", "IN", "🇮🇳"),
        Country::new("Canada", "+1", "CA", "🇨🇦"),
        Country::new("Brazil", "+55", "BR", "🇧🇷"),
        Country::new("Japan", "+81", "JP", "🇯🇵"),
        Country::new("Nigeria", "+234", "NG", "🇳🇬"),
        Country::new("Greece", "+30", "GR", "🇬🇷"),
        Country::new("Saudi Arabia", "+966", "SA", "🇸🇦"),
    ]
});

/// Canned remote directory with simulated latency, standing in for the HTTP
/// backend.
pub struct StaticCountryApi {
    latency: Duration,
}

impl StaticCountryApi {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl CountryRemoteSource for StaticCountryApi {
    async fn fetch_countries(&self) -> Result<Vec<Country>, CountryError> {
        tokio::time::sleep(self.latency).await;
        Ok(COUNTRY_DIRECTORY.clone())
    }
}

/// Orchestrates the local and remote sources.
pub struct CountryRepository {
    local: Arc<dyn CountryLocalSource>,
    remote: Arc<dyn CountryRemoteSource>,
}

impl CountryRepository {
    pub fn new(local: Arc<dyn CountryLocalSource>, remote: Arc<dyn CountryRemoteSource>) -> Self {
        Self { local, remote }
    }

    /// Stream of results for one query: the cached filter result first, then
    /// the refreshed result or the refresh error. Dropping the receiver
    /// abandons the stream.
    pub fn get_countries(&self, query: &str) -> mpsc::Receiver<Result<Vec<Country>, CountryError>> {
        let (tx, rx) = mpsc::channel(4);
        let local = Arc::clone(&self.local);
        let remote = Arc::clone(&self.remote);
        let query = query.to_owned();
        tokio::spawn(async move {
            let cached = local.countries(&query).await;
            if tx.send(Ok(cached)).await.is_err() {
                return;
            }
            match remote.fetch_countries().await {
                Ok(fresh) => {
                    local.replace_all(fresh).await;
                    let refreshed = local.countries(&query).await;
                    let _ = tx.send(Ok(refreshed)).await;
                }
                Err(error) => {
                    tracing::warn!(%error, query = %query, "country refresh failed");
                    let _ = tx.send(Err(error)).await;
                }
            }
        });
        rx
    }

    /// Look up one country by ISO code in the cache.
    pub async fn get_country(&self, code: &str) -> Result<Country, CountryError> {
        self.local
            .country(code)
            .await
            .ok_or_else(|| CountryError::NotFound {
                code: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingApi;

    #[async_trait]
    impl CountryRemoteSource for FailingApi {
        async fn fetch_countries(&self) -> Result<Vec<Country>, CountryError> {
            Err(CountryError::RemoteUnavailable)
        }
    }

    fn seeded_cache() -> Arc<InMemoryCountryCache> {
        Arc::new(InMemoryCountryCache::seeded(vec![Country::new(
            "Egypt", "+20", "EG", "🇪🇬",
        )]))
    }

    #[tokio::test]
    async fn emits_cache_result_then_refreshed_result() {
        let repository = CountryRepository::new(
            seeded_cache(),
            Arc::new(StaticCountryApi::new(Duration::from_millis(1))),
        );

        let mut results = repository.get_countries("united");
        let cached = results.recv().await.unwrap().unwrap();
        assert!(cached.is_empty());

        let refreshed = results.recv().await.unwrap().unwrap();
        let names: Vec<&str> = refreshed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["United States", "United Kingdom"]);
        assert!(results.recv().await.is_none());
    }

    #[tokio::test]
    async fn refresh_writes_through_so_later_queries_hit_fresh_data() {
        let cache = seeded_cache();
        let repository = CountryRepository::new(
            cache.clone(),
            Arc::new(StaticCountryApi::new(Duration::from_millis(1))),
        );

        let mut results = repository.get_countries("");
        let _ = results.recv().await.unwrap().unwrap();
        let refreshed = results.recv().await.unwrap().unwrap();
        assert!(refreshed.len() > 1);

        // A follow-up cache read sees the refreshed set without a fetch.
        assert_eq!(cache.countries("jap").await.len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_the_cache_emission_standing() {
        let cache = seeded_cache();
        let repository = CountryRepository::new(cache.clone(), Arc::new(FailingApi));

        let mut results = repository.get_countries("eg");
        let cached = results.recv().await.unwrap().unwrap();
        assert_eq!(cached.len(), 1);

        assert!(results.recv().await.unwrap().is_err());
        assert_eq!(cache.countries("eg").await.len(), 1);
    }

    #[tokio::test]
    async fn get_country_reports_missing_codes() {
        let repository = CountryRepository::new(seeded_cache(), Arc::new(FailingApi));
        assert!(repository.get_country("EG").await.is_ok());
        assert!(matches!(
            repository.get_country("ZZ").await,
            Err(CountryError::NotFound { .. })
        ));
    }

    #[test]
    fn query_matching_covers_name_code_and_dial_prefix() {
        let egypt = Country::new("Egypt", "+20", "EG", "🇪🇬");
        assert!(matches(&egypt, ""));
        assert!(matches(&egypt, "egy"));
        assert!(matches(&egypt, "eg"));
        assert!(matches(&egypt, "20"));
        assert!(!matches(&egypt, "france"));
    }
}
