//! TTL-bounded settings cache with single-flight refresh.
//!
//! A single cache instance is shared by every concurrent request. The
//! snapshot is immutable once published; the only writer is the
//! refresh path, and the single-flight lock prevents two refreshes
//! from racing. Settings changes therefore propagate to the gates
//! within one TTL window without hitting the backing store on every
//! request, and an explicit `invalidate()` after an admin update makes
//! them propagate immediately.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use peerloop_types::settings::SecuritySettingsSnapshot;
use peerloop_types::settings_adapter::SettingsAdapter;

use crate::prelude::*;

/// What the cache could produce for a caller. Making staleness and
/// unavailability explicit lets each gate decide its fail-open /
/// fail-closed policy deliberately instead of via a blanket catch.
#[derive(Debug)]
pub enum CacheResult {
	/// Snapshot within its TTL window
	Fresh(Arc<SecuritySettingsSnapshot>),
	/// Expired snapshot served because a refresh failed or timed out
	Stale(Arc<SecuritySettingsSnapshot>),
	/// No snapshot was ever populated and the fetch failed
	Unavailable(Error),
}

impl CacheResult {
	pub fn snapshot(&self) -> Option<&Arc<SecuritySettingsSnapshot>> {
		match self {
			CacheResult::Fresh(snapshot) | CacheResult::Stale(snapshot) => Some(snapshot),
			CacheResult::Unavailable(_) => None,
		}
	}
}

struct CacheEntry {
	snapshot: Arc<SecuritySettingsSnapshot>,
	valid_until: Instant,
}

pub struct SettingsCache {
	adapter: Arc<dyn SettingsAdapter>,
	entry: RwLock<Option<CacheEntry>>,
	ttl: RwLock<Duration>,
	wait_timeout: Duration,
	/// Single-flight refresh lock. Holding it while fetching means
	/// concurrent expired-cache readers wait for the in-flight fetch
	/// instead of issuing duplicates.
	flight: Mutex<()>,
}

impl SettingsCache {
	pub fn new(adapter: Arc<dyn SettingsAdapter>, ttl: Duration, wait_timeout: Duration) -> Self {
		Self {
			adapter,
			entry: RwLock::new(None),
			ttl: RwLock::new(ttl),
			wait_timeout,
			flight: Mutex::new(()),
		}
	}

	/// Current snapshot, refreshing through the adapter when the TTL
	/// has expired. See `CacheResult` for the possible outcomes.
	pub async fn get(&self) -> CacheResult {
		if let Some(snapshot) = self.fresh() {
			return CacheResult::Fresh(snapshot);
		}

		match tokio::time::timeout(self.wait_timeout, self.flight.lock()).await {
			Ok(_guard) => {
				// A refresh may have completed while we waited for the lock
				if let Some(snapshot) = self.fresh() {
					return CacheResult::Fresh(snapshot);
				}

				match self.adapter.fetch_security_settings().await {
					Ok(snapshot) => {
						let snapshot = Arc::new(snapshot.normalized());
						self.store(snapshot.clone());
						debug!("security settings refreshed");
						CacheResult::Fresh(snapshot)
					}
					Err(err) => match self.any() {
						Some(snapshot) => {
							warn!("settings fetch failed, serving stale snapshot: {}", err);
							CacheResult::Stale(snapshot)
						}
						None => CacheResult::Unavailable(err),
					},
				}
			}
			Err(_elapsed) => match self.any() {
				Some(snapshot) => {
					warn!("timed out waiting for in-flight settings refresh, serving cached snapshot");
					CacheResult::Stale(snapshot)
				}
				None => CacheResult::Unavailable(Error::SettingsUnavailable(
					"timed out waiting for in-flight settings refresh".into(),
				)),
			},
		}
	}

	/// Clear the cached entry and its expiry. Does not fetch; the next
	/// `get()` does. Called after an admin persists a settings change.
	pub fn invalidate(&self) {
		*self.entry.write() = None;
		debug!("settings cache invalidated");
	}

	/// Reconfigure the cache window without invalidating the current
	/// entry. Takes effect on the next successful refresh.
	pub fn set_ttl(&self, ttl: Duration) {
		*self.ttl.write() = ttl;
	}

	fn fresh(&self) -> Option<Arc<SecuritySettingsSnapshot>> {
		let entry = self.entry.read();
		entry
			.as_ref()
			.filter(|e| Instant::now() < e.valid_until)
			.map(|e| e.snapshot.clone())
	}

	/// Cached snapshot regardless of expiry
	fn any(&self) -> Option<Arc<SecuritySettingsSnapshot>> {
		self.entry.read().as_ref().map(|e| e.snapshot.clone())
	}

	fn store(&self, snapshot: Arc<SecuritySettingsSnapshot>) {
		let ttl = *self.ttl.read();
		*self.entry.write() = Some(CacheEntry { snapshot, valid_until: Instant::now() + ttl });
	}
}

impl std::fmt::Debug for SettingsCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingsCache")
			.field("ttl", &*self.ttl.read())
			.field("wait_timeout", &self.wait_timeout)
			.field("populated", &self.entry.read().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use peerloop_types::settings::{IpAllowList, SecuritySettingsSnapshot};
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

	/// Adapter that counts fetches and can be told to fail or stall
	#[derive(Debug, Default)]
	struct TestAdapter {
		fetches: AtomicUsize,
		fail: AtomicBool,
		delay: RwLock<Option<Duration>>,
	}

	impl TestAdapter {
		fn fetch_count(&self) -> usize {
			self.fetches.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl SettingsAdapter for TestAdapter {
		async fn fetch_security_settings(&self) -> PlResult<SecuritySettingsSnapshot> {
			self.fetches.fetch_add(1, Ordering::SeqCst);
			let delay = *self.delay.read();
			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}
			if self.fail.load(Ordering::SeqCst) {
				return Err(Error::Internal("settings store unreachable".into()));
			}
			Ok(SecuritySettingsSnapshot {
				ip_allow_list: IpAllowList { enabled: true, entries: vec!["10.0.0.1".into()] },
				..Default::default()
			})
		}

		async fn update_security_settings(&self, _snapshot: SecuritySettingsSnapshot) -> PlResult<()> {
			Ok(())
		}
	}

	fn cache_with(adapter: Arc<TestAdapter>) -> SettingsCache {
		SettingsCache::new(adapter, Duration::from_secs(30), Duration::from_secs(5))
	}

	#[tokio::test]
	async fn test_second_read_within_ttl_hits_cache() {
		let adapter = Arc::new(TestAdapter::default());
		let cache = cache_with(adapter.clone());

		let first = cache.get().await;
		let second = cache.get().await;

		assert_eq!(adapter.fetch_count(), 1);
		let (first, second) = (first.snapshot().unwrap(), second.snapshot().unwrap());
		assert!(Arc::ptr_eq(first, second));
	}

	#[tokio::test(start_paused = true)]
	async fn test_expiry_triggers_refresh() {
		let adapter = Arc::new(TestAdapter::default());
		let cache = cache_with(adapter.clone());

		assert!(matches!(cache.get().await, CacheResult::Fresh(_)));
		tokio::time::advance(Duration::from_secs(31)).await;
		assert!(matches!(cache.get().await, CacheResult::Fresh(_)));
		assert_eq!(adapter.fetch_count(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_set_ttl_does_not_invalidate() {
		let adapter = Arc::new(TestAdapter::default());
		let cache = cache_with(adapter.clone());

		cache.get().await;
		cache.set_ttl(Duration::from_secs(300));
		tokio::time::advance(Duration::from_secs(31)).await;

		// Old entry still carries the original 30s window, so this refreshes...
		cache.get().await;
		assert_eq!(adapter.fetch_count(), 2);

		// ...but the refreshed entry now lives under the longer TTL
		tokio::time::advance(Duration::from_secs(200)).await;
		cache.get().await;
		assert_eq!(adapter.fetch_count(), 2);
	}

	#[tokio::test]
	async fn test_invalidate_forces_refetch() {
		let adapter = Arc::new(TestAdapter::default());
		let cache = cache_with(adapter.clone());

		cache.get().await;
		cache.invalidate();
		cache.get().await;

		assert_eq!(adapter.fetch_count(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_stale_served_on_fetch_failure() {
		let adapter = Arc::new(TestAdapter::default());
		let cache = cache_with(adapter.clone());

		cache.get().await;
		adapter.fail.store(true, Ordering::SeqCst);
		tokio::time::advance(Duration::from_secs(31)).await;

		let result = cache.get().await;
		assert!(matches!(result, CacheResult::Stale(_)));
		assert!(result.snapshot().unwrap().ip_allow_list.enabled);
	}

	#[tokio::test]
	async fn test_unavailable_when_never_populated() {
		let adapter = Arc::new(TestAdapter { fail: AtomicBool::new(true), ..Default::default() });
		let cache = cache_with(adapter.clone());

		assert!(matches!(cache.get().await, CacheResult::Unavailable(_)));
	}

	#[tokio::test(start_paused = true)]
	async fn test_single_flight_refresh() {
		let adapter = Arc::new(TestAdapter {
			delay: RwLock::new(Some(Duration::from_millis(100))),
			..Default::default()
		});
		let cache = Arc::new(cache_with(adapter.clone()));

		let mut tasks = Vec::new();
		for _ in 0..8 {
			let cache = cache.clone();
			tasks.push(tokio::spawn(async move { cache.get().await }));
		}
		for task in tasks {
			let result = task.await.unwrap();
			assert!(result.snapshot().is_some());
		}

		// all eight concurrent expired-cache readers shared one fetch
		assert_eq!(adapter.fetch_count(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_timeout_serves_stale_entry() {
		let adapter = Arc::new(TestAdapter::default());
		let cache = Arc::new(cache_with(adapter.clone()));

		cache.get().await;
		*adapter.delay.write() = Some(Duration::from_secs(60));
		tokio::time::advance(Duration::from_secs(31)).await;

		// refresher takes the flight lock and stalls in the fetch
		let _refresher = {
			let cache = cache.clone();
			tokio::spawn(async move { cache.get().await })
		};
		tokio::task::yield_now().await;

		let waiter = cache.get().await;
		assert!(matches!(waiter, CacheResult::Stale(_)));
		assert!(waiter.snapshot().unwrap().ip_allow_list.enabled);
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_timeout_unavailable_when_never_populated() {
		let adapter = Arc::new(TestAdapter {
			delay: RwLock::new(Some(Duration::from_secs(60))),
			..Default::default()
		});
		let cache = Arc::new(cache_with(adapter.clone()));

		let _refresher = {
			let cache = cache.clone();
			tokio::spawn(async move { cache.get().await })
		};
		tokio::task::yield_now().await;

		// the waiter gives up on the in-flight fetch with nothing cached to fall back on
		assert!(matches!(cache.get().await, CacheResult::Unavailable(_)));
		assert_eq!(adapter.fetch_count(), 1);
	}
}

// vim: ts=4
