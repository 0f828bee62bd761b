//! Repository access cache
//!
//! Caches trust verdicts per `(owner, repo, username)` for a fixed TTL and
//! collapses concurrent lookups of the same key into one upstream query.
//!
//! Per key the cache moves through:
//!
//! ```text
//! Absent ──► Pending ──► Resolved ──(ttl)──► Expired ──► Pending ...
//!               │
//!               └──(lookup error)──► Absent
//! ```
//!
//! Verdicts live in a bounded `moka` cache, which owns expiry and eviction.
//! The upstream query runs on its own task. Callers only await a shared handle
//! to it, so a caller that gives up never aborts the query for the others and
//! the verdict is still written to the cache.

use crate::error::LockdownError;
use crate::lockdown::lookup::PermissionLookup;
use crate::lockdown::policy;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use moka::sync::Cache;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Default upper bound on cached verdicts
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Longest TTL a verdict may be kept for; longer values are clamped
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

type LookupOutcome = Result<bool, LockdownError>;
type SharedLookup = Shared<BoxFuture<'static, LookupOutcome>>;
type InFlight = Mutex<HashMap<CacheKey, SharedLookup>>;

/// Normalized cache key.
///
/// GitHub logins and repository names are case-insensitive, so all three
/// parts are lowercased here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub owner: String,
    pub repo: String,
    pub username: String,
}

impl CacheKey {
    pub fn new(owner: &str, repo: &str, username: &str) -> Self {
        Self {
            owner: owner.to_lowercase(),
            repo: repo.to_lowercase(),
            username: username.to_lowercase(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.username)
    }
}

enum Pending {
    Cached(bool),
    Waiting(SharedLookup),
}

/// Removes the in-flight registration of a key when the lookup task ends,
/// including by panic.
struct Registration<'a> {
    in_flight: &'a InFlight,
    key: &'a CacheKey,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        lock(self.in_flight).remove(self.key);
    }
}

// Critical sections are plain map operations; a poisoned lock holds no
// half-written state.
fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<CacheKey, SharedLookup>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

struct CacheState {
    lookup: Arc<dyn PermissionLookup>,
    ttl: Duration,
    max_entries: usize,
    entries: Cache<CacheKey, bool>,
    in_flight: InFlight,
}

impl CacheState {
    /// Attach to the in-flight lookup for `key`, or start one.
    fn join_or_start(self: &Arc<Self>, key: CacheKey) -> Pending {
        let mut in_flight = lock(&self.in_flight);

        // A leader may have finished between the fast path and taking the lock
        if let Some(safe) = self.entries.get(&key) {
            return Pending::Cached(safe);
        }

        if let Some(existing) = in_flight.get(&key) {
            debug!(key = %key, "Joining in-flight permission lookup");
            return Pending::Waiting(existing.clone());
        }

        debug!(key = %key, "Starting permission lookup");
        let handle = tokio::spawn(Arc::clone(self).resolve(key.clone()));

        let task_key = key.clone();
        let shared = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => {
                    warn!(key = %task_key, "Permission lookup panicked");
                    Err(LockdownError::LookupPanicked)
                }
                // Runtime shutting down
                Err(_) => Err(LockdownError::Cancelled),
            }
        }
        .boxed()
        .shared();

        in_flight.insert(key, shared.clone());
        Pending::Waiting(shared)
    }

    /// Runs on its own task: query, evaluate, record, deregister.
    async fn resolve(self: Arc<Self>, key: CacheKey) -> LookupOutcome {
        // Dropped last, so the verdict is stored before the registration goes
        // away and a caller missing one always finds the other.
        let _registration = Registration {
            in_flight: &self.in_flight,
            key: &key,
        };

        match self.lookup.lookup(&key.owner, &key.repo, &key.username).await {
            Ok(permission) => {
                let safe = policy::is_safe(permission.is_private, permission.permission);
                self.entries.insert(key.clone(), safe);
                debug!(
                    key = %key,
                    is_private = permission.is_private,
                    permission = %permission.permission,
                    safe,
                    "Cached content trust verdict"
                );
                Ok(safe)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Permission lookup failed");
                Err(LockdownError::Lookup(Arc::new(e)))
            }
        }
    }
}

/// TTL cache of content trust verdicts.
///
/// Built once at startup and handed to every request; cloning is cheap and
/// clones share state.
#[derive(Clone)]
pub struct RepoAccessCache {
    state: Arc<CacheState>,
}

impl RepoAccessCache {
    pub fn new(lookup: Arc<dyn PermissionLookup>, ttl: Duration) -> Self {
        Self::with_max_entries(lookup, ttl, DEFAULT_MAX_ENTRIES)
    }

    /// `max_entries` is clamped to at least 1 and `ttl` to at most [`MAX_TTL`].
    pub fn with_max_entries(
        lookup: Arc<dyn PermissionLookup>,
        ttl: Duration,
        max_entries: usize,
    ) -> Self {
        if ttl > MAX_TTL {
            warn!(?ttl, max = ?MAX_TTL, "Access cache TTL too long, clamping");
        }
        let ttl = ttl.min(MAX_TTL);
        let max_entries = max_entries.max(1);

        let entries = Cache::builder()
            .max_capacity(max_entries as u64)
            .time_to_live(ttl)
            .build();

        Self {
            state: Arc::new(CacheState {
                lookup,
                ttl,
                max_entries,
                entries,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.state.ttl
    }

    /// Number of unexpired verdicts
    pub fn len(&self) -> usize {
        self.state.entries.run_pending_tasks();
        self.state.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a fresh verdict exists for the key (no lookup is triggered)
    pub fn contains(&self, username: &str, owner: &str, repo: &str) -> bool {
        self.state
            .entries
            .contains_key(&CacheKey::new(owner, repo, username))
    }

    /// Drop expired verdicts now instead of on the cache's next maintenance
    pub fn purge_expired(&self) {
        self.state.entries.run_pending_tasks();
    }

    /// Whether content authored by `username` in `owner/repo` may be shown.
    ///
    /// Lookup failures are returned to every waiting caller and never cached.
    /// Cancelling `ct` detaches this caller only.
    #[instrument(skip(self, ct), fields(owner = %owner, repo = %repo, username = %username))]
    pub async fn is_safe_content(
        &self,
        ct: &CancellationToken,
        username: &str,
        owner: &str,
        repo: &str,
    ) -> Result<bool, LockdownError> {
        let key = CacheKey::new(owner, repo, username);

        if let Some(safe) = self.state.entries.get(&key) {
            debug!(safe, "Access cache hit");
            return Ok(safe);
        }

        let shared = match self.state.join_or_start(key) {
            Pending::Cached(safe) => return Ok(safe),
            Pending::Waiting(shared) => shared,
        };

        tokio::select! {
            biased;
            _ = ct.cancelled() => Err(LockdownError::Cancelled),
            outcome = shared => outcome,
        }
    }
}

impl fmt::Debug for RepoAccessCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoAccessCache")
            .field("ttl", &self.state.ttl)
            .field("max_entries", &self.state.max_entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GitHubError, GitHubResult};
    use crate::lockdown::lookup::RepoPermission;
    use crate::lockdown::policy::PermissionLevel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    /// Scripted lookup that counts upstream calls
    #[derive(Default)]
    struct FakeLookup {
        calls: AtomicUsize,
        failures_left: AtomicUsize,
        delay: Duration,
        repos: HashMap<(String, String), (bool, HashMap<String, PermissionLevel>)>,
    }

    impl FakeLookup {
        fn seeded() -> Self {
            let mut repos = HashMap::new();
            repos.insert(
                ("owner".to_string(), "repo".to_string()),
                (
                    false,
                    HashMap::from([
                        ("testuser".to_string(), PermissionLevel::Read),
                        ("maintainer".to_string(), PermissionLevel::Write),
                        ("admin".to_string(), PermissionLevel::Admin),
                    ]),
                ),
            );
            repos.insert(
                ("owner2".to_string(), "repo2".to_string()),
                (true, HashMap::new()),
            );
            Self {
                repos,
                ..Default::default()
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn failing_first(self, n: usize) -> Self {
            self.failures_left.store(n, Ordering::SeqCst);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PermissionLookup for FakeLookup {
        async fn lookup(
            &self,
            owner: &str,
            repo: &str,
            username: &str,
        ) -> GitHubResult<RepoPermission> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(GitHubError::Api {
                    status: 502,
                    message: "bad gateway".to_string(),
                });
            }

            let (is_private, collaborators) = self
                .repos
                .get(&(owner.to_string(), repo.to_string()))
                .ok_or_else(|| GitHubError::NotFound {
                    resource: format!("repository {}/{}", owner, repo),
                })?;

            Ok(RepoPermission {
                is_private: *is_private,
                permission: collaborators
                    .get(username)
                    .copied()
                    .unwrap_or(PermissionLevel::None),
            })
        }
    }

    fn cache_with(lookup: &Arc<FakeLookup>) -> RepoAccessCache {
        RepoAccessCache::new(lookup.clone(), TTL)
    }

    #[tokio::test]
    async fn test_private_repo_is_safe_without_collaborator_edge() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = cache_with(&lookup);
        let ct = CancellationToken::new();

        let safe = cache
            .is_safe_content(&ct, "testuser2", "owner2", "repo2")
            .await
            .unwrap();
        assert!(safe);
    }

    #[tokio::test]
    async fn test_public_repo_write_threshold() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = cache_with(&lookup);
        let ct = CancellationToken::new();

        assert!(!cache.is_safe_content(&ct, "testuser", "owner", "repo").await.unwrap());
        assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        assert!(cache.is_safe_content(&ct, "admin", "owner", "repo").await.unwrap());
        assert!(!cache.is_safe_content(&ct, "stranger", "owner", "repo").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = cache_with(&lookup);
        let ct = CancellationToken::new();

        for _ in 0..5 {
            assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        }
        assert_eq!(lookup.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_case_insensitive() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = cache_with(&lookup);
        let ct = CancellationToken::new();

        assert!(cache.is_safe_content(&ct, "Maintainer", "OWNER", "Repo").await.unwrap());
        assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        assert!(cache.contains("MAINTAINER", "owner", "REPO"));
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_share_one_lookup() {
        let lookup = Arc::new(FakeLookup::seeded().with_delay(Duration::from_millis(100)));
        let cache = cache_with(&lookup);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let ct = CancellationToken::new();
                    cache.is_safe_content(&ct, "testuser", "owner", "repo").await
                })
            })
            .collect();

        for handle in handles {
            assert!(!handle.await.unwrap().unwrap());
        }
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_new_lookup() {
        let ttl = Duration::from_millis(100);
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = RepoAccessCache::new(lookup.clone(), ttl);
        let ct = CancellationToken::new();

        cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap();
        cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap();
        assert_eq!(lookup.calls(), 1);

        tokio::time::sleep(ttl + Duration::from_millis(50)).await;
        assert!(!cache.contains("maintainer", "owner", "repo"));
        cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap();
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test]
    async fn test_lookup_errors_are_not_cached() {
        let lookup = Arc::new(FakeLookup::seeded().failing_first(1));
        let cache = cache_with(&lookup);
        let ct = CancellationToken::new();

        let err = cache
            .is_safe_content(&ct, "maintainer", "owner", "repo")
            .await
            .unwrap_err();
        assert!(matches!(err, LockdownError::Lookup(_)));
        assert!(cache.is_empty());

        assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        assert_eq!(lookup.calls(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_repository_error_retried_on_next_call() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = cache_with(&lookup);
        let ct = CancellationToken::new();

        for _ in 0..2 {
            let err = cache
                .is_safe_content(&ct, "x", "owner", "nonexistent-repo")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("nonexistent-repo"));
        }
        assert!(!cache.contains("x", "owner", "nonexistent-repo"));
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_share_the_error() {
        let lookup = Arc::new(
            FakeLookup::seeded()
                .with_delay(Duration::from_millis(50))
                .failing_first(1),
        );
        let cache = cache_with(&lookup);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let ct = CancellationToken::new();
                    cache.is_safe_content(&ct, "maintainer", "owner", "repo").await
                })
            })
            .collect();

        for handle in handles {
            assert!(matches!(
                handle.await.unwrap(),
                Err(LockdownError::Lookup(_))
            ));
        }
        assert_eq!(lookup.calls(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_caller_does_not_abort_lookup_for_others() {
        let lookup = Arc::new(FakeLookup::seeded().with_delay(Duration::from_millis(100)));
        let cache = cache_with(&lookup);

        let leader_ct = CancellationToken::new();
        let leader = {
            let cache = cache.clone();
            let ct = leader_ct.clone();
            tokio::spawn(async move { cache.is_safe_content(&ct, "maintainer", "owner", "repo").await })
        };
        let follower = {
            let cache = cache.clone();
            tokio::spawn(async move {
                let ct = CancellationToken::new();
                cache.is_safe_content(&ct, "maintainer", "owner", "repo").await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        leader_ct.cancel();

        assert!(matches!(
            leader.await.unwrap(),
            Err(LockdownError::Cancelled)
        ));
        assert!(follower.await.unwrap().unwrap());
        assert_eq!(lookup.calls(), 1);
        assert!(cache.contains("maintainer", "owner", "repo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_completes_after_every_caller_cancelled() {
        let lookup = Arc::new(FakeLookup::seeded().with_delay(Duration::from_millis(100)));
        let cache = cache_with(&lookup);

        let ct = CancellationToken::new();
        let call = {
            let cache = cache.clone();
            let ct = ct.clone();
            tokio::spawn(async move { cache.is_safe_content(&ct, "testuser", "owner", "repo").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        ct.cancel();
        assert!(matches!(call.await.unwrap(), Err(LockdownError::Cancelled)));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.contains("testuser", "owner", "repo"));

        let fresh = CancellationToken::new();
        assert!(!cache.is_safe_content(&fresh, "testuser", "owner", "repo").await.unwrap());
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_eviction_keeps_cache_bounded() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = RepoAccessCache::with_max_entries(lookup.clone(), TTL, 2);
        let ct = CancellationToken::new();

        cache.is_safe_content(&ct, "testuser", "owner", "repo").await.unwrap();
        cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap();
        cache.is_safe_content(&ct, "admin", "owner", "repo").await.unwrap();

        assert!(cache.len() <= 2);
        assert_eq!(lookup.calls(), 3);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let ttl = Duration::from_millis(100);
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = RepoAccessCache::new(lookup.clone(), ttl);
        let ct = CancellationToken::new();

        cache.is_safe_content(&ct, "testuser", "owner", "repo").await.unwrap();
        cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap();
        cache.purge_expired();
        assert_eq!(cache.len(), 2);

        tokio::time::sleep(ttl + Duration::from_millis(50)).await;
        cache.purge_expired();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let lookup = Arc::new(FakeLookup::seeded());
        let cache = RepoAccessCache::new(lookup.clone(), Duration::from_secs(u64::MAX));
        let ct = CancellationToken::new();

        assert_eq!(cache.ttl(), MAX_TTL);
        assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        assert_eq!(lookup.calls(), 1);
    }

    /// Panics on the first call, answers WRITE afterwards
    #[derive(Default)]
    struct PanicOnceLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PermissionLookup for PanicOnceLookup {
        async fn lookup(
            &self,
            _owner: &str,
            _repo: &str,
            _username: &str,
        ) -> GitHubResult<RepoPermission> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("lookup blew up");
            }
            Ok(RepoPermission {
                is_private: false,
                permission: PermissionLevel::Write,
            })
        }
    }

    #[tokio::test]
    async fn test_panicking_lookup_does_not_wedge_key() {
        let lookup = Arc::new(PanicOnceLookup::default());
        let cache = RepoAccessCache::new(lookup.clone(), TTL);
        let ct = CancellationToken::new();

        let err = cache
            .is_safe_content(&ct, "maintainer", "owner", "repo")
            .await
            .unwrap_err();
        assert!(matches!(err, LockdownError::LookupPanicked));

        assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }
}
