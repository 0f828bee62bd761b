//! Per-request content gate used by tool handlers

use crate::error::{LockdownError, ToolError, ToolResult};
use crate::lockdown::cache::RepoAccessCache;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Login GitHub attributes content of deleted accounts to
const GHOST_LOGIN: &str = "ghost";

/// Decides which user-authored content a tool may return.
///
/// With lockdown mode off every check passes without touching the cache.
/// With lockdown mode on and no cache, every check fails.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    lockdown_mode: bool,
    cache: Option<Arc<RepoAccessCache>>,
    ct: CancellationToken,
}

impl ContentFilter {
    pub fn new(
        lockdown_mode: bool,
        cache: Option<Arc<RepoAccessCache>>,
        ct: CancellationToken,
    ) -> Self {
        Self {
            lockdown_mode,
            cache,
            ct,
        }
    }

    /// Filter that lets everything through
    pub fn disabled() -> Self {
        Self::new(false, None, CancellationToken::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.lockdown_mode
    }

    /// Whether content by `author` in `owner/repo` may be returned.
    ///
    /// A missing or empty author is checked as GitHub's ghost account: safe on
    /// private repositories, unsafe on public ones.
    pub async fn is_author_safe(
        &self,
        author: Option<&str>,
        owner: &str,
        repo: &str,
    ) -> Result<bool, LockdownError> {
        if !self.lockdown_mode {
            return Ok(true);
        }

        let cache = self.cache.as_ref().ok_or(LockdownError::NotConfigured)?;
        let login = author.filter(|a| !a.is_empty()).unwrap_or(GHOST_LOGIN);
        cache.is_safe_content(&self.ct, login, owner, repo).await
    }

    /// Gate for a single resource.
    pub async fn ensure_author_allowed(
        &self,
        author: Option<&str>,
        owner: &str,
        repo: &str,
        resource: &str,
    ) -> ToolResult<()> {
        if self.is_author_safe(author, owner, repo).await? {
            Ok(())
        } else {
            debug!(resource, author = ?author, "Blocked content from untrusted author");
            Err(ToolError::restricted(resource))
        }
    }

    /// Drop items whose author is not trusted, returning how many were removed.
    ///
    /// Each distinct author is checked once. Any lookup failure fails the
    /// whole call and leaves `items` untouched.
    pub async fn retain_safe<T, F>(
        &self,
        items: &mut Vec<T>,
        owner: &str,
        repo: &str,
        author_of: F,
    ) -> ToolResult<usize>
    where
        F: Fn(&T) -> Option<&str>,
    {
        if !self.lockdown_mode || items.is_empty() {
            return Ok(0);
        }

        let author_key = |item: &T| author_of(item).filter(|a| !a.is_empty()).map(str::to_lowercase);

        let mut authors: Vec<Option<String>> = items.iter().map(&author_key).collect();
        authors.sort();
        authors.dedup();

        let checks = authors.into_iter().map(|author| async move {
            let safe = self.is_author_safe(author.as_deref(), owner, repo).await?;
            Ok::<_, LockdownError>((author, safe))
        });
        let verdicts: HashMap<Option<String>, bool> =
            try_join_all(checks).await?.into_iter().collect();

        let before = items.len();
        items.retain(|item| verdicts.get(&author_key(item)).copied().unwrap_or(false));
        let removed = before - items.len();

        if removed > 0 {
            debug!(owner, repo, removed, "Omitted items from untrusted authors");
        }
        Ok(removed)
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::disabled()
    }
}
