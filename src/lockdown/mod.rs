//! Lockdown mode
//!
//! Decides whether user-authored content may be handed to the agent. On a
//! public repository only content from collaborators with push access is
//! trusted; everything on a private repository is.
//!
//! ```toml
//! [lockdown]
//! enabled = true
//! cache_ttl_secs = 300
//! ```
//!
//! Verdicts are cached per `(owner, repo, author)` by [`RepoAccessCache`];
//! tools consult them through a per-request [`ContentFilter`].

pub mod cache;
pub mod filter;
pub mod lookup;
pub mod policy;

pub use cache::{CacheKey, MAX_TTL, RepoAccessCache};
pub use filter::ContentFilter;
pub use lookup::{PermissionLookup, RepoPermission};
pub use policy::{PermissionLevel, is_safe};
