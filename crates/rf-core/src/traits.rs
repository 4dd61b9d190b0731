//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::error::Result;
use crate::kind::ThreadKind;
use crate::models::{Page, PageRequest, Thread, ThreadFilter, ThreadId, UserId, UserProfile};

/// Document persistence for threads. One record per thread per kind; the
/// embedded votes, comments and answers travel with it in a single write.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn find_by_id(&self, kind: ThreadKind, id: ThreadId) -> Result<Option<Thread>>;

    /// Newest first.
    async fn find_many(&self, kind: ThreadKind, filter: &ThreadFilter, page: PageRequest) -> Result<Page<Thread>>;

    async fn insert(&self, kind: ThreadKind, thread: &Thread) -> Result<()>;

    /// Replaces the whole document iff the stored version still equals
    /// `expected_version`. A moved-on version is `AppError::Conflict`, a
    /// vanished document is `AppError::NotFound`.
    async fn save(&self, kind: ThreadKind, thread: &Thread, expected_version: u64) -> Result<()>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, kind: ThreadKind, id: ThreadId) -> Result<bool>;
}

/// Read-only view of the account collaborator, used by author resolution.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserProfile>>;

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserProfile>>;
}
