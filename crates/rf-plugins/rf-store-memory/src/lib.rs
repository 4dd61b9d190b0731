//! # rf-store-memory
//!
//! In-process implementation of `ThreadStore` and `UserDirectory`.
//! Nothing survives a restart; used for tests and throwaway dev runs.
//! Each kind gets its own map, mirroring one collection per kind.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rf_core::error::{AppError, Result};
use rf_core::models::{Page, PageRequest, Thread, ThreadFilter, ThreadId, UserId, UserProfile};
use rf_core::traits::{ThreadStore, UserDirectory};
use rf_core::ThreadKind;
use tracing::debug;

#[derive(Default)]
pub struct MemoryThreadStore {
    questions: DashMap<ThreadId, Thread>,
    discussions: DashMap<ThreadId, Thread>,
    faqs: DashMap<ThreadId, Thread>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, kind: ThreadKind) -> &DashMap<ThreadId, Thread> {
        match kind {
            ThreadKind::Question => &self.questions,
            ThreadKind::Discussion => &self.discussions,
            ThreadKind::Faq => &self.faqs,
        }
    }

    /// Unconditional overwrite, ignoring versions. Models a naive
    /// last-write-wins backend.
    pub fn overwrite(&self, kind: ThreadKind, thread: Thread) {
        self.collection(kind).insert(thread.id, thread);
    }
}

fn filter_matches(filter: &ThreadFilter, thread: &Thread) -> bool {
    let author_ok = filter.author.map_or(true, |a| a == thread.author);
    let tags_ok = filter.tags.is_empty() || filter.tags.iter().any(|t| thread.tags.contains(t));
    author_ok && tags_ok
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn find_by_id(&self, kind: ThreadKind, id: ThreadId) -> Result<Option<Thread>> {
        Ok(self.collection(kind).get(&id).map(|t| t.clone()))
    }

    async fn find_many(&self, kind: ThreadKind, filter: &ThreadFilter, page: PageRequest) -> Result<Page<Thread>> {
        let mut hits: Vec<Thread> = self
            .collection(kind)
            .iter()
            .filter(|entry| filter_matches(filter, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        hits.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));

        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn insert(&self, kind: ThreadKind, thread: &Thread) -> Result<()> {
        match self.collection(kind).entry(thread.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("{} {} already exists", kind, thread.id))),
            Entry::Vacant(slot) => {
                slot.insert(thread.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, kind: ThreadKind, thread: &Thread, expected_version: u64) -> Result<()> {
        // get_mut holds the shard lock, so compare-and-swap is atomic per document
        let mut stored = self
            .collection(kind)
            .get_mut(&thread.id)
            .ok_or_else(|| AppError::not_found(ThreadId::ENTITY, thread.id))?;
        if stored.version != expected_version {
            return Err(AppError::Conflict(format!(
                "{} {} is at version {}, expected {}",
                kind, thread.id, stored.version, expected_version
            )));
        }
        *stored = thread.clone();
        debug!(%kind, id = %thread.id, version = thread.version, "saved thread");
        Ok(())
    }

    async fn delete(&self, kind: ThreadKind, id: ThreadId) -> Result<bool> {
        Ok(self.collection(kind).remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: DashMap<UserId, UserProfile>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, user: UserProfile) {
        self.users.insert(user.id, user);
    }

    /// Simulates account deletion.
    pub fn remove(&self, id: UserId) -> Option<UserProfile> {
        self.users.remove(&id).map(|(_, user)| user)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserProfile>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().username == username)
            .map(|entry| entry.value().clone()))
    }
}
