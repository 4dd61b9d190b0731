//! # Thread Kind Registry
//!
//! Maps a kind token to the storage entry point for that variant so every
//! operation is written once against "a Thread".

use std::sync::Arc;

use tracing::debug;

use crate::error::{AppError, Result};
use crate::kind::ThreadKind;
use crate::models::{Page, PageRequest, Thread, ThreadFilter, ThreadId};
use crate::traits::ThreadStore;

#[derive(Clone)]
pub struct ThreadRegistry {
    store: Arc<dyn ThreadStore>,
}

/// A kind bound to its backing collection.
#[derive(Clone, Copy)]
pub struct KindHandle<'a> {
    kind: ThreadKind,
    store: &'a dyn ThreadStore,
}

impl ThreadRegistry {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self { store }
    }

    /// Resolves a kind token. Tokens outside the closed set are
    /// `UnknownKind`, a programming error.
    pub fn resolve(&self, token: &str) -> Result<KindHandle<'_>> {
        Ok(self.handle(token.parse()?))
    }

    pub fn handle(&self, kind: ThreadKind) -> KindHandle<'_> {
        KindHandle { kind, store: self.store.as_ref() }
    }
}

impl<'a> KindHandle<'a> {
    pub fn kind(&self) -> ThreadKind {
        self.kind
    }

    /// Malformed id is `InvalidId`, no match is `NotFound`.
    pub async fn load(&self, raw_id: &str) -> Result<Thread> {
        self.load_by_id(ThreadId::parse(raw_id)?).await
    }

    pub async fn load_by_id(&self, id: ThreadId) -> Result<Thread> {
        debug!(kind = %self.kind, %id, "loading thread");
        self.store
            .find_by_id(self.kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(ThreadId::ENTITY, id))
    }

    pub async fn find_many(&self, filter: &ThreadFilter, page: PageRequest) -> Result<Page<Thread>> {
        self.store.find_many(self.kind, filter, page).await
    }

    pub async fn insert(&self, thread: &Thread) -> Result<()> {
        self.store.insert(self.kind, thread).await
    }

    /// Persists the whole aggregate in one write, bumping its version.
    pub async fn save(&self, thread: &mut Thread) -> Result<()> {
        let expected = thread.version;
        thread.version = expected + 1;
        if let Err(e) = self.store.save(self.kind, thread, expected).await {
            thread.version = expected;
            return Err(e);
        }
        Ok(())
    }

    pub async fn delete(&self, id: ThreadId) -> Result<()> {
        if self.store.delete(self.kind, id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(ThreadId::ENTITY, id))
        }
    }
}
