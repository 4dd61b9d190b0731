//! # ForumService
//!
//! The boundary the HTTP layer calls. Every mutation runs the same explicit
//! pipeline:
//!
//! 1. load the whole aggregate for `(kind, id)`
//! 2. mutate it in memory
//! 3. persist it in one versioned write
//! 4. resolve authors into the returned view
//!
//! Steps 1-3 repeat when the write loses an optimistic-concurrency race,
//! up to `max_write_attempts` times. Callers are assumed to be
//! authenticated and authorized already.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aggregate::validate_vote;
use crate::error::{AppError, Result};
use crate::kind::ThreadKind;
use crate::models::{AnswerId, CommentId, NewThread, Page, PageRequest, Thread, ThreadFilter, ThreadId, UserId};
use crate::population::AuthorResolver;
use crate::registry::ThreadRegistry;
use crate::traits::{ThreadStore, UserDirectory};
use crate::view::ThreadView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub max_write_attempts: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self { max_write_attempts: 3, default_page_size: 20, max_page_size: 100 }
    }
}

#[derive(Clone)]
pub struct ForumService {
    registry: ThreadRegistry,
    resolver: AuthorResolver,
    directory: Arc<dyn UserDirectory>,
    options: ServiceOptions,
}

impl ForumService {
    pub fn new(store: Arc<dyn ThreadStore>, directory: Arc<dyn UserDirectory>, options: ServiceOptions) -> Self {
        Self {
            registry: ThreadRegistry::new(store),
            resolver: AuthorResolver::new(directory.clone()),
            directory,
            options,
        }
    }

    pub fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &AuthorResolver {
        &self.resolver
    }

    /// Clamps a caller-supplied page request to the configured bounds.
    pub fn page_request(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        let limit = limit
            .unwrap_or(self.options.default_page_size)
            .clamp(1, self.options.max_page_size);
        PageRequest::new(page.unwrap_or(1), limit)
    }

    // -- Reads --

    /// Side-effect free load; does not count a view.
    pub async fn load_thread(&self, kind: ThreadKind, id: &str) -> Result<ThreadView> {
        let thread = self.registry.handle(kind).load(id).await?;
        Ok(self.resolver.resolve(&thread).await)
    }

    /// Load for display: counts one view.
    pub async fn show_thread(&self, kind: ThreadKind, id: &str) -> Result<ThreadView> {
        self.mutate(kind, id, |t| {
            t.record_view();
            Ok(())
        })
        .await
    }

    pub async fn list_threads(
        &self,
        kind: ThreadKind,
        filter: &ThreadFilter,
        page: PageRequest,
    ) -> Result<Page<ThreadView>> {
        let page = self.registry.handle(kind).find_many(filter, page).await?;
        Ok(self.resolver.resolve_page(page).await)
    }

    pub async fn list_threads_by_username(
        &self,
        kind: ThreadKind,
        username: &str,
        page: PageRequest,
    ) -> Result<Page<ThreadView>> {
        let user = self
            .directory
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(UserId::ENTITY, username))?;
        let filter = ThreadFilter { author: Some(user.id), ..ThreadFilter::default() };
        self.list_threads(kind, &filter, page).await
    }

    // -- Thread lifecycle --

    pub async fn create_thread(&self, kind: ThreadKind, author: UserId, fields: NewThread) -> Result<ThreadView> {
        let thread = Thread::new(kind, author, fields);
        self.registry.handle(kind).insert(&thread).await?;
        info!(%kind, id = %thread.id, %author, "thread created");
        Ok(self.resolver.resolve(&thread).await)
    }

    pub async fn delete_thread(&self, kind: ThreadKind, id: &str) -> Result<()> {
        let id = ThreadId::parse(id)?;
        self.registry.handle(kind).delete(id).await?;
        info!(%kind, %id, "thread deleted");
        Ok(())
    }

    // -- Mutations --

    pub async fn vote(&self, kind: ThreadKind, thread: &str, user: UserId, value: i64) -> Result<ThreadView> {
        let value = i64::from(validate_vote(value)?);
        self.mutate(kind, thread, |t| t.vote(user, value).map(|_| ())).await
    }

    pub async fn add_comment(&self, kind: ThreadKind, thread: &str, author: UserId, body: &str) -> Result<ThreadView> {
        self.mutate(kind, thread, |t| {
            t.add_comment(author, body);
            Ok(())
        })
        .await
    }

    pub async fn remove_comment(&self, kind: ThreadKind, thread: &str, comment: &str) -> Result<ThreadView> {
        let comment = CommentId::parse(comment)?;
        self.mutate(kind, thread, |t| t.remove_comment(comment).map(|_| ())).await
    }

    pub async fn add_answer(&self, kind: ThreadKind, thread: &str, author: UserId, text: &str) -> Result<ThreadView> {
        self.mutate(kind, thread, |t| {
            t.add_answer(author, text);
            Ok(())
        })
        .await
    }

    pub async fn remove_answer(&self, kind: ThreadKind, thread: &str, answer: &str) -> Result<ThreadView> {
        let answer = AnswerId::parse(answer)?;
        self.mutate(kind, thread, |t| t.remove_answer(answer).map(|_| ())).await
    }

    pub async fn add_answer_comment(
        &self,
        kind: ThreadKind,
        thread: &str,
        answer: &str,
        author: UserId,
        body: &str,
    ) -> Result<ThreadView> {
        let answer = AnswerId::parse(answer)?;
        self.mutate(kind, thread, |t| t.add_answer_comment(answer, author, body).map(|_| ()))
            .await
    }

    pub async fn remove_answer_comment(
        &self,
        kind: ThreadKind,
        thread: &str,
        answer: &str,
        comment: &str,
    ) -> Result<ThreadView> {
        let answer = AnswerId::parse(answer)?;
        let comment = CommentId::parse(comment)?;
        self.mutate(kind, thread, |t| t.remove_answer_comment(answer, comment).map(|_| ()))
            .await
    }

    /// `load -> mutate -> persist -> resolve`, retried on write conflicts.
    /// A failing mutation leaves nothing persisted.
    async fn mutate<F>(&self, kind: ThreadKind, id: &str, mut apply: F) -> Result<ThreadView>
    where
        F: FnMut(&mut Thread) -> Result<()> + Send,
    {
        let id = ThreadId::parse(id)?;
        let handle = self.registry.handle(kind);
        let attempts = self.options.max_write_attempts.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut thread = handle.load_by_id(id).await?;
            apply(&mut thread)?;

            match handle.save(&mut thread).await {
                Ok(()) => {
                    debug!(%kind, %id, version = thread.version, score = thread.score, "thread persisted");
                    return Ok(self.resolver.resolve(&thread).await);
                }
                Err(AppError::Conflict(reason)) if attempt < attempts => {
                    warn!(%kind, %id, attempt, %reason, "write conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
