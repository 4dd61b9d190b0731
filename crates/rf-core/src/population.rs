//! # Author Resolution
//!
//! Expands stored author references into profile projections at every
//! nesting level. Resolution only ever builds views; the stored Thread keeps
//! its bare `UserId` references.
//!
//! A reference that no longer resolves (deleted account, or a directory
//! lookup that failed) degrades to `author: null` for that one slot and the
//! rest of the document is still resolved.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Page, Thread, UserId, UserProfile};
use crate::traits::UserDirectory;
use crate::view::ThreadView;

#[derive(Clone)]
pub struct AuthorResolver {
    directory: Arc<dyn UserDirectory>,
}

impl AuthorResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, thread: &Thread) -> ThreadView {
        let mut view = ThreadView::from(thread);
        self.refresh(&mut view).await;
        view
    }

    /// Re-resolves an existing view from its retained references.
    /// Idempotent: running it on a resolved view yields the same view.
    pub async fn refresh(&self, view: &mut ThreadView) {
        let users = self.lookup(view.author_refs()).await;
        view.apply_authors(&users);
    }

    /// Resolves a page with one lookup per distinct author across all items.
    pub async fn resolve_page(&self, page: Page<Thread>) -> Page<ThreadView> {
        let mut views = page.map(|t| ThreadView::from(&t));
        let refs: BTreeSet<UserId> = views.items.iter().flat_map(ThreadView::author_refs).collect();
        let users = self.lookup(refs).await;
        for view in &mut views.items {
            view.apply_authors(&users);
        }
        views
    }

    async fn lookup(&self, ids: BTreeSet<UserId>) -> HashMap<UserId, UserProfile> {
        let mut users = HashMap::with_capacity(ids.len());
        for id in ids {
            match self.directory.find_user(id).await {
                Ok(Some(user)) => {
                    users.insert(id, user);
                }
                Ok(None) => debug!(user = %id, "author no longer exists"),
                Err(e) => warn!(user = %id, error = %e, "author lookup failed"),
            }
        }
        users
    }
}
