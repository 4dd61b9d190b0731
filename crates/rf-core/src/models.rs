//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Forum.
//! A Thread is one persisted document that embeds its Votes, Comments and
//! Answers. Author fields are stored as bare `UserId` references; the
//! expanded author data only ever lives in the views built by
//! [`crate::population`].
//! We use UUID v7 for time-ordered, globally unique identification.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::embedded::{Embedded, Identified};
use crate::error::{AppError, Result};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub const ENTITY: &'static str = $entity;

            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Parses an externally supplied id. Anything that is not a UUID
            /// is `InvalidId`, never `NotFound`.
            pub fn parse(raw: &str) -> Result<Self> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| AppError::invalid_id($entity, raw))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Weak reference to an account owned by the user collaborator.
    UserId,
    "user"
);
entity_id!(ThreadId, "thread");
entity_id!(AnswerId, "answer");
entity_id!(CommentId, "comment");
entity_id!(VoteId, "vote");

/// One user's directional vote on a thread. A stored vote is never 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub user: UserId,
    pub vote: i32,
}

/// A short remark attached to a Thread or to an Answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: UserId,
    pub body: String,
    pub created: DateTime<Utc>,
}

/// A full response to a Thread. Owns its comments; removing the answer
/// removes them with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub author: UserId,
    pub text: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub comments: Embedded<Comment>,
}

/// The root aggregate shared by Questions, Discussions and FAQs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub author: UserId,
    pub title: String,
    pub text: String,
    pub tags: BTreeSet<String>,
    /// Display category; only FAQs carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Cached sum of `votes`.
    pub score: i64,
    #[serde(default)]
    pub votes: Embedded<Vote>,
    #[serde(default)]
    pub comments: Embedded<Comment>,
    #[serde(default)]
    pub answers: Embedded<Answer>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    /// Internal write counter used for optimistic concurrency.
    #[serde(default)]
    pub version: u64,
}

/// Caller-supplied fields for a new Thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThread {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

/// Public profile handed out by the user collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub created: DateTime<Utc>,
}

/// Listing filter; `tags` matches threads carrying any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadFilter {
    pub author: Option<UserId>,
    pub tags: Vec<String>,
}

impl ThreadFilter {
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags.into_iter().filter_map(|t| normalize_tag(t.as_ref())).collect();
        self
    }
}

/// Tags are stored trimmed and lowercased; blank tags are dropped.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit: limit.max(1) }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

impl Identified for Vote {
    fn key(&self) -> Uuid {
        self.id.0
    }
}

impl Identified for Comment {
    fn key(&self) -> Uuid {
        self.id.0
    }
}

impl Identified for Answer {
    fn key(&self) -> Uuid {
        self.id.0
    }
}
