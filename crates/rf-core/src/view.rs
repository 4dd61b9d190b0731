//! # Outbound Views
//!
//! The presentation form of a Thread. Building a view strips the internal
//! write counter and carries every author as a raw reference plus an
//! optional expanded profile, filled in by [`crate::population`].
//! The thread author gets the full profile; nested authors never see `role`.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    Answer, AnswerId, Comment, CommentId, Role, Thread, ThreadId, UserId, UserProfile, Vote, VoteId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorProfile {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub created: DateTime<Utc>,
}

/// Nested author projection without sensitive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub created: DateTime<Utc>,
}

impl From<&UserProfile> for AuthorProfile {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            created: user.created,
        }
    }
}

impl From<&UserProfile> for AuthorSummary {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            created: user.created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteView {
    pub id: VoteId,
    pub user: UserId,
    pub vote: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    #[serde(skip)]
    pub author_ref: UserId,
    pub author: Option<AuthorSummary>,
    pub body: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    pub id: AnswerId,
    #[serde(skip)]
    pub author_ref: UserId,
    pub author: Option<AuthorSummary>,
    pub text: String,
    pub created: DateTime<Utc>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    pub id: ThreadId,
    #[serde(skip)]
    pub author_ref: UserId,
    pub author: Option<AuthorProfile>,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub score: i64,
    pub votes: Vec<VoteView>,
    pub comments: Vec<CommentView>,
    pub answers: Vec<AnswerView>,
    pub created: DateTime<Utc>,
    pub views: u64,
}

impl From<&Vote> for VoteView {
    fn from(v: &Vote) -> Self {
        Self { id: v.id, user: v.user, vote: v.vote }
    }
}

impl From<&Comment> for CommentView {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id,
            author_ref: c.author,
            author: None,
            body: c.body.clone(),
            created: c.created,
        }
    }
}

impl From<&Answer> for AnswerView {
    fn from(a: &Answer) -> Self {
        Self {
            id: a.id,
            author_ref: a.author,
            author: None,
            text: a.text.clone(),
            created: a.created,
            comments: a.comments.iter().map(CommentView::from).collect(),
        }
    }
}

/// Unresolved projection: every author is still a bare reference.
impl From<&Thread> for ThreadView {
    fn from(t: &Thread) -> Self {
        Self {
            id: t.id,
            author_ref: t.author,
            author: None,
            title: t.title.clone(),
            text: t.text.clone(),
            tags: t.tags.iter().cloned().collect(),
            category: t.category.clone(),
            score: t.score,
            votes: t.votes.iter().map(VoteView::from).collect(),
            comments: t.comments.iter().map(CommentView::from).collect(),
            answers: t.answers.iter().map(AnswerView::from).collect(),
            created: t.created,
            views: t.views,
        }
    }
}

impl ThreadView {
    /// Every author referenced at any depth.
    pub fn author_refs(&self) -> BTreeSet<UserId> {
        let mut refs = BTreeSet::from([self.author_ref]);
        refs.extend(self.comments.iter().map(|c| c.author_ref));
        for answer in &self.answers {
            refs.insert(answer.author_ref);
            refs.extend(answer.comments.iter().map(|c| c.author_ref));
        }
        refs
    }

    /// Overwrites every author projection from `users`. References missing
    /// from the map become `None`.
    pub fn apply_authors(&mut self, users: &HashMap<UserId, UserProfile>) {
        self.author = users.get(&self.author_ref).map(AuthorProfile::from);
        for comment in &mut self.comments {
            comment.apply_author(users);
        }
        for answer in &mut self.answers {
            answer.author = users.get(&answer.author_ref).map(AuthorSummary::from);
            for comment in &mut answer.comments {
                comment.apply_author(users);
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl CommentView {
    fn apply_author(&mut self, users: &HashMap<UserId, UserProfile>) {
        self.author = users.get(&self.author_ref).map(AuthorSummary::from);
    }
}
