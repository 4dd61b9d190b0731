//! # Thread Aggregate
//!
//! In-memory mutations on a loaded Thread. Nothing here touches storage;
//! [`crate::service::ForumService`] wraps every call in
//! `load -> mutate -> persist -> resolve`.

use chrono::Utc;

use crate::embedded::Embedded;
use crate::error::{AppError, Result};
use crate::kind::ThreadKind;
use crate::models::{
    normalize_tag, Answer, AnswerId, Comment, CommentId, NewThread, Thread, ThreadId, UserId, Vote, VoteId,
};

/// What a `vote` call did to the vote set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Cast,
    Changed { from: i32 },
    Removed { from: i32 },
    Unchanged,
}

/// Checks a raw vote value against {-1, 0, 1}.
pub fn validate_vote(value: i64) -> Result<i32> {
    match value {
        -1 | 0 | 1 => Ok(value as i32),
        other => Err(AppError::InvalidArgument(format!("vote must be -1, 0 or 1, got {other}"))),
    }
}

impl Thread {
    pub fn new(kind: ThreadKind, author: UserId, fields: NewThread) -> Self {
        let tags = fields.tags.iter().filter_map(|t| normalize_tag(t)).collect();

        Self {
            id: ThreadId::new(),
            author,
            title: fields.title,
            text: fields.text,
            tags,
            category: fields.category.filter(|_| kind.has_category()),
            score: 0,
            votes: Embedded::new(),
            comments: Embedded::new(),
            answers: Embedded::new(),
            created: Utc::now(),
            views: 0,
            version: 0,
        }
    }

    /// Casts, changes or withdraws `user`'s vote. `score` is adjusted by the
    /// delta only; it must still equal the full sum afterwards.
    pub fn vote(&mut self, user: UserId, value: i64) -> Result<VoteOutcome> {
        let value = validate_vote(value)?;

        let outcome = match self.votes.find_mut(|v| v.user == user) {
            Some(existing) => {
                let from = existing.vote;
                self.score -= i64::from(from);
                if value == 0 {
                    let id = existing.id;
                    self.votes.remove(id.0);
                    VoteOutcome::Removed { from }
                } else {
                    existing.vote = value;
                    self.score += i64::from(value);
                    VoteOutcome::Changed { from }
                }
            }
            None if value != 0 => {
                self.votes.push(Vote { id: VoteId::new(), user, vote: value });
                self.score += i64::from(value);
                VoteOutcome::Cast
            }
            None => VoteOutcome::Unchanged,
        };

        debug_assert_eq!(self.score, self.recomputed_score());
        Ok(outcome)
    }

    /// Full sum over the vote set, independent of the cached `score`.
    pub fn recomputed_score(&self) -> i64 {
        self.votes.iter().map(|v| i64::from(v.vote)).sum()
    }

    pub fn vote_of(&self, user: UserId) -> Option<i32> {
        self.votes.iter().find(|v| v.user == user).map(|v| v.vote)
    }

    pub fn add_comment(&mut self, author: UserId, body: impl Into<String>) -> CommentId {
        let comment = new_comment(author, body.into());
        let id = comment.id;
        self.comments.push(comment);
        id
    }

    pub fn remove_comment(&mut self, id: CommentId) -> Result<Comment> {
        self.comments
            .remove(id.0)
            .ok_or_else(|| AppError::not_found(CommentId::ENTITY, id))
    }

    pub fn add_answer(&mut self, author: UserId, text: impl Into<String>) -> AnswerId {
        let answer = Answer {
            id: AnswerId::new(),
            author,
            text: text.into(),
            created: Utc::now(),
            comments: Embedded::new(),
        };
        let id = answer.id;
        self.answers.push(answer);
        id
    }

    /// Removes the answer together with all of its comments.
    pub fn remove_answer(&mut self, id: AnswerId) -> Result<Answer> {
        self.answers
            .remove(id.0)
            .ok_or_else(|| AppError::not_found(AnswerId::ENTITY, id))
    }

    pub fn answer(&self, id: AnswerId) -> Result<&Answer> {
        self.answers
            .get(id.0)
            .ok_or_else(|| AppError::not_found(AnswerId::ENTITY, id))
    }

    fn answer_mut(&mut self, id: AnswerId) -> Result<&mut Answer> {
        self.answers
            .get_mut(id.0)
            .ok_or_else(|| AppError::not_found(AnswerId::ENTITY, id))
    }

    pub fn add_answer_comment(
        &mut self,
        answer: AnswerId,
        author: UserId,
        body: impl Into<String>,
    ) -> Result<CommentId> {
        let comment = new_comment(author, body.into());
        let id = comment.id;
        self.answer_mut(answer)?.comments.push(comment);
        Ok(id)
    }

    pub fn remove_answer_comment(&mut self, answer: AnswerId, comment: CommentId) -> Result<Comment> {
        self.answer_mut(answer)?
            .comments
            .remove(comment.0)
            .ok_or_else(|| AppError::not_found(CommentId::ENTITY, comment))
    }

    pub fn record_view(&mut self) {
        self.views += 1;
    }
}

fn new_comment(author: UserId, body: String) -> Comment {
    Comment { id: CommentId::new(), author, body, created: Utc::now() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(kind: ThreadKind) -> Thread {
        Thread::new(
            kind,
            UserId::new(),
            NewThread {
                title: "How do lifetimes work?".into(),
                text: "Asking for a friend.".into(),
                tags: vec!["Rust".into(), " borrowck ".into(), "".into()],
                category: Some("basics".into()),
            },
        )
    }

    fn assert_invariants(t: &Thread) {
        assert_eq!(t.score, t.recomputed_score());
        let mut users: Vec<_> = t.votes.iter().map(|v| v.user).collect();
        users.sort();
        users.dedup();
        assert_eq!(users.len(), t.votes.len(), "more than one vote per user");
        assert!(t.votes.iter().all(|v| v.vote != 0), "zero vote stored");
    }

    #[test]
    fn new_thread_starts_empty() {
        let t = thread(ThreadKind::Question);
        assert_eq!(t.score, 0);
        assert!(t.votes.is_empty() && t.comments.is_empty() && t.answers.is_empty());
        assert_eq!(t.tags.iter().cloned().collect::<Vec<_>>(), vec!["borrowck", "rust"]);
        assert_eq!(t.category, None);
        assert_eq!(thread(ThreadKind::Faq).category.as_deref(), Some("basics"));
    }

    #[test]
    fn vote_walkthrough() {
        let mut q = thread(ThreadKind::Question);
        let (a, b) = (UserId::new(), UserId::new());

        assert_eq!(q.vote(a, 1).unwrap(), VoteOutcome::Cast);
        assert_eq!(q.score, 1);
        q.vote(b, 1).unwrap();
        assert_eq!(q.score, 2);
        assert_eq!(q.vote(a, -1).unwrap(), VoteOutcome::Changed { from: 1 });
        assert_eq!(q.score, 0);
        assert_eq!((q.vote_of(a), q.vote_of(b)), (Some(-1), Some(1)));
        assert_eq!(q.vote(a, 0).unwrap(), VoteOutcome::Removed { from: -1 });
        assert_eq!(q.score, 1);
        assert_eq!(q.votes.len(), 1);
        assert_eq!(q.vote_of(b), Some(1));
        assert_invariants(&q);
    }

    #[test]
    fn zero_vote_without_existing_vote_is_a_noop() {
        let mut t = thread(ThreadKind::Discussion);
        let before = t.clone();
        assert_eq!(t.vote(UserId::new(), 0).unwrap(), VoteOutcome::Unchanged);
        assert_eq!(t, before);
    }

    #[test]
    fn out_of_range_vote_is_rejected_without_change() {
        let mut t = thread(ThreadKind::Question);
        let user = UserId::new();
        t.vote(user, 1).unwrap();
        let before = t.clone();
        for bad in [2, -2, 100, i64::MIN] {
            assert!(matches!(t.vote(user, bad), Err(AppError::InvalidArgument(_))));
        }
        assert_eq!(t, before);
    }

    #[test]
    fn score_matches_recount_after_every_step() {
        let users: Vec<UserId> = (0..5).map(|_| UserId::new()).collect();
        let mut t = thread(ThreadKind::Faq);
        // deterministic pseudo-random walk over (user, value)
        let mut seed: u64 = 0x5eed;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let user = users[(seed >> 33) as usize % users.len()];
            let value = ((seed >> 17) % 3) as i64 - 1;
            t.vote(user, value).unwrap();
            assert_invariants(&t);
        }
    }

    #[test]
    fn repeated_votes_by_one_user_keep_a_single_record() {
        let mut t = thread(ThreadKind::Question);
        let user = UserId::new();
        for value in [1, 1, -1, -1, 1] {
            t.vote(user, value).unwrap();
            assert_eq!(t.votes.len(), 1);
        }
        assert_eq!(t.score, 1);
    }

    #[test]
    fn removing_an_answer_takes_its_comments_with_it() {
        let mut t = thread(ThreadKind::Question);
        let (x, y) = (t.add_answer(UserId::new(), "first"), t.add_answer(UserId::new(), "second"));
        t.add_answer_comment(x, UserId::new(), "c1").unwrap();
        t.add_answer_comment(x, UserId::new(), "c2").unwrap();
        let keep = t.add_answer_comment(y, UserId::new(), "stays").unwrap();

        let removed = t.remove_answer(x).unwrap();
        assert_eq!(removed.comments.len(), 2);
        assert_eq!(t.answers.len(), 1);
        let survivor = t.answer(y).unwrap();
        assert_eq!(survivor.comments.len(), 1);
        assert!(survivor.comments.contains(keep.0));
        assert!(matches!(t.remove_answer(x), Err(AppError::NotFound { entity: "answer", .. })));
    }

    #[test]
    fn comments_are_addressed_by_id_not_position() {
        let mut t = thread(ThreadKind::Discussion);
        let ids: Vec<_> = (0..3).map(|i| t.add_comment(UserId::new(), format!("c{i}"))).collect();
        t.remove_comment(ids[0]).unwrap();
        assert_eq!(t.remove_comment(ids[2]).unwrap().body, "c2");
        assert!(matches!(t.remove_comment(ids[0]), Err(AppError::NotFound { entity: "comment", .. })));
        assert_eq!(t.comments.len(), 1);
    }

    #[test]
    fn answer_comment_errors_name_the_missing_entity() {
        let mut t = thread(ThreadKind::Question);
        let missing = AnswerId::new();
        let err = t.add_answer_comment(missing, UserId::new(), "hi").unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "answer", .. }));

        let answer = t.add_answer(UserId::new(), "body");
        let err = t.remove_answer_comment(answer, CommentId::new()).unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "comment", .. }));
    }
}
