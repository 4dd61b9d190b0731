//! # Thread Kinds
//!
//! The closed set of thread variants. All three share one mutation contract;
//! a kind only decides which collection stores the document and whether the
//! `category` display field is kept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThreadKind {
    #[serde(rename = "questions")]
    Question,
    #[serde(rename = "discussions")]
    Discussion,
    #[serde(rename = "faqs")]
    Faq,
}

impl ThreadKind {
    pub const ALL: [ThreadKind; 3] = [ThreadKind::Question, ThreadKind::Discussion, ThreadKind::Faq];

    /// Route/collection token, e.g. `"questions"`.
    pub fn token(self) -> &'static str {
        match self {
            ThreadKind::Question => "questions",
            ThreadKind::Discussion => "discussions",
            ThreadKind::Faq => "faqs",
        }
    }

    /// Name of the backing collection (table) for this kind.
    pub fn collection(self) -> &'static str {
        self.token()
    }

    pub fn has_category(self) -> bool {
        matches!(self, ThreadKind::Faq)
    }
}

impl fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ThreadKind {
    type Err = AppError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        ThreadKind::ALL
            .into_iter()
            .find(|kind| kind.token() == token)
            .ok_or_else(|| AppError::UnknownKind(token.to_string()))
    }
}
