//! Shared fixtures for the cross-crate tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rf_core::{ForumService, NewThread, Role, ServiceOptions, UserId, UserProfile};
use rf_store_memory::{MemoryThreadStore, MemoryUserDirectory};

pub struct MemoryForum {
    pub service: ForumService,
    pub store: Arc<MemoryThreadStore>,
    pub users: Arc<MemoryUserDirectory>,
}

pub fn memory_forum() -> MemoryForum {
    let store = Arc::new(MemoryThreadStore::new());
    let users = Arc::new(MemoryUserDirectory::new());
    let service = ForumService::new(store.clone(), users.clone(), ServiceOptions::default());
    MemoryForum { service, store, users }
}

pub fn profile(username: &str, role: Role) -> UserProfile {
    UserProfile {
        id: UserId::new(),
        username: username.to_string(),
        display_name: Some(username.to_uppercase()),
        role,
        created: Utc::now(),
    }
}

pub fn new_thread(title: &str) -> NewThread {
    NewThread {
        title: title.to_string(),
        text: format!("{title}, in more detail."),
        tags: vec!["rust".into(), "async".into()],
        category: Some("general".into()),
    }
}

pub const LONG_ANSWER: &str = "Use an Arc<Mutex<_>> or, better, restructure ownership.";
