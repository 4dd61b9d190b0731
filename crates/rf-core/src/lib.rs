//! rusty-forum/crates/rf-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Forum:
//! the threaded-content aggregate shared by Questions, Discussions and FAQs.

pub mod aggregate;
pub mod embedded;
pub mod error;
pub mod kind;
pub mod models;
pub mod population;
pub mod registry;
pub mod service;
pub mod traits;
pub mod view;

// Re-exporting for easier access in other crates
pub use aggregate::*;
pub use embedded::*;
pub use error::*;
pub use kind::*;
pub use models::*;
pub use population::*;
pub use registry::*;
pub use service::*;
pub use traits::*;
pub use view::*;
