//! In-memory implementation of the masthead persistence seams.
//!
//! [`MemoryStore`] implements the `ArticleStore`, `CommentStore`, and
//! `SlugGenerator` traits from `masthead-workflow`, and
//! [`MemoryAuthorizer`] implements `Authorizer`. Every multi-field
//! transition executes under one mutex guard, which is the in-memory
//! equivalent of the single transaction a database-backed store would
//! use. A production deployment swaps these for its own backend; the
//! workflow services never notice.

pub mod memory;

pub use memory::{MemoryAuthorizer, MemoryStore};
