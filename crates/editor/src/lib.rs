//! Masthead editing session.
//!
//! Single-writer, in-memory layer of the editorial core:
//!
//! - [`EditorSession`] — owns one document and its undo/redo history;
//!   every mutation records a snapshot, so no edit can bypass history.
//! - [`AutoSaver`] — background task that decides when the session's
//!   document is durably persisted (debounce + idle detection), tracks
//!   save status, and retries after failures.
//!
//! History lives only for the current session; durable server-side undo
//! is out of scope.

pub mod autosave;
pub mod session;

pub use autosave::{AutoSaveConfig, AutoSaver, SaveHandler, SaveStatus};
pub use session::EditorSession;
