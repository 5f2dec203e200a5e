//! Masthead domain core.
//!
//! Pure domain layer for the editorial content lifecycle: the block
//! document model, the bounded undo/redo history, the article publishing
//! state machine, and the comment moderation/flagging model. This crate
//! has zero internal deps so it can be used by the editor session, the
//! workflow services, and any future CLI or API layer alike.
//!
//! Persistence, authorization, and transport are deliberately absent
//! here; they are consumed through traits defined in `masthead-workflow`.

pub mod block;
pub mod document;
pub mod error;
pub mod history;
pub mod moderation;
pub mod publishing;
pub mod roles;
pub mod slug;
pub mod types;

pub use block::{Block, BlockData, BlockId, BlockKind, BlockPatch};
pub use document::Document;
pub use error::{CoreError, CoreResult};
pub use history::History;
pub use roles::Role;
