//! Masthead workflow services.
//!
//! Gated state transitions over persisted records:
//!
//! - [`PublishingService`] — article lifecycle (submit, approve, reject,
//!   publish, unpublish, archive, duplicate) behind role gates.
//! - [`ModerationService`] — comment flagging and moderation.
//!
//! Persistence, authorization, and slug uniqueness are consumed through
//! the traits in [`ports`]; the services own only validation, gating,
//! and the transition semantics. Results and errors are plain values;
//! the caller (HTTP handler, CLI) maps them to its transport.

pub mod moderation;
pub mod ports;
pub mod publishing;

pub use moderation::{BulkModerationOutcome, ModerationService};
pub use ports::{ArticleStore, Authorizer, CommentStore, SlugGenerator};
pub use publishing::PublishingService;
