//! Chat conversation workflow.
//!
//! A transcript of turns per user, mirrored wholesale to the realtime store.
//! Replies come from the canned disease table when a keyword matches,
//! otherwise from the remote completion service.

pub mod canned;
pub mod manager;
pub mod message;

pub use canned::CannedResponses;
pub use manager::{ConversationManager, FALLBACK_REPLY};
pub use message::{ChatMessage, Role, Transcript, SYSTEM_PROMPT};
