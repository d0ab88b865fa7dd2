//! Gemora Kop agent: everything between an incoming message and a reply.
//!
//! This crate contains:
//! - **classifier**: keyword + pattern check for Gemora relevance
//! - **context**: system instructions and the outbound message list
//! - **reply**: the `ReplyGenerator` and its uniform `ChatReply` envelope

pub mod classifier;
pub mod context;
pub mod reply;

pub use classifier::is_gemora_question;
pub use context::ContextBuilder;
pub use reply::{ChatReply, ReplyBody, ReplyGenerator};
