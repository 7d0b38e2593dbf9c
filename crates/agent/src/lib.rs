//! Conversation core for the dental receptionist
//!
//! Orchestrates one call at a time:
//! caller utterance → session history → dialogue model → structured
//! block extraction → appointment commit → speakable reply.
//!
//! The protocol adapters (WebSocket, call-control) live in the server
//! crate; everything here is transport-agnostic.

pub mod commit;
pub mod extract;
pub mod messages;
pub mod prompt;
pub mod session;
pub mod turn;

pub use commit::AppointmentCommitPolicy;
pub use extract::{extract_json_block, strip_json_block, CallSummary};
pub use session::{ConversationSession, SessionManager};
pub use turn::DialogueTurnProcessor;
