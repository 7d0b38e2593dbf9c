//! Core traits and types for the dental receptionist voice agent
//!
//! This crate provides the foundational pieces shared across the workspace:
//! - Conversation types (turns, roles, per-turn results)
//! - Appointment draft and validation types
//! - Collaborator traits (dialogue model, speech synthesizer)
//! - Error types

pub mod appointment;
pub mod conversation;
pub mod error;
pub mod traits;

pub use appointment::{AppointmentDraft, AppointmentField, Doctor, UrgencyLevel};
pub use conversation::{DialogueTurnResult, Turn, TurnRole};
pub use error::{Error, Result};
pub use traits::{DialogueModel, SpeechSynthesizer};
