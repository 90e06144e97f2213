//! Bank Bot: a conversational banking assistant.

pub mod cards;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod profile;
pub mod recognizer;
pub mod store;
