//! `BotStore` trait: the async persistence interface the bot runs against.
//!
//! User-scoped data (the profile) outlives conversations; conversation-scoped
//! data (the dialog stack) is deleted whenever a conversation goes idle.

use async_trait::async_trait;

use crate::dialog::DialogStack;
use crate::error::DatabaseError;
use crate::profile::UserProfile;

/// Backend-agnostic storage for user profiles and dialog stacks.
#[async_trait]
pub trait BotStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Get a user's profile, if one was saved.
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError>;

    /// Insert or replace a user's profile.
    async fn save_profile(&self, user_id: &str, profile: &UserProfile)
    -> Result<(), DatabaseError>;

    /// Delete a user's profile. Returns whether one existed.
    async fn delete_profile(&self, user_id: &str) -> Result<bool, DatabaseError>;

    // ── Dialog stacks ───────────────────────────────────────────────

    /// Get the suspended dialog stack for a conversation.
    ///
    /// A stored stack that no longer deserializes is reported as
    /// `DatabaseError::Serialization`.
    async fn load_dialog_stack(
        &self,
        conversation_id: &str,
    ) -> Result<Option<DialogStack>, DatabaseError>;

    /// Insert or replace a conversation's dialog stack.
    async fn save_dialog_stack(
        &self,
        conversation_id: &str,
        user_id: &str,
        stack: &DialogStack,
    ) -> Result<(), DatabaseError>;

    /// Delete a conversation's dialog stack. Returns whether one existed.
    async fn delete_dialog_stack(&self, conversation_id: &str) -> Result<bool, DatabaseError>;
}
