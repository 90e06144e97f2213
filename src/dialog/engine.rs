//! Bot: runs one inbound activity through the dialog stack.
//!
//! A turn is:
//! 1. Pick an entry: system activity, literal command, trigger, resume of the
//!    suspended frame, or intent recognition.
//! 2. Drive the stack until a frame suspends on a prompt, the stack empties,
//!    or the conversation ends.
//! 3. Persist the profile and the stack, and address the replies back to the
//!    sender.
//!
//! Turns for the same conversation are serialized by a per-conversation lock.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::prompt::PromptResult;
use super::router::{Route, RoutingTable, TriggerMode};
use super::state::{DialogArgs, DialogId, DialogStack, Frame};
use super::steps::{StepOutcome, TurnContext, run_step};
use crate::channels::{Activity, ActivityType};
use crate::error::{DatabaseError, DialogError, Result};
use crate::profile::UserProfile;
use crate::recognizer::{Intent, IntentRecognizer};
use crate::store::BotStore;

/// Upper bound on steps run in a single turn without suspending.
pub const MAX_STEPS_PER_TURN: usize = 64;

/// How a turn left the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// A frame is waiting on a prompt.
    Suspended,
    /// Every dialog finished.
    Idle,
    /// A dialog ended the conversation.
    Ended,
}

/// Per-conversation async locks, pruned when idle.
#[derive(Default)]
struct ConversationLocks {
    inner: std::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConversationLocks {
    fn handle(&self, conversation_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(conversation_id.to_string()).or_default())
    }

    /// Drop the entry if no turn holds or waits on it.
    fn prune(&self, conversation_id: &str) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if map
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(conversation_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// The conversational bot.
pub struct Bot {
    store: Arc<dyn BotStore>,
    recognizer: Arc<dyn IntentRecognizer>,
    routes: Arc<RoutingTable>,
    locks: ConversationLocks,
}

impl Bot {
    pub fn new(
        store: Arc<dyn BotStore>,
        recognizer: Arc<dyn IntentRecognizer>,
        routes: Arc<RoutingTable>,
    ) -> Self {
        Self {
            store,
            recognizer,
            routes,
            locks: ConversationLocks::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn BotStore> {
        &self.store
    }

    /// Process one inbound activity and return the addressed replies.
    pub async fn process(&self, activity: &Activity) -> Result<Vec<Activity>> {
        let conversation_id = activity.conversation.id.as_str();
        let handle = self.locks.handle(conversation_id);
        let result = {
            let _guard = handle.lock().await;
            self.run_turn(activity).await
        };
        drop(handle);
        self.locks.prune(conversation_id);

        let replies = result?;
        Ok(replies
            .into_iter()
            .map(|reply| activity.address_reply(reply))
            .collect())
    }

    async fn run_turn(&self, activity: &Activity) -> Result<Vec<Activity>> {
        let conversation_id = activity.conversation.id.as_str();
        let user_id = activity.from.id.as_str();

        let route = match activity.kind {
            ActivityType::DeleteUserData => Some(Route {
                dialog: DialogId::DeleteProfile,
                mode: TriggerMode::Reset,
            }),
            ActivityType::ConversationUpdate if activity.bot_was_added() => Some(Route {
                dialog: DialogId::Greeting,
                mode: TriggerMode::Reset,
            }),
            ActivityType::Message => self.routes.match_message(activity.text()),
            kind => {
                debug!(conversation = %conversation_id, %kind, "Ignoring activity");
                return Ok(Vec::new());
            }
        };

        let (original_profile, profile_corrupt) = self.load_profile(user_id).await?;
        let mut stack = self.load_stack(conversation_id).await?;
        let mut ctx = TurnContext::new(original_profile.clone());

        let end = match route {
            Some(Route { dialog, mode }) => {
                if mode == TriggerMode::Reset {
                    stack.clear();
                }
                info!(conversation = %conversation_id, %dialog, ?mode, "Beginning dialog");
                stack.push(Frame::new(dialog, DialogArgs::default()));
                drive(conversation_id, &mut stack, &mut ctx, None, MAX_STEPS_PER_TURN)
            }
            None => self.resume_or_recognize(activity, &mut stack, &mut ctx).await,
        };

        let end = match end {
            Ok(end) => end,
            Err(e) => {
                warn!(conversation = %conversation_id, error = %e, "Discarding dialog state");
                self.store.delete_dialog_stack(conversation_id).await?;
                return Err(e.into());
            }
        };

        match end {
            TurnEnd::Suspended => {
                self.store
                    .save_dialog_stack(conversation_id, user_id, &stack)
                    .await?
            }
            TurnEnd::Idle | TurnEnd::Ended => {
                self.store.delete_dialog_stack(conversation_id).await?;
            }
        }

        let (profile, replies) = ctx.into_parts();
        if profile_corrupt || profile != original_profile {
            if profile.is_empty() {
                self.store.delete_profile(user_id).await?;
            } else {
                self.store.save_profile(user_id, &profile).await?;
            }
        }

        info!(
            conversation = %conversation_id,
            user = %user_id,
            ?end,
            replies = replies.len(),
            "Turn complete"
        );
        Ok(replies)
    }

    /// Stored profile, or a default one. An undecodable profile is logged and
    /// flagged so the turn overwrites or deletes the row.
    async fn load_profile(&self, user_id: &str) -> Result<(UserProfile, bool)> {
        match self.store.load_profile(user_id).await {
            Ok(profile) => Ok((profile.unwrap_or_default(), false)),
            Err(DatabaseError::Serialization(reason)) => {
                warn!(user = %user_id, %reason, "Stored profile is unreadable; starting fresh");
                Ok((UserProfile::default(), true))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stored stack, or an empty one. Undecodable state is logged and dropped.
    async fn load_stack(&self, conversation_id: &str) -> Result<DialogStack> {
        match self.store.load_dialog_stack(conversation_id).await {
            Ok(stack) => Ok(stack.unwrap_or_default()),
            Err(DatabaseError::Serialization(reason)) => {
                let err = DialogError::CorruptState {
                    conversation_id: conversation_id.to_string(),
                    reason,
                };
                warn!(error = %err, "Starting from an empty dialog stack");
                Ok(DialogStack::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resume_or_recognize(
        &self,
        activity: &Activity,
        stack: &mut DialogStack,
        ctx: &mut TurnContext,
    ) -> std::result::Result<TurnEnd, DialogError> {
        let conversation_id = activity.conversation.id.as_str();
        let text = activity.text();

        if let Some(frame) = stack.top_mut() {
            match frame.awaiting.take() {
                Some(prompt) => {
                    let Some(answer) = prompt.parse(text) else {
                        debug!(dialog = %frame.dialog, "Response did not answer prompt");
                        ctx.send(prompt.to_activity());
                        frame.awaiting = Some(prompt);
                        return Ok(TurnEnd::Suspended);
                    };
                    debug!(dialog = %frame.dialog, step = frame.step, "Resuming dialog");
                    return drive(conversation_id, stack, ctx, Some(answer), MAX_STEPS_PER_TURN);
                }
                None => {
                    warn!(
                        conversation = %conversation_id,
                        dialog = %frame.dialog,
                        "Stored frame is not awaiting a prompt; starting over"
                    );
                    stack.clear();
                }
            }
        }

        let intent = match self.recognizer.recognize(text).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(recognizer = self.recognizer.name(), error = %e, "Recognition failed");
                Intent::no_match()
            }
        };
        let dialog = self.routes.dialog_for_intent(intent.name);
        info!(
            conversation = %conversation_id,
            intent = %intent.name,
            score = intent.score,
            %dialog,
            "Beginning dialog"
        );
        stack.push(Frame::new(dialog, DialogArgs::with_entities(intent.entities)));
        drive(conversation_id, stack, ctx, None, MAX_STEPS_PER_TURN)
    }

    #[cfg(test)]
    fn tracked_conversations(&self) -> usize {
        self.locks.len()
    }
}

/// Run steps until the stack suspends, empties or the conversation ends.
fn drive(
    conversation_id: &str,
    stack: &mut DialogStack,
    ctx: &mut TurnContext,
    mut input: Option<PromptResult>,
    limit: usize,
) -> std::result::Result<TurnEnd, DialogError> {
    let mut steps = 0;
    loop {
        let Some(frame) = stack.top_mut() else {
            return Ok(TurnEnd::Idle);
        };

        steps += 1;
        if steps > limit {
            return Err(DialogError::StepLimitExceeded {
                conversation_id: conversation_id.to_string(),
                limit,
            });
        }

        let outcome = if frame.is_finished() {
            StepOutcome::EndDialog
        } else {
            run_step(frame.dialog, frame.step, &frame.args, input.take(), ctx)
        };

        match outcome {
            StepOutcome::Next(result) => {
                frame.step += 1;
                input = result;
            }
            StepOutcome::Prompt(prompt) => {
                ctx.send(prompt.to_activity());
                frame.step += 1;
                frame.awaiting = Some(prompt);
                return Ok(TurnEnd::Suspended);
            }
            StepOutcome::EndDialog => {
                stack.pop();
                input = None;
                if let Some(prompt) = stack.top().and_then(|parent| parent.awaiting.as_ref()) {
                    ctx.send(prompt.to_activity());
                    return Ok(TurnEnd::Suspended);
                }
            }
            StepOutcome::EndConversation(message) => {
                if let Some(message) = message {
                    ctx.say(message);
                }
                ctx.send(Activity::end_of_conversation());
                stack.clear();
                return Ok(TurnEnd::Ended);
            }
            StepOutcome::Begin(dialog, args) => {
                frame.step += 1;
                stack.push(Frame::new(dialog, args));
                input = None;
            }
            StepOutcome::Replace(dialog, args) => {
                stack.pop();
                stack.push(Frame::new(dialog, args));
                input = None;
            }
        }
    }
}
