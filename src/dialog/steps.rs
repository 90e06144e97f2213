//! Step functions for every dialog.
//!
//! A step never transfers control itself. It mutates the profile, queues
//! replies on the `TurnContext`, and returns a `StepOutcome` describing what
//! the engine should do next.

use rust_decimal::Decimal;
use tracing::warn;

use super::prompt::{Prompt, PromptResult};
use super::state::{DialogArgs, DialogId};
use crate::cards::{greeting_card, receipt_card};
use crate::channels::Activity;
use crate::profile::{AccountType, UserProfile, format_usd};
use crate::recognizer::ACCOUNT_ENTITY;

pub const NAME_PROMPT: &str = "What's your name?";
pub const ADDRESS_PROMPT: &str = "What is your address?";
pub const DEPOSIT_PROMPT: &str = "What is going to be your opening deposit?";
pub const CONFIRM_RECEIPT_PROMPT: &str = "Does this all look correct?";
pub const ANYTHING_ELSE_PROMPT: &str = "Is there anything else I can do for you?";
pub const ACCOUNT_TYPE_PROMPT: &str = "Which type of an account?";
pub const WHICH_ACCOUNT_PROMPT: &str = "Which of your accounts?";

pub const FAREWELL_MESSAGE: &str = "Thank you for banking with us today!";
pub const THANKS_MESSAGE: &str = "Glad to help! :)";
pub const NO_MATCH_MESSAGE: &str =
    "Sorry, I didn't quite understand you. Try saying 'open account'.";
pub const HELP_MESSAGE: &str = "You can say **open account** to open a new account or \
                                **what's my balance** to check your balance.";
pub const CANCEL_MESSAGE: &str = "OK--I've cancelled that out.";
pub const BYE_MESSAGE: &str = "Thanks for stopping by!";
pub const PROFILE_DELETED_MESSAGE: &str = "User profile deleted";

/// What the engine does after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Run the next step of the same dialog, handing it a result.
    Next(Option<PromptResult>),
    /// Send the prompt and suspend until the user replies.
    Prompt(Prompt),
    /// Finish this dialog and resume its caller.
    EndDialog,
    /// Send an optional final message, then end the whole conversation.
    EndConversation(Option<String>),
    /// Run a child dialog; this one resumes at its next step afterwards.
    Begin(DialogId, DialogArgs),
    /// Swap this dialog for another.
    Replace(DialogId, DialogArgs),
}

/// Mutable state visible to steps during one turn.
#[derive(Debug, Default)]
pub struct TurnContext {
    pub profile: UserProfile,
    replies: Vec<Activity>,
}

impl TurnContext {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            replies: Vec::new(),
        }
    }

    /// Queue an outbound activity.
    pub fn send(&mut self, activity: Activity) {
        self.replies.push(activity);
    }

    /// Queue an outbound text message.
    pub fn say(&mut self, text: impl Into<String>) {
        self.send(Activity::outgoing(text));
    }

    pub fn replies(&self) -> &[Activity] {
        &self.replies
    }

    pub fn into_parts(self) -> (UserProfile, Vec<Activity>) {
        (self.profile, self.replies)
    }
}

/// Run step `step` of `dialog`.
pub fn run_step(
    dialog: DialogId,
    step: usize,
    args: &DialogArgs,
    input: Option<PromptResult>,
    ctx: &mut TurnContext,
) -> StepOutcome {
    match dialog {
        DialogId::Greeting => greeting(ctx),
        DialogId::Profile => profile(step, input, ctx),
        DialogId::OpeningBalance => opening_balance(step, input, ctx),
        DialogId::Finalization => finalization(step, input, ctx),
        DialogId::Thanks => {
            ctx.say(THANKS_MESSAGE);
            StepOutcome::EndConversation(None)
        }
        DialogId::OpenAccount => open_account(step, args, input, ctx),
        DialogId::GetMyBalance => get_my_balance(step, input, ctx),
        DialogId::NoMatch => {
            ctx.say(NO_MATCH_MESSAGE);
            StepOutcome::EndDialog
        }
        DialogId::Help => help(args, ctx),
        DialogId::Cancel => {
            ctx.say(CANCEL_MESSAGE);
            StepOutcome::EndDialog
        }
        DialogId::Bye => {
            ctx.profile.clear();
            StepOutcome::EndConversation(Some(BYE_MESSAGE.to_string()))
        }
        DialogId::DeleteProfile => {
            ctx.profile.clear();
            StepOutcome::EndConversation(Some(PROFILE_DELETED_MESSAGE.to_string()))
        }
    }
}

fn greeting(ctx: &mut TurnContext) -> StepOutcome {
    ctx.send(Activity::outgoing_card(greeting_card()));
    StepOutcome::EndDialog
}

fn profile(step: usize, input: Option<PromptResult>, ctx: &mut TurnContext) -> StepOutcome {
    match step {
        0 => {
            if ctx.profile.name.is_none() {
                StepOutcome::Prompt(Prompt::text(NAME_PROMPT))
            } else {
                StepOutcome::Next(None)
            }
        }
        1 => {
            if let Some(name) = input.as_ref().and_then(PromptResult::as_text) {
                ctx.profile.name = Some(name.to_string());
            }
            if ctx.profile.address.is_none() {
                StepOutcome::Prompt(Prompt::text(ADDRESS_PROMPT))
            } else {
                StepOutcome::Next(None)
            }
        }
        _ => {
            if let Some(address) = input.as_ref().and_then(PromptResult::as_text) {
                ctx.profile.address = Some(address.to_string());
            }
            StepOutcome::Begin(DialogId::OpeningBalance, DialogArgs::default())
        }
    }
}

fn opening_balance(step: usize, input: Option<PromptResult>, ctx: &mut TurnContext) -> StepOutcome {
    match step {
        0 => {
            if ctx.profile.balance.is_none() {
                StepOutcome::Prompt(Prompt::number(DEPOSIT_PROMPT))
            } else {
                StepOutcome::Next(None)
            }
        }
        1 => {
            match input.as_ref().and_then(PromptResult::as_number) {
                Some(deposit) => ctx.profile.record_opening_balance(deposit),
                // Fell through with a balance already on file: confirm it as is.
                None => match ctx.profile.balance {
                    Some(existing) => ctx.profile.record_opening_balance(existing),
                    None => {
                        return StepOutcome::Replace(
                            DialogId::OpeningBalance,
                            DialogArgs::default(),
                        );
                    }
                },
            }
            ctx.send(Activity::outgoing_card(receipt_card(&ctx.profile)));
            StepOutcome::Prompt(Prompt::confirm(CONFIRM_RECEIPT_PROMPT))
        }
        _ => {
            if is_yes(input.as_ref()) {
                StepOutcome::Replace(DialogId::Finalization, DialogArgs::default())
            } else {
                ctx.profile.reset_opening_balance();
                StepOutcome::Replace(DialogId::OpeningBalance, DialogArgs::default())
            }
        }
    }
}

fn finalization(step: usize, input: Option<PromptResult>, ctx: &mut TurnContext) -> StepOutcome {
    match step {
        0 => {
            if !ctx.profile.ready_for_checkout {
                warn!("Finalization entered before the profile was ready for checkout");
                return StepOutcome::EndDialog;
            }
            StepOutcome::Prompt(Prompt::confirm(ANYTHING_ELSE_PROMPT))
        }
        _ => {
            if is_yes(input.as_ref()) {
                StepOutcome::Replace(DialogId::Greeting, DialogArgs::default())
            } else {
                StepOutcome::EndConversation(Some(FAREWELL_MESSAGE.to_string()))
            }
        }
    }
}

fn open_account(
    step: usize,
    args: &DialogArgs,
    input: Option<PromptResult>,
    ctx: &mut TurnContext,
) -> StepOutcome {
    match step {
        0 => {
            let from_entity = args
                .find_entity(ACCOUNT_ENTITY)
                .and_then(|e| e.value.parse::<AccountType>().ok());
            if let Some(account) = from_entity {
                return StepOutcome::Next(Some(account_choice(account)));
            }
            if ctx.profile.account.is_none() {
                StepOutcome::Prompt(Prompt::choice(ACCOUNT_TYPE_PROMPT, AccountType::labels()))
            } else {
                StepOutcome::Next(None)
            }
        }
        _ => {
            let chosen = input
                .as_ref()
                .and_then(PromptResult::as_choice)
                .and_then(|label| label.parse::<AccountType>().ok());
            let Some(account) = chosen else {
                ctx.say("Ok");
                return StepOutcome::EndDialog;
            };

            ctx.profile.account = Some(account);
            ctx.say(format!(
                "Excellent, let me get started right away on starting a new {account} account for you!"
            ));

            if ctx.profile.name.is_none() {
                StepOutcome::Begin(DialogId::Profile, DialogArgs::default())
            } else {
                StepOutcome::EndDialog
            }
        }
    }
}

fn get_my_balance(step: usize, input: Option<PromptResult>, ctx: &mut TurnContext) -> StepOutcome {
    match step {
        0 => StepOutcome::Prompt(Prompt::choice(WHICH_ACCOUNT_PROMPT, AccountType::labels())),
        _ => {
            if input.is_none() {
                return StepOutcome::Replace(DialogId::GetMyBalance, DialogArgs::default());
            }
            let balance = ctx.profile.balance.unwrap_or(Decimal::ZERO);
            ctx.say(format!("Your balance is {}", format_usd(balance)));
            if ctx.profile.ready_for_checkout {
                StepOutcome::Replace(DialogId::Finalization, DialogArgs::default())
            } else {
                StepOutcome::EndDialog
            }
        }
    }
}

fn help(args: &DialogArgs, ctx: &mut TurnContext) -> StepOutcome {
    if let Some(target) = args.action {
        let forwarded = DialogArgs::with_entities(args.entities.clone());
        return StepOutcome::Replace(target, forwarded);
    }
    ctx.say(HELP_MESSAGE);
    StepOutcome::EndDialog
}

fn is_yes(input: Option<&PromptResult>) -> bool {
    input
        .and_then(PromptResult::as_choice)
        .is_some_and(|c| c.eq_ignore_ascii_case("yes"))
}

fn account_choice(account: AccountType) -> PromptResult {
    let index = AccountType::ALL
        .iter()
        .position(|a| *a == account)
        .unwrap_or_default();
    PromptResult::Choice {
        index,
        value: account.label().to_string(),
    }
}
