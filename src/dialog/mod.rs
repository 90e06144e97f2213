//! Dialog system: dialog stack, prompts, step functions, routing and the
//! turn engine.

pub mod engine;
pub mod prompt;
pub mod router;
pub mod state;
pub mod steps;

pub use engine::{Bot, MAX_STEPS_PER_TURN, TurnEnd};
pub use prompt::{Prompt, PromptKind, PromptResult};
pub use router::{Route, RoutingTable, TriggerMode};
pub use state::{DialogArgs, DialogId, DialogStack, Frame};
pub use steps::{StepOutcome, TurnContext};
