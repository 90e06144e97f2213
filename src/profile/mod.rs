//! Per-user banking profile: the data the conversation collects.
//!
//! One `UserProfile` exists per end-user identity. It is created lazily on
//! the first turn, filled in by the Profile / OpenAccount / OpeningBalance
//! dialogs, and wiped by "bye" or a delete-profile request.

pub mod currency;
pub mod model;

pub use currency::format_usd;
pub use model::{AccountType, UserProfile};
