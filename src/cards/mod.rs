//! Rich cards attached to bot replies.

pub mod model;
pub mod templates;

pub use model::{Attachment, CardAction, CardImage, Fact, ReceiptCard, ReceiptItem, ThumbnailCard};
pub use templates::{greeting_card, receipt_card};
