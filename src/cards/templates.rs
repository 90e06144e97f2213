//! The bot's fixed cards: the welcome card and the account receipt.

use rust_decimal::Decimal;

use super::model::{
    Attachment, CardAction, CardImage, Fact, ReceiptCard, ReceiptItem, ThumbnailCard,
};
use crate::profile::{UserProfile, format_usd};

const GREETING_IMAGE: &str = "https://sec.ch9.ms/ch9/7ff5/e07cfef0-aa3b-40bb-9baa-7c9ef8ff7ff5/buildreactionbotframework_960.jpg";
const RECEIPT_ITEM_IMAGE: &str =
    "https://github.com/amido/azure-vector-icons/raw/master/renders/cloud-service.png";
const PRICING_URL: &str = "https://azure.microsoft.com/en-us/pricing/";
const PRICING_BUTTON_IMAGE: &str =
    "https://raw.githubusercontent.com/amido/azure-vector-icons/master/renders/microsoft-azure.png";

/// Welcome card sent when a conversation starts.
pub fn greeting_card() -> Attachment {
    Attachment::Thumbnail(ThumbnailCard {
        title: "Welcome to Bank of Bing".to_string(),
        subtitle: "The future of banking is here!".to_string(),
        text: "I'm Godfrey, your personal banking bot! You can say things like \
               'open account' or 'what's my balance.'"
            .to_string(),
        images: vec![CardImage::new(GREETING_IMAGE)],
    })
}

/// Receipt summarising a newly opened account and its opening deposit.
pub fn receipt_card(profile: &UserProfile) -> Attachment {
    let account = profile
        .account
        .map(|a| a.label())
        .unwrap_or("Bank");
    let name = profile.name.as_deref().unwrap_or("you");
    let total = format_usd(profile.balance.unwrap_or(Decimal::ZERO));

    Attachment::Receipt(ReceiptCard {
        title: format!("New {account} for {name}"),
        facts: vec![
            Fact::new("Order Number", "1234"),
            Fact::new("Payment Method", "VISA 5555-****"),
        ],
        items: vec![ReceiptItem {
            title: format!("{account} Account"),
            price: total.clone(),
            quantity: Some("720".to_string()),
            image: Some(CardImage::new(RECEIPT_ITEM_IMAGE)),
        }],
        total,
        buttons: vec![
            CardAction::open_url(PRICING_URL, "More Information").with_image(PRICING_BUTTON_IMAGE),
        ],
    })
}
