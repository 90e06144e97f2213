//! Integration tests for the messaging endpoint.
//!
//! Each test spins up an Axum server on a random port and exercises the real
//! HTTP contract with reqwest.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use bank_bot::channels::webhook_routes;
use bank_bot::dialog::{Bot, RoutingTable};
use bank_bot::recognizer::KeywordRecognizer;
use bank_bot::store::LibSqlBackend;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return its base URL.
async fn start_server() -> String {
    let store = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let bot = Arc::new(Bot::new(
        store,
        Arc::new(KeywordRecognizer::default_rules()),
        Arc::new(RoutingTable::bank_default()),
    ));
    let app = webhook_routes(bot);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

fn message(text: &str) -> Value {
    json!({
        "type": "message",
        "id": "msg-1",
        "channelId": "emulator",
        "serviceUrl": "http://localhost:9000",
        "from": {"id": "user-1", "name": "Ada"},
        "recipient": {"id": "bot-1"},
        "conversation": {"id": "conv-1"},
        "text": text
    })
}

async fn post_activity(client: &reqwest::Client, base: &str, activity: &Value) -> Vec<Value> {
    let resp = client
        .post(format!("{base}/api/messages"))
        .json(activity)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"status": "ok", "service": "bank-bot"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn conversation_update_returns_greeting_card() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();

        let update = json!({
            "type": "conversationUpdate",
            "from": {"id": "user-1"},
            "recipient": {"id": "bot-1"},
            "conversation": {"id": "conv-1"},
            "membersAdded": [{"id": "bot-1"}, {"id": "user-1"}]
        });
        let replies = post_activity(&client, &base, &update).await;

        assert_eq!(replies.len(), 1);
        let reply = &replies[0];
        assert_eq!(reply["type"], "message");
        assert_eq!(reply["from"]["id"], "bot-1");
        assert_eq!(reply["recipient"]["id"], "user-1");
        assert_eq!(reply["conversation"]["id"], "conv-1");
        assert_eq!(
            reply["attachments"][0]["contentType"],
            "application/vnd.microsoft.card.thumbnail"
        );
        assert_eq!(
            reply["attachments"][0]["content"]["title"],
            "Welcome to Bank of Bing"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn message_flow_over_http() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();

        let replies = post_activity(&client, &base, &message("open account")).await;
        assert_eq!(replies[0]["text"], "Which type of an account?");
        assert_eq!(replies[0]["replyToId"], "msg-1");
        assert_eq!(replies[0]["channelId"], "emulator");
        let actions = replies[0]["suggestedActions"]["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[2]["value"], "IRA");

        post_activity(&client, &base, &message("IRA")).await;
        post_activity(&client, &base, &message("Ada")).await;
        post_activity(&client, &base, &message("1 Main St")).await;
        let replies = post_activity(&client, &base, &message("500")).await;
        assert_eq!(
            replies[0]["attachments"][0]["contentType"],
            "application/vnd.microsoft.card.receipt"
        );
        assert_eq!(replies[0]["attachments"][0]["content"]["total"], "$500.00");
        assert_eq!(replies[1]["text"], "Does this all look correct?");

        let profile: Value = client
            .get(format!("{base}/api/users/user-1/profile"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(profile["name"], "Ada");
        assert_eq!(profile["account"], "IRA");
        assert_eq!(profile["readyForCheckout"], true);

        let replies = post_activity(&client, &base, &message("bye")).await;
        assert_eq!(replies[0]["text"], "Thanks for stopping by!");
        assert_eq!(replies[1]["type"], "endOfConversation");
        assert_eq!(replies[1]["code"], "completedSuccessfully");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_profile_is_404() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let resp = reqwest::get(format!("{base}/api/users/nobody/profile"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ignored_activity_returns_empty_array() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let typing = json!({
            "type": "typing",
            "from": {"id": "user-1"},
            "recipient": {"id": "bot-1"},
            "conversation": {"id": "conv-1"}
        });
        let replies = post_activity(&client, &base, &typing).await;
        assert!(replies.is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_body_is_client_error() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/messages"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    })
    .await
    .expect("test timed out");
}
