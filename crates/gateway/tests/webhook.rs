#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests driving the webhook and admin routes over a real
//! socket.

use std::{net::SocketAddr, sync::Arc};

use {async_trait::async_trait, tokio::net::TcpListener};

use {
    remora_gateway::{AppState, ReplySettings, build_app},
    remora_providers::{ChatMessage, ReplyProvider, StaticReplyProvider},
    remora_reply::{PacingConfig, PlanOptions},
    remora_store::{ConversationStore, Direction, SqliteConversationStore},
};

fn settings(max_len: usize) -> ReplySettings {
    ReplySettings {
        system_prompt: "You are a helpful assistant answering text messages.".into(),
        fallback_reply: "Sorry, I could not generate a response.".into(),
        plan: PlanOptions {
            max_len,
            reserve_prefix_width: false,
        },
        pacing: PacingConfig::default(),
    }
}

async fn test_store() -> (Arc<dyn ConversationStore>, sqlx::SqlitePool) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    SqliteConversationStore::init(&pool).await.unwrap();
    let store: Arc<dyn ConversationStore> = Arc::new(SqliteConversationStore::new(pool.clone()));
    (store, pool)
}

/// Spin up a gateway on an ephemeral port, return the bound address.
async fn start_server(state: AppState) -> SocketAddr {
    let app = build_app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct FailingProvider;

#[async_trait]
impl ReplyProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
        anyhow::bail!("completion backend offline")
    }
}

#[tokio::test]
async fn replies_with_a_twiml_envelope() {
    let (store, _pool) = test_store().await;
    let provider = Arc::new(StaticReplyProvider::new("Thanks for reaching out!"));
    let addr = start_server(AppState::new(provider, store, settings(1500))).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/webhooks/twilio"))
        .form(&[
            ("Body", "What time do you open?"),
            ("From", "+15550100"),
            ("MessageSid", "SM123"),
            // Extra provider fields must be ignored.
            ("AccountSid", "AC999"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/xml");
    let body = resp.text().await.unwrap();
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Response><Message>Thanks for reaching out!</Message></Response>"
    );
}

#[tokio::test]
async fn get_on_the_webhook_is_method_not_allowed() {
    let (store, _pool) = test_store().await;
    let provider = Arc::new(StaticReplyProvider::new("unused"));
    let addr = start_server(AppState::new(provider, store, settings(1500))).await;

    let resp = reqwest::get(format!("http://{addr}/webhooks/twilio"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn blank_fields_default_and_are_recorded() {
    let (store, _pool) = test_store().await;
    let provider = Arc::new(StaticReplyProvider::new("Hi!"));
    let addr = start_server(AppState::new(provider, Arc::clone(&store), settings(1500))).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/webhooks/twilio"))
        .form(&[("Body", ""), ("From", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let identities = store.list_identities().await.unwrap();
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].token, "Unknown");

    let threads = store.list_threads(&identities[0].id).await.unwrap();
    let messages = store.list_messages(&threads[0].id).await.unwrap();
    assert_eq!(messages[0].direction, Direction::Inbound);
    assert_eq!(messages[0].body, "Hello?");
}

#[tokio::test]
async fn provider_failure_falls_back_to_the_fixed_reply() {
    let (store, _pool) = test_store().await;
    let addr = start_server(AppState::new(Arc::new(FailingProvider), store, settings(1500))).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/webhooks/twilio"))
        .form(&[("Body", "hi"), ("From", "+15550100")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Response><Message>Sorry, I could not generate a response.</Message></Response>"
    );
    assert!(!body.contains("<Pause"));
}

#[tokio::test]
async fn store_failure_leaves_the_reply_byte_identical() {
    let provider: Arc<dyn ReplyProvider> =
        Arc::new(StaticReplyProvider::new("Same answer either way."));

    let (healthy_store, _pool) = test_store().await;
    let (broken_store, broken_pool) = test_store().await;
    broken_pool.close().await;

    let healthy = start_server(AppState::new(
        Arc::clone(&provider),
        healthy_store,
        settings(1500),
    ))
    .await;
    let broken = start_server(AppState::new(provider, broken_store, settings(1500))).await;

    let client = reqwest::Client::new();
    let form = [("Body", "hi"), ("From", "+15550100"), ("MessageSid", "SM1")];

    let healthy_body = client
        .post(format!("http://{healthy}/webhooks/twilio"))
        .form(&form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let broken_body = client
        .post(format!("http://{broken}/webhooks/twilio"))
        .form(&form)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(healthy_body, broken_body);
}

#[tokio::test]
async fn long_replies_are_split_paced_and_recorded() {
    let (store, _pool) = test_store().await;
    let reply = "aaaa bbbb cccc. dddd eeee ffff. gggg hhhh iiii.";
    let provider = Arc::new(StaticReplyProvider::new(reply));
    let addr = start_server(AppState::new(provider, Arc::clone(&store), settings(20))).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/webhooks/twilio"))
        .form(&[("Body", "hi"), ("From", "+15550100"), ("MessageSid", "SM77")])
        .send()
        .await
        .unwrap();

    let body = resp.text().await.unwrap();
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Response>\
         <Message>...</Message>\
         <Pause length=\"2\"/><Message>(1/3) aaaa bbbb cccc.</Message>\
         <Pause length=\"1\"/><Message>(2/3) dddd eeee ffff.</Message>\
         <Pause length=\"1\"/><Message>(3/3) gggg hhhh iiii.</Message>\
         </Response>"
    );

    let identities = store.list_identities().await.unwrap();
    let threads = store.list_threads(&identities[0].id).await.unwrap();
    assert_eq!(threads[0].provider_sid.as_deref(), Some("SM77"));
    assert!(threads[0].ended_at.is_some());

    let messages = store.list_messages(&threads[0].id).await.unwrap();
    let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec![
        "hi",
        "(1/3) aaaa bbbb cccc.",
        "(2/3) dddd eeee ffff.",
        "(3/3) gggg hhhh iiii.",
        "reply split into 3 parts",
    ]);
    assert!(messages.windows(2).all(|w| w[0].sent_at < w[1].sent_at));
}

#[tokio::test]
async fn admin_conversations_list_messages_in_replay_order() {
    let (store, _pool) = test_store().await;
    let provider = Arc::new(StaticReplyProvider::new("Sure thing."));
    let addr = start_server(AppState::new(provider, store, settings(1500))).await;

    let client = reqwest::Client::new();
    client
        .post(format!("http://{addr}/webhooks/twilio"))
        .form(&[("Body", "ping"), ("From", "+15550100")])
        .send()
        .await
        .unwrap();

    let json: serde_json::Value = client
        .get(format!("http://{addr}/admin/conversations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let identities = json["identities"].as_array().unwrap();
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0]["token"], "+15550100");

    let threads = identities[0]["threads"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    let messages = threads[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["direction"], "inbound");
    assert_eq!(messages[0]["body"], "ping");
    assert_eq!(messages[1]["direction"], "outbound");
    assert_eq!(messages[1]["body"], "Sure thing.");

    let idents: serde_json::Value = client
        .get(format!("http://{addr}/admin/identities"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(idents["identities"][0]["token"], "+15550100");
}

#[tokio::test]
async fn health_endpoint_returns_json() {
    let (store, _pool) = test_store().await;
    let provider = Arc::new(StaticReplyProvider::new("unused"));
    let addr = start_server(AppState::new(provider, store, settings(1500))).await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}
