//! HTTP-level integration tests against a mock server.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use palaver::{ChatEvent, CreateChatRequest, Error, ListBotsRequest, Message, PalaverClient};

async fn client_for(server: &MockServer) -> PalaverClient {
    PalaverClient::builder()
        .base_url(server.uri())
        .auth_token("test-token")
        .build()
        .unwrap()
}

#[tokio::test]
async fn retrieve_unwraps_envelope_and_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bots/bot1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {"bot_id": "bot1", "name": "Helper"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let bot = client.bots().retrieve("bot1").await.unwrap();
    assert_eq!(bot.bot_id, "bot1");
    assert_eq!(bot.name, "Helper");
}

#[tokio::test]
async fn business_error_code_carries_log_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bots/missing"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "log-abc")
                .set_body_json(json!({"code": 4101, "msg": "bot not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.bots().retrieve("missing").await.unwrap_err();
    match err {
        Error::Api {
            code,
            message,
            log_id,
        } => {
            assert_eq!(code, 4101);
            assert_eq!(message, "bot not found");
            assert_eq!(log_id.as_deref(), Some("log-abc"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_error_body_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bots/b"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"code": 4100, "msg": "bad token"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.bots().retrieve("b").await.unwrap_err();
    assert_eq!(err.code(), Some(4100));
}

#[tokio::test]
async fn bot_listing_walks_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bots"))
        .and(query_param("workspace_id", "ws1"))
        .and(query_param("page_num", "1"))
        .and(query_param("page_size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {
                "total": 3,
                "items": [
                    {"bot_id": "b1", "bot_name": "One"},
                    {"bot_id": "b2", "bot_name": "Two"}
                ]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/bots"))
        .and(query_param("page_num", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {
                "total": 3,
                "items": [{"bot_id": "b3", "bot_name": "Three"}]
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut bots = client
        .bots()
        .list(ListBotsRequest {
            workspace_id: "ws1".to_string(),
            page_num: 0,
            page_size: 2,
        })
        .await
        .unwrap();

    assert_eq!(bots.total(), 3);
    let mut names = Vec::new();
    while bots.next().await {
        names.push(bots.current().unwrap().name.clone());
    }
    assert_eq!(names, vec!["One", "Two", "Three"]);
    assert!(bots.err().is_none());
}

#[tokio::test]
async fn chat_stream_decodes_events() {
    let server = MockServer::start().await;
    let body = "event: conversation.chat.created\n\
                data: {\"id\":\"chat1\",\"conversation_id\":\"c1\",\"status\":\"created\"}\n\
                \n\
                event: conversation.message.delta\n\
                data: {\"id\":\"m1\",\"conversation_id\":\"c1\",\"role\":\"assistant\",\"content\":\"Hi\"}\n\
                \n\
                event: done\n\
                data:\n";
    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "stream-log")
                .set_body_raw(body, "text/event-stream"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = CreateChatRequest {
        bot_id: "bot1".to_string(),
        user_id: "user1".to_string(),
        messages: vec![Message::user_text("Hello")],
        ..Default::default()
    };
    let mut events = client.chat().stream(request).await.unwrap();
    assert_eq!(events.log_id(), Some("stream-log"));

    let first = events.recv().await.unwrap().unwrap();
    assert_eq!(first.chat().unwrap().id, "chat1");

    let second = events.recv().await.unwrap().unwrap();
    assert_eq!(second.message().unwrap().content, "Hi");

    let third = events.recv().await.unwrap().unwrap();
    assert!(matches!(third, ChatEvent::Done { .. }));

    assert!(events.recv().await.unwrap().is_none());
    events.close();
    events.close();
}

#[tokio::test]
async fn json_rejection_of_stream_request_is_decoded_before_parsing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/workflows/stream_run"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 100, "msg": "bad workflow id"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .workflows()
        .stream(Default::default())
        .await
        .unwrap_err();
    match err {
        Error::Api { code, message, .. } => {
            assert_eq!(code, 100);
            assert_eq!(message, "bad workflow id");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn message_listing_propagates_continuation_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/conversations/c1/messages"))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("before_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {
                "has_more": true,
                "last_id": "m2",
                "items": [
                    {"role": "assistant", "content": "a", "id": "m1", "conversation_id": "c1"},
                    {"role": "user", "content": "b", "id": "m2", "conversation_id": "c1"}
                ]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/conversations/c1/messages"))
        .and(query_param("before_id", "m2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {
                "has_more": false,
                "items": [
                    {"role": "user", "content": "c", "id": "m3", "conversation_id": "c1"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut messages = client
        .conversations()
        .messages(palaver::ListMessagesRequest {
            conversation_id: "c1".to_string(),
            limit: 2,
            before_id: None,
        })
        .await
        .unwrap();

    let mut ids = Vec::new();
    while messages.next().await {
        ids.push(messages.current().unwrap().id.clone());
    }
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert!(messages.err().is_none());
}
