mod common;

use common::{call_json, shop_json, test_settings};
use receptionist_web::models::{AdapterType, CallIntent, ShopConfigCreate};
use receptionist_web::services::{ApiError, ReceptionistApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "token-abc";

async fn client() -> (MockServer, ReceptionistApi) {
    let server = MockServer::start().await;
    let api = ReceptionistApi::new(&test_settings(&server.uri()).api).unwrap();
    (server, api)
}

#[tokio::test]
async fn requests_carry_bearer_token() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/shops/me"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shop_json(true)))
        .expect(1)
        .mount(&server)
        .await;

    let shop = api.get_shop(TOKEN).await.unwrap();
    assert_eq!(shop.name, "Main Street Auto");
    assert!(shop.settings.allows(CallIntent::GetHours));
}

#[tokio::test]
async fn list_calls_passes_limit() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/calls/me"))
        .and(query_param("limit", "25"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([call_json("c1", None), call_json("c2", None)])),
        )
        .mount(&server)
        .await;

    let calls = api.list_calls(TOKEN, 25).await.unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].id, "c2");
}

#[tokio::test]
async fn create_shop_posts_payload() {
    let (server, api) = client().await;
    Mock::given(method("POST"))
        .and(path("/api/shops/me"))
        .and(body_json(json!({
            "name": "Main Street Auto",
            "phone": "+15551234567",
            "adapter_type": "tekmetric"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(shop_json(true)))
        .expect(1)
        .mount(&server)
        .await;

    let create = ShopConfigCreate {
        name: "Main Street Auto".to_string(),
        phone: "+15551234567".to_string(),
        adapter_type: AdapterType::Tekmetric,
        settings: None,
    };
    api.create_shop(TOKEN, &create).await.unwrap();
}

#[tokio::test]
async fn error_detail_reaches_the_caller() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/billing/subscription"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "Billing provider offline"})),
        )
        .mount(&server)
        .await;

    match api.subscription(TOKEN).await {
        Err(ApiError::Status { status, detail }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(detail, "Billing provider offline");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_maps_to_unauthorized() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/calendar/google/status"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    assert!(matches!(
        api.calendar_status(TOKEN).await,
        Err(ApiError::Unauthorized)
    ));
}

#[tokio::test]
async fn delete_accepts_empty_body() {
    let (server, api) = client().await;
    Mock::given(method("DELETE"))
        .and(path("/api/shops/me"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api.delete_shop(TOKEN).await.unwrap();
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/billing/quota"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert!(matches!(api.quota(TOKEN).await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn customer_context_uses_normalized_number() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/context/customer/+15551234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "phone_number": "+15551234567",
            "shop_id": "65f0c0ffee",
            "last_interaction": "2026-03-03T10:00:00Z",
            "interactions": [],
            "known_info": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = api.customer_context(TOKEN, "(555) 123-4567").await.unwrap();
    assert_eq!(context.phone_number, "+15551234567");
}

#[tokio::test]
async fn calendar_connect_and_disconnect_use_google_endpoints() {
    let (server, api) = client().await;
    Mock::given(method("GET"))
        .and(path("/api/calendar/google/auth"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"authorization_url": "https://accounts.google.com/o/oauth2/auth?state=s1"}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/calendar/google/disconnect"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": ""})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = api.calendar_auth_url(TOKEN).await.unwrap();
    assert_eq!(
        auth.authorization_url,
        "https://accounts.google.com/o/oauth2/auth?state=s1"
    );

    let result = api.calendar_disconnect(TOKEN).await.unwrap();
    assert!(result.success);
}
