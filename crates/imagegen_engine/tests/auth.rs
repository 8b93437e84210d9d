use imagegen_engine::{AuthClient, AuthError, ServiceSettings};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AuthClient {
    AuthClient::new(ServiceSettings {
        base_url: server.uri(),
        api_key: "anon".to_string(),
        ..ServiceSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn sign_in_returns_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_json(json!({ "email": "a@example.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt",
            "user": { "id": "user-1", "email": "a@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = client(&server)
        .sign_in("a@example.com", "secret1")
        .await
        .expect("signed in");
    assert_eq!(identity.user_id, "user-1");
    assert_eq!(identity.access_token, "jwt");
}

#[tokio::test]
async fn wrong_password_maps_to_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .sign_in("a@example.com", "secret1")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).sign_up("not-an-email", "secret1").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidEmail);
}
