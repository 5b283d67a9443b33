use actix_web::{http::StatusCode, test::TestRequest, web};
use cattle_engine::{
    db_types::{Notification, Role, UserAccount},
    traits::UserApiError,
    NotificationApi,
    UserApi,
};
use chrono::{Duration, Utc};
use serde_json::json;

use super::{
    helpers::{bearer, error_message, get_auth_config, issue_token, send_request},
    mocks::{MockNotificationStore, MockUserManager},
};
use crate::{
    auth::{hash_password, TokenIssuer, TokenVerifier},
    config::AuthConfig,
    data_objects::LoginResponse,
    routes::{LoginRoute, NotificationsRoute, RegisterRoute},
};

fn account(username: &str, password: &str, role: Role, is_active: bool) -> UserAccount {
    UserAccount {
        username: username.to_string(),
        password_hash: hash_password(password).unwrap(),
        email: format!("{username}@example.com"),
        first_name: "Ana".into(),
        last_name: "Souza".into(),
        phone: "+55 62 99999-0000".into(),
        address: "Rio Verde, GO".into(),
        tax_id: None,
        ie: None,
        role,
        is_active,
        created_at: Utc::now(),
    }
}

fn configure_with(db: MockUserManager) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(RegisterRoute::<MockUserManager>::new())
            .service(LoginRoute::<MockUserManager>::new())
            .app_data(web::Data::new(UserApi::new(db)))
            .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())));
    }
}

fn registration(username: &str, role: &str) -> serde_json::Value {
    json!({
        "username": username,
        "password": "senha-forte",
        "email": format!("{username}@example.com"),
        "first_name": "Ana",
        "last_name": "Souza",
        "phone": "+55 62 99999-0000",
        "address": "Rio Verde, GO",
        "role": role,
    })
}

fn login(username: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/auth/token").set_form([("username", username), ("password", password)])
}

#[actix_web::test]
async fn register_farmer() {
    let _ = env_logger::try_init();
    let mut db = MockUserManager::new();
    db.expect_create_user().times(1).returning(|user| {
        assert_eq!(user.role, Role::Farmer);
        assert!(user.password_hash.starts_with("$argon2"), "password was not hashed");
        Ok(UserAccount {
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            address: user.address,
            tax_id: user.tax_id,
            ie: user.ie,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        })
    });
    let req = TestRequest::post().uri("/auth/register").set_json(registration("fazenda_boa", "farmer"));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::CREATED, "was: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["username"], "fazenda_boa");
    assert_eq!(value["role"], "farmer");
    assert!(value.get("password_hash").is_none());
}

#[actix_web::test]
async fn register_admin_is_refused() {
    let mut db = MockUserManager::new();
    db.expect_create_user().never();
    let req = TestRequest::post().uri("/auth/register").set_json(registration("sneaky", "admin"));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "was: {body}");
}

#[actix_web::test]
async fn register_taken_username() {
    let mut db = MockUserManager::new();
    db.expect_create_user().returning(|user| Err(UserApiError::UsernameTaken(user.username)));
    let req = TestRequest::post().uri("/auth/register").set_json(registration("ana", "user"));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(error_message(&body).contains("already taken"), "was: {body}");
}

#[actix_web::test]
async fn register_with_malformed_body() {
    let db = MockUserManager::new();
    let req = TestRequest::post().uri("/auth/register").set_json(json!({"username": "ana"}));
    let (status, _) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_with_valid_credentials() {
    let _ = env_logger::try_init();
    let mut db = MockUserManager::new();
    let user = account("ana", "senha-forte", Role::User, true);
    db.expect_fetch_user().returning(move |_| Ok(Some(user.clone())));
    let (status, body) = send_request(login("ana", "senha-forte"), configure_with(db)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let response: LoginResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.token_type, "bearer");
    assert_eq!(response.role, Role::User);
    let claims = TokenVerifier::new(&get_auth_config()).verify(&response.access_token).unwrap();
    assert_eq!(claims.sub, "ana");
    assert_eq!(claims.role, Role::User);
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let mut db = MockUserManager::new();
    let user = account("ana", "senha-forte", Role::User, true);
    db.expect_fetch_user().returning(move |_| Ok(Some(user.clone())));
    let (status, body) = send_request(login("ana", "senha-fraca"), configure_with(db)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(error_message(&body).contains("Invalid username or password"), "was: {body}");
}

#[actix_web::test]
async fn login_as_unknown_user() {
    let mut db = MockUserManager::new();
    db.expect_fetch_user().returning(|_| Ok(None));
    let (status, _) = send_request(login("ghost", "whatever"), configure_with(db)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_to_disabled_account() {
    let mut db = MockUserManager::new();
    let user = account("ana", "senha-forte", Role::Farmer, false);
    db.expect_fetch_user().returning(move |_| Ok(Some(user.clone())));
    let (status, body) = send_request(login("ana", "senha-forte"), configure_with(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(error_message(&body).contains("disabled"), "was: {body}");
}

fn configure_inbox(cfg: &mut web::ServiceConfig) {
    let mut db = MockNotificationStore::new();
    db.expect_fetch_notifications_for_user().returning(|user| {
        let notification: Notification = serde_json::from_value(json!({
            "id": "n-1",
            "user_id": user,
            "message": "New proposal received",
            "details": { "proposal_id": "p-1" },
            "timestamp": Utc::now(),
            "read": false,
        }))
        .unwrap();
        Ok(vec![notification])
    });
    cfg.service(NotificationsRoute::<MockNotificationStore>::new()).app_data(web::Data::new(NotificationApi::new(db)));
}

#[actix_web::test]
async fn protected_route_with_valid_token() {
    let req = TestRequest::get().uri("/notifications").insert_header(bearer(&issue_token("ana", Role::User)));
    let (status, body) = send_request(req, configure_inbox).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let inbox: Vec<Notification> = serde_json::from_str(&body).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].user_id, "ana");
}

#[actix_web::test]
async fn protected_route_without_token() {
    let (status, body) = send_request(TestRequest::get().uri("/notifications"), configure_inbox).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(error_message(&body).contains("No access token"), "was: {body}");
}

#[actix_web::test]
async fn protected_route_with_garbage_token() {
    let req = TestRequest::get().uri("/notifications").insert_header(bearer("made-up-nonsense"));
    let (status, body) = send_request(req, configure_inbox).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(error_message(&body).contains("not in the correct format"), "was: {body}");
}

#[actix_web::test]
async fn token_signed_with_another_secret() {
    let other = AuthConfig::new("a-completely-different-secret-0123456789", Duration::minutes(5));
    let token = TokenIssuer::new(&other).issue_token("ana", Role::Admin).unwrap();
    let req = TestRequest::get().uri("/notifications").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure_inbox).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_token() {
    let expired = AuthConfig::new("endpoint-tests-secret-0123456789abcdef", Duration::minutes(-5));
    let token = TokenIssuer::new(&expired).issue_token("ana", Role::User).unwrap();
    let req = TestRequest::get().uri("/notifications").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure_inbox).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(error_message(&body).contains("invalid"), "was: {body}");
}
