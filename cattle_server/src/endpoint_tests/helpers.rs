use actix_web::{
    body::MessageBody,
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
    ResponseError,
};
use cattle_engine::db_types::Role;
use chrono::Duration;
use log::debug;

use crate::{
    auth::{TokenIssuer, TokenVerifier},
    config::AuthConfig,
    middleware::JwtMiddlewareFactory,
    server::configure_extractors,
};

// A fixed configuration for issuing tokens in tests. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-tests-secret-0123456789abcdef", Duration::minutes(10))
}

pub fn issue_token(username: &str, role: Role) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(username, role).expect("Failed to sign token")
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Sends `req` to an app configured by `configure`, behind the bearer token middleware, and returns the status and
/// body. Errors raised by middleware are rendered the same way the server renders them.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .wrap(JwtMiddlewareFactory::new(TokenVerifier::new(&get_auth_config())))
        .configure(configure_extractors)
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1,
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap_or_default()).into_owned();
    (status, body)
}

/// The `error` field of a JSON error response.
pub fn error_message(body: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(body).unwrap_or_else(|_| panic!("Not JSON: {body}"));
    value["error"].as_str().unwrap_or_default().to_string()
}
