mod admin;
mod auth;
mod catalog;
mod files;
mod helpers;
mod lifecycle;
mod mocks;

use actix_web::{test, App};

use crate::routes::health;

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let body = test::read_body(res).await;
    assert_eq!(body.as_ref(), "👍️\n".as_bytes());
}
