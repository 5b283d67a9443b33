use actix_web::{http::StatusCode, test::TestRequest, web};
use cattle_engine::{
    db_types::{CustomCity, References, Role, UserAccount},
    CatalogApi,
    UserApi,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::{bearer, error_message, issue_token, send_request},
    mocks::MockReferenceStore,
};
use crate::routes::{AddBreedRoute, AddCityRoute, DeleteBreedRoute, DeleteCityRoute, ReferencesRoute};

fn references() -> References {
    References {
        breeds: vec!["Angus".into(), "Brahman".into(), "Nelore".into()],
        custom_cities: vec![CustomCity { state: "GO".into(), name: "Rio Verde".into() }],
    }
}

fn admin_account(is_active: bool) -> UserAccount {
    UserAccount {
        username: "root".into(),
        password_hash: String::default(),
        email: "root@localhost".into(),
        first_name: "Marketplace".into(),
        last_name: "Administrator".into(),
        phone: String::default(),
        address: String::default(),
        tax_id: None,
        ie: None,
        role: Role::Admin,
        is_active,
        created_at: Utc::now(),
    }
}

/// The account store behind the admin token used in these tests.
fn accounts(admin_is_active: bool) -> MockReferenceStore {
    let mut accounts = MockReferenceStore::new();
    accounts
        .expect_fetch_user()
        .withf(|username| username == "root")
        .returning(move |_| Ok(Some(admin_account(admin_is_active))));
    accounts
}

fn configure_with(db: MockReferenceStore) -> impl FnOnce(&mut web::ServiceConfig) {
    configure_with_accounts(db, accounts(true))
}

fn configure_with_accounts(
    db: MockReferenceStore,
    accounts: MockReferenceStore,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(ReferencesRoute::<MockReferenceStore>::new())
            .service(AddBreedRoute::<MockReferenceStore>::new())
            .service(DeleteBreedRoute::<MockReferenceStore>::new())
            .service(AddCityRoute::<MockReferenceStore>::new())
            .service(DeleteCityRoute::<MockReferenceStore>::new())
            .app_data(web::Data::new(CatalogApi::new(db)))
            .app_data(web::Data::new(UserApi::new(accounts)));
    }
}

#[actix_web::test]
async fn references_are_public() {
    let _ = env_logger::try_init();
    let mut db = MockReferenceStore::new();
    db.expect_fetch_references().returning(|| Ok(references()));
    let (status, body) = send_request(TestRequest::get().uri("/system/references"), configure_with(db)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let refs: References = serde_json::from_str(&body).unwrap();
    assert_eq!(refs, references());
}

#[actix_web::test]
async fn add_breed_without_token() {
    let mut db = MockReferenceStore::new();
    db.expect_insert_breed().never();
    let req = TestRequest::post().uri("/admin/breed?name=Brahman");
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "was: {body}");
}

#[actix_web::test]
async fn add_breed_as_farmer() {
    let mut db = MockReferenceStore::new();
    db.expect_insert_breed().never();
    let req =
        TestRequest::post().uri("/admin/breed?name=Brahman").insert_header(bearer(&issue_token("joao", Role::Farmer)));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(error_message(&body).contains("farmer role cannot access"), "was: {body}");
}

#[actix_web::test]
async fn add_breed_as_admin() {
    let mut db = MockReferenceStore::new();
    db.expect_insert_breed().withf(|name| name == "Brahman").times(1).returning(|_| Ok(()));
    db.expect_fetch_references().returning(|| Ok(references()));
    let req =
        TestRequest::post().uri("/admin/breed?name=Brahman").insert_header(bearer(&issue_token("root", Role::Admin)));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let refs: References = serde_json::from_str(&body).unwrap();
    assert!(refs.breeds.contains(&"Brahman".to_string()));
}

#[actix_web::test]
async fn disabled_admin_keeps_a_valid_token_but_cannot_use_it() {
    let mut db = MockReferenceStore::new();
    db.expect_insert_breed().never();
    let req =
        TestRequest::post().uri("/admin/breed?name=Brahman").insert_header(bearer(&issue_token("root", Role::Admin)));
    let (status, body) = send_request(req, configure_with_accounts(db, accounts(false))).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "was: {body}");
}

#[actix_web::test]
async fn add_blank_breed() {
    let mut db = MockReferenceStore::new();
    db.expect_insert_breed().never();
    let req = TestRequest::post().uri("/admin/breed?name=%20").insert_header(bearer(&issue_token("root", Role::Admin)));
    let (status, _) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn delete_breed_as_admin() {
    let mut db = MockReferenceStore::new();
    db.expect_delete_breed().withf(|name| name == "Angus").times(1).returning(|_| Ok(true));
    db.expect_fetch_references().returning(|| {
        Ok(References { breeds: vec!["Nelore".into()], custom_cities: vec![] })
    });
    let req = TestRequest::delete().uri("/admin/breed/Angus").insert_header(bearer(&issue_token("root", Role::Admin)));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let refs: References = serde_json::from_str(&body).unwrap();
    assert_eq!(refs.breeds, vec!["Nelore".to_string()]);
}

#[actix_web::test]
async fn add_and_delete_city() {
    let mut db = MockReferenceStore::new();
    db.expect_insert_custom_city()
        .withf(|city| city.state == "MT" && city.name == "Sorriso")
        .times(1)
        .returning(|_| Ok(()));
    db.expect_fetch_references().returning(|| Ok(references()));
    let req = TestRequest::post()
        .uri("/admin/location/city")
        .insert_header(bearer(&issue_token("root", Role::Admin)))
        .set_json(json!({ "state": "MT", "name": "Sorriso" }));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");

    let mut db = MockReferenceStore::new();
    db.expect_delete_custom_city().withf(|state, name| state == "GO" && name == "Rio Verde").returning(|_, _| Ok(true));
    db.expect_fetch_references().returning(|| Ok(References::default()));
    let req = TestRequest::delete()
        .uri("/admin/location/city/GO/Rio%20Verde")
        .insert_header(bearer(&issue_token("root", Role::Admin)));
    let (status, body) = send_request(req, configure_with(db)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
}
