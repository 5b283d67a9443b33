use actix_web::{http::StatusCode, test::TestRequest, web};
use cattle_engine::{
    db_types::{NewListing, NewUserAccount, Role},
    test_utils::prepare_env::{drop_database, fresh_database},
    AdminApi,
    ListingApi,
    SqliteDatabase,
    UserApi,
    UserManagement,
};
use serde_json::Value;

use super::helpers::{bearer, get_auth_config, issue_token, send_request};
use crate::{
    auth::{hash_password, TokenIssuer},
    config::AdminAccount,
    data_objects::ToggleResponse,
    routes::{
        AdminDeleteListingRoute,
        AdminListingsRoute,
        AdminStatsRoute,
        AdminUsersRoute,
        DeleteUserRoute,
        LoginRoute,
        ToggleUserRoute,
    },
    server::bootstrap_admin,
};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(AdminStatsRoute::<SqliteDatabase>::new())
            .service(AdminUsersRoute::<SqliteDatabase>::new())
            .service(ToggleUserRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new())
            .service(AdminListingsRoute::<SqliteDatabase>::new())
            .service(AdminDeleteListingRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(AdminApi::new(db.clone())))
            .app_data(web::Data::new(UserApi::new(db)))
            .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())));
    }
}

async fn seeded_database() -> SqliteDatabase {
    let db = fresh_database().await;
    let admin = AdminAccount { username: "root".into(), password: "s3nha-do-admin".to_string().into() };
    bootstrap_admin(&db, &admin).await.unwrap();
    // A second start-up must leave the existing account alone
    bootstrap_admin(&db, &admin).await.unwrap();
    let farmer = NewUserAccount {
        username: "fazenda".into(),
        password_hash: hash_password("senha").unwrap(),
        email: "fazenda@example.com".into(),
        first_name: "Joao".into(),
        last_name: "Pereira".into(),
        phone: "+55 65 97777-0000".into(),
        address: "Sorriso, MT".into(),
        tax_id: Some("123.456.789-00".into()),
        ie: None,
        role: Role::Farmer,
    };
    db.create_user(farmer).await.unwrap();
    db
}

#[actix_web::test]
async fn bootstrapped_admin_can_log_in() {
    let db = seeded_database().await;
    let req = TestRequest::post().uri("/auth/token").set_form([("username", "root"), ("password", "s3nha-do-admin")]);
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["role"], "admin");
    drop_database(db).await;
}

#[actix_web::test]
async fn admin_routes_refuse_other_roles() {
    let db = seeded_database().await;
    for (uri, role) in [("/admin/stats", Role::User), ("/admin/users", Role::Farmer), ("/admin/listings", Role::User)] {
        let req = TestRequest::get().uri(uri).insert_header(bearer(&issue_token("fazenda", role)));
        let (status, body) = send_request(req, configure(db.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}: {body}");
    }
    drop_database(db).await;
}

#[actix_web::test]
async fn stats_and_users() {
    let db = seeded_database().await;
    ListingApi::new(db.clone()).create_listing("fazenda", NewListing::new("Angus", 12)).await.unwrap();
    let admin = issue_token("root", Role::Admin);

    let req = TestRequest::get().uri("/admin/stats").insert_header(bearer(&admin));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let stats: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_supply"], 1);
    assert_eq!(stats["total_demand"], 0);

    let req = TestRequest::get().uri("/admin/users").insert_header(bearer(&admin));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("argon2"), "Password hashes leaked: {body}");
    let users: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(users.len(), 2);
    drop_database(db).await;
}

#[actix_web::test]
async fn disabling_an_account_blocks_login() {
    let db = seeded_database().await;
    let admin = issue_token("root", Role::Admin);
    let req = TestRequest::patch().uri("/admin/user/fazenda/toggle-status").insert_header(bearer(&admin));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let toggled: ToggleResponse = serde_json::from_str(&body).unwrap();
    assert!(!toggled.is_active);

    let req = TestRequest::post().uri("/auth/token").set_form([("username", "fazenda"), ("password", "senha")]);
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::patch().uri("/admin/user/ghost/toggle-status").insert_header(bearer(&admin));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    drop_database(db).await;
}

#[actix_web::test]
async fn deleting_users_and_listings() {
    let db = seeded_database().await;
    let listing = ListingApi::new(db.clone()).create_listing("fazenda", NewListing::new("Angus", 12)).await.unwrap();
    let admin = issue_token("root", Role::Admin);

    let req = TestRequest::delete().uri("/admin/user/root").insert_header(bearer(&admin));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/admin/listing/supply/{}", listing.record.id);
    let req = TestRequest::delete().uri(&uri).insert_header(bearer(&admin));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let req = TestRequest::delete().uri(&uri).insert_header(bearer(&admin));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::delete().uri("/admin/listing/cattle/123").insert_header(bearer(&admin));
    let (status, _) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::delete().uri("/admin/user/fazenda").insert_header(bearer(&admin));
    let (status, body) = send_request(req, configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    assert!(db.fetch_user("fazenda").await.unwrap().is_none());
    drop_database(db).await;
}
