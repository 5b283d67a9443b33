use actix_web::{http::StatusCode, test::TestRequest, web};
use bytes::Bytes;
use cattle_engine::db_types::Role;
use tempfile::TempDir;

use super::helpers::{bearer, error_message, issue_token, send_request};
use crate::{
    blob_store::FileBlobStore,
    data_objects::UploadResponse,
    routes::{FetchFileRoute, UploadRoute},
};

async fn store() -> (TempDir, FileBlobStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileBlobStore::new(dir.path()).await.unwrap();
    (dir, store)
}

fn configure(store: FileBlobStore) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(UploadRoute::<FileBlobStore>::new())
            .service(FetchFileRoute::<FileBlobStore>::new())
            .app_data(web::Data::new(store));
    }
}

#[actix_web::test]
async fn upload_and_download() {
    let (_dir, store) = store().await;
    let req = TestRequest::post()
        .uri("/upload?filename=boi-gordo.JPG")
        .insert_header(bearer(&issue_token("fazenda", Role::Farmer)))
        .set_payload(Bytes::from_static(b"\xff\xd8\xff\xe0 not really a jpeg"));
    let (status, body) = send_request(req, configure(store.clone())).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let uploaded: UploadResponse = serde_json::from_str(&body).unwrap();
    assert!(uploaded.filename.ends_with(".jpg"), "{}", uploaded.filename);

    // Downloads do not need a token
    let req = TestRequest::get().uri(&format!("/files/{}", uploaded.filename));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.ends_with("not really a jpeg"));
}

#[actix_web::test]
async fn upload_needs_a_token() {
    let (_dir, store) = store().await;
    let req = TestRequest::post().uri("/upload?filename=gta.pdf").set_payload("%PDF-1.4");
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn empty_upload() {
    let (_dir, store) = store().await;
    let req = TestRequest::post().uri("/upload").insert_header(bearer(&issue_token("fazenda", Role::Farmer)));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("empty"), "was: {body}");
}

#[actix_web::test]
async fn missing_and_hidden_files() {
    let (_dir, store) = store().await;
    let (status, _) = send_request(TestRequest::get().uri("/files/nope.pdf"), configure(store.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_request(TestRequest::get().uri("/files/.env"), configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
