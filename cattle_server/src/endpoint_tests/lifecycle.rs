//! The full deal lifecycle, driven over HTTP against a throwaway SQLite database.
use actix_web::{http::StatusCode, test::TestRequest, web};
use cattle_engine::{
    db_types::{NewUserAccount, Role},
    events::EventProducers,
    test_utils::prepare_env::{drop_database, fresh_database},
    ListingApi,
    NotificationApi,
    ProposalFlowApi,
    SettlementApi,
    SqliteDatabase,
    UserApi,
    UserManagement,
};
use serde_json::{json, Value};

use super::helpers::{bearer, error_message, issue_token, send_request};
use crate::routes::{
    CreateDemandRoute,
    CreateListingRoute,
    FinalizeRoute,
    MarketRoute,
    NotificationsRoute,
    PayReservationRoute,
    ReceivedProposalsRoute,
    RecordWeightRoute,
    RespondToProposalRoute,
    SentProposalsRoute,
    SlaughterhouseWeightRoute,
    SubmitProposalRoute,
    TransactionRoute,
    WeightsRoute,
};

async fn create_account(db: &SqliteDatabase, username: &str, role: Role) {
    let user = NewUserAccount {
        username: username.into(),
        password_hash: "unused".into(),
        email: format!("{username}@example.com"),
        first_name: username.into(),
        last_name: "Teste".into(),
        phone: "+55 64 98888-0000".into(),
        address: "Zona Rural".into(),
        tax_id: None,
        ie: None,
        role,
    };
    db.create_user(user).await.expect("Error creating account");
}

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(MarketRoute::<SqliteDatabase>::new())
            .service(CreateListingRoute::<SqliteDatabase>::new())
            .service(CreateDemandRoute::<SqliteDatabase>::new())
            .service(NotificationsRoute::<SqliteDatabase>::new())
            .service(SubmitProposalRoute::<SqliteDatabase>::new())
            .service(ReceivedProposalsRoute::<SqliteDatabase>::new())
            .service(SentProposalsRoute::<SqliteDatabase>::new())
            .service(RespondToProposalRoute::<SqliteDatabase>::new())
            .service(PayReservationRoute::<SqliteDatabase>::new())
            .service(RecordWeightRoute::<SqliteDatabase>::new())
            .service(WeightsRoute::<SqliteDatabase>::new())
            .service(FinalizeRoute::<SqliteDatabase>::new())
            .service(SlaughterhouseWeightRoute::<SqliteDatabase>::new())
            .service(TransactionRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(ListingApi::new(db.clone())))
            .app_data(web::Data::new(NotificationApi::new(db.clone())))
            .app_data(web::Data::new(UserApi::new(db.clone())))
            .app_data(web::Data::new(ProposalFlowApi::new(db.clone(), EventProducers::default())))
            .app_data(web::Data::new(SettlementApi::new(db, EventProducers::default())));
    }
}

struct Market {
    db: SqliteDatabase,
    farmer: String,
    buyer: String,
}

impl Market {
    async fn new() -> Self {
        let db = fresh_database().await;
        create_account(&db, "fazenda", Role::Farmer).await;
        create_account(&db, "frigorifico", Role::User).await;
        Self { db, farmer: issue_token("fazenda", Role::Farmer), buyer: issue_token("frigorifico", Role::User) }
    }

    async fn post(&self, token: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = TestRequest::post().uri(uri).insert_header(bearer(token)).set_json(body);
        self.send(req).await
    }

    async fn get(&self, token: &str, uri: &str) -> (StatusCode, Value) {
        self.send(TestRequest::get().uri(uri).insert_header(bearer(token))).await
    }

    async fn send(&self, req: TestRequest) -> (StatusCode, Value) {
        let (status, body) = send_request(req, configure(self.db.clone())).await;
        let value = serde_json::from_str(&body).unwrap_or_else(|_| panic!("Response is not JSON: {body}"));
        (status, value)
    }

    /// Posts a listing and walks it through to `SOLD`, returning the listing and proposal ids.
    async fn sold_listing(&self, quantity: i64) -> (String, String) {
        let (status, posted) = self
            .post(
                &self.farmer,
                "/farmer",
                json!({ "breed": "Nelore", "quantity": quantity, "city": "Rio Verde", "state": "GO",
                        "nfe_file": "nfe.pdf", "gta_file": "gta.pdf" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{posted}");
        let listing_id = posted["id"].as_str().unwrap().to_string();
        let (status, created) =
            self.post(&self.buyer, "/proposals", json!({ "listing_id": listing_id, "price_offer": 300.0 })).await;
        assert_eq!(status, StatusCode::OK, "{created}");
        let proposal_id = created["id"].as_str().unwrap().to_string();
        let (status, accepted) = self.post(&self.farmer, &format!("/proposals/{proposal_id}/accept"), json!({})).await;
        assert_eq!(status, StatusCode::OK, "{accepted}");
        let (status, docs) = self.post(&self.buyer, &format!("/pay-reservation/{proposal_id}"), json!({})).await;
        assert_eq!(status, StatusCode::OK, "{docs}");
        (listing_id, proposal_id)
    }

    async fn close(self) {
        drop_database(self.db).await;
    }
}

#[actix_web::test]
async fn live_weight_deal() {
    let market = Market::new().await;
    let (status, demand) = market
        .post(&market.buyer, "/buyer", json!({ "breed": "Nelore", "quantity": 10, "state": "GO" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{demand}");
    assert_eq!(demand["matches"], 0);

    let (status, posted) =
        market.post(&market.farmer, "/farmer", json!({ "race": "Nelore", "quantity": 10, "price": 310.0 })).await;
    assert_eq!(status, StatusCode::OK, "{posted}");
    assert_eq!(posted["matches"], 1);
    let listing_id = posted["id"].as_str().unwrap().to_string();

    let (status, inbox) = market.get(&market.buyer, "/notifications").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1, "{inbox}");

    let (status, market_feed) = market.get(&market.buyer, "/market").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(market_feed["supply"][0]["id"], listing_id.as_str());

    // Farmers cannot make offers
    let (status, _) =
        market.post(&market.farmer, "/proposals", json!({ "listing_id": listing_id, "price_offer": 1.0 })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = market
        .post(
            &market.buyer,
            "/proposals",
            json!({ "supply_id": listing_id, "price_offer": 300.0, "message": "Retiro na sexta" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["msg"], "Sent");
    let proposal_id = created["id"].as_str().unwrap().to_string();

    let (status, received) = market.get(&market.farmer, "/my-proposals").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(received[0]["buyer_contact"], "+55 64 98888-0000");

    // Only the owner of the listing may respond, and only with a known action
    let (status, _) = market.post(&market.buyer, &format!("/proposals/{proposal_id}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, err) = market.post(&market.farmer, &format!("/proposals/{proposal_id}/haggle"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");

    let (status, accepted) = market.post(&market.farmer, &format!("/proposals/{proposal_id}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "ACCEPTED");
    let (status, _) = market.post(&market.farmer, &format!("/proposals/{proposal_id}/accept"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Weights can be recorded while awaiting payment, but finalizing needs a paid deposit
    let (status, weighed) = market
        .post(
            &market.farmer,
            &format!("/listings/{listing_id}/weights"),
            json!({ "batch_number": 1, "quantity": 5, "total_weight": 1500.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{weighed}");
    assert_eq!(weighed["remaining"], 5);
    let terms = json!({ "nfe_document": "nfe.pdf", "gta_document": "gta.pdf", "transport_fee": 200.0,
                        "funrural_tax": 100.0 });
    let (status, _) = market.post(&market.farmer, &format!("/listings/{listing_id}/finalize"), terms.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, docs) = market.post(&market.buyer, &format!("/pay-reservation/{proposal_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{docs}");
    assert!(docs.get("nfe").is_some() && docs.get("gta").is_some(), "{docs}");

    let (status, weighed) = market
        .post(
            &market.farmer,
            &format!("/listings/{listing_id}/weights"),
            json!({ "batch_number": 2, "quantity": 5, "total_weight": 1500.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weighed["total_weighed"], 10);
    assert_eq!(weighed["remaining"], 0);
    let (status, report) = market.get(&market.buyer, &format!("/listings/{listing_id}/weights")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"].as_array().unwrap().len(), 2);

    let (status, finalized) = market.post(&market.farmer, &format!("/listings/{listing_id}/finalize"), terms).await;
    assert_eq!(status, StatusCode::OK, "{finalized}");
    let tx = &finalized["data"];
    assert_eq!(tx["status"], "completed");
    assert_eq!(tx["at_quantity"], 200.0);
    assert_eq!(tx["gross_amount"], 31200.0);
    assert_eq!(tx["final_amount"], 30900.0);

    let (status, fetched) = market.get(&market.buyer, &format!("/transactions/{listing_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["id"], tx["id"]);

    let (status, sent) = market.get(&market.buyer, "/my-sent-proposals").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent.as_array().unwrap().len(), 1, "{sent}");
    market.close().await;
}

#[actix_web::test]
async fn dead_weight_deal() {
    let market = Market::new().await;
    let (listing_id, _) = market.sold_listing(4).await;

    let bad_yield = json!({ "nfe_document": "n", "gta_document": "g", "yield_rate": 0.6 });
    let (status, _) = market.post(&market.farmer, &format!("/listings/{listing_id}/finalize"), bad_yield).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let terms = json!({ "nfe_document": "nfe.pdf", "gta_document": "gta.pdf", "transport_fee": 50.0 });
    let (status, finalized) = market.post(&market.farmer, &format!("/listings/{listing_id}/finalize"), terms).await;
    assert_eq!(status, StatusCode::OK, "{finalized}");
    assert_eq!(finalized["data"]["status"], "awaiting_slaughterhouse_weight");
    assert!(finalized["data"]["final_amount"].is_null());
    let tx_id = finalized["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/transactions/{tx_id}/slaughterhouse-weight");
    let too_high = json!({ "final_weight": 900.0, "yield_rate": 0.7, "price_per_unit": 310.0 });
    let (status, err) = market.post(&market.buyer, &uri, too_high).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("0.7"), "{err}");

    let report = json!({ "final_weight": 900.0, "yield_rate": 0.5, "price_per_unit": 310.0 });
    let (status, settled) = market.post(&market.buyer, &uri, report).await;
    assert_eq!(status, StatusCode::OK, "{settled}");
    // 900 kg is 60 arrobas: 60 * 0.5 * 310 = 9300, less the transport fee captured at finalize
    assert_eq!(settled["data"]["status"], "completed");
    assert_eq!(settled["data"]["at_quantity"], 60.0);
    assert_eq!(settled["data"]["gross_amount"], 9300.0);
    assert_eq!(settled["data"]["final_amount"], 9250.0);
    market.close().await;
}

#[actix_web::test]
async fn unknown_records() {
    let market = Market::new().await;
    let (status, err) = market.post(&market.buyer, "/pay-reservation/nope", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!error_message(&err.to_string()).is_empty());
    let (status, _) = market.get(&market.buyer, "/transactions/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) =
        market.post(&market.buyer, "/proposals", json!({ "listing_id": "nope", "price_offer": 300.0 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    market.close().await;
}

#[actix_web::test]
async fn tokens_of_disabled_accounts_cannot_change_anything() {
    let market = Market::new().await;
    let (listing_id, proposal_id) = market.sold_listing(4).await;
    market.db.toggle_user_active("fazenda").await.expect("Error disabling account");

    // The token has not expired, so reads still go through
    let (status, _) = market.get(&market.farmer, &format!("/listings/{listing_id}/weights")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = market
        .post(&market.farmer, "/farmer", json!({ "breed": "Nelore", "quantity": 3, "state": "GO" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{err}");
    let weight = json!({ "batch_number": 1, "quantity": 4, "total_weight": 1200.0 });
    let (status, _) = market.post(&market.farmer, &format!("/listings/{listing_id}/weights"), weight).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, weights) = market.get(&market.buyer, &format!("/listings/{listing_id}/weights")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(weights["data"].as_array().unwrap().is_empty(), "{weights}");

    // Deleting the account has the same effect on the other party's token
    market.db.delete_user("frigorifico").await.expect("Error deleting account");
    let (status, _) = market.post(&market.buyer, &format!("/pay-reservation/{proposal_id}"), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    market.close().await;
}
