use std::time::Duration;

use actix_web::{
    dev::Server,
    error::Error,
    http::KeepAlive,
    middleware::Logger,
    web,
    web::ServiceConfig,
    App,
    HttpRequest,
    HttpServer,
};
use cattle_engine::{
    db_types::{NewUserAccount, Role},
    events::{EventHandlers, EventHooks, EventProducers},
    AdminApi,
    CatalogApi,
    ListingApi,
    NotificationApi,
    ProposalFlowApi,
    SettlementApi,
    SqliteDatabase,
    UserApi,
    UserManagement,
};
use log::*;

use crate::{
    auth::{hash_password, TokenIssuer, TokenVerifier},
    blob_store::FileBlobStore,
    config::{AdminAccount, ServerConfig},
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    routes::{
        health,
        AddBreedRoute,
        AddCityRoute,
        AdminDeleteListingRoute,
        AdminListingsRoute,
        AdminStatsRoute,
        AdminUsersRoute,
        CreateDemandRoute,
        CreateListingRoute,
        DeleteBreedRoute,
        DeleteCityRoute,
        DeleteUserRoute,
        FetchFileRoute,
        FinalizeRoute,
        InternalWeightRoute,
        LoginRoute,
        MarketRoute,
        MyListingsRoute,
        NotificationsRoute,
        PayReservationRoute,
        ReceivedProposalsRoute,
        RecordWeightRoute,
        ReferencesRoute,
        RegisterRoute,
        RequestAdvanceRoute,
        RespondToProposalRoute,
        SentProposalsRoute,
        SlaughterhouseWeightRoute,
        SubmitProposalRoute,
        ToggleUserRoute,
        TransactionRoute,
        UploadRoute,
        WeightsRoute,
    },
};

/// Uploads (photos, NF-e and GTA documents) larger than this are refused.
const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migrations failed. {e}")))?;
    if let Some(admin) = &config.admin {
        bootstrap_admin(&db, admin).await?;
    }
    let blob_store = FileBlobStore::new(&config.upload_dir)
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not prepare the upload directory. {e}")))?;
    let handlers = EventHandlers::new(config.event_buffer_size, EventHooks::logging());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, blob_store, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Creates the configured administrator account, unless an account with that name already exists.
pub async fn bootstrap_admin<B: UserManagement>(db: &B, admin: &AdminAccount) -> Result<(), ServerError> {
    if db.fetch_user(&admin.username).await?.is_some() {
        debug!("💻️ Administrator account {} already exists", admin.username);
        return Ok(());
    }
    let password_hash = hash_password(admin.password.reveal())?;
    let account = NewUserAccount {
        username: admin.username.clone(),
        password_hash,
        email: format!("{}@localhost", admin.username),
        first_name: "Marketplace".into(),
        last_name: "Administrator".into(),
        phone: String::default(),
        address: String::default(),
        tax_id: None,
        ie: None,
        role: Role::Admin,
    };
    db.create_user(account).await?;
    info!("💻️ Created administrator account {}", admin.username);
    Ok(())
}

fn json_error(err: impl std::fmt::Display, _req: &HttpRequest) -> Error {
    ServerError::InvalidRequestBody(err.to_string()).into()
}

/// Sets the request size limit, and makes extractor failures (malformed bodies, query strings and paths) produce the
/// same JSON error responses as the handlers do.
pub fn configure_extractors(cfg: &mut ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_SIZE))
        .app_data(web::JsonConfig::default().error_handler(|e, req| json_error(e, req)))
        .app_data(web::FormConfig::default().error_handler(|e, req| json_error(e, req)))
        .app_data(web::QueryConfig::default().error_handler(|e, req| json_error(e, req)))
        .app_data(web::PathConfig::default().error_handler(|e, req| {
            ServerError::InvalidRequestPath(format!("{e} ({})", req.path())).into()
        }));
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    blob_store: FileBlobStore,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let listing_api = ListingApi::new(db.clone());
        let proposal_api = ProposalFlowApi::new(db.clone(), producers.clone());
        let settlement_api = SettlementApi::new(db.clone(), producers.clone());
        let notification_api = NotificationApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let user_api = UserApi::new(db.clone());
        let admin_api = AdminApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let verifier = TokenVerifier::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cms::access_log"))
            .configure(configure_extractors)
            .app_data(web::Data::new(listing_api))
            .app_data(web::Data::new(proposal_api))
            .app_data(web::Data::new(settlement_api))
            .app_data(web::Data::new(notification_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(user_api))
            .app_data(web::Data::new(admin_api))
            .app_data(web::Data::new(blob_store.clone()))
            .app_data(web::Data::new(jwt_signer));
        // Bearer tokens are checked on everything under /api. Routes that need the caller's identity reject requests
        // without one.
        let api_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(verifier))
            .service(MarketRoute::<SqliteDatabase>::new())
            .service(ReferencesRoute::<SqliteDatabase>::new())
            .service(FetchFileRoute::<FileBlobStore>::new())
            .service(UploadRoute::<FileBlobStore>::new())
            .service(CreateListingRoute::<SqliteDatabase>::new())
            .service(CreateDemandRoute::<SqliteDatabase>::new())
            .service(MyListingsRoute::<SqliteDatabase>::new())
            .service(NotificationsRoute::<SqliteDatabase>::new())
            .service(SubmitProposalRoute::<SqliteDatabase>::new())
            .service(ReceivedProposalsRoute::<SqliteDatabase>::new())
            .service(SentProposalsRoute::<SqliteDatabase>::new())
            .service(RespondToProposalRoute::<SqliteDatabase>::new())
            .service(PayReservationRoute::<SqliteDatabase>::new())
            .service(RecordWeightRoute::<SqliteDatabase>::new())
            .service(WeightsRoute::<SqliteDatabase>::new())
            .service(InternalWeightRoute::<SqliteDatabase>::new())
            .service(RequestAdvanceRoute::<SqliteDatabase>::new())
            .service(FinalizeRoute::<SqliteDatabase>::new())
            .service(SlaughterhouseWeightRoute::<SqliteDatabase>::new())
            .service(TransactionRoute::<SqliteDatabase>::new())
            .service(AddBreedRoute::<SqliteDatabase>::new())
            .service(DeleteBreedRoute::<SqliteDatabase>::new())
            .service(AddCityRoute::<SqliteDatabase>::new())
            .service(DeleteCityRoute::<SqliteDatabase>::new())
            .service(AdminStatsRoute::<SqliteDatabase>::new())
            .service(AdminUsersRoute::<SqliteDatabase>::new())
            .service(ToggleUserRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new())
            .service(AdminListingsRoute::<SqliteDatabase>::new())
            .service(AdminDeleteListingRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
