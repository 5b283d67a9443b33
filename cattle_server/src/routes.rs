//! Request handler definitions
//!
//! Define each route and its handler here. Handlers should stay thin: pull the caller's identity from [`JwtClaims`]
//! (or [`ActiveAccount`] for anything that changes state), call into the marketplace engine, and shape the response. Anything more involved belongs in the engine.
//!
//! Each worker thread processes its requests sequentially, so handlers must never block. Database access is async.
//! CPU-heavy work (password hashing) is moved onto the blocking thread pool with [`web::block`].
use actix_web::{get, web, HttpResponse, Responder};
use bytes::Bytes;
use cattle_engine::{
    db_types::{
        CustomCity,
        ListingId,
        NewDemand,
        NewListing,
        NewWeightEntry,
        ProposalAction,
        ProposalId,
        Role,
        TransactionId,
    },
    traits::{SettlementTerms, WeighingResult},
    AdminApi,
    CatalogApi,
    ListingApi,
    ListingManagement,
    MarketplaceDatabase,
    NotificationApi,
    NotificationManagement,
    ProposalFlowApi,
    ReferenceData,
    SettlementApi,
    UserApi,
    UserManagement,
};
use log::*;

use crate::{
    auth::{hash_password, verify_password, ActiveAccount, JwtClaims, TokenIssuer},
    blob_store::BlobStore,
    data_objects::{
        AdvanceRequest,
        BreedParams,
        DataResponse,
        InternalWeightRequest,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        MarketResponse,
        NewProposalRequest,
        PostedResponse,
        ProposalCreated,
        RegisterRequest,
        SlaughterhouseWeightRequest,
        ToggleResponse,
        UploadParams,
        UploadResponse,
        WeighingResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl UserManagement);
/// Route handler for account registration
///
/// The password is hashed with Argon2 before the account is stored. Anyone may register as a `user` (buyer) or a
/// `farmer`. Administrator accounts cannot be self-registered.
pub async fn register<B: UserManagement>(
    body: web::Json<RegisterRequest>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ Registration request for {}", request.username);
    request.validate()?;
    let password = request.password.clone();
    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| ServerError::Unspecified(format!("Password hashing task failed. {e}")))??;
    let account = api.register(request.into_new_account(password_hash)).await?;
    Ok(HttpResponse::Created().json(account))
}

route!(login => Post "/auth/token" impl UserManagement);
/// Route handler for the login endpoint
///
/// Credentials are sent as an url-encoded form (`username`, `password`). On success, a bearer token is issued that
/// must be sent in the `Authorization` header of subsequent requests. The token does not refresh.
pub async fn login<B: UserManagement>(
    form: web::Form<LoginRequest>,
    api: web::Data<UserApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { username, password } = form.into_inner();
    trace!("💻️ Received login request for {username}");
    let account = api.authenticate(&username, |hash| verify_password(&password, hash)).await?;
    let access_token = signer.issue_token(&account.username, account.role)?;
    debug!("💻️ Issued access token to {username}");
    Ok(HttpResponse::Ok().json(LoginResponse::bearer(access_token, account.role, account.username)))
}

//----------------------------------------------   Files  ----------------------------------------------------
route!(upload => Post "/upload" impl BlobStore);
/// Stores the raw request body and returns the name it was stored under. The `filename` query parameter supplies the
/// original name, from which the extension is kept.
pub async fn upload<B: BlobStore>(
    claims: JwtClaims,
    params: web::Query<UploadParams>,
    body: Bytes,
    store: web::Data<B>,
) -> Result<HttpResponse, ServerError> {
    if body.is_empty() {
        return Err(ServerError::InvalidRequestBody("The uploaded file is empty".into()));
    }
    let original = params.into_inner().filename.unwrap_or_default();
    let filename = store.store(&original, body).await?;
    info!("💻️ {} uploaded {original} as {filename}", claims.sub);
    Ok(HttpResponse::Ok().json(UploadResponse { filename }))
}

route!(fetch_file => Get "/files/{filename}" impl BlobStore);
pub async fn fetch_file<B: BlobStore>(
    path: web::Path<String>,
    store: web::Data<B>,
) -> Result<HttpResponse, ServerError> {
    let filename = path.into_inner();
    trace!("💻️ GET file {filename}");
    let data = store.fetch(&filename).await?.ok_or_else(|| ServerError::NoRecordFound(filename.clone()))?;
    Ok(HttpResponse::Ok().content_type("application/octet-stream").body(data))
}

//----------------------------------------------   Listings  ----------------------------------------------------
route!(market => Get "/market" impl ListingManagement, NotificationManagement);
/// The public market feed: every open supply listing, newest first.
pub async fn market<B: ListingManagement + NotificationManagement>(
    api: web::Data<ListingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET market");
    let supply = api.market().await?;
    Ok(HttpResponse::Ok().json(MarketResponse { supply }))
}

route!(create_listing => Post "/farmer" impl ListingManagement, NotificationManagement, UserManagement);
/// Posts a supply listing. The owners of any open demands for the same breed are notified.
pub async fn create_listing<B: ListingManagement + NotificationManagement + UserManagement>(
    caller: ActiveAccount<B>,
    body: web::Json<NewListing>,
    api: web::Data<ListingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST supply listing for {}", caller.claims.sub);
    let result = api.create_listing(caller.username(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostedResponse { id: result.record.id.to_string(), matches: result.matches }))
}

route!(create_demand => Post "/buyer" impl ListingManagement, NotificationManagement, UserManagement);
/// Posts a demand. The owners of any open supply listings for the same breed are notified.
pub async fn create_demand<B: ListingManagement + NotificationManagement + UserManagement>(
    caller: ActiveAccount<B>,
    body: web::Json<NewDemand>,
    api: web::Data<ListingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST demand for {}", caller.claims.sub);
    let result = api.create_demand(caller.username(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostedResponse { id: result.record.id.to_string(), matches: result.matches }))
}

route!(my_listings => Get "/my-listings" impl ListingManagement, NotificationManagement);
pub async fn my_listings<B: ListingManagement + NotificationManagement>(
    claims: JwtClaims,
    api: web::Data<ListingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_listings for {}", claims.sub);
    let listings = api.my_listings(claims.username()).await?;
    Ok(HttpResponse::Ok().json(listings))
}

route!(notifications => Get "/notifications" impl NotificationManagement);
pub async fn notifications<B: NotificationManagement>(
    claims: JwtClaims,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET notifications for {}", claims.sub);
    let inbox = api.inbox(claims.username()).await?;
    Ok(HttpResponse::Ok().json(inbox))
}

//----------------------------------------------   Proposals  ---------------------------------------------------
route!(submit_proposal => Post "/proposals" impl MarketplaceDatabase, UserManagement);
/// Makes an offer (price per arroba) on an open listing. Farmers cannot make offers.
pub async fn submit_proposal<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    body: web::Json<NewProposalRequest>,
    api: web::Data<ProposalFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let NewProposalRequest { listing_id, price_offer, message } = body.into_inner();
    debug!("💻️ POST proposal by {} on listing {listing_id}", caller.claims.sub);
    let proposal = api.submit_proposal(caller.username(), &listing_id, price_offer, message).await?;
    Ok(HttpResponse::Ok().json(ProposalCreated { msg: "Sent".into(), id: proposal.id.to_string() }))
}

route!(received_proposals => Get "/my-proposals" impl MarketplaceDatabase, UserManagement);
/// Proposals made against the caller's listings, newest first.
pub async fn received_proposals<B: MarketplaceDatabase + UserManagement>(
    claims: JwtClaims,
    api: web::Data<ProposalFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET received proposals for {}", claims.sub);
    let proposals = api.received_proposals(claims.username()).await?;
    Ok(HttpResponse::Ok().json(proposals))
}

route!(sent_proposals => Get "/my-sent-proposals" impl MarketplaceDatabase, UserManagement);
/// Proposals the caller has made, newest first, each with a summary of the listing.
pub async fn sent_proposals<B: MarketplaceDatabase + UserManagement>(
    claims: JwtClaims,
    api: web::Data<ProposalFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET sent proposals for {}", claims.sub);
    let proposals = api.sent_proposals(claims.username()).await?;
    Ok(HttpResponse::Ok().json(proposals))
}

route!(respond_to_proposal => Post "/proposals/{id}/{action}" impl MarketplaceDatabase, UserManagement);
/// `accept` or `reject` a pending proposal. Only the owner of the listing may respond. Accepting reserves the
/// listing for the buyer until they pay the deposit.
pub async fn respond_to_proposal<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<(ProposalId, String)>,
    api: web::Data<ProposalFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (id, action) = path.into_inner();
    debug!("💻️ {} wants to {action} proposal {id}", caller.claims.sub);
    let action = action.parse::<ProposalAction>().map_err(|e| ServerError::InvalidRequestPath(e.to_string()))?;
    let proposal = api.respond_to_proposal(&id, action, caller.username()).await?;
    Ok(HttpResponse::Ok().json(proposal))
}

route!(pay_reservation => Post "/pay-reservation/{id}" impl MarketplaceDatabase, UserManagement);
/// The buyer pays the deposit on an accepted proposal. The listing is sold and the settlement documents are
/// returned.
pub async fn pay_reservation<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<ProposalId>,
    api: web::Data<ProposalFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ {} is paying the deposit on proposal {id}", caller.claims.sub);
    let documents = api.pay_deposit(&id, caller.username()).await?;
    Ok(HttpResponse::Ok().json(documents))
}

//----------------------------------------------   Settlement  --------------------------------------------------
route!(record_weight => Post "/listings/{id}/weights" impl MarketplaceDatabase, UserManagement);
pub async fn record_weight<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<ListingId>,
    body: web::Json<NewWeightEntry>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ {} is recording a weight on listing {id}", caller.claims.sub);
    let result: WeighingResult = api.record_weight(&id, caller.username(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(WeighingResponse::from(result)))
}

route!(weights => Get "/listings/{id}/weights" impl MarketplaceDatabase);
pub async fn weights<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<ListingId>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET weights on listing {id} for {}", claims.sub);
    let report = api.weights(&id).await?;
    Ok(HttpResponse::Ok().json(report))
}

route!(internal_weight => Post "/listings/{id}/internal-weight" impl MarketplaceDatabase, UserManagement);
/// The farmer's own weight estimate, for dead-weight deals. For reference only.
pub async fn internal_weight<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<ListingId>,
    body: web::Json<InternalWeightRequest>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let listing = api.record_internal_weight(&id, caller.username(), body.estimated_weight).await?;
    Ok(HttpResponse::Ok().json(listing))
}

route!(request_advance => Post "/listings/{id}/request-advance" impl MarketplaceDatabase, UserManagement);
pub async fn request_advance<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<ListingId>,
    body: web::Json<AdvanceRequest>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let listing = api.request_advance(&id, caller.username(), body.pauta_value).await?;
    Ok(HttpResponse::Ok().json(listing))
}

route!(finalize => Post "/listings/{id}/finalize" impl MarketplaceDatabase, UserManagement);
/// Closes out a sold listing. If the animals were weighed alive the deal is settled straight away; otherwise the
/// transaction waits for the slaughterhouse weight.
pub async fn finalize<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<ListingId>,
    body: web::Json<SettlementTerms>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ {} is finalizing listing {id}", caller.claims.sub);
    let transaction = api.finalize(&id, caller.username(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(transaction)))
}

route!(slaughterhouse_weight => Post "/transactions/{id}/slaughterhouse-weight" impl MarketplaceDatabase, UserManagement);
pub async fn slaughterhouse_weight<B: MarketplaceDatabase + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<TransactionId>,
    body: web::Json<SlaughterhouseWeightRequest>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let SlaughterhouseWeightRequest { final_weight, yield_rate, price_per_unit } = body.into_inner();
    debug!("💻️ {} reported a slaughterhouse weight of {final_weight} kg for transaction {id}", caller.claims.sub);
    let transaction = api.submit_slaughterhouse_weight(&id, final_weight, yield_rate, price_per_unit).await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(transaction)))
}

route!(transaction => Get "/transactions/{listing_id}" impl MarketplaceDatabase);
/// The settlement record for a listing.
pub async fn transaction<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<ListingId>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET transaction for listing {id} by {}", claims.sub);
    let transaction = api.transaction_for_listing(&id).await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(transaction)))
}

//----------------------------------------------   Reference data  ----------------------------------------------
route!(references => Get "/system/references" impl ReferenceData);
pub async fn references<B: ReferenceData>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET references");
    Ok(HttpResponse::Ok().json(api.references().await?))
}

route!(add_breed => Post "/admin/breed" impl ReferenceData, UserManagement where requires [Role::Admin]);
/// Adds a breed (`?name=`) to the catalog. Adding an existing breed is not an error.
pub async fn add_breed<B: ReferenceData + UserManagement>(
    caller: ActiveAccount<B>,
    params: web::Query<BreedParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ {} is adding breed {}", caller.username(), params.name);
    Ok(HttpResponse::Ok().json(api.add_breed(&params.name).await?))
}

route!(delete_breed => Delete "/admin/breed/{name}" impl ReferenceData, UserManagement where requires [Role::Admin]);
pub async fn delete_breed<B: ReferenceData + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let name = path.into_inner();
    info!("💻️ {} is deleting breed {name}", caller.username());
    Ok(HttpResponse::Ok().json(api.delete_breed(&name).await?))
}

route!(add_city => Post "/admin/location/city" impl ReferenceData, UserManagement where requires [Role::Admin]);
pub async fn add_city<B: ReferenceData + UserManagement>(
    caller: ActiveAccount<B>,
    body: web::Json<CustomCity>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CustomCity { state, name } = body.into_inner();
    info!("💻️ {} is adding custom city {name} ({state})", caller.username());
    Ok(HttpResponse::Ok().json(api.add_city(&state, &name).await?))
}

route!(delete_city => Delete "/admin/location/city/{state}/{name}" impl ReferenceData, UserManagement where requires [Role::Admin]);
pub async fn delete_city<B: ReferenceData + UserManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<(String, String)>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (state, name) = path.into_inner();
    info!("💻️ {} is deleting custom city {name} ({state})", caller.username());
    Ok(HttpResponse::Ok().json(api.delete_city(&state, &name).await?))
}

//----------------------------------------------   Admin  -------------------------------------------------------
route!(admin_stats => Get "/admin/stats" impl UserManagement, ListingManagement, NotificationManagement where requires [Role::Admin]);
pub async fn admin_stats<B: UserManagement + ListingManagement + NotificationManagement>(
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET admin stats");
    Ok(HttpResponse::Ok().json(api.stats().await?))
}

route!(admin_users => Get "/admin/users" impl UserManagement, ListingManagement, NotificationManagement where requires [Role::Admin]);
/// All user accounts. Password hashes are never serialized.
pub async fn admin_users<B: UserManagement + ListingManagement + NotificationManagement>(
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET admin users");
    Ok(HttpResponse::Ok().json(api.users().await?))
}

route!(toggle_user => Patch "/admin/user/{username}/toggle-status" impl UserManagement, ListingManagement, NotificationManagement where requires [Role::Admin]);
pub async fn toggle_user<B: UserManagement + ListingManagement + NotificationManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<String>,
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let username = path.into_inner();
    let is_active = api.toggle_user(&username).await?;
    info!("💻️ {} toggled account {username}. Active: {is_active}", caller.username());
    Ok(HttpResponse::Ok().json(ToggleResponse { username, is_active }))
}

route!(delete_user => Delete "/admin/user/{username}" impl UserManagement, ListingManagement, NotificationManagement where requires [Role::Admin]);
pub async fn delete_user<B: UserManagement + ListingManagement + NotificationManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<String>,
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let username = path.into_inner();
    if username == caller.claims.sub {
        return Err(ServerError::InsufficientPermissions("Administrators cannot delete their own account".into()));
    }
    api.delete_user(&username).await?;
    info!("💻️ Account {username} deleted by {}", caller.claims.sub);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Deleted {username}"))))
}

route!(admin_listings => Get "/admin/listings" impl UserManagement, ListingManagement, NotificationManagement where requires [Role::Admin]);
pub async fn admin_listings<B: UserManagement + ListingManagement + NotificationManagement>(
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET admin listings");
    Ok(HttpResponse::Ok().json(api.all_listings().await?))
}

route!(admin_delete_listing => Delete "/admin/listing/{kind}/{id}" impl UserManagement, ListingManagement, NotificationManagement where requires [Role::Admin]);
/// Removes a supply listing (`supply`) or a demand (`demand`).
pub async fn admin_delete_listing<B: UserManagement + ListingManagement + NotificationManagement>(
    caller: ActiveAccount<B>,
    path: web::Path<(String, String)>,
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (kind, id) = path.into_inner();
    api.delete_listing(&kind, &id).await?;
    info!("💻️ {} deleted {kind} record {id}", caller.username());
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Deleted {kind} {id}"))))
}
