use std::{fmt::Display, sync::OnceLock};

use cattle_engine::{
    db_types::{ListingId, NewUserAccount, Role},
    traits::WeighingResult,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,32}$").expect("Invalid username pattern"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email pattern"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Wraps a record in a `data` field.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

//----------------------------------------------   Accounts  ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: Option<String>,
    pub ie: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl RegisterRequest {
    /// Usernames appear in URLs and tokens, so they are restricted to 3-32 letters, digits, `_`, `.` or `-`.
    pub fn validate(&self) -> Result<(), ServerError> {
        if !username_pattern().is_match(&self.username) {
            return Err(ServerError::InvalidRequestBody(format!(
                "'{}' is not a valid username. Use 3-32 letters, digits, '_', '.' or '-'.",
                self.username
            )));
        }
        if !email_pattern().is_match(&self.email) {
            return Err(ServerError::InvalidRequestBody(format!("'{}' is not a valid email address", self.email)));
        }
        if self.password.is_empty() {
            return Err(ServerError::InvalidRequestBody("A password is required".into()));
        }
        Ok(())
    }

    /// Converts the request into a new account record, replacing the password with its hash.
    pub fn into_new_account(self, password_hash: String) -> NewUserAccount {
        NewUserAccount {
            username: self.username,
            password_hash,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            tax_id: self.tax_id,
            ie: self.ie,
            role: self.role,
        }
    }
}

/// Login credentials, sent as an url-encoded form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
    pub username: String,
}

impl LoginResponse {
    pub fn bearer(access_token: String, role: Role, username: String) -> Self {
        Self { access_token, token_type: "bearer".into(), role, username }
    }
}

//----------------------------------------------   Listings  ----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedResponse {
    pub id: String,
    pub matches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketResponse<T> {
    pub supply: Vec<T>,
}

//----------------------------------------------   Proposals  ---------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProposalRequest {
    #[serde(alias = "supply_id")]
    pub listing_id: ListingId,
    pub price_offer: f64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCreated {
    pub msg: String,
    pub id: String,
}

//----------------------------------------------   Settlement  --------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct WeighingResponse {
    pub message: String,
    pub total_weighed: i64,
    pub remaining: i64,
}

impl From<WeighingResult> for WeighingResponse {
    fn from(result: WeighingResult) -> Self {
        Self {
            message: "Weight entry added".into(),
            total_weighed: result.total_weighed,
            remaining: result.remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalWeightRequest {
    pub estimated_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub pauta_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaughterhouseWeightRequest {
    pub final_weight: f64,
    pub yield_rate: f64,
    pub price_per_unit: f64,
}

//----------------------------------------------   Admin & files  -----------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedParams {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub username: String,
    pub is_active: bool,
}
