use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

//--------------------------------------     Identifiers      ---------------------------------------------------------
macro_rules! record_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh, random (UUIDv4) identifier
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(ListingId);
record_id!(DemandId);
record_id!(ProposalId);
record_id!(TransactionId);
record_id!(NotificationId);

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion from string: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------        Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular marketplace participant. Buyers are users.
    #[default]
    User,
    /// A cattle producer. Farmers may list supply, but may not submit proposals.
    Farmer,
    /// Can manage reference data and user accounts.
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Farmer => write!(f, "farmer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "farmer" => Ok(Self::Farmer),
            "admin" => Ok(Self::Admin),
            _ => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------    ListingStatus     ---------------------------------------------------------
/// The lifecycle of a supply listing. A listing only ever moves forward through these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    /// Accepting proposals
    Open,
    /// A proposal was accepted; waiting for the buyer's deposit
    AwaitingPayment,
    /// The deposit was paid. The cattle can be weighed and the deal settled.
    Sold,
    /// A settlement transaction exists for this listing
    Completed,
}

impl Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Open => write!(f, "OPEN"),
            ListingStatus::AwaitingPayment => write!(f, "AWAITING_PAYMENT"),
            ListingStatus::Sold => write!(f, "SOLD"),
            ListingStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for ListingStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "AWAITING_PAYMENT" => Ok(Self::AwaitingPayment),
            "SOLD" => Ok(Self::Sold),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(ConversionError(format!("Invalid listing status: {s}"))),
        }
    }
}

//--------------------------------------    ProposalStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Paid,
}

impl Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "PENDING"),
            ProposalStatus::Accepted => write!(f, "ACCEPTED"),
            ProposalStatus::Rejected => write!(f, "REJECTED"),
            ProposalStatus::Paid => write!(f, "PAID"),
        }
    }
}

//--------------------------------------    ProposalAction    ---------------------------------------------------------
/// What a listing owner can do with a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalAction {
    Accept,
    Reject,
}

impl Display for ProposalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalAction::Accept => write!(f, "accept"),
            ProposalAction::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for ProposalAction {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            _ => Err(ConversionError(format!("Unknown proposal action: {s}"))),
        }
    }
}

//--------------------------------------  TransactionStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    AwaitingSlaughterhouseWeight,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::AwaitingSlaughterhouseWeight => write!(f, "awaiting_slaughterhouse_weight"),
        }
    }
}

//-------------------------------------- AdvancePaymentStatus ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdvancePaymentStatus {
    Pending,
}

//--------------------------------------       YieldRate      ---------------------------------------------------------
/// The carcass yield ("rendimento") of the animals: the fraction of live weight that is sold as meat.
///
/// Only values in the closed range [0.48, 0.55] are accepted.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct YieldRate(f64);

#[derive(Debug, Clone, Error)]
#[error("Yield rate {0} is outside the accepted range [0.48, 0.55]")]
pub struct YieldRateError(pub f64);

impl YieldRate {
    pub const MIN: f64 = 0.48;
    pub const MAX: f64 = 0.55;
    pub const DEFAULT: f64 = 0.52;

    pub fn new(rate: f64) -> Result<Self, YieldRateError> {
        if (Self::MIN..=Self::MAX).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(YieldRateError(rate))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for YieldRate {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for YieldRate {
    type Error = YieldRateError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for YieldRate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rate = f64::deserialize(deserializer)?;
        YieldRate::new(rate).map_err(serde::de::Error::custom)
    }
}

impl Display for YieldRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

//--------------------------------------      UserAccount     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAccount {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: Option<String>,
    pub ie: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserAccount {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: Option<String>,
    pub ie: Option<String>,
    pub role: Role,
}

//--------------------------------------        Listing       ---------------------------------------------------------
/// A farmer's offer to sell a lot of cattle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub owner: String,
    pub breed: String,
    pub quantity: i64,
    pub city: String,
    pub state: String,
    pub average_weight: Option<f64>,
    pub price: Option<f64>,
    pub photo: Option<String>,
    pub nfe_file: Option<String>,
    pub gta_file: Option<String>,
    pub status: ListingStatus,
    pub buyer: Option<String>,
    pub internal_estimated_weight: Option<f64>,
    pub internal_weight_recorded_at: Option<DateTime<Utc>>,
    pub pauta_value_requested: Option<f64>,
    pub advance_payment_status: Option<AdvancePaymentStatus>,
    pub advance_requested_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<TransactionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner == username
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    #[serde(alias = "race")]
    pub breed: String,
    pub quantity: i64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub average_weight: Option<f64>,
    pub price: Option<f64>,
    #[serde(alias = "cattle_photo")]
    pub photo: Option<String>,
    pub nfe_file: Option<String>,
    pub gta_file: Option<String>,
}

impl NewListing {
    pub fn new<S: Into<String>>(breed: S, quantity: i64) -> Self {
        Self {
            breed: breed.into(),
            quantity,
            city: String::default(),
            state: String::default(),
            average_weight: None,
            price: None,
            photo: None,
            nfe_file: None,
            gta_file: None,
        }
    }

    pub fn with_location<S: Into<String>>(mut self, city: S, state: S) -> Self {
        self.city = city.into();
        self.state = state.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_documents<S: Into<String>>(mut self, nfe: S, gta: S) -> Self {
        self.nfe_file = Some(nfe.into());
        self.gta_file = Some(gta.into());
        self
    }
}

//--------------------------------------        Demand        ---------------------------------------------------------
/// A buyer's standing request for a lot of cattle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Demand {
    pub id: DemandId,
    pub owner: String,
    pub breed: String,
    pub quantity: i64,
    pub city: String,
    pub state: String,
    pub max_price: Option<f64>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDemand {
    #[serde(alias = "race")]
    pub breed: String,
    pub quantity: i64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub max_price: Option<f64>,
}

impl NewDemand {
    pub fn new<S: Into<String>>(breed: S, quantity: i64) -> Self {
        Self { breed: breed.into(), quantity, city: String::default(), state: String::default(), max_price: None }
    }
}

//--------------------------------------       Proposal       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub id: ProposalId,
    pub listing_id: ListingId,
    pub buyer: String,
    pub buyer_contact: String,
    pub price_offer: f64,
    pub message: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub listing_id: ListingId,
    pub buyer: String,
    pub buyer_contact: String,
    pub price_offer: f64,
    pub message: String,
}

//--------------------------------------      WeightEntry     ---------------------------------------------------------
/// One weighed batch of animals from a listing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    pub id: i64,
    pub listing_id: ListingId,
    pub batch_number: i64,
    pub quantity: i64,
    /// Total mass of the batch, in kg
    pub total_weight: f64,
    pub recorded_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWeightEntry {
    pub batch_number: i64,
    pub quantity: i64,
    pub total_weight: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewWeightEntry {
    pub fn new(batch_number: i64, quantity: i64, total_weight: f64) -> Self {
        Self { batch_number, quantity, total_weight, timestamp: None }
    }
}

//--------------------------------------      Transaction     ---------------------------------------------------------
/// The settlement record for a listing. There is at most one per listing.
///
/// Live-weight transactions are complete when they are created. Dead-weight transactions are created in the
/// `AwaitingSlaughterhouseWeight` state, and the weight, yield and amount fields are only filled in once the
/// slaughterhouse reports the carcass weight.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub listing_id: ListingId,
    pub proposal_id: ProposalId,
    pub buyer: String,
    pub seller: String,
    pub nfe_document: String,
    pub gta_document: String,
    pub transport_fee: f64,
    pub funrural_tax: f64,
    pub total_weight: Option<f64>,
    pub slaughterhouse_weight: Option<f64>,
    pub at_quantity: Option<f64>,
    pub yield_rate: Option<f64>,
    pub price_per_unit: f64,
    pub gross_amount: Option<f64>,
    pub final_amount: Option<f64>,
    pub status: TransactionStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_complete(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// Data needed to write a transaction row. Built by the settlement API from the finalize request and the computed
/// settlement.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: TransactionId,
    pub listing_id: ListingId,
    pub proposal_id: ProposalId,
    pub buyer: String,
    pub seller: String,
    pub nfe_document: String,
    pub gta_document: String,
    pub transport_fee: f64,
    pub funrural_tax: f64,
    pub price_per_unit: f64,
    pub settlement: Settlement,
}

/// The two mutually exclusive ways a deal can be settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// The animals were weighed alive on the farm
    LiveWeight(SettlementAmounts),
    /// The animals are weighed after slaughter. Amounts are unknown until the slaughterhouse reports.
    DeadWeight,
}

/// The outcome of applying the settlement formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettlementAmounts {
    pub total_weight: f64,
    pub at_quantity: f64,
    pub yield_rate: f64,
    pub gross_amount: f64,
    pub final_amount: f64,
}

//--------------------------------------     Notification     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: String,
    pub message: String,
    pub details: Json<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl NewNotification {
    pub fn new<S: Into<String>, M: Into<String>>(user_id: S, message: M, details: serde_json::Value) -> Self {
        Self { user_id: user_id.into(), message: message.into(), details }
    }
}

//--------------------------------------      References      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CustomCity {
    pub state: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct References {
    pub breeds: Vec<String>,
    pub custom_cities: Vec<CustomCity>,
}
