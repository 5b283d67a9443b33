use std::{env, io::Write, path::PathBuf};

use cattle_common::Secret;
use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_CMS_HOST: &str = "127.0.0.1";
const DEFAULT_CMS_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/cattle.db";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_TOKEN_EXPIRY: Duration = Duration::minutes(60);
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;
const MIN_JWT_SECRET_LENGTH: usize = 32;
const DEFAULT_ADMIN_USERNAME: &str = "admin";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Where uploaded photos and documents are stored.
    pub upload_dir: PathBuf,
    /// The capacity of the channel feeding each event hook.
    pub event_buffer_size: usize,
    /// An administrator account to create on start-up, if it does not exist yet.
    pub admin: Option<AdminAccount>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CMS_HOST.to_string(),
            port: DEFAULT_CMS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            admin: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CMS_HOST").ok().unwrap_or_else(|| DEFAULT_CMS_HOST.into());
        let port = env::var("CMS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CMS_PORT. {e} Using the default, {DEFAULT_CMS_PORT}, instead."
                    );
                    DEFAULT_CMS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CMS_PORT);
        let database_url = env::var("CMS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CMS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let upload_dir = env::var("CMS_UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            info!("🪛️ CMS_UPLOAD_DIR is not set. Uploads will be stored in ./{DEFAULT_UPLOAD_DIR}");
            PathBuf::from(DEFAULT_UPLOAD_DIR)
        });
        let event_buffer_size = env::var("CMS_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for CMS_EVENT_BUFFER_SIZE: {s}");
                        None
                    })
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let admin = AdminAccount::from_env();
        Self { host, port, database_url, auth, upload_dir, event_buffer_size, admin }
    }
}

//-------------------------------------------------  AdminAccount  -----------------------------------------------------
/// Administrators cannot register themselves. The first one is created from `CMS_ADMIN_USERNAME` and
/// `CMS_ADMIN_PASSWORD` when the server starts.
#[derive(Clone, Debug)]
pub struct AdminAccount {
    pub username: String,
    pub password: Secret<String>,
}

impl AdminAccount {
    pub fn from_env() -> Option<Self> {
        let password = env::var("CMS_ADMIN_PASSWORD").ok().filter(|p| !p.is_empty())?;
        let username = env::var("CMS_ADMIN_USERNAME").ok().unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.into());
        Some(Self { username, password: Secret::new(password) })
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an access token remains valid after it is issued.
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this since all issued tokens will be invalid after a restart. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        match NamedTempFile::new().ok().and_then(|f| f.keep().ok()) {
            Some((mut f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT signing secret for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the CMS_JWT_SECRET environment variable instead. \
                         🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT signing secret to the temporary file. {e}"),
                }
            },
            None => warn!("🪛️ Could not create a temporary file to store the JWT signing secret."),
        }
        Self { jwt_secret: Secret::new(secret), token_expiry: DEFAULT_TOKEN_EXPIRY }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_expiry: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_expiry }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("CMS_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [CMS_JWT_SECRET]")))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "CMS_JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long"
            )));
        }
        let token_expiry = env::var("CMS_TOKEN_EXPIRY_MINUTES")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .ok()
                    .filter(|&m| m > 0)
                    .map(Duration::minutes)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for CMS_TOKEN_EXPIRY_MINUTES: {s}");
                        None
                    })
            })
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);
        Ok(Self::new(secret, token_expiry))
    }
}
