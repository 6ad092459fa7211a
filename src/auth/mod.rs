// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Google OAuth2 plumbing: token persistence, refresh, and the interactive
//! consent flow.
//!
//! Tokens live as pretty-printed JSON in the user's home directory. A
//! refresh is an explicit event: the client returns the new token set and
//! the caller persists it through [`TokenStore::save`]; nothing writes the
//! file behind the caller's back.

mod flow;

pub use flow::run_interactive;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use directories_next::UserDirs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

pub const TOKEN_FILE_NAME: &str = ".google_oauth_token";

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tokens are treated as expired this long before their stated expiry.
const EXPIRY_SKEW_MS: i64 = 60_000;

pub const BASE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/spreadsheets",
];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no home directory available for the token store")]
    NoHomeDir,

    #[error("failed to read token file {path}")]
    ReadToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {path} is not valid JSON")]
    ParseToken {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write token file {path}")]
    WriteToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token request failed")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("not authenticated; run `billsync authenticate` first")]
    NotAuthenticated,

    #[error("stored token has no refresh token; run `billsync authenticate` again")]
    NoRefreshToken,

    #[error("failed to bind the callback listener on port {port}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("authorization flow ended before a code was received")]
    FlowAborted,
}

/// The persisted token material, in the same shape Google's token endpoint
/// returns it (`expiry_date` in milliseconds since the epoch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl TokenSet {
    /// Whether the access token should be refreshed. A token without an
    /// expiry is treated as expired.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => now_ms + EXPIRY_SKEW_MS >= expiry,
            None => true,
        }
    }

    /// Overlay a refresh response on this set, keeping the long-lived
    /// refresh token when the response omits one.
    pub fn merged_with(&self, update: TokenSet) -> TokenSet {
        TokenSet {
            access_token: update.access_token,
            refresh_token: update.refresh_token.or_else(|| self.refresh_token.clone()),
            scope: update.scope.or_else(|| self.scope.clone()),
            token_type: update.token_type.or_else(|| self.token_type.clone()),
            expiry_date: update.expiry_date,
        }
    }
}

/// Scoped reader/writer for the on-disk token file.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// `~/.google_oauth_token`
    pub fn default_location() -> Result<Self, AuthError> {
        let dirs = UserDirs::new().ok_or(AuthError::NoHomeDir)?;
        Ok(Self::new(&dirs.home_dir().join(TOKEN_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token set; a missing file is `None`, not an error.
    pub fn load(&self) -> Result<Option<TokenSet>, AuthError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AuthError::ReadToken {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let tokens = serde_json::from_str(&json).map_err(|source| AuthError::ParseToken {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(tokens))
    }

    /// Write the token set out, pretty-printed. Opens, writes and closes in
    /// one scope.
    pub fn save(&self, tokens: &TokenSet) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(tokens).map_err(|source| AuthError::ParseToken {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| AuthError::WriteToken {
            path: self.path.clone(),
            source,
        })
    }
}

/// OAuth application settings.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Port of the local consent-callback listener.
    pub port: u16,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    pub fn new(client_id: &str, client_secret: &str, port: u16) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            port,
            scopes: BASE_SCOPES.iter().map(|scope| scope.to_string()).collect(),
        }
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/authenticate", self.port)
    }
}

// --- token endpoint wire shape ---

#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenEndpointResponse {
    fn into_token_set(self, now_ms: i64) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
        }
    }
}

/// Client for Google's OAuth2 endpoints (installed-app flow).
pub struct OAuthClient {
    http: Client,
    config: OAuthConfig,
    token_endpoint: String,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Result<Self, AuthError> {
        Self::with_token_endpoint(config, TOKEN_ENDPOINT)
    }

    /// Point the client at a different token endpoint (tests use a stub).
    pub fn with_token_endpoint(
        config: OAuthConfig,
        token_endpoint: &str,
    ) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            config,
            token_endpoint: token_endpoint.to_string(),
        })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// The Google consent URL the user is sent to.
    pub fn consent_url(&self) -> String {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", &self.config.redirect_uri()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", &scope),
            ],
        )
        .expect("consent endpoint URL is well-formed");
        url.into()
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", &self.config.redirect_uri()),
            ("code", code),
        ])
        .await
    }

    /// Trade a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenSet, AuthError> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: TokenEndpointResponse = response.json().await?;
        Ok(parsed.into_token_set(Utc::now().timestamp_millis()))
    }
}

/// Produce a usable bearer token, refreshing through `client` and
/// persisting the refreshed set via `store` when the cached one is stale.
pub async fn ensure_access_token(
    client: &OAuthClient,
    store: &TokenStore,
) -> Result<String, AuthError> {
    let tokens = store.load()?.ok_or(AuthError::NotAuthenticated)?;
    if !tokens.is_expired(Utc::now().timestamp_millis()) {
        return Ok(tokens.access_token);
    }
    let refresh_token = tokens
        .refresh_token
        .as_deref()
        .ok_or(AuthError::NoRefreshToken)?;
    info!("access token expired, refreshing");
    let refreshed = tokens.merged_with(client.refresh(refresh_token).await?);
    store.save(&refreshed)?;
    Ok(refreshed.access_token)
}
