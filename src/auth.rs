use axum::{
    RequestPartsExt,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::{AppError, Result},
    store::ForumStore,
    wallet::WalletIdentity,
};

pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";
pub const WALLET_CHAIN_HEADER: &str = "x-wallet-chain";

/// Session token claims as issued by the auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject id
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: &str, jwt_secret: &str, ttl: Duration) -> Result<(String, Self)> {
        let now = Utc::now();
        let claims = Self {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_ref()),
        )?;

        Ok((token, claims))
    }

    pub fn verify(token: &str, jwt_secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

/// Who is acting: a connected wallet or an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Wallet(WalletIdentity),
    Session { subject: String },
}

impl Identity {
    /// The string stored as `author_id` / `user_id`.
    pub fn user_id(&self) -> &str {
        match self {
            Identity::Wallet(wallet) => &wallet.address,
            Identity::Session { subject } => subject,
        }
    }
}

/// Fails with `NotAuthenticated` when no identity is present.
pub fn require_identity(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or_else(|| {
        AppError::NotAuthenticated("Connect a wallet or sign in to continue".to_string())
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::Validation(format!("Header {} is not valid text", name)))
        })
        .transpose()
}

/// Wallet headers, if the client sent them.
pub fn wallet_from_headers(headers: &HeaderMap) -> Result<Option<WalletIdentity>> {
    let address = header_str(headers, WALLET_ADDRESS_HEADER)?;
    let chain = header_str(headers, WALLET_CHAIN_HEADER)?;

    match (address, chain) {
        (None, None) => Ok(None),
        (Some(address), Some(chain)) => WalletIdentity::parse(chain, address).map(Some),
        _ => Err(AppError::Validation(format!(
            "{} and {} must be sent together",
            WALLET_ADDRESS_HEADER, WALLET_CHAIN_HEADER
        ))),
    }
}

// Identity of the caller, if any. Missing credentials yield `None`; malformed
// ones are rejected rather than silently treated as anonymous.
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<Identity>);

impl OptionalAuthUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S: ForumStore> FromRequestParts<AppState<S>> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self> {
        // The active wallet session wins over a bearer token
        if let Some(wallet) = wallet_from_headers(&parts.headers)? {
            return Ok(OptionalAuthUser(Some(Identity::Wallet(wallet))));
        }

        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuthUser(None));
        }

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::NotAuthenticated("Malformed authorization header".to_string())
            })?;

        // Bad signatures and expired sessions surface as `AppError::Jwt` (401)
        let claims = Claims::verify(bearer.token(), &state.config.jwt_secret)?;

        Ok(OptionalAuthUser(Some(Identity::Session {
            subject: claims.sub,
        })))
    }
}
