// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth routes and the session cookie.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{authenticate, create_jwt, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::services::StoredTokens;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth state stays acceptable.
const OAUTH_STATE_MAX_AGE_SECS: u64 = 10 * 60;

/// Read access to activities is all the dashboard needs.
const STRAVA_SCOPE: &str = "activity:read";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/oauth/callback", get(oauth_callback))
        .route("/logout", get(logout))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_secs())
}

/// Start OAuth flow - redirect to Strava authorization.
async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = sign_state(&state.config.session_signing_key, unix_now()?)?;
    let callback_url = format!("{}/oauth/callback", state.config.public_url);

    let auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&approval_prompt=auto&scope={}&state={}",
        state.strava.authorize_url(),
        urlencoding::encode(state.strava.client_id()),
        urlencoding::encode(&callback_url),
        STRAVA_SCOPE,
        oauth_state
    );

    tracing::info!(
        client_id = %state.strava.client_id(),
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, create session.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Ok((jar, Redirect::to("/")));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing code".to_string()))?;

    let signed = params.state.unwrap_or_default();
    if !verify_state(&signed, &state.config.session_signing_key, unix_now()?) {
        tracing::error!("OAuth state invalid or expired");
        return Err(AppError::BadRequest("Invalid OAuth state".to_string()));
    }

    tracing::info!("Exchanging authorization code for tokens");
    let mut response = state.strava.exchange_code(&code).await?;
    let athlete = response.athlete.take().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Token response did not include an athlete"))
    })?;

    state.tokens.insert(athlete.id, StoredTokens::from(response));
    state.activity_cache.invalidate(athlete.id);

    tracing::info!(
        athlete_id = athlete.id,
        firstname = %athlete.firstname.as_deref().unwrap_or_default(),
        "OAuth successful, tokens stored"
    );

    let jwt = create_jwt(athlete.id, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = session_cookie(jwt, SESSION_TTL_SECS as i64, is_secure(&state));
    Ok((jar.add(cookie), Redirect::to("/")))
}

/// Logout - forget the athlete's tokens and expire the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Redirect) {
    if let Some(user) = authenticate(&jar, &headers, &state.config.session_signing_key) {
        state.tokens.remove(user.athlete_id);
        state.activity_cache.invalidate(user.athlete_id);
        tracing::info!(athlete_id = user.athlete_id, "Logged out");
    }

    let removal = session_cookie(String::new(), 0, is_secure(&state));
    (jar.add(removal), Redirect::to("/"))
}

fn is_secure(state: &AppState) -> bool {
    state.config.public_url.starts_with("https://")
}

/// Session cookie; creation and removal share the same attributes.
fn session_cookie(value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Signed OAuth state: `base64url("{timestamp_hex}|{hmac_hex}")`.
fn sign_state(secret: &[u8], timestamp: u64) -> Result<String> {
    let payload = format!("{:x}", timestamp);
    let signature = state_signature(secret, &payload)?;
    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

fn state_signature(secret: &[u8], payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check the signature and age of an OAuth state parameter.
fn verify_state(state: &str, secret: &[u8], now: u64) -> bool {
    let Some(decoded) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    let Some((timestamp_hex, signature_hex)) = decoded.split_once('|') else {
        return false;
    };

    let Ok(expected) = state_signature(secret, timestamp_hex) else {
        return false;
    };
    if !bool::from(expected.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    match u64::from_str_radix(timestamp_hex, 16) {
        Ok(issued) => issued <= now && now - issued <= OAUTH_STATE_MAX_AGE_SECS,
        Err(_) => false,
    }
}
