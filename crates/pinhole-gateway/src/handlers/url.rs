use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse, Envelope, MappingView, Owner};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use jiff::SignedDuration;
use pinhole_core::{ExpirationPolicy, ShortCode, ShortenParams, ShortenerError, StorageError};
use tracing::{debug, error};

const SECONDS_PER_HOUR: i64 = 60 * 60;

fn expiration_from_hours(expires_in: Option<i64>) -> Result<ExpirationPolicy> {
    let Some(hours) = expires_in else {
        return Ok(ExpirationPolicy::Never);
    };
    if hours <= 0 {
        return Err(AppError::BadRequest(
            "expires_in must be positive".to_string(),
        ));
    }

    hours
        .checked_mul(SECONDS_PER_HOUR)
        .map(|secs| ExpirationPolicy::AfterDuration(SignedDuration::from_secs(secs)))
        .ok_or_else(|| AppError::BadRequest("expires_in is too large".to_string()))
}

pub async fn create_url_handler(
    State(state): State<AppState>,
    owner: Option<Extension<Owner>>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = payload.map_err(|e| {
        AppError::BadRequest(format!("Invalid request format: {}", e.body_text()))
    })?;
    let expiration = expiration_from_hours(request.expires_in)?;
    let owner_id = owner.map(|Extension(Owner(id))| id);

    let mapping = state
        .shortener()
        .shorten(ShortenParams {
            original_url: request.url,
            algorithm: state.algorithm(),
            owner_id,
            expiration,
        })
        .await?;

    let Some(code) = &mapping.short_code else {
        error!(id = mapping.id, "Shortener returned a mapping without a code");
        return Err(ShortenerError::Storage(StorageError::InvalidData(format!(
            "mapping {} has no short code",
            mapping.id
        )))
        .into());
    };

    Ok(Json(CreateUrlResponse {
        short_url: state.short_url(code),
        algorithm: mapping.algorithm,
        expires_at: mapping.expires_at,
    }))
}

pub async fn list_urls_handler(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<MappingView>>>> {
    let mappings = state.shortener().list().await?;
    Ok(Json(Envelope::success(
        mappings.into_iter().map(MappingView::from).collect(),
    )))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = ShortCode::new(code)?;
    let original_url = state.shortener().resolve(&code).await?;

    debug!(code = %code, "Redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]).into_response())
}
