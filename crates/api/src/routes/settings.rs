//! Site settings routes.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::{Settings, SettingsInput, SiteInfo};
use crate::state::AppState;

/// Full settings record for the admin console.
///
/// GET /settings
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Settings>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    Ok(Json(settings))
}

/// Replace the settings record, creating it on first save.
///
/// PUT /settings
#[instrument(skip_all, fields(admin = %admin.sub))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SettingsInput>,
) -> Result<Json<Settings>> {
    let input = input.validated()?;
    let settings = SettingsRepository::new(state.pool()).upsert(&input).await?;
    state.cache().invalidate_site_info().await;
    tracing::info!("Site settings updated");
    Ok(Json(settings))
}

/// Public subset used by the storefront header and footer.
///
/// GET /site-info
pub async fn site_info(State(state): State<AppState>) -> Result<Json<SiteInfo>> {
    if let Some(info) = state.cache().site_info().await {
        return Ok(Json(info));
    }

    let seen = state.cache().site_info_generation();
    let info = SiteInfo::from(SettingsRepository::new(state.pool()).get().await?);
    state.cache().set_site_info(seen, info.clone()).await;
    Ok(Json(info))
}
