//! Dashboard rendering endpoint handler.

use axum::extract::State;
use domain::models::EntryFilter;
use serde::Serialize;

use crate::app::AppState;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extractors::OwnerContext;
use crate::middleware::metrics::record_dashboard_rendered;
use crate::services::dashboard::PanelSummary;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Base64 encoded PNG.
    pub image: String,
    /// Name of the CSV export written for this render.
    pub csv_saved: String,
    pub rows: usize,
    pub panels: Vec<PanelSummary>,
}

/// Render the owner's entries.
///
/// GET /generate_dashboard
pub async fn generate_dashboard(
    State(state): State<AppState>,
    owner: OwnerContext,
) -> Result<Envelope<DashboardResponse>, ApiError> {
    let entries = state
        .store
        .list(&owner.owner_id, &EntryFilter::default())
        .await?;

    // Rendering writes the CSV export synchronously.
    let renderer = state.renderer.clone();
    let owner_id = owner.owner_id.clone();
    let rendered = tokio::task::spawn_blocking(move || renderer.render(&owner_id, entries))
        .await
        .map_err(|e| ApiError::Internal(format!("Render task failed: {}", e)))??;
    record_dashboard_rendered(rendered.rows);

    Ok(Envelope::success(DashboardResponse {
        image: rendered.image_base64,
        csv_saved: rendered.export_filename,
        rows: rendered.rows,
        panels: rendered.panels,
    }))
}
