// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod api;
pub mod assemble;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod metrics;
pub mod pipeline;
pub mod sentiment;
pub mod summary;

pub use crate::api::{create_router, AppState};
pub use crate::pipeline::{AnalysisReport, Pipeline};

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::AppConfig;

/// Load config + catalog and build the shared state the router runs on.
///
/// A missing or broken catalog is logged and replaced by an empty one; the
/// analysis routes do not depend on it.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let pipeline = Pipeline::from_config(cfg)?;

    let catalog_path = cfg.catalog.resolved_path();
    let catalog = match Catalog::load_from_file(&catalog_path) {
        Ok(c) => {
            info!(path = %catalog_path.display(), platforms = c.len(), "catalog loaded");
            c
        }
        Err(e) => {
            warn!(error = ?e, "catalog unavailable, serving an empty one");
            Catalog::default()
        }
    };

    Ok(AppState::new(pipeline, catalog))
}
