use crate::config::AppConfig;
use crate::lookup::AttainmentLookup;
use crate::tooltip::{Pointer, Tooltip, TooltipView};
use crate::types::{CountyFeature, Datasets, EducationRecord};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use geo::{BoundingRect, Contains, Point};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info};

// Wrapper for RTree indexing
pub struct CountyIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub counties: Vec<CountyFeature>,
    pub tree: RTree<CountyIndex>,
    pub lookup: Mutex<AttainmentLookup>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, datasets: Datasets) -> Self {
        info!("Building spatial index for {} counties...", datasets.counties.len());
        let tree_items: Vec<CountyIndex> = datasets
            .counties
            .iter()
            .enumerate()
            .filter_map(|(i, county)| {
                let rect = county.geometry.bounding_rect()?;
                Some(CountyIndex {
                    index: i,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();

        Self {
            counties: datasets.counties,
            tree: RTree::bulk_load(tree_items),
            lookup: Mutex::new(AttainmentLookup::new(datasets.education)),
            config,
        }
    }

    /// Runs a hover-enter through a fresh tooltip.
    fn hover(&self, fips: u32, pointer: Pointer) -> TooltipView {
        let mut tooltip = Tooltip::new(self.config.tooltip.clone());
        // A poisoned lock only means another request panicked mid-lookup; the
        // cache itself is still consistent.
        let mut lookup = self.lookup.lock().unwrap_or_else(|e| e.into_inner());
        let shown = tooltip.enter(&mut lookup, fips, pointer);
        debug!(
            fips,
            shown,
            scans = lookup.scan_count(),
            cached = lookup.cached(),
            "tooltip lookup"
        );
        tooltip.view()
    }
}

#[derive(Deserialize, Default)]
pub struct PointerParams {
    #[serde(default)]
    page_x: f64,
    #[serde(default)]
    page_y: f64,
}

#[derive(Deserialize)]
pub struct QueryParams {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
pub struct QueryResponse {
    fips: u32,
    record: Option<EducationRecord>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let output_dir = ServeDir::new(&state.config.output.dir);

    Router::new()
        .route("/api/tooltip/:fips", get(tooltip_handler))
        .route("/api/query", get(query_handler))
        .fallback_service(output_dir)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, datasets: Datasets) -> Result<()> {
    let port = config.server.port;
    let state = Arc::new(AppState::new(config, datasets));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn tooltip_handler(
    State(state): State<Arc<AppState>>,
    Path(fips): Path<u32>,
    Query(params): Query<PointerParams>,
) -> Json<TooltipView> {
    let pointer = Pointer {
        page_x: params.page_x,
        page_y: params.page_y,
    };
    Json(state.hover(fips, pointer))
}

/// County under a point in map coordinates, with its record when one exists.
async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    let point = Point::new(params.x, params.y);
    let envelope = AABB::from_point([params.x, params.y]);

    // Query RTree
    let candidates = state.tree.locate_in_envelope_intersecting(&envelope);

    for candidate in candidates {
        if let Some(county) = state.counties.get(candidate.index) {
            if county.geometry.contains(&point) {
                let mut lookup = state.lookup.lock().unwrap_or_else(|e| e.into_inner());
                return Json(Some(QueryResponse {
                    fips: county.id,
                    record: lookup.lookup(county.id).cloned(),
                }));
            }
        }
    }

    Json(None)
}
