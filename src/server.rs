use axum::{
    extract::Query,
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::DashboardUseCase;
use crate::error::{Result, TrackerError};
use crate::pipeline::processing::CategorySelection;
use crate::pipeline::PipelineOutput;
use crate::presentation::{DashboardTemplate, DashboardView};

/// Query key for the category filter; repeat it to pick several
pub const CAMPAIGN_PARAM: &str = "campaign";
/// Sent by the filter form so a submit with every box cleared is not a first view
pub const APPLIED_PARAM: &str = "applied";

pub struct AppState {
    pub use_case: DashboardUseCase,
    pub metrics: Option<PrometheusHandle>,
}

type SharedState = Arc<AppState>;

/// `None` for a first view, which picks every available category
fn selection_from_query(params: &[(String, String)]) -> Option<CategorySelection> {
    let submitted = params
        .iter()
        .any(|(key, _)| key == CAMPAIGN_PARAM || key == APPLIED_PARAM);
    if !submitted {
        return None;
    }
    Some(
        params
            .iter()
            .filter(|(key, _)| key == CAMPAIGN_PARAM)
            .map(|(_, value)| value.clone())
            .collect(),
    )
}

async fn run_for_query(state: &AppState, params: &[(String, String)]) -> Result<PipelineOutput> {
    match selection_from_query(params) {
        Some(selection) => state.use_case.run(&selection).await,
        None => state.use_case.run_default().await,
    }
}

fn status_for(err: &TrackerError) -> StatusCode {
    match err {
        TrackerError::Fetch(_) => StatusCode::BAD_GATEWAY,
        TrackerError::Schema { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sales-volume-tracker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTML dashboard; every request is a fresh fetch and pipeline run
async fn dashboard_page(
    Extension(state): Extension<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let source = state.use_case.source_description();

    let rendered = match run_for_query(&state, &params).await {
        Ok(output) => {
            let view = DashboardView::from_output(&output);
            DashboardTemplate::from_view(&view, source)
                .and_then(|page| page.render_page())
                .map(|html| (StatusCode::OK, html))
        }
        Err(e) => {
            let status = status_for(&e);
            DashboardTemplate::from_error(&e, source)
                .render_page()
                .map(|html| (status, html))
        }
    };

    match rendered {
        Ok((status, html)) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render dashboard: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// The same view as JSON
async fn dashboard_api(
    Extension(state): Extension<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    match run_for_query(&state, &params).await {
        Ok(output) => Json(DashboardView::from_output(&output)).into_response(),
        Err(e) => (
            status_for(&e),
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn metrics_endpoint(Extension(state): Extension<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/dashboard", get(dashboard_api))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(Arc::new(state)))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Start the HTTP server on the given address
pub async fn start_server(state: AppState, bind_addr: &str) -> Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| TrackerError::Config(format!("Invalid bind address '{}': {}", bind_addr, e)))?;
    let app = create_server(state);

    info!(%addr, "Dashboard server listening");
    println!("📈 Dashboard:    http://{addr}/");
    println!("💚 Health check: http://{addr}/health");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| TrackerError::Server(e.to_string()))?;

    Ok(())
}
