use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

use crate::core::{visible_bounds, GroupOrder, MapEngine};
use crate::models::{
    CameraMove, CameraMoveRequest, ErrorResponse, EventResponse, HealthResponse, MapEventRequest,
    MarkersQuery, MarkersResponse, PanelOrder, PanelQuery, PanelResponse, RefreshResponse,
    SelectionDetailResponse, ViewportResponse,
};
use crate::services::{refresh_once, OfferStore};

/// Application state shared across all handlers
///
/// Every handler takes the engine lock for the duration of one event, so
/// events are applied one at a time in arrival order.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OfferStore>,
    pub engine: Arc<Mutex<MapEngine>>,
}

/// Configure all map routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/map/markers", web::get().to(get_markers))
        .route("/map/panel", web::get().to(get_panel))
        .route("/map/viewport", web::get().to(get_viewport))
        .route("/map/viewport", web::post().to(move_viewport))
        .route("/map/events", web::post().to(post_event))
        .route("/map/selection", web::get().to(get_selection))
        .route("/map/refresh", web::post().to(refresh));
}

fn validation_error(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: message.into(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let fetch = state.engine.lock().await.fetch_status().clone();

    let status = if fetch.is_degraded() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        fetch,
    })
}

/// Marker placements
///
/// GET /api/v1/map/markers?width=1280&height=800
///
/// With both `width` and `height`, only markers visible from the current
/// camera are returned.
async fn get_markers(
    state: web::Data<AppState>,
    query: web::Query<MarkersQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors.to_string());
    }

    let engine = state.engine.lock().await;

    let (markers, visible) = match (query.width, query.height) {
        (Some(width), Some(height)) => {
            let bounds = visible_bounds(&engine.camera(), width, height);
            (engine.markers_within(&bounds), Some(bounds))
        }
        _ => (engine.markers(), None),
    };

    tracing::debug!("Returning {} markers", markers.len());

    HttpResponse::Ok().json(MarkersResponse {
        snapshot_id: engine.snapshot_id().map(|id| id.to_string()),
        total: engine.aggregation().len(),
        markers,
        visible,
    })
}

/// List panel
///
/// GET /api/v1/map/panel?order=recency|location|distance
async fn get_panel(
    state: web::Data<AppState>,
    query: web::Query<PanelQuery>,
) -> impl Responder {
    let engine = state.engine.lock().await;

    let entries = match query.order.unwrap_or_default() {
        PanelOrder::Recency => engine.panel(GroupOrder::Recency),
        PanelOrder::Location => engine.panel(GroupOrder::LocationId),
        PanelOrder::Distance => engine.panel_by_distance(),
    };

    HttpResponse::Ok().json(PanelResponse {
        snapshot_id: engine.snapshot_id().map(|id| id.to_string()),
        header: engine.panel_header(),
        entries,
    })
}

fn viewport_response(engine: &MapEngine) -> ViewportResponse {
    let config = engine.viewport_config();
    ViewportResponse {
        camera: engine.camera(),
        bounds: config.bounds,
        min_zoom: config.min_zoom,
        max_zoom: config.max_zoom,
    }
}

/// Current camera
async fn get_viewport(state: web::Data<AppState>) -> impl Responder {
    let engine = state.engine.lock().await;
    HttpResponse::Ok().json(viewport_response(&engine))
}

/// Camera move from the renderer
///
/// POST /api/v1/map/viewport
///
/// Request body, either:
/// ```json
/// { "latitude": 48.85, "longitude": 2.35, "zoom": 9.0 }
/// ```
/// or
/// ```json
/// { "deltaLat": 0.5, "deltaLon": -0.2, "deltaZoom": 1.0 }
/// ```
async fn move_viewport(
    state: web::Data<AppState>,
    req: web::Json<CameraMoveRequest>,
) -> impl Responder {
    let camera_move = match req.into_inner().into_move() {
        Ok(camera_move) => camera_move,
        Err(message) => return validation_error(message),
    };

    let mut engine = state.engine.lock().await;

    match camera_move {
        CameraMove::To(target) => engine.move_camera(target),
        CameraMove::By(delta) => engine.pan_zoom(delta),
    };

    HttpResponse::Ok().json(viewport_response(&engine))
}

/// Pointer event from the map or the list panel
///
/// POST /api/v1/map/events
///
/// Request body:
/// ```json
/// { "type": "markerEnter|markerLeave|markerClick|listItemClick|closeSelection", "locationId": "string" }
/// ```
async fn post_event(
    state: web::Data<AppState>,
    req: web::Json<MapEventRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors.to_string());
    }

    let event = match req.into_inner().into_event() {
        Ok(event) => event,
        Err(message) => return validation_error(message),
    };

    tracing::debug!(?event, "Applying map event");

    let mut engine = state.engine.lock().await;
    let camera = engine.dispatch(event);

    HttpResponse::Ok().json(EventResponse {
        selection: engine.selection().snapshot(),
        camera,
    })
}

/// Selected posting detail
async fn get_selection(state: web::Data<AppState>) -> impl Responder {
    let engine = state.engine.lock().await;

    HttpResponse::Ok().json(SelectionDetailResponse {
        selection: engine.selection().snapshot(),
        detail: engine.selected_detail(),
    })
}

/// Fetch offers now
///
/// POST /api/v1/map/refresh
///
/// Answers 409 when a fetch started later won the race; its snapshot stays.
async fn refresh(state: web::Data<AppState>) -> impl Responder {
    match refresh_once(state.store.as_ref(), &state.engine).await {
        Ok(Some(summary)) => HttpResponse::Ok().json(RefreshResponse {
            snapshot_id: summary.snapshot_id.to_string(),
            groups: summary.groups,
            postings: summary.postings,
            excluded: summary.excluded,
            selection_cleared: summary.selection_cleared,
        }),
        Ok(None) => HttpResponse::Conflict().json(ErrorResponse {
            error: "Refresh superseded".to_string(),
            message: "A more recent fetch was applied first".to_string(),
            status_code: 409,
        }),
        Err(e) => HttpResponse::BadGateway().json(ErrorResponse {
            error: "Failed to fetch offers".to_string(),
            message: e.to_string(),
            status_code: 502,
        }),
    }
}
