// Integration tests for the carte engine

use actix_web::{test, web, App};
use carte_engine::core::{MapEngine, MapEvent, SelectionPhase};
use carte_engine::models::{
    CameraDelta, ContractType, EventResponse, Location, MarkersResponse, OfferRecord,
    PanelResponse, SelectionDetailResponse, ViewportResponse,
};
use carte_engine::routes::map::AppState;
use carte_engine::routes::{configure_routes, handle_json_payload_error, handle_query_payload_error};
use carte_engine::services::{refresh_once, OfferStore, StaticOfferStore};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

fn structure(id: &str, lat: f64, lon: f64) -> Location {
    Location {
        id: id.to_string(),
        name: format!("Structure {}", id),
        city: "Limoges".to_string(),
        latitude: lat,
        longitude: lon,
        is_verified: true,
    }
}

fn offer(id: &str, location: Option<Location>) -> OfferRecord {
    OfferRecord {
        id: id.to_string(),
        title: format!("Offer {}", id),
        specialty: "Pédiatrie".to_string(),
        contract_type: ContractType::Internship,
        is_full_time: false,
        salary_min: Some(1200),
        salary_max: None,
        description: None,
        created_at: None,
        location,
    }
}

fn two_structures() -> Vec<OfferRecord> {
    let l1 = structure("L1", 45.8336, 1.2611);
    let l2 = structure("L2", 48.8656, 2.3212);
    vec![
        offer("p1", Some(l1.clone())),
        offer("p2", Some(l1)),
        offer("p3", Some(l2)),
    ]
}

#[::core::prelude::v1::test]
fn test_click_close_and_refresh_scenario() {
    let mut engine = MapEngine::with_defaults();
    engine.apply_refresh(two_structures());

    let camera = engine.dispatch(MapEvent::MarkerClick("L1".into())).unwrap();
    assert_eq!(engine.selection().phase(), SelectionPhase::Selected("p1".into()));
    assert_eq!((camera.latitude, camera.longitude, camera.zoom), (45.8336, 1.2611, 12.0));
    assert_eq!(camera.duration_ms, 1000);

    engine.dispatch(MapEvent::CloseSelection);
    assert_eq!(engine.selection().phase(), SelectionPhase::Idle);

    // Select again, then the posting leaves the active set
    engine.dispatch(MapEvent::ListItemClick("L1".into()));
    let mut next = two_structures();
    next.remove(0);
    let summary = engine.apply_refresh(next);

    assert!(summary.selection_cleared);
    assert_eq!(engine.selection().phase(), SelectionPhase::Idle);
    assert!(engine.selected_detail().is_none());
}

#[::core::prelude::v1::test]
fn test_hover_while_selected_keeps_selection() {
    let mut engine = MapEngine::with_defaults();
    engine.apply_refresh(two_structures());
    engine.dispatch(MapEvent::MarkerClick("L1".into()));

    engine.dispatch(MapEvent::MarkerEnter("L2".into()));

    let markers = engine.markers();
    let l1 = markers.iter().find(|m| m.location_id == "L1").unwrap();
    let l2 = markers.iter().find(|m| m.location_id == "L2").unwrap();
    assert!(l1.selected && !l1.hovered);
    assert!(l2.hovered && !l2.selected);
    assert_eq!(engine.selection().phase(), SelectionPhase::Selected("p1".into()));
}

#[::core::prelude::v1::test]
fn test_focus_unknown_location_leaves_camera() {
    let mut engine = MapEngine::with_defaults();
    engine.apply_refresh(two_structures());
    let before = engine.camera();

    assert!(engine.focus("nope", 12.0, 1000).is_none());
    assert!(engine.dispatch(MapEvent::MarkerClick("nope".into())).is_none());

    assert_eq!(engine.camera(), before);
    assert_eq!(engine.selection().phase(), SelectionPhase::Idle);
}

#[::core::prelude::v1::test]
fn test_missing_location_excluded_once() {
    let mut engine = MapEngine::with_defaults();
    let mut records = two_structures();
    records.push(offer("orphan", None));

    let summary = engine.apply_refresh(records);

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.postings, 3);
    assert_eq!(summary.excluded, 1);
    assert!(engine.markers().iter().all(|m| m.location_id != "orphan"));
}

#[::core::prelude::v1::test]
fn test_pan_zoom_stays_in_limits() {
    let mut engine = MapEngine::with_defaults();

    let view = engine.pan_zoom(CameraDelta { delta_lat: 90.0, delta_lon: -90.0, delta_zoom: 40.0 });

    let config = engine.viewport_config();
    assert_eq!(view.latitude, config.bounds.max_lat);
    assert_eq!(view.longitude, config.bounds.min_lon);
    assert_eq!(view.zoom, config.max_zoom);
}

#[::core::prelude::v1::test]
fn test_refresh_from_seed_store() {
    let store = StaticOfferStore::seed();
    let engine = Mutex::new(MapEngine::with_defaults());

    let summary = tokio_test::block_on(refresh_once(&store, &engine)).unwrap().unwrap();

    assert_eq!(summary.groups, 3);
    assert_eq!(summary.postings, 4);
    assert_eq!(summary.excluded, 0);
}

async fn seeded_state() -> web::Data<AppState> {
    let store: Arc<dyn OfferStore> = Arc::new(StaticOfferStore::seed());
    let engine = Arc::new(Mutex::new(MapEngine::with_defaults()));
    refresh_once(store.as_ref(), &engine).await.unwrap();
    web::Data::new(AppState { store, engine })
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_http_markers_and_panel() {
    let state = seeded_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/map/markers").to_request();
    let body: MarkersResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.total, 3);
    let ids: Vec<_> = body.markers.iter().map(|m| m.location_id.as_str()).collect();
    assert_eq!(ids, vec!["structure-brest", "structure-limoges", "structure-paris"]);
    assert_eq!(body.markers[2].badge.as_deref(), Some("2"));
    assert_eq!(body.markers[0].badge, None);

    let req = test::TestRequest::get().uri("/api/v1/map/panel").to_request();
    let body: PanelResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.entries.len(), 3);
    assert_eq!(body.entries[0].location.id, "structure-brest");
    assert_eq!(body.entries[1].postings.len(), 2);
}

#[actix_web::test]
async fn test_http_click_then_detail() {
    let state = seeded_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/map/events")
        .set_json(json!({"type": "markerClick", "locationId": "structure-limoges"}))
        .to_request();
    let body: EventResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.selection.phase, SelectionPhase::Selected("offer-2".into()));
    assert_eq!(body.camera.unwrap().zoom, 12.0);

    let req = test::TestRequest::get().uri("/api/v1/map/selection").to_request();
    let body: SelectionDetailResponse = test::call_and_read_body_json(&app, req).await;

    let detail = body.detail.unwrap();
    assert_eq!(detail.location.city, "Limoges");
    assert_eq!(detail.compensation, "5,000–7,000 €");
}

#[actix_web::test]
async fn test_http_viewport_is_clamped() {
    let state = seeded_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/map/viewport")
        .set_json(json!({"latitude": 70.0, "longitude": 2.0, "zoom": 2.0}))
        .to_request();
    let body: ViewportResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.camera.latitude, 51.5);
    assert_eq!(body.camera.longitude, 2.0);
    assert_eq!(body.camera.zoom, body.min_zoom);
}

#[actix_web::test]
async fn test_http_rejects_bad_payloads() {
    let state = seeded_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/map/events")
        .set_json(json!({"type": "markerClick"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/map/events")
        .set_json(json!({"type": "doubleClick", "locationId": "x"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get().uri("/api/v1/map/markers?width=0&height=600").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get().uri("/api/v1/map/markers?width=1280").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn test_http_viewport_rejects_mismatched_bodies() {
    let state = seeded_state().await;
    let app = init_app!(state);
    let before = state.engine.lock().await.camera();

    for body in [
        json!({"latitude": 43.3, "longitude": 5.4}),
        json!({"delta_zoom": 3.0}),
        json!({"foo": 1}),
        json!({}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/map/viewport")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "body {}", body);

        let error: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(error["status_code"], 400);
    }

    assert_eq!(state.engine.lock().await.camera(), before);
}

#[actix_web::test]
async fn test_http_viewport_relative_move() {
    let state = seeded_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/map/viewport")
        .set_json(json!({"deltaZoom": 1.0}))
        .to_request();
    let body: ViewportResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.camera.zoom, 6.5);
}

#[actix_web::test]
async fn test_http_health() {
    let state = seeded_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["fetch"]["consecutiveFailures"], 0);
}
