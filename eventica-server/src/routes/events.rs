//! Event endpoints

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use eventica_core::{Event, EventInput, PublicEvent};
use serde::{Deserialize, Serialize};

use crate::auth::require_admin;
use crate::routes::AppError;
use crate::state::AppState;

pub fn router(state: &AppState, migrate_body_limit: usize) -> Router<AppState> {
    let admin = Router::new()
        .route("/api/v1/event/add", post(add_event))
        .route("/api/v1/event/update/{id}", put(update_event))
        .route("/api/v1/event/delete/{id}", delete(delete_event))
        .route(
            "/api/v1/event/migrate",
            post(migrate).layer(DefaultBodyLimit::max(migrate_body_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/v1/event/allevents", get(all_events))
        .route("/api/v1/event/upcoming", get(upcoming_events))
        .route("/api/v1/event/{id}", get(get_event))
        .merge(admin)
}

#[derive(Serialize)]
pub struct EventResponse {
    pub message: &'static str,
    pub event: Event,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: &'static str,
    pub deleted_event: Event,
}

/// Events split around today for the listing page
#[derive(Serialize)]
pub struct UpcomingResponse {
    pub upcoming: Vec<PublicEvent>,
    pub past: Vec<PublicEvent>,
}

/// Optional `?q=` text filter on the listing routes
#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct MigrateRequest {
    pub events: Vec<Event>,
}

#[derive(Serialize)]
pub struct MigrateResponse {
    pub message: &'static str,
    pub count: usize,
    pub timestamp: String,
}

/// POST /api/v1/event/add - Create an event
async fn add_event(
    State(state): State<AppState>,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let event = state.blocking(move |service| service.create(&input)).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "Event created successfully.",
            event,
        }),
    ))
}

/// PUT /api/v1/event/update/:id - Replace an event's fields
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EventInput>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state
        .blocking(move |service| service.update(&id, &input))
        .await?;

    Ok(Json(EventResponse {
        message: "Event updated successfully.",
        event,
    }))
}

/// DELETE /api/v1/event/delete/:id - Remove an event
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted_event = state.blocking(move |service| service.delete(&id)).await?;

    Ok(Json(DeleteResponse {
        message: "Event deleted successfully.",
        deleted_event,
    }))
}

/// GET /api/v1/event/allevents - All events, newest first
async fn all_events(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PublicEvent>>, AppError> {
    let events = state
        .blocking(move |service| service.search(params.q.as_deref()))
        .await?;
    tracing::debug!(count = events.len(), "sending events");

    Ok(Json(events.into_iter().map(PublicEvent::from).collect()))
}

/// GET /api/v1/event/upcoming - Upcoming and past events in display order
async fn upcoming_events(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<UpcomingResponse>, AppError> {
    let (upcoming, past) = state
        .blocking(move |service| service.search_upcoming(params.q.as_deref()))
        .await?;

    Ok(Json(UpcomingResponse {
        upcoming: upcoming.into_iter().map(PublicEvent::from).collect(),
        past: past.into_iter().map(PublicEvent::from).collect(),
    }))
}

/// GET /api/v1/event/:id - A single event
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicEvent>, AppError> {
    let event = state.blocking(move |service| service.get(&id)).await?;
    Ok(Json(event.into()))
}

/// POST /api/v1/event/migrate - Replace the collection
async fn migrate(
    State(state): State<AppState>,
    Json(req): Json<MigrateRequest>,
) -> Result<Json<MigrateResponse>, AppError> {
    let count = state
        .blocking(move |service| service.migrate(req.events))
        .await?;

    Ok(Json(MigrateResponse {
        message: "Events migrated successfully",
        count,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{Duration, Local};
    use eventica_core::config::EventicaConfig;
    use eventica_core::datetime::MalformedDatePolicy;
    use eventica_core::service::EventService;
    use eventica_core::store::{AnyStore, JsonFileStore, SqliteStore, WriteFailurePolicy};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::routes::app;
    use crate::state::AppState;

    fn test_state(token: Option<&str>) -> AppState {
        let store = AnyStore::Sqlite(SqliteStore::open_in_memory().unwrap());
        let service = EventService::with_policy(store, MalformedDatePolicy::Reject, None);
        AppState::new(service, token.map(String::from))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = app(state.clone(), &EventicaConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn demo() -> Value {
        json!({
            "title": "Demo",
            "description": "d",
            "date": "2025-01-10",
            "time": "09:00",
            "endTime": "10:30"
        })
    }

    #[tokio::test]
    async fn test_add_event() {
        let state = test_state(None);
        let (status, body) = send(&state, json_request("POST", "/api/v1/event/add", demo())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["event"]["id"], "1");
        assert_eq!(body["event"]["date"], "10-01-2025");
        assert_eq!(body["event"]["time"], "9:00am - 10:30am");
        assert_eq!(body["event"]["location"], "Location TBD");
    }

    #[tokio::test]
    async fn test_add_event_missing_title() {
        let state = test_state(None);
        let input = json!({"description": "d", "date": "2025-01-10"});
        let (status, body) = send(&state, json_request("POST", "/api/v1/event/add", input)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Title and description are required.");
    }

    #[tokio::test]
    async fn test_add_event_bad_date() {
        let state = test_state(None);
        let mut input = demo();
        input["date"] = json!("whenever");

        let (status, _) = send(&state, json_request("POST", "/api/v1/event/add", input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_update_and_delete() {
        let state = test_state(None);
        send(&state, json_request("POST", "/api/v1/event/add", demo())).await;

        let (status, body) = send(&state, empty_request("GET", "/api/v1/event/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_id"], "1");

        let mut change = demo();
        change["title"] = json!("Renamed");
        let (status, body) =
            send(&state, json_request("PUT", "/api/v1/event/update/1", change)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event"]["title"], "Renamed");

        let (status, body) = send(&state, empty_request("DELETE", "/api/v1/event/delete/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deletedEvent"]["id"], "1");

        let (status, body) = send(&state, empty_request("GET", "/api/v1/event/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Event not found.");
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_events_alone() {
        let state = test_state(None);
        send(&state, json_request("POST", "/api/v1/event/add", demo())).await;
        let (_, before) = send(&state, empty_request("GET", "/api/v1/event/allevents")).await;

        let (status, _) = send(&state, empty_request("DELETE", "/api/v1/event/delete/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, after) = send(&state, empty_request("GET", "/api/v1/event/allevents")).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_all_events_newest_first() {
        let state = test_state(None);
        for (date, time) in [("2024-01-01", "09:00"), ("2025-01-01", ""), ("2025-01-01", "18:00")] {
            let body = json!({"title": "t", "description": "d", "date": date, "time": time});
            send(&state, json_request("POST", "/api/v1/event/add", body)).await;
        }

        let (status, body) = send(&state, empty_request("GET", "/api/v1/event/allevents")).await;
        assert_eq!(status, StatusCode::OK);

        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[tokio::test]
    async fn test_upcoming_partition() {
        let state = test_state(None);
        let today = Local::now().date_naive();
        for date in [today - Duration::days(3), today, today + Duration::days(5)] {
            let body = json!({
                "title": "t",
                "description": "d",
                "date": date.format("%Y-%m-%d").to_string()
            });
            send(&state, json_request("POST", "/api/v1/event/add", body)).await;
        }

        let (status, body) = send(&state, empty_request("GET", "/api/v1/event/upcoming")).await;
        assert_eq!(status, StatusCode::OK);

        let upcoming: Vec<&str> = body["upcoming"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["_id"].as_str().unwrap())
            .collect();
        assert_eq!(upcoming, vec!["2", "3"]);
        assert_eq!(body["past"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_migrate_and_health() {
        let state = test_state(None);
        let events = json!({"events": [
            {"title": "a", "date": "01-01-2024", "description": "x"},
            {"id": "7", "title": "b", "date": "02-01-2024", "time": "9:00am", "description": "x"}
        ]});

        let request = json_request("POST", "/api/v1/event/migrate", events);
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);

        let (status, body) = send(&state, empty_request("GET", "/api/v1/event/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["eventCount"], 2);
        assert_eq!(body["backend"], "sqlite");
    }

    #[tokio::test]
    async fn test_admin_token_guards_mutations() {
        let state = test_state(Some("s3cret"));

        let (status, _) = send(&state, json_request("POST", "/api/v1/event/add", demo())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut request = json_request("POST", "/api/v1/event/add", demo());
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::CREATED);

        // Reads stay public
        let (status, _) = send(&state, empty_request("GET", "/api/v1/event/allevents")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_query_filters_listings() {
        let state = test_state(None);
        for (title, description) in [("Jazz Night", "live band"), ("Book club", "Jazz novels")] {
            let body = json!({"title": title, "description": description, "date": "2999-01-01"});
            send(&state, json_request("POST", "/api/v1/event/add", body)).await;
        }
        let body = json!({"title": "Quiz", "description": "trivia", "date": "2999-01-02"});
        send(&state, json_request("POST", "/api/v1/event/add", body)).await;

        let (status, body) =
            send(&state, empty_request("GET", "/api/v1/event/allevents?q=JAZZ")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let request = empty_request("GET", "/api/v1/event/upcoming?q=quiz");
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["upcoming"].as_array().unwrap().len(), 1);
        assert_eq!(body["upcoming"][0]["title"], "Quiz");

        let (_, body) = send(&state, empty_request("GET", "/api/v1/event/allevents?q=")).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_migrate_accepts_a_full_export() {
        let state = test_state(None);
        let description = "x".repeat(400);
        let events: Vec<Value> = (1..=179)
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "title": format!("Event {}", i),
                    "date": "01-01-2024",
                    "description": description,
                })
            })
            .collect();
        let payload = json!({ "events": events });
        assert!(payload.to_string().len() > EventicaConfig::default().body_limit_bytes);

        let request = json_request("POST", "/api/v1/event/migrate", payload);
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 179);
    }

    #[tokio::test]
    async fn test_oversized_event_is_rejected() {
        let state = test_state(None);
        let mut input = demo();
        input["description"] = json!("x".repeat(EventicaConfig::default().body_limit_bytes));

        let (status, _) = send(&state, json_request("POST", "/api/v1/event/add", input)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_locked_events_file_does_not_stall_runtime() {
        use fs2::FileExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let store = AnyStore::Json(JsonFileStore::new(path.clone(), WriteFailurePolicy::Fail));
        let service = EventService::with_policy(store, MalformedDatePolicy::Reject, None);
        let state = AppState::new(service, None);

        // Another process (e.g. the CLI) holding the write lock
        let holder = std::fs::File::create(dir.path().join("events.json.lock")).unwrap();
        holder.lock_exclusive().unwrap();

        let pending = tokio::spawn({
            let state = state.clone();
            async move { send(&state, empty_request("GET", "/api/v1/event/allevents")).await }
        });

        // Only reachable if the single runtime thread is free while the request waits
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!pending.is_finished());

        FileExt::unlock(&holder).unwrap();
        let (status, body) = pending.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
