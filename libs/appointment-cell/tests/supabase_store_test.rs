use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::*;
use appointment_cell::services::{AppointmentStore, SupabaseAppointmentStore};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn store_for(mock_server: &MockServer) -> SupabaseAppointmentStore {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    SupabaseAppointmentStore::new(&config)
}

#[tokio::test]
async fn test_insert_writes_snake_case_row() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "username": "alice",
            "service_type": "Corte",
            "date_time": "2025-03-10T17:00:00Z",
            "status": "scheduled"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_row(&id.to_string(), "alice", "2025-03-10T17:00:00+00:00")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = store_for(&mock_server)
        .insert(NewAppointment {
            username: "alice".to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            service_type: "Corte".to_string(),
            date_time: Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
        })
        .await
        .unwrap();

    assert_eq!(created.id, id);
    assert_eq!(created.date_time, Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap());
}

#[tokio::test]
async fn test_find_builds_owner_and_window_query() {
    let mock_server = MockServer::start().await;
    let from = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("username", "eq.alice"))
        .and(query_param("date_time", format!("gte.{}", from.to_rfc3339())))
        .and(query_param("order", "date_time.asc,id.asc"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(&Uuid::new_v4().to_string(), "alice", "2025-03-10T17:00:00Z")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let found = store_for(&mock_server)
        .find(&AppointmentFilter::owned_by("alice").since(from).limit(1))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "alice");
}

#[tokio::test]
async fn test_unbounded_find_reads_past_row_cap() {
    let mock_server = MockServer::start().await;

    let first_page: Vec<_> = (0..1000)
        .map(|_| MockSupabaseResponses::appointment_row(&Uuid::new_v4().to_string(), "alice", "2025-03-10T17:00:00Z"))
        .collect();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("limit", "1000"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(first_page)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("offset", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(&Uuid::new_v4().to_string(), "bob", "2025-03-11T17:00:00Z")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let found = store_for(&mock_server).find(&AppointmentFilter::default()).await.unwrap();

    assert_eq!(found.len(), 1001);
    assert_eq!(found[1000].username, "bob");
}

#[tokio::test]
async fn test_get_missing_row_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert!(store_for(&mock_server).get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_schedule_patches_row() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    let mut row = MockSupabaseResponses::appointment_row(&id.to_string(), "bob", "2025-04-01T13:00:00Z");
    row["service_type"] = json!("Barba");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(body_partial_json(json!({"service_type": "Barba"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let updated = store_for(&mock_server)
        .update_schedule(id, "Barba", Utc.with_ymd_and_hms(2025, 4, 1, 13, 0, 0).unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.service_type, "Barba");
    assert_eq!(updated.username, "bob");
}

#[tokio::test]
async fn test_delete_reports_absent_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert!(store_for(&mock_server).delete(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_database_failure_maps_to_database_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection refused", "XX000")
        ))
        .mount(&mock_server)
        .await;

    let result = store_for(&mock_server).find(&AppointmentFilter::default()).await;
    assert_matches!(result, Err(AppointmentError::DatabaseError(_)));
}
