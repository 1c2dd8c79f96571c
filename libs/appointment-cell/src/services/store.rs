// libs/appointment-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentStatus, NewAppointment,
};

/// Persistent appointment collection shared by all request handlers.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Persists a new appointment; the store assigns its id.
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError>;

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Matching appointments ordered by `date_time` ascending.
    async fn find(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError>;

    /// Returns `None` when the appointment no longer exists.
    async fn update_schedule(
        &self,
        appointment_id: Uuid,
        service_type: &str,
        date_time: DateTime<Utc>,
    ) -> Result<Option<Appointment>, AppointmentError>;

    /// Hard delete. Returns the removed record, or `None` if it was absent.
    async fn delete(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError>;
}

/// Row layout of the `appointments` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppointmentRow {
    id: Uuid,
    username: String,
    author: String,
    service_type: String,
    date_time: DateTime<Utc>,
    status: AppointmentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            username: row.username,
            author: row.author,
            service_type: row.service_type,
            date_time: row.date_time,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn rows(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let rows: Vec<AppointmentRow> = self.supabase.request_with_headers(
            method,
            path,
            body,
            Some(SupabaseClient::return_representation()),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Appointment::from).collect())
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let now = Utc::now();
        let row = AppointmentRow {
            id: Uuid::new_v4(),
            username: appointment.username,
            author: appointment.author,
            service_type: appointment.service_type,
            date_time: appointment.date_time,
            status: appointment.status,
            created_at: now,
            updated_at: now,
        };
        let body = serde_json::to_value(&row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to encode appointment: {}", e)))?;

        self.rows(Method::POST, "/rest/v1/appointments", Some(body))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no rows".to_string()))
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        Ok(self.rows(Method::GET, &path, None).await?.into_iter().next())
    }

    async fn find(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Searching appointments with filter: {:?}", filter);

        let mut query_parts = vec!["select=*".to_string()];

        if let Some(username) = &filter.username {
            query_parts.push(format!("username=eq.{}", urlencoding::encode(username)));
        }
        if let Some(from) = filter.from {
            let date_str = from.to_rfc3339();
            query_parts.push(format!("date_time=gte.{}", urlencoding::encode(&date_str)));
        }
        query_parts.push("order=date_time.asc,id.asc".to_string());

        match filter.limit {
            Some(limit) => {
                query_parts.push(format!("limit={}", limit));
                let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
                self.rows(Method::GET, &path, None).await
            }
            None => {
                let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
                let rows: Vec<AppointmentRow> = self.supabase.fetch_all(&path)
                    .await
                    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
                Ok(rows.into_iter().map(Appointment::from).collect())
            }
        }
    }

    async fn update_schedule(
        &self,
        appointment_id: Uuid,
        service_type: &str,
        date_time: DateTime<Utc>,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let body = json!({
            "service_type": service_type,
            "date_time": date_time.to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        Ok(self.rows(Method::PATCH, &path, Some(body)).await?.into_iter().next())
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        Ok(self.rows(Method::DELETE, &path, None).await?.into_iter().next())
    }
}
