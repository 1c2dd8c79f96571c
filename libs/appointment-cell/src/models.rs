// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use identity_cell::IdentityError;

/// Author recorded when a booking request does not name one.
pub const DEFAULT_AUTHOR: &str = "administrador";

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    /// Owner of the booking.
    pub username: String,
    /// Who placed the booking.
    pub author: String,
    pub service_type: String,
    pub date_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cancellation removes the row, so stored appointments are always
/// `Scheduled`. `Cancelled` exists for records read from older data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub username: String,
    pub author: String,
    pub service_type: String,
    pub date_time: DateTime<Utc>,
    pub status: AppointmentStatus,
}

/// Store query. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub username: Option<String>,
    /// Inclusive lower bound on `date_time`.
    pub from: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl AppointmentFilter {
    pub fn owned_by(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            ..Self::default()
        }
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.username.as_deref().map_or(true, |u| appointment.username == u)
            && self.from.map_or(true, |from| appointment.date_time >= from)
    }
}

/// How a reschedule stores the submitted wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RescheduleTimeMode {
    /// Persist the submitted wall-clock read as UTC; only the notification
    /// uses the Sao Paulo conversion. Matches the legacy backend.
    #[default]
    LegacyUntransformed,
    /// Persist the same converted instant the notification shows.
    Normalized,
}

impl RescheduleTimeMode {
    pub fn from_flag(normalize: bool) -> Self {
        if normalize {
            RescheduleTimeMode::Normalized
        } else {
            RescheduleTimeMode::LegacyUntransformed
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub service_type: String,
    /// Civil time in America/Sao_Paulo, e.g. `2025-03-10 14:00`.
    pub date_time: String,
    pub username: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentRequest {
    pub service_type: String,
    pub date_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    /// Honoured for administrators only.
    pub username: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("User already has a future appointment")]
    FutureAppointmentExists,

    #[error("Not authorized to access this appointment")]
    Forbidden,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Identity lookup failed: {0}")]
    Identity(#[from] IdentityError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn appointment(username: &str, date_time: DateTime<Utc>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            username: username.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            service_type: "Corte".to_string(),
            date_time,
            status: AppointmentStatus::Scheduled,
            created_at: date_time,
            updated_at: date_time,
        }
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap();
        let filter = AppointmentFilter::owned_by("alice").since(now);

        assert!(filter.matches(&appointment("alice", now)));
        assert!(filter.matches(&appointment("alice", now + Duration::minutes(1))));
        assert!(!filter.matches(&appointment("alice", now - Duration::seconds(1))));
        assert!(!filter.matches(&appointment("bob", now + Duration::days(1))));
        assert!(AppointmentFilter::default().matches(&appointment("bob", now)));
    }

    #[test]
    fn test_appointment_serializes_camel_case() {
        let apt = appointment("alice", Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap());
        let value = serde_json::to_value(&apt).unwrap();

        assert_eq!(value["serviceType"], "Corte");
        assert_eq!(value["dateTime"], "2025-03-10T17:00:00Z");
        assert_eq!(value["status"], "scheduled");
    }

    #[test]
    fn test_book_request_author_is_optional() {
        let request: BookAppointmentRequest = serde_json::from_value(serde_json::json!({
            "serviceType": "Barba",
            "dateTime": "2025-03-10 14:00",
            "username": "alice"
        }))
        .unwrap();
        assert!(request.author.is_none());
    }

    #[test]
    fn test_reschedule_mode_flag() {
        assert_eq!(RescheduleTimeMode::from_flag(false), RescheduleTimeMode::LegacyUntransformed);
        assert_eq!(RescheduleTimeMode::from_flag(true), RescheduleTimeMode::Normalized);
        assert_eq!(RescheduleTimeMode::default(), RescheduleTimeMode::LegacyUntransformed);
    }
}
