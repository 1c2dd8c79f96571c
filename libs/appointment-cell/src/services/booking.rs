// libs/appointment-cell/src/services/booking.rs
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use identity_cell::{SupabaseUserDirectory, UserAccount, UserDirectory, UserSummary};
use notification_cell::{notifier_from_config, NotificationDispatcher};
use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentListQuery, AppointmentStatus,
    BookAppointmentRequest, NewAppointment, RescheduleAppointmentRequest, RescheduleTimeMode,
    DEFAULT_AUTHOR,
};
use crate::services::civil_time::WallClock;
use crate::services::messages;
use crate::services::store::{AppointmentStore, SupabaseAppointmentStore};

/// Booking rules, ownership checks and admin notifications on top of the
/// appointment store and the user directory.
///
/// The one-future-booking rule is a read followed by a write with no lock or
/// transaction around it, so two concurrent requests from the same user can
/// both pass the check.
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn UserDirectory>,
    notifications: NotificationDispatcher,
    reschedule_mode: RescheduleTimeMode,
}

impl AppointmentBookingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        directory: Arc<dyn UserDirectory>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            directory,
            notifications,
            reschedule_mode: RescheduleTimeMode::default(),
        }
    }

    pub fn with_reschedule_mode(mut self, mode: RescheduleTimeMode) -> Self {
        self.reschedule_mode = mode;
        self
    }

    /// Production wiring: Supabase for appointments and users, Twilio for
    /// notifications when configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let store = Arc::new(SupabaseAppointmentStore::new(config));
        let directory = Arc::new(SupabaseUserDirectory::new(config));
        let notifications = NotificationDispatcher::from_config(notifier_from_config(config), config);

        Self::new(store, directory, notifications)
            .with_reschedule_mode(RescheduleTimeMode::from_flag(config.reschedule_normalize_time))
    }

    /// Books an appointment for `request.username`.
    ///
    /// The future-booking limit is checked against the acting user, not the
    /// target: administrators are never limited, and a regular user with an
    /// upcoming appointment cannot book anything else.
    pub async fn book_appointment(
        &self,
        principal_id: &str,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let caller = self.resolve_caller(principal_id).await?;

        if !caller.is_administrator() {
            let upcoming = AppointmentFilter::owned_by(&caller.username)
                .since(Utc::now())
                .limit(1);
            if !self.store.find(&upcoming).await?.is_empty() {
                info!("Rejecting booking by {}: future appointment already exists", caller.username);
                return Err(AppointmentError::FutureAppointmentExists);
            }
        }

        let service_type = require_text("serviceType", &request.service_type)?;
        let username = require_text("username", &request.username)?;
        let date_time = WallClock::parse(&request.date_time)?.in_reference_zone();

        let author = request.author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        let appointment = self.store.insert(NewAppointment {
            username,
            author,
            service_type,
            date_time,
            status: AppointmentStatus::Scheduled,
        }).await?;

        self.notifications.dispatch(messages::booking_confirmed(&appointment));

        info!("Appointment {} booked for {} by {}", appointment.id, appointment.username, caller.username);
        Ok(appointment)
    }

    /// Administrators see everything, optionally narrowed to one username.
    /// Everyone else sees only their own appointments from now on.
    pub async fn list_appointments(
        &self,
        principal_id: &str,
        query: AppointmentListQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let caller = self.resolve_caller(principal_id).await?;

        let filter = if caller.is_administrator() {
            AppointmentFilter {
                username: query.username.filter(|u| !u.is_empty()),
                ..AppointmentFilter::default()
            }
        } else {
            AppointmentFilter::owned_by(&caller.username).since(Utc::now())
        };

        let appointments = self.store.find(&filter).await?;
        debug!("Listed {} appointments for {}", appointments.len(), caller.username);
        Ok(appointments)
    }

    pub async fn get_appointment(
        &self,
        principal_id: &str,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let (appointment, _caller) = self.load_authorized(principal_id, appointment_id).await?;
        Ok(appointment)
    }

    /// Changes service and time. Ownership and id are kept, and the
    /// future-booking limit is not re-checked.
    pub async fn reschedule_appointment(
        &self,
        principal_id: &str,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let (_current, caller) = self.load_authorized(principal_id, appointment_id).await?;

        let service_type = require_text("serviceType", &request.service_type)?;
        let wall_clock = WallClock::parse(&request.date_time)?;
        let converted = wall_clock.in_reference_zone();
        let persisted = match self.reschedule_mode {
            RescheduleTimeMode::LegacyUntransformed => wall_clock.as_utc(),
            RescheduleTimeMode::Normalized => converted,
        };

        let updated = self.store
            .update_schedule(appointment_id, &service_type, persisted)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        self.notifications.dispatch(messages::booking_rescheduled(&caller.username, &service_type, &converted));

        info!("Appointment {} rescheduled by {}", appointment_id, caller.username);
        Ok(updated)
    }

    /// Removes the appointment permanently and returns what was removed.
    pub async fn cancel_appointment(
        &self,
        principal_id: &str,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let (_current, caller) = self.load_authorized(principal_id, appointment_id).await?;

        let removed = self.store
            .delete(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        self.notifications.dispatch(messages::booking_cancelled(&caller.username, &removed));

        info!("Appointment {} cancelled by {}", appointment_id, caller.username);
        Ok(removed)
    }

    /// Every username, for the "book on behalf of" selector. No caller needed.
    pub async fn list_usernames(&self) -> Result<Vec<UserSummary>, AppointmentError> {
        Ok(self.directory.list_usernames().await?)
    }

    async fn resolve_caller(&self, principal_id: &str) -> Result<UserAccount, AppointmentError> {
        self.directory
            .find_by_id(principal_id)
            .await?
            .ok_or_else(|| {
                warn!("Authenticated principal {} has no user record", principal_id);
                AppointmentError::UserNotFound
            })
    }

    async fn load_authorized(
        &self,
        principal_id: &str,
        appointment_id: Uuid,
    ) -> Result<(Appointment, UserAccount), AppointmentError> {
        let appointment = self.store
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        let caller = self.resolve_caller(principal_id).await?;

        if !caller.is_administrator() && appointment.username != caller.username {
            warn!("{} denied access to appointment {}", caller.username, appointment_id);
            return Err(AppointmentError::Forbidden);
        }

        Ok((appointment, caller))
    }
}

fn require_text(field: &str, value: &str) -> Result<String, AppointmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentError::ValidationError(format!("Campo obrigatório não informado: {}", field)));
    }
    Ok(trimmed.to_string())
}
