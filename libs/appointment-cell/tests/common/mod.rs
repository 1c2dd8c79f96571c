#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentStatus, NewAppointment,
    RescheduleTimeMode, DEFAULT_AUTHOR,
};
use appointment_cell::services::{AppointmentBookingService, AppointmentStore};
use identity_cell::{IdentityError, UserAccount, UserDirectory, UserSummary};
use notification_cell::{NotificationDispatcher, NotificationError, Notifier};

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    /// Inserts a record directly, bypassing booking rules.
    pub fn seed(&self, username: &str, date_time: DateTime<Utc>) -> Appointment {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            username: username.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            service_type: "Corte".to_string(),
            date_time,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.appointments.lock().unwrap().push(appointment.clone());
        appointment
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.appointments.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let now = Utc::now();
        let stored = Appointment {
            id: Uuid::new_v4(),
            username: appointment.username,
            author: appointment.author,
            service_type: appointment.service_type,
            date_time: appointment.date_time,
            status: appointment.status,
            created_at: now,
            updated_at: now,
        };
        self.appointments.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.appointments.lock().unwrap().iter().find(|a| a.id == appointment_id).cloned())
    }

    async fn find(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        let mut found: Vec<Appointment> = self.appointments.lock().unwrap()
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.date_time);
        if let Some(limit) = filter.limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn update_schedule(
        &self,
        appointment_id: Uuid,
        service_type: &str,
        date_time: DateTime<Utc>,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let mut appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter_mut().find(|a| a.id == appointment_id).map(|a| {
            a.service_type = service_type.to_string();
            a.date_time = date_time;
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let mut appointments = self.appointments.lock().unwrap();
        let position = appointments.iter().position(|a| a.id == appointment_id);
        Ok(position.map(|i| appointments.remove(i)))
    }
}

pub struct StaticUserDirectory {
    users: Vec<UserAccount>,
}

impl StaticUserDirectory {
    pub fn new(usernames: &[&str]) -> Self {
        Self {
            users: usernames.iter().map(|name| UserAccount {
                id: principal_id(name),
                username: name.to_string(),
                password_hash: "hash".to_string(),
            }).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserAccount>, IdentityError> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_usernames(&self) -> Result<Vec<UserSummary>, IdentityError> {
        Ok(self.users.iter().map(|u| UserSummary { username: u.username.clone() }).collect())
    }
}

/// Matches `shared_utils::test_utils::TestUser::new`.
pub fn principal_id(username: &str) -> String {
    format!("user-{}", username)
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Waits for fire-and-forget deliveries to land.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..200 {
            {
                let messages = self.messages.lock().unwrap();
                if messages.len() >= count {
                    return messages.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotificationError> {
        Err(NotificationError::Provider { status: 500, message: "twilio down".to_string() })
    }
}

/// Never answers within any reasonable request budget.
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotificationError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

pub struct Harness {
    pub service: AppointmentBookingService,
    pub store: Arc<InMemoryAppointmentStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_mode(RescheduleTimeMode::LegacyUntransformed)
    }

    pub fn with_mode(mode: RescheduleTimeMode) -> Self {
        let store = Arc::new(InMemoryAppointmentStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let directory = Arc::new(StaticUserDirectory::new(&["admin", "root", "alice", "bob"]));
        let dispatcher = NotificationDispatcher::new(notifier.clone(), Duration::from_secs(1), 1);

        let service = AppointmentBookingService::new(store.clone(), directory, dispatcher)
            .with_reschedule_mode(mode);

        Self { service, store, notifier }
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> (AppointmentBookingService, Arc<InMemoryAppointmentStore>) {
        Self::with_dispatcher(NotificationDispatcher::new(notifier, Duration::from_secs(1), 1))
    }

    pub fn with_dispatcher(dispatcher: NotificationDispatcher) -> (AppointmentBookingService, Arc<InMemoryAppointmentStore>) {
        let store = Arc::new(InMemoryAppointmentStore::default());
        let directory = Arc::new(StaticUserDirectory::new(&["admin", "alice"]));
        (AppointmentBookingService::new(store.clone(), directory, dispatcher), store)
    }
}
