pub mod booking;
pub mod civil_time;
pub mod messages;
pub mod store;

pub use booking::AppointmentBookingService;
pub use store::{AppointmentStore, SupabaseAppointmentStore};
