use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::booking::AppointmentBookingService;

/// Router state: the config the auth layer reads and the booking service the
/// handlers call.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub booking: AppointmentBookingService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, booking: AppointmentBookingService) -> Self {
        Self { config, booking }
    }

    pub fn from_config(config: AppConfig) -> Self {
        let booking = AppointmentBookingService::from_config(&config);
        Self::new(Arc::new(config), booking)
    }
}
