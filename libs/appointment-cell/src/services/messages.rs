use chrono::{DateTime, Utc};

use crate::models::Appointment;
use crate::services::civil_time::format_civil;

pub fn booking_confirmed(appointment: &Appointment) -> String {
    format!(
        "Novo agendamento confirmado:\nUsuário: {}\nServiço: {}\nData e Hora: {}h",
        appointment.username,
        appointment.service_type,
        format_civil(&appointment.date_time)
    )
}

pub fn booking_rescheduled(acting_username: &str, service_type: &str, date_time: &DateTime<Utc>) -> String {
    format!(
        "O agendamento de {} foi remarcado:\nNovo Serviço: {}\nNova Data e Hora: {}h",
        acting_username,
        service_type,
        format_civil(date_time)
    )
}

pub fn booking_cancelled(acting_username: &str, appointment: &Appointment) -> String {
    format!(
        "O agendamento de {} para o serviço de {} em {} foi cancelado.",
        acting_username,
        appointment.service_type,
        format_civil(&appointment.date_time)
    )
}
