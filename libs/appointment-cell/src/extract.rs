// libs/appointment-cell/src/extract.rs
use axum::extract::FromRequest;
use uuid::Uuid;

use shared_models::error::AppError;

/// `axum::Json` whose rejections answer with the usual `{"message": ...}`
/// body and a 400 status.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Ids that are not UUIDs cannot name a stored appointment.
pub fn parse_appointment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Agendamento não encontrado".to_string()))
}
