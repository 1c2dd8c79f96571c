// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use identity_cell::UserSummary;
use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::extract::{parse_appointment_id, JsonBody};
use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, BookAppointmentRequest,
    RescheduleAppointmentRequest,
};
use crate::state::AppState;

pub const BOOKED_MESSAGE: &str = "Agendamento criado com sucesso";
pub const CANCELLED_MESSAGE: &str = "Agendamento cancelado";

/// Maps service errors to responses. Infrastructure failures are logged and
/// replaced by `fallback` so store details never reach the client.
fn to_app_error(err: AppointmentError, fallback: &str) -> AppError {
    match err {
        AppointmentError::NotFound => AppError::NotFound("Agendamento não encontrado".to_string()),
        AppointmentError::UserNotFound => AppError::NotFound("Usuário não encontrado".to_string()),
        AppointmentError::FutureAppointmentExists => AppError::BadRequest(
            "Você já tem um agendamento futuro. Cancele ou remarque o atual antes de agendar outro.".to_string(),
        ),
        AppointmentError::Forbidden => AppError::Forbidden("Acesso negado".to_string()),
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::InvalidDateTime(input) => {
            AppError::BadRequest(format!("Data e hora inválidas: {}", input))
        }
        AppointmentError::DatabaseError(_) | AppointmentError::Identity(_) => {
            error!("{}: {}", fallback, err);
            AppError::Internal(fallback.to_string())
        }
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    JsonBody(request): JsonBody<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking.book_appointment(&principal.id, request)
        .await
        .map_err(|e| to_app_error(e, "Erro ao criar agendamento"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": BOOKED_MESSAGE,
            "appointment": appointment
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.booking.list_appointments(&principal.id, query)
        .await
        .map_err(|e| to_app_error(e, "Erro ao buscar agendamentos"))?;

    Ok(Json(appointments))
}

/// Public: feeds the booking form's user selector.
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.booking.list_usernames()
        .await
        .map_err(|e| to_app_error(e, "Erro ao buscar usuários"))?;

    Ok(Json(users))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    let appointment = state.booking.get_appointment(&principal.id, appointment_id)
        .await
        .map_err(|e| to_app_error(e, "Erro ao buscar o agendamento"))?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(appointment_id): Path<String>,
    JsonBody(request): JsonBody<RescheduleAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    let appointment = state.booking.reschedule_appointment(&principal.id, appointment_id, request)
        .await
        .map_err(|e| to_app_error(e, "Erro ao atualizar agendamento"))?;

    Ok(Json(appointment))
}

/// Responds with plain text, unlike the other routes.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(appointment_id): Path<String>,
) -> Result<&'static str, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    state.booking.cancel_appointment(&principal.id, appointment_id)
        .await
        .map_err(|e| to_app_error(e, "Erro ao cancelar agendamento"))?;

    Ok(CANCELLED_MESSAGE)
}
