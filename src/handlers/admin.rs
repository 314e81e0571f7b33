use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Booking;
use crate::state::AppState;

const SESSION_TTL_HOURS: i64 = 12;

fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let token = bearer_token(headers);
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    let db = state.db.lock().unwrap();
    if queries::session_is_valid(&db, token)? {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    expires_in_hours: i64,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if body.password != state.config.admin_password {
        tracing::warn!("admin login attempt with wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = Uuid::new_v4().to_string();
    {
        let db = state.db.lock().unwrap();
        let expired = queries::expire_old_sessions(&db)?;
        if expired > 0 {
            tracing::debug!(count = expired, "purged expired admin sessions");
        }
        queries::create_session(&db, &token, SESSION_TTL_HOURS)?;
    }

    tracing::info!("admin session issued");
    Ok(Json(LoginResponse {
        token,
        expires_in_hours: SESSION_TTL_HOURS,
    }))
}

// POST /api/admin/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers);

    let removed = {
        let db = state.db.lock().unwrap();
        queries::delete_session(&db, token)?
    };

    if removed {
        Ok(Json(serde_json::json!({"ok": true})))
    } else {
        Err(AppError::Unauthorized)
    }
}

// GET /api/admin/bookings?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct AdminBookingsQuery {
    pub date: Option<NaiveDate>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AdminBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&state, &headers)?;

    let bookings = {
        let db = state.db.lock().unwrap();
        match query.date {
            // Day view for the admin calendar, ascending by start time
            Some(date) => queries::get_bookings_for_date(&db, date)?,
            None => queries::get_all_bookings(&db)?,
        }
    };

    Ok(Json(bookings))
}

// GET /api/admin/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&state, &headers)?;

    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, &id)?
    };

    booking
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}
