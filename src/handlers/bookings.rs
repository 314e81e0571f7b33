use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::{IntervalStream, WatchStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::{find_category, selectable_categories, CustomerDetails, Gender};
use crate::services::availability::TimeSlot;
use crate::services::i18n::{translate, Lang};
use crate::services::submission::{submit_booking, BookingSubmission};
use crate::state::AppState;

// GET /api/catalog
#[derive(Deserialize)]
pub struct CatalogQuery {
    pub gender: String,
    pub ice_cream: Option<bool>,
    pub lang: Option<Lang>,
}

#[derive(Serialize)]
pub struct CatalogEntry {
    id: String,
    label: String,
    quantity: u32,
    quantity_label: String,
    duration_hours: u32,
    duration_label: String,
}

pub async fn get_catalog(
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let gender = Gender::parse(&query.gender)
        .ok_or_else(|| AppError::Validation(format!("unknown gender: {}", query.gender)))?;
    let lang = query.lang.unwrap_or_default();

    // Answering yes to the women's add-on question collapses the list to
    // the ice-cream package; otherwise it never appears.
    let categories = if gender == Gender::Women && query.ice_cream == Some(true) {
        crate::models::cup_catalog()
            .into_iter()
            .filter(|c| c.is_ice_cream())
            .collect()
    } else {
        selectable_categories(gender)
    };

    let entries = categories
        .into_iter()
        .map(|c| {
            let count = c.cups.to_string();
            let hours = c.duration_hours.to_string();
            let unit_key = c.unit_key.as_deref().unwrap_or("cupsLabel");
            CatalogEntry {
                label: translate(lang, &c.label_key, &[]),
                quantity_label: translate(lang, unit_key, &[("count", &count)]),
                duration_label: translate(lang, "durationLabel", &[("hours", &hours)]),
                id: c.id,
                quantity: c.cups,
                duration_hours: c.duration_hours,
            }
        })
        .collect();

    Ok(Json(entries))
}

// GET /api/availability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    date: NaiveDate,
    category: String,
    duration_hours: u32,
    slots: Vec<TimeSlot>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let category = find_category(&query.category)
        .ok_or_else(|| AppError::NotFound(format!("category {}", query.category)))?;

    let slots = state.snapshots.latest().available_slots(
        state.window,
        query.date,
        category.duration_hours,
    );

    Ok(Json(AvailabilityResponse {
        date: query.date,
        category: category.id,
        duration_hours: category.duration_hours,
        slots,
    }))
}

// POST /api/bookings — multipart form fields plus the agreement file.
#[derive(Serialize)]
pub struct BookingCreatedResponse {
    ok: bool,
    booking_id: String,
    message: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BookingCreatedResponse>, AppError> {
    let mut gender = None;
    let mut wants_ice_cream = None;
    let mut category_id = None;
    let mut date = None;
    let mut start_time = None;
    let mut end_time = None;
    let mut lang = Lang::default();
    let mut details = CustomerDetails::default();
    let mut agreement: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("bad multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "agreement" {
            let file_name = field.file_name().unwrap_or("agreement").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("bad agreement upload: {e}")))?;
            agreement = Some((file_name, bytes.to_vec()));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("bad field {name}: {e}")))?;

        match name.as_str() {
            "gender" => {
                gender = Some(
                    Gender::parse(&value)
                        .ok_or_else(|| AppError::Validation(format!("unknown gender: {value}")))?,
                )
            }
            "ice_cream" => {
                wants_ice_cream = Some(value.parse::<bool>().map_err(|_| {
                    AppError::Validation(format!("ice_cream must be true or false, got {value}"))
                })?)
            }
            "category_id" => category_id = Some(value),
            "date" => {
                date = Some(NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
                    AppError::Validation(format!("date must be YYYY-MM-DD, got {value}"))
                })?)
            }
            "start_time" => start_time = Some(value),
            "end_time" => end_time = Some(value),
            "lang" => lang = Lang::parse(&value).unwrap_or_default(),
            "name" => details.name = value,
            "phone" => details.phone = value,
            "address" => details.address = value,
            "zone" => details.zone = value,
            "street" => details.street = value,
            "building_number" => details.building_number = value,
            "unit_number" => details.unit_number = Some(value),
            "google_maps_link" => details.google_maps_link = Some(value),
            _ => tracing::debug!(field = %name, "ignoring unknown form field"),
        }
    }

    let missing = |what: &str| AppError::Validation(format!("{what} is required"));
    let (agreement_file_name, agreement_bytes) = agreement.ok_or_else(|| missing("agreement"))?;

    let submission = BookingSubmission {
        gender: gender.ok_or_else(|| missing("gender"))?,
        wants_ice_cream,
        category_id: category_id.ok_or_else(|| missing("category_id"))?,
        date: date.ok_or_else(|| missing("date"))?,
        slot: TimeSlot {
            start_time: start_time.ok_or_else(|| missing("start_time"))?,
            end_time: end_time.ok_or_else(|| missing("end_time"))?,
        },
        details,
        agreement_file_name,
        agreement_bytes,
    };

    let date_str = submission.date.format("%Y-%m-%d").to_string();
    let start_str = submission.slot.start_time.clone();

    let booking = submit_booking(&state, submission).await?;

    Ok(Json(BookingCreatedResponse {
        ok: true,
        booking_id: booking.id,
        message: translate(
            lang,
            "bookingConfirmationMessage",
            &[("date", &date_str), ("startTime", &start_str)],
        ),
    }))
}

// GET /api/bookings/events — SSE occupancy stream for the public form.
// Deliberately sanitized: dates and intervals only, no customer data.
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.snapshots.subscribe();

    let snapshots = WatchStream::new(rx).map(|snapshot| {
        let occupied: Vec<serde_json::Value> = snapshot
            .bookings
            .iter()
            .map(|b| {
                serde_json::json!({
                    "date": b.date,
                    "startTime": b.start_time,
                    "endTime": b.end_time,
                })
            })
            .collect();
        let data = serde_json::json!({
            "loading": snapshot.loading,
            "occupied": occupied,
        })
        .to_string();
        Ok(Event::default().data(data).event("occupancy"))
    });

    let keepalive = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok(Event::default().comment("keepalive")));

    Sse::new(snapshots.merge(keepalive))
}
