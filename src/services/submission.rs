use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{find_category, Booking, BookingWizard, CustomerDetails, Gender};
use crate::services::availability::{overlaps, TimeSlot};
use crate::state::AppState;

/// Everything the form submits in one request.
#[derive(Debug)]
pub struct BookingSubmission {
    pub gender: Gender,
    pub wants_ice_cream: Option<bool>,
    pub category_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub details: CustomerDetails,
    pub agreement_file_name: String,
    pub agreement_bytes: Vec<u8>,
}

/// The full submission flow: gate and validate through the wizard, check
/// the latest snapshot, upload the agreement, then write the record inside
/// a transaction that re-validates non-overlap against the live store. A
/// record-write failure after a successful upload deletes the orphaned
/// file again.
pub async fn submit_booking(
    state: &AppState,
    submission: BookingSubmission,
) -> Result<Booking, AppError> {
    let category = find_category(&submission.category_id)
        .ok_or_else(|| AppError::Validation(format!("unknown category: {}", submission.category_id)))?;

    let mut wizard = BookingWizard::new();
    wizard.select_gender(submission.gender);
    if let Some(wants) = submission.wants_ice_cream {
        wizard.choose_add_on(wants).map_err(validation)?;
    }
    wizard.select_category(category.clone()).map_err(validation)?;
    wizard.select_date(submission.date).map_err(validation)?;
    wizard.select_slot(submission.slot.clone()).map_err(validation)?;
    wizard
        .enter_details(submission.details.clone())
        .map_err(validation)?;
    wizard
        .attach_agreement(&submission.agreement_file_name)
        .map_err(validation)?;

    // Fast pre-check against the latest snapshot. A loading snapshot
    // reports every slot booked, so nothing is written before the first
    // snapshot arrives.
    let booked = state
        .snapshots
        .latest()
        .is_slot_booked(
            submission.date,
            &submission.slot.start_time,
            &submission.slot.end_time,
        )
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if booked {
        return Err(AppError::SlotTaken);
    }

    let stored = state
        .files
        .store(&submission.agreement_file_name, &submission.agreement_bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        date: submission.date,
        start_time: submission.slot.start_time.clone(),
        end_time: submission.slot.end_time.clone(),
        gender: submission.gender,
        cup_category: category,
        customer_name: submission.details.name.clone(),
        customer_phone: submission.details.phone.clone(),
        address: submission.details.address.clone(),
        zone: submission.details.zone.clone(),
        street: submission.details.street.clone(),
        building_number: submission.details.building_number.clone(),
        unit_number: submission.details.unit_number.clone(),
        google_maps_link: submission.details.google_maps_link.clone(),
        agreement_file_name: submission.agreement_file_name.clone(),
        agreement_file_url: stored.url.clone(),
        agreement_file_path: stored.path.clone(),
        created_at: Utc::now().naive_utc(),
    };

    if let Err(err) = persist(state, &booking) {
        tracing::warn!(error = %err, booking_id = %booking.id, "record write failed after upload");
        // Compensating cleanup: don't leave the uploaded file orphaned.
        if let Err(delete_err) = state.files.delete(&stored.path).await {
            tracing::error!(error = %delete_err, path = %stored.path, "failed to delete orphaned agreement file");
        }
        return Err(err);
    }

    wizard.mark_submitted().map_err(validation)?;
    tracing::info!(
        booking_id = %booking.id,
        date = %booking.date,
        start = %booking.start_time,
        end = %booking.end_time,
        "booking created"
    );

    Ok(booking)
}

fn validation(e: crate::models::WizardError) -> AppError {
    AppError::Validation(e.to_string())
}

// Transactional write: re-read the date's bookings and re-validate
// non-overlap against the live store, not the possibly-stale snapshot
// the client picked its slot from.
fn persist(state: &AppState, booking: &Booking) -> Result<(), AppError> {
    let mut conn = state.db.lock().unwrap();

    {
        let tx = conn.transaction()?;
        let existing = queries::get_bookings_for_date(&tx, booking.date)?;
        let conflict = existing.iter().any(|b| {
            overlaps(
                &b.start_time,
                &b.end_time,
                &booking.start_time,
                &booking.end_time,
            )
        });
        if conflict {
            return Err(AppError::SlotTaken);
        }
        queries::insert_booking(&tx, booking)?;
        tx.commit()?;
    }

    state.snapshots.refresh(&conn)?;
    Ok(())
}
