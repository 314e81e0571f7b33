use anyhow::anyhow;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::models::{Booking, Gender};

const BOOKING_COLUMNS: &str = "id, date, start_time, end_time, gender, cup_category, \
     customer_name, customer_phone, address, zone, street, building_number, \
     unit_number, google_maps_link, agreement_file_name, agreement_file_url, \
     agreement_file_path, created_at";

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    // The category is stored as a denormalized JSON copy so catalog edits
    // never change historical bookings.
    let category_json = serde_json::to_string(&booking.cup_category)?;

    conn.execute(
        "INSERT INTO bookings (id, date, start_time, end_time, gender, cup_category,
            customer_name, customer_phone, address, zone, street, building_number,
            unit_number, google_maps_link, agreement_file_name, agreement_file_url,
            agreement_file_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            booking.id,
            booking.date.format("%Y-%m-%d").to_string(),
            booking.start_time,
            booking.end_time,
            booking.gender.as_str(),
            category_json,
            booking.customer_name,
            booking.customer_phone,
            booking.address,
            booking.zone,
            booking.street,
            booking.building_number,
            booking.unit_number,
            booking.google_maps_link,
            booking.agreement_file_name,
            booking.agreement_file_url,
            booking.agreement_file_path,
            booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

/// Full booking set, ordered the way the snapshot provider promises:
/// date descending, then start time ascending.
pub fn get_all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY date DESC, start_time ASC",
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE date = ?1 ORDER BY start_time ASC",
    ))?;

    let rows = stmt.query_map(params![date.format("%Y-%m-%d").to_string()], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1",
    ))?;

    let result = stmt.query_row(params![id], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(1)?;
    let gender_str: String = row.get(4)?;
    let category_json: String = row.get(5)?;
    let created_at_str: String = row.get(17)?;

    Ok(Booking {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        gender: Gender::parse(&gender_str).ok_or_else(|| anyhow!("bad gender: {gender_str}"))?,
        cup_category: serde_json::from_str(&category_json)?,
        customer_name: row.get(6)?,
        customer_phone: row.get(7)?,
        address: row.get(8)?,
        zone: row.get(9)?,
        street: row.get(10)?,
        building_number: row.get(11)?,
        unit_number: row.get(12)?,
        google_maps_link: row.get(13)?,
        agreement_file_name: row.get(14)?,
        agreement_file_url: row.get(15)?,
        agreement_file_path: row.get(16)?,
        created_at: NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")?,
    })
}

// ── Admin sessions ──

pub fn create_session(conn: &Connection, token: &str, ttl_hours: i64) -> anyhow::Result<()> {
    let now = Utc::now().naive_utc();
    let expires = now + Duration::hours(ttl_hours);
    conn.execute(
        "INSERT INTO admin_sessions (token, created_at, expires_at) VALUES (?1, ?2, ?3)",
        params![
            token,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
            expires.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn session_is_valid(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM admin_sessions WHERE token = ?1 AND expires_at > ?2",
        params![token, now],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn delete_session(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM admin_sessions WHERE token = ?1",
        params![token],
    )?;
    Ok(count > 0)
}

pub fn expire_old_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "DELETE FROM admin_sessions WHERE expires_at <= ?1",
        params![now],
    )?;
    Ok(count)
}
