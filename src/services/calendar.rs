use crate::models::Booking;
use crate::services::availability::validate_time;

/// Render a booking as a single-event iCalendar file for the admin's
/// calendar app. Times are local to the shop; the grid has no timezone.
pub fn generate_ics(booking: &Booking) -> String {
    let day = booking.date.format("%Y%m%d");
    let dtstart = format!("{day}T{}00", compact_time(&booking.start_time));
    let dtend = format!("{day}T{}00", compact_time(&booking.end_time));
    let dtstamp = booking.created_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@coffeespot", booking.id);

    let unit = if booking.cup_category.unit_key.is_some() {
        "servings"
    } else {
        "cups"
    };
    let summary = format!(
        "Coffee booking: {} {unit} ({})",
        booking.cup_category.cups, booking.customer_name
    );
    let description = format!(
        "{} / {} / zone {} - {} - building {}",
        booking.customer_name, booking.customer_phone, booking.zone, booking.street,
        booking.building_number
    );

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Coffeespot//Booking//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

// "14:00" -> "1400". Stored times are validated on the way in, so a bad
// one here means a corrupted row; fall back to midnight rather than panic.
fn compact_time(time: &str) -> String {
    match validate_time(time) {
        Ok((h, m)) => format!("{h:02}{m:02}"),
        Err(_) => "0000".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::models::{find_category, Gender};

    fn booking() -> Booking {
        Booking {
            id: "abc-123".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            start_time: "14:00".to_string(),
            end_time: "16:00".to_string(),
            gender: Gender::Women,
            cup_category: find_category("20cups").unwrap(),
            customer_name: "Noora".to_string(),
            customer_phone: "+97455511111".to_string(),
            address: "Villa 12".to_string(),
            zone: "3".to_string(),
            street: "Corniche".to_string(),
            building_number: "12".to_string(),
            unit_number: None,
            google_maps_link: None,
            agreement_file_name: "signed.pdf".to_string(),
            agreement_file_url: "http://localhost/files/agreements/signed.pdf".to_string(),
            agreement_file_path: "agreements/signed.pdf".to_string(),
            created_at: NaiveDateTime::parse_from_str("2025-06-30 09:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&booking());
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("UID:abc-123@coffeespot"));
        assert!(ics.contains("DTSTART:20250701T140000"));
        assert!(ics.contains("DTEND:20250701T160000"));
        assert!(ics.contains("DTSTAMP:20250630T090000"));
        assert!(ics.contains("SUMMARY:Coffee booking: 20 cups (Noora)"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_generate_ics_servings_unit() {
        let mut b = booking();
        b.cup_category = find_category("iceCreamServings").unwrap();
        b.end_time = "15:00".to_string();

        let ics = generate_ics(&b);
        assert!(ics.contains("SUMMARY:Coffee booking: 15 servings (Noora)"));
        assert!(ics.contains("DTEND:20250701T150000"));
    }
}
