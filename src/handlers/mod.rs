pub mod admin;
pub mod bookings;
pub mod calendar;
pub mod health;
