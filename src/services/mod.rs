pub mod availability;
pub mod calendar;
pub mod i18n;
pub mod snapshot;
pub mod storage;
pub mod submission;
