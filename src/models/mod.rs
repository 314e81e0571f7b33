pub mod booking;
pub mod category;
pub mod wizard;

pub use booking::{Booking, CustomerDetails, Gender};
pub use category::{cup_catalog, find_category, selectable_categories, CupCategory};
pub use wizard::{BookingWizard, WizardError, WizardState};
