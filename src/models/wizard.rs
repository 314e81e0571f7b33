use chrono::NaiveDate;

use crate::services::availability::{validate_time, TimeSlot};

use super::{CupCategory, CustomerDetails, Gender};

/// How far the booking form has progressed. Forward-only: revisiting an
/// earlier step clears everything after it (the reset table lives in the
/// transition methods below).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Start,
    GenderSelected,
    AddOnChoiceMade,
    CategorySelected,
    DateSelected,
    SlotSelected,
    DetailsEntered,
    AgreementUploaded,
    Submitted,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("select men or women first")]
    GenderRequired,

    #[error("the ice-cream add-on is only offered to women")]
    AddOnNotOffered,

    #[error("answer the ice-cream question first")]
    AddOnChoiceRequired,

    #[error("the ice-cream package is chosen through the add-on question")]
    CategoryNotOffered,

    #[error("that package is not available for this selection")]
    CategoryNotAllowed,

    #[error("pick a package first")]
    CategoryRequired,

    #[error("pick a date first")]
    DateRequired,

    #[error("invalid time slot: {0}")]
    InvalidSlot(String),

    #[error("slot length does not match the package duration")]
    SlotDurationMismatch,

    #[error("pick a time slot first")]
    SlotRequired,

    #[error("{0}")]
    InvalidDetails(String),

    #[error("enter customer details first")]
    DetailsRequired,

    #[error("agreement file is required")]
    AgreementRequired,
}

/// The booking form as an explicit state machine, replacing the original
/// web of value-change watchers that each reset some downstream fields.
#[derive(Debug, Default)]
pub struct BookingWizard {
    gender: Option<Gender>,
    wants_ice_cream: Option<bool>,
    category: Option<CupCategory>,
    date: Option<NaiveDate>,
    slot: Option<TimeSlot>,
    details: Option<CustomerDetails>,
    agreement_file_name: Option<String>,
    submitted: bool,
}

impl BookingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WizardState {
        if self.submitted {
            WizardState::Submitted
        } else if self.agreement_file_name.is_some() {
            WizardState::AgreementUploaded
        } else if self.details.is_some() {
            WizardState::DetailsEntered
        } else if self.slot.is_some() {
            WizardState::SlotSelected
        } else if self.date.is_some() {
            WizardState::DateSelected
        } else if self.category.is_some() {
            WizardState::CategorySelected
        } else if self.wants_ice_cream.is_some() {
            WizardState::AddOnChoiceMade
        } else if self.gender.is_some() {
            WizardState::GenderSelected
        } else {
            WizardState::Start
        }
    }

    /// Step 1. Resets every downstream choice.
    pub fn select_gender(&mut self, gender: Gender) {
        self.gender = Some(gender);
        self.wants_ice_cream = None;
        self.category = None;
        self.reset_from_date();
    }

    /// Step 2, women only. Answering yes locks the ice-cream package in;
    /// answering no returns to the regular list.
    pub fn choose_add_on(&mut self, wants_ice_cream: bool) -> Result<(), WizardError> {
        match self.gender {
            None => return Err(WizardError::GenderRequired),
            Some(Gender::Men) => return Err(WizardError::AddOnNotOffered),
            Some(Gender::Women) => {}
        }

        self.wants_ice_cream = Some(wants_ice_cream);
        self.category = if wants_ice_cream {
            super::category::find_category(super::category::ICE_CREAM_CATEGORY_ID)
        } else {
            None
        };
        self.reset_from_date();
        Ok(())
    }

    /// Step 3. Enforces the gating rules: the ice-cream package is only
    /// reachable via the add-on question, and women-only packages are
    /// refused for men.
    pub fn select_category(&mut self, category: CupCategory) -> Result<(), WizardError> {
        let gender = self.gender.ok_or(WizardError::GenderRequired)?;

        match gender {
            Gender::Women => match self.wants_ice_cream {
                None => return Err(WizardError::AddOnChoiceRequired),
                Some(true) => {
                    if !category.is_ice_cream() {
                        return Err(WizardError::CategoryNotAllowed);
                    }
                }
                Some(false) => {
                    if category.is_ice_cream() {
                        return Err(WizardError::CategoryNotOffered);
                    }
                }
            },
            Gender::Men => {
                if category.is_ice_cream() {
                    return Err(WizardError::CategoryNotOffered);
                }
                if category.women_only {
                    return Err(WizardError::CategoryNotAllowed);
                }
            }
        }

        self.category = Some(category);
        self.reset_from_date();
        Ok(())
    }

    /// Step 4. Resets the slot and later steps.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        if self.category.is_none() {
            return Err(WizardError::CategoryRequired);
        }
        self.date = Some(date);
        self.reset_from_slot();
        Ok(())
    }

    /// Step 5. The slot length must match the selected package duration.
    pub fn select_slot(&mut self, slot: TimeSlot) -> Result<(), WizardError> {
        let category = self.category.as_ref().ok_or(WizardError::CategoryRequired)?;
        if self.date.is_none() {
            return Err(WizardError::DateRequired);
        }

        let (sh, sm) =
            validate_time(&slot.start_time).map_err(|e| WizardError::InvalidSlot(e.to_string()))?;
        let (eh, em) =
            validate_time(&slot.end_time).map_err(|e| WizardError::InvalidSlot(e.to_string()))?;

        let start = sh * 60 + sm;
        let end = eh * 60 + em;
        if end <= start {
            return Err(WizardError::InvalidSlot(format!(
                "{} is not before {}",
                slot.start_time, slot.end_time
            )));
        }
        if end - start != category.duration_hours * 60 {
            return Err(WizardError::SlotDurationMismatch);
        }

        self.slot = Some(slot);
        self.details = None;
        self.agreement_file_name = None;
        self.submitted = false;
        Ok(())
    }

    /// Step 6.
    pub fn enter_details(&mut self, details: CustomerDetails) -> Result<(), WizardError> {
        if self.slot.is_none() {
            return Err(WizardError::SlotRequired);
        }
        details.validate().map_err(WizardError::InvalidDetails)?;
        self.details = Some(details);
        self.agreement_file_name = None;
        self.submitted = false;
        Ok(())
    }

    /// Step 7.
    pub fn attach_agreement(&mut self, file_name: &str) -> Result<(), WizardError> {
        if self.details.is_none() {
            return Err(WizardError::DetailsRequired);
        }
        if file_name.trim().is_empty() {
            return Err(WizardError::AgreementRequired);
        }
        self.agreement_file_name = Some(file_name.to_string());
        self.submitted = false;
        Ok(())
    }

    pub fn mark_submitted(&mut self) -> Result<(), WizardError> {
        if self.agreement_file_name.is_none() {
            return Err(WizardError::AgreementRequired);
        }
        self.submitted = true;
        Ok(())
    }

    fn reset_from_date(&mut self) {
        self.date = None;
        self.reset_from_slot();
    }

    fn reset_from_slot(&mut self) {
        self.slot = None;
        self.details = None;
        self.agreement_file_name = None;
        self.submitted = false;
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn category(&self) -> Option<&CupCategory> {
        self.category.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn slot(&self) -> Option<&TimeSlot> {
        self.slot.as_ref()
    }

    pub fn details(&self) -> Option<&CustomerDetails> {
        self.details.as_ref()
    }
}
