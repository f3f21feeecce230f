//! The wedding details collected by the form.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_BUDGET, DEFAULT_GUEST_COUNT, MIN_GUEST_COUNT};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetailsError {
    #[error("invalid wedding date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("wedding date {date} is in the past (earliest allowed is {today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("invalid guest count '{0}'")]
    InvalidGuestCount(String),
    #[error("number of guests must be at least 1, got {0}")]
    TooFewGuests(u32),
    #[error("invalid budget '{0}', expected a whole number of rupees")]
    InvalidBudget(String),
}

/// Raw form submission. Every field arrives as text so that a bad value
/// becomes a message on the page instead of a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsForm {
    #[serde(default)]
    pub wedding_date: String,
    #[serde(default)]
    pub guest_count: String,
    #[serde(default)]
    pub budget: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeddingDetails {
    pub date: Option<NaiveDate>,
    pub guest_count: u32,
    pub budget: u64,
}

impl Default for WeddingDetails {
    fn default() -> Self {
        Self {
            date: None,
            guest_count: DEFAULT_GUEST_COUNT,
            budget: DEFAULT_BUDGET,
        }
    }
}

impl WeddingDetails {
    /// Replaces the stored values with the submitted ones. Nothing changes
    /// unless every field passes.
    pub fn apply(&mut self, form: &DetailsForm, today: NaiveDate) -> Result<(), DetailsError> {
        let date = parse_date(&form.wedding_date, today)?;
        let guest_count = parse_guest_count(&form.guest_count)?;
        let budget = parse_budget(&form.budget)?;

        self.date = date;
        self.guest_count = guest_count;
        self.budget = budget;
        Ok(())
    }

    pub fn set_date(&mut self, raw: &str, today: NaiveDate) -> Result<(), DetailsError> {
        self.date = parse_date(raw, today)?;
        Ok(())
    }

    pub fn set_guest_count(&mut self, raw: &str) -> Result<(), DetailsError> {
        self.guest_count = parse_guest_count(raw)?;
        Ok(())
    }

    pub fn set_budget(&mut self, raw: &str) -> Result<(), DetailsError> {
        self.budget = parse_budget(raw)?;
        Ok(())
    }

    pub fn date_display(&self) -> String {
        match self.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "a date yet to be decided".to_string(),
        }
    }

    pub fn budget_display(&self) -> String {
        format!("₹{}", self.budget)
    }
}

impl fmt::Display for WeddingDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "date: {}, guests: {}, budget: {}",
            self.date_display(),
            self.guest_count,
            self.budget_display()
        )
    }
}

fn parse_date(raw: &str, today: NaiveDate) -> Result<Option<NaiveDate>, DetailsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DetailsError::InvalidDate(raw.to_string()))?;
    if date < today {
        return Err(DetailsError::DateInPast { date, today });
    }
    Ok(Some(date))
}

fn parse_guest_count(raw: &str) -> Result<u32, DetailsError> {
    let raw = raw.trim();
    let count: u32 = raw
        .parse()
        .map_err(|_| DetailsError::InvalidGuestCount(raw.to_string()))?;
    if count < MIN_GUEST_COUNT {
        return Err(DetailsError::TooFewGuests(count));
    }
    Ok(count)
}

fn parse_budget(raw: &str) -> Result<u64, DetailsError> {
    let raw = raw.trim();
    raw.parse()
        .map_err(|_| DetailsError::InvalidBudget(raw.to_string()))
}
