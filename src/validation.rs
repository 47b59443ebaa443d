//! Validation of raw form input.
//!
//! Validation never fails with an `Err`. It produces a `FieldErrors` set that the forms keep and
//! render next to the offending fields.

use crate::model::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const DESCRIPTION_REQUIRED: &str = "Description is required.";
pub const AMOUNT_REQUIRED: &str = "Amount is required.";
pub const AMOUNT_INVALID: &str = "Please enter a valid positive number.";

/// A validated form field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Description,
    Amount,
}

serde_plain::derive_display_from_serialize!(Field);

/// Field-level error messages. A field that is absent is valid.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Clears the error of one field. Errors on other fields are kept.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Parses user-entered amount text as a plain or scientific decimal number. Currency symbols and
/// thousands separators are not accepted here.
pub fn parse_amount(text: &str) -> Option<Amount> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .map(Amount::new)
}

/// Validates the raw description and amount text of an expense form.
pub fn validate(description: &str, amount_text: &str) -> FieldErrors {
    parse_input(description, amount_text)
        .err()
        .unwrap_or_default()
}

/// Validates like `validate`, handing back the parsed amount when both fields are valid.
pub fn parse_input(description: &str, amount_text: &str) -> Result<Amount, FieldErrors> {
    let description_ok = !description.trim().is_empty();
    let amount = if amount_text.is_empty() {
        Err(AMOUNT_REQUIRED)
    } else {
        parse_amount(amount_text)
            .filter(Amount::is_valid_entry)
            .ok_or(AMOUNT_INVALID)
    };
    match (description_ok, amount) {
        (true, Ok(amount)) => Ok(amount),
        (description_ok, amount) => {
            let mut errors = FieldErrors::new();
            if !description_ok {
                errors.insert(Field::Description, DESCRIPTION_REQUIRED);
            }
            if let Err(message) = amount {
                errors.insert(Field::Amount, message);
            }
            Err(errors)
        }
    }
}
