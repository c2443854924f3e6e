//! Shipping and payment form input.
//!
//! Only presence is enforced. Email, phone and postal code formats are not
//! checked, and card fields are never validated for format or checksum.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};
use crate::domain::value_objects::PaymentMethod;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShippingProfile {
    #[validate(custom = "not_blank")]
    pub first_name: String,
    #[validate(custom = "not_blank")]
    pub last_name: String,
    #[validate(custom = "not_blank")]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub address: String,
    #[validate(custom = "not_blank")]
    pub city: String,
    #[validate(custom = "not_blank")]
    pub postal_code: String,
    #[validate(custom = "not_blank")]
    pub country: String,
}

impl ShippingProfile {
    /// Blank form, optionally seeded with the signed-in user's email.
    pub fn blank(email: Option<&str>) -> Self {
        Self { email: email.unwrap_or_default().to_string(), ..Self::default() }
    }

    /// Stored email wins; the identity email fills in when none is stored.
    pub fn with_fallback_email(mut self, email: Option<&str>) -> Self {
        if self.email.trim().is_empty() {
            self.email = email.unwrap_or_default().to_string();
        }
        self
    }
}

/// Card fields collected when paying by card. They are required but never
/// persisted or charged.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct CardDetails {
    #[validate(custom = "not_blank")]
    pub card_number: String,
    #[validate(custom = "not_blank")]
    pub card_expiry: String,
    #[validate(custom = "not_blank")]
    pub card_cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails").field("card_number", &"<redacted>").field("card_expiry", &self.card_expiry).finish_non_exhaustive()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Per-field validation failures, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }
    pub fn fields(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }

    fn absorb(&mut self, errors: &ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            let code = errs.first().map(|e| e.code.to_string()).unwrap_or_else(|| "invalid".to_string());
            self.0.insert(field.to_string(), code);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "missing or invalid fields: {}", fields.join(", "))
    }
}

/// Checks the shipping form, plus the card form when paying by card.
pub fn validate_checkout_form(shipping: &ShippingProfile, method: PaymentMethod, card: Option<&CardDetails>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if let Err(e) = shipping.validate() { errors.absorb(&e); }
    if method == PaymentMethod::Card {
        let blank = CardDetails::default();
        if let Err(e) = card.unwrap_or(&blank).validate() { errors.absorb(&e); }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn complete_profile() -> ShippingProfile {
        ShippingProfile {
            first_name: "Ada".into(), last_name: "Lovelace".into(), email: "ada@example.com".into(),
            phone: "+44 20 7946 0000".into(), address: "12 St James's Square".into(), city: "London".into(),
            postal_code: "SW1Y 4JH".into(), country: "United Kingdom".into(),
        }
    }

    #[test]
    fn test_complete_profile_passes() {
        assert_eq!(validate_checkout_form(&complete_profile(), PaymentMethod::CashOnDelivery, None), Ok(()));
    }

    #[test]
    fn test_every_shipping_field_is_required() {
        let errors = validate_checkout_form(&ShippingProfile::default(), PaymentMethod::CashOnDelivery, None).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, ["address", "city", "country", "email", "first_name", "last_name", "phone", "postal_code"]);
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut profile = complete_profile();
        profile.city = "   ".into();
        let errors = validate_checkout_form(&profile, PaymentMethod::CashOnDelivery, None).unwrap_err();
        assert!(errors.contains("city"));
        assert_eq!(errors.fields().count(), 1);
    }

    #[test]
    fn test_email_format_not_enforced() {
        let mut profile = complete_profile();
        profile.email = "not-an-email".into();
        profile.postal_code = "?".into();
        assert!(validate_checkout_form(&profile, PaymentMethod::CashOnDelivery, None).is_ok());
    }

    #[test]
    fn test_card_fields_required_only_for_card() {
        let errors = validate_checkout_form(&complete_profile(), PaymentMethod::Card, None).unwrap_err();
        assert!(errors.contains("card_number") && errors.contains("card_expiry") && errors.contains("card_cvv"));

        let card = CardDetails { card_number: "not a number".into(), card_expiry: "whenever".into(), card_cvv: "x".into() };
        assert!(validate_checkout_form(&complete_profile(), PaymentMethod::Card, Some(&card)).is_ok());
        assert!(validate_checkout_form(&complete_profile(), PaymentMethod::CashOnDelivery, Some(&CardDetails::default())).is_ok());
    }

    #[test]
    fn test_fallback_email() {
        let stored = ShippingProfile { city: "Paris".into(), ..ShippingProfile::default() };
        assert_eq!(stored.clone().with_fallback_email(Some("id@example.com")).email, "id@example.com");
        let mut with_email = stored;
        with_email.email = "stored@example.com".into();
        assert_eq!(with_email.with_fallback_email(Some("id@example.com")).email, "stored@example.com");
        assert_eq!(ShippingProfile::blank(None), ShippingProfile::default());
    }

    #[test]
    fn test_card_debug_redacts_number() {
        let card = CardDetails { card_number: "4111111111111111".into(), ..CardDetails::default() };
        assert!(!format!("{card:?}").contains("4111"));
    }
}
