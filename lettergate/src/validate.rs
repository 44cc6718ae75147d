//! Billing field validation and phone normalization.
//!
//! Validation runs entirely client-side before any network call; failing
//! fields populate a [`ValidationErrors`] map keyed by wire field name and
//! block submission. Phone numbers are Kenyan mobile numbers, accepted in
//! local form (`07...`, `7...`, `1...`) or already-international form
//! (`254...`) and normalized to exactly `254` + 9 digits.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationErrors;
use crate::provider::BillingDetails;

/// `local@domain.tld` shape, intentionally loose.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

/// Kenyan mobile numbers: optional `254`/`+254`/`0` prefix, then a `7` or
/// `1` line number with 8 more digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:254|\+254|0)?(7|1)\d{8}$").expect("valid phone regex"));

/// Country code prepended during normalization.
const COUNTRY_CODE: &str = "254";

/// Canonical length: country code plus 9 subscriber digits.
const CANONICAL_LEN: usize = 12;

/// Whether a flow requires a mobile number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneRequirement {
    /// Phone number is not collected (card and hosted-checkout flows).
    NotCollected,
    /// Phone number is required and format-checked (mobile-money flow).
    Required,
}

/// Validates billing details for submission.
///
/// `billing` may be `None` (nothing entered yet); every required field is
/// then reported missing. The returned map is empty when the form is valid.
#[must_use]
pub fn validate_billing(
    billing: Option<&BillingDetails>,
    phone: PhoneRequirement,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let (first_name, last_name, email, phone_number) = match billing {
        Some(b) => (
            b.first_name.as_str(),
            b.last_name.as_str(),
            b.email.as_str(),
            b.phone_number.as_deref(),
        ),
        None => ("", "", "", None),
    };

    if first_name.is_empty() {
        errors.insert("first_name", "First name is required");
    }
    if last_name.is_empty() {
        errors.insert("last_name", "Last name is required");
    }
    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.insert("email", "Email is invalid");
    }

    if phone == PhoneRequirement::Required {
        match phone_number {
            None | Some("") => errors.insert("phone_number", "Phone number is required"),
            Some(number) if !PHONE_RE.is_match(number) => {
                errors.insert("phone_number", "Enter a valid Kenyan phone number");
            }
            Some(_) => {}
        }
    }

    errors
}

/// Normalizes a phone number to canonical international form.
///
/// Non-digit characters are stripped first. A leading `0` is replaced by the
/// country code; a bare line number starting `7` or `1` is prefixed with it.
/// The result is truncated to [`CANONICAL_LEN`] digits.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    let mut formatted = if let Some(rest) = digits.strip_prefix('0') {
        format!("{COUNTRY_CODE}{rest}")
    } else if digits.starts_with('7') || digits.starts_with('1') {
        format!("{COUNTRY_CODE}{digits}")
    } else {
        digits
    };

    formatted.truncate(CANONICAL_LEN);
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing(first: &str, last: &str, email: &str, phone: Option<&str>) -> BillingDetails {
        BillingDetails {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: email.to_owned(),
            phone_number: phone.map(str::to_owned),
        }
    }

    #[test]
    fn valid_card_billing_passes() {
        let b = billing("Jane", "Doe", "foo@bar.com", None);
        assert!(validate_billing(Some(&b), PhoneRequirement::NotCollected).is_empty());
    }

    #[test]
    fn bare_email_fails_and_full_email_passes() {
        let b = billing("Jane", "Doe", "foo", None);
        let errors = validate_billing(Some(&b), PhoneRequirement::NotCollected);
        assert_eq!(errors.get("email"), Some("Email is invalid"));

        let b = billing("Jane", "Doe", "foo@bar.com", None);
        assert!(validate_billing(Some(&b), PhoneRequirement::NotCollected).is_empty());
    }

    #[test]
    fn empty_names_fail_with_field_specific_messages() {
        let b = billing("", "", "foo@bar.com", None);
        let errors = validate_billing(Some(&b), PhoneRequirement::NotCollected);
        assert_eq!(errors.get("first_name"), Some("First name is required"));
        assert_eq!(errors.get("last_name"), Some("Last name is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn missing_billing_reports_every_required_field() {
        let errors = validate_billing(None, PhoneRequirement::Required);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn phone_only_checked_when_required() {
        let b = billing("Jane", "Doe", "foo@bar.com", None);
        assert!(validate_billing(Some(&b), PhoneRequirement::NotCollected).is_empty());

        let errors = validate_billing(Some(&b), PhoneRequirement::Required);
        assert_eq!(errors.get("phone_number"), Some("Phone number is required"));
    }

    #[test]
    fn malformed_phone_is_rejected() {
        let b = billing("Jane", "Doe", "foo@bar.com", Some("12345"));
        let errors = validate_billing(Some(&b), PhoneRequirement::Required);
        assert_eq!(
            errors.get("phone_number"),
            Some("Enter a valid Kenyan phone number")
        );
    }

    #[test]
    fn accepted_phone_shapes() {
        for number in ["0712345678", "712345678", "254712345678", "+254712345678", "0112345678"] {
            let b = billing("Jane", "Doe", "foo@bar.com", Some(number));
            let errors = validate_billing(Some(&b), PhoneRequirement::Required);
            assert!(errors.is_empty(), "{number} should be accepted: {errors}");
        }
    }

    #[test]
    fn normalizes_to_canonical_international_form() {
        assert_eq!(normalize_phone("0712345678"), "254712345678");
        assert_eq!(normalize_phone("712345678"), "254712345678");
        assert_eq!(normalize_phone("+254712345678"), "254712345678");
        assert_eq!(normalize_phone("112345678"), "254112345678");
    }

    #[test]
    fn normalization_truncates_excess_digits() {
        assert_eq!(normalize_phone("07123456789999"), "254712345678");
    }
}
