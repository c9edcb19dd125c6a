//! Small form validation helpers shared by the services.

use crate::error::FieldErrors;

pub(crate) const REQUIRED: &str = "This field is required.";

pub(crate) fn required(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
    }
}

pub(crate) fn max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let count = value.chars().count();
    if count > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {count})."),
        );
    }
}

/// Letters, digits and `@ . + - _`, at most 150 characters.
pub(crate) fn username(errors: &mut FieldErrors, field: &str, value: &str) {
    required(errors, field, value);
    max_chars(errors, field, value, 150);
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            field,
            "Enter a valid username. This value may contain only letters, \
             numbers, and @/./+/-/_ characters.",
        );
    }
}

/// Empty is allowed; anything else needs a local part and a dotted domain.
pub(crate) fn optional_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if !valid {
        errors.add(field, "Enter a valid email address.");
    }
}
