use std::fmt;

pub const LABEL_MAX_LEN: usize = 64;
pub const ACCOUNT_ID_MAX_LEN: usize = 32;
pub const CONTACT_NUMBER_MIN_DIGITS: usize = 7;
pub const CONTACT_NUMBER_MAX_DIGITS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// Collapses whitespace runs (tabs and newlines included) to one space and
/// drops the remaining control characters.
pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// Sanitizes a free-text label and returns the cleaned value.
fn clean_label(field: &'static str, value: &str) -> ValidationResult<String> {
    let value = sanitize_string(value);
    validate_required(field, &value)?;
    validate_max_len(field, &value, LABEL_MAX_LEN)?;
    Ok(value)
}

pub fn validate_display_name(display_name: &str) -> ValidationResult<String> {
    clean_label("display_name", display_name)
}

pub fn validate_game_label(game_label: &str) -> ValidationResult<String> {
    clean_label("game_label", game_label)
}

/// Digits only, optionally led by `+`. Surrounding whitespace is dropped.
pub fn validate_contact_number(contact_number: &str) -> ValidationResult<String> {
    let contact_number = sanitize_string(contact_number);
    validate_required("contact_number", &contact_number)?;

    let digits = contact_number.strip_prefix('+').unwrap_or(&contact_number);
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(
            "contact_number",
            "must contain only digits, optionally prefixed with '+'",
        ));
    }

    if !(CONTACT_NUMBER_MIN_DIGITS..=CONTACT_NUMBER_MAX_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::new(
            "contact_number",
            format!(
                "must have between {} and {} digits",
                CONTACT_NUMBER_MIN_DIGITS, CONTACT_NUMBER_MAX_DIGITS
            ),
        ));
    }

    Ok(contact_number)
}

pub fn validate_account_id(account_id: &str) -> ValidationResult<String> {
    let account_id = account_id.trim().to_string();
    validate_required("account_id", &account_id)?;
    validate_max_len("account_id", &account_id, ACCOUNT_ID_MAX_LEN)?;
    Ok(account_id)
}
