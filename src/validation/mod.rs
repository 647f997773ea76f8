use std::fmt;

pub const NICKNAME_MAX_LEN: usize = 50;
pub const PHONE_NUMBER_MAX_LEN: usize = 50;
pub const E164_MIN_DIGITS: usize = 8;
pub const E164_MAX_DIGITS: usize = 15;

/// Calling codes recognized by the sandbox, longest first. A production
/// deployment would carry full phone-number metadata; the demo corridors
/// only need this table.
const CALLING_CODES: &[&str] = &[
    "211", "212", "213", "216", "218", "220", "221", "222", "223", "224", "225", "226", "227",
    "228", "229", "230", "231", "232", "233", "234", "235", "236", "237", "238", "239", "240",
    "241", "242", "243", "244", "245", "248", "249", "250", "251", "252", "253", "254", "255",
    "256", "257", "258", "260", "261", "262", "263", "264", "265", "266", "267", "268", "269",
    "20", "27", "30", "31", "32", "33", "34", "39", "40", "41", "44", "49", "51", "52", "54",
    "55", "56", "57", "58", "60", "61", "62", "63", "64", "65", "66", "81", "82", "84", "86",
    "90", "91", "92", "93", "94", "95", "98", "1", "7",
];

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

impl From<ValidationError> for crate::error::AppError {
    fn from(err: ValidationError) -> Self {
        crate::error::AppError::UserFacing(err.to_string())
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
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
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// Validates an E.164 phone number: a leading `+`, 8 to 15 digits, and a
/// calling code the sandbox recognizes.
pub fn validate_phone_number(phone_number: &str) -> ValidationResult {
    let phone_number = sanitize_string(phone_number);
    validate_required("phoneNumber", &phone_number)?;

    let Some(digits) = phone_number.strip_prefix('+') else {
        return Err(ValidationError::new("phoneNumber", "must start with '+'"));
    };

    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(
            "phoneNumber",
            "must contain only digits after '+'",
        ));
    }

    if digits.len() < E164_MIN_DIGITS || digits.len() > E164_MAX_DIGITS {
        return Err(ValidationError::new(
            "phoneNumber",
            format!(
                "must contain between {} and {} digits",
                E164_MIN_DIGITS, E164_MAX_DIGITS
            ),
        ));
    }

    if digits.starts_with('0') {
        return Err(ValidationError::new(
            "phoneNumber",
            "calling code must not start with 0",
        ));
    }

    if indicative_of(&phone_number).is_none() {
        return Err(ValidationError::new("phoneNumber", "unknown calling code"));
    }

    Ok(())
}

/// Returns the indicative (calling code with its `+`) of a phone number,
/// longest prefix first. `None` when the calling code is not recognized.
pub fn indicative_of(phone_number: &str) -> Option<String> {
    let digits = phone_number.strip_prefix('+')?;

    CALLING_CODES
        .iter()
        .find(|code| digits.starts_with(*code))
        .map(|code| format!("+{}", code))
}

/// Parses a `sessionId` header value: a non-negative integer with no
/// fractional part.
pub fn parse_session_id(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();

    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(
            "sessionId",
            "must be a non-negative integer",
        ));
    }

    raw.parse::<u32>()
        .map_err(|_| ValidationError::new("sessionId", "must be a non-negative integer"))
}
