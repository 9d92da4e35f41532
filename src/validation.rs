//! Request field checks shared by the handlers.
//!
//! Each handler builds a [`FieldErrors`], runs the checks it needs, and turns
//! the collector into a 400 response with per-field messages.

use crate::error::{ApiError, FieldErrorMap};

pub const MIN_GRADE_LEVEL: i32 = 9;
pub const MAX_GRADE_LEVEL: i32 = 12;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 40;
pub const MAX_GPA: f64 = 5.0;

#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: FieldErrorMap,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Trimmed value, or a "required" error when blank
    pub fn required(&mut self, field: &str, value: &str, message: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, message);
        }
        trimmed.to_string()
    }

    pub fn email(&mut self, field: &str, value: &str) -> String {
        let email = value.trim().to_string();
        if email.is_empty() {
            self.add(field, "Email is required");
        } else if !is_valid_email(&email) {
            self.add(field, "Email is invalid");
        }
        email
    }

    pub fn password(&mut self, field: &str, value: &str) {
        let len = value.chars().count();
        if len == 0 {
            self.add(field, "Password is required");
        } else if len < MIN_PASSWORD_LEN {
            self.add(field, format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
        } else if len > MAX_PASSWORD_LEN {
            self.add(field, format!("Password must not exceed {} characters", MAX_PASSWORD_LEN));
        }
    }

    pub fn password_confirmation(&mut self, field: &str, password: &str, confirmation: Option<&str>) {
        if let Some(confirmation) = confirmation {
            if confirmation != password {
                self.add(field, "Confirm Password does not match");
            }
        }
    }

    /// At least one level, each within 9..=12. Returns the sorted, de-duplicated set.
    pub fn grade_levels(&mut self, field: &str, levels: &[i32]) -> Vec<i32> {
        if levels.is_empty() {
            self.add(field, "At least one grade level must be selected");
            return Vec::new();
        }
        if levels.iter().any(|l| !is_valid_grade_level(*l)) {
            self.add(field, "Invalid grade level");
        }
        let mut levels = levels.to_vec();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    pub fn gpa(&mut self, field: &str, gpa: f64) {
        if !gpa.is_finite() {
            self.add(field, "GPA must be a number");
        } else if !(0.0..=MAX_GPA).contains(&gpa) {
            self.add(field, format!("GPA must be between 0.0 and {:.1}", MAX_GPA));
        }
    }

    pub fn into_result(self, message: &str) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, Some(self.errors)))
        }
    }
}

pub fn is_valid_grade_level(level: i32) -> bool {
    (MIN_GRADE_LEVEL..=MAX_GRADE_LEVEL).contains(&level)
}

/// `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.starts_with('.'),
        None => false,
    }
}

/// Trim every entry and drop the blank ones
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        assert!(is_valid_email("john@foo.com"));
        assert!(is_valid_email("first.last+ap@school.k12.hi.us"));
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "john", "john@", "@foo.com", "john@foo", "jo hn@foo.com", "a@b@c.com", "a@.com"] {
            assert!(!is_valid_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn password_bounds() {
        let mut errors = FieldErrors::new();
        errors.password("password", "12345");
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        errors.password("password", "changeme");
        assert!(errors.is_empty());

        let mut errors = FieldErrors::new();
        errors.password("password", &"x".repeat(41));
        assert!(!errors.is_empty());
    }

    #[test]
    fn mismatched_confirmation_is_reported() {
        let mut errors = FieldErrors::new();
        errors.password_confirmation("confirmPassword", "changeme", Some("changeme2"));
        let err = errors.into_result("Invalid signup").unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["confirmPassword"], "Confirm Password does not match");
    }

    #[test]
    fn grade_levels_are_deduplicated_and_bounded() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.grade_levels("gradeLevels", &[12, 11, 11]), vec![11, 12]);
        assert!(errors.is_empty());

        errors.grade_levels("gradeLevels", &[8, 10]);
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        errors.grade_levels("gradeLevels", &[]);
        assert!(!errors.is_empty());
    }

    #[test]
    fn gpa_must_be_in_range() {
        let mut errors = FieldErrors::new();
        errors.gpa("GPA", 3.8);
        assert!(errors.is_empty());
        errors.gpa("GPA", 5.5);
        errors.gpa("other", f64::NAN);
        let body = errors.into_result("bad").unwrap_err().to_json();
        assert_eq!(body["field_errors"]["GPA"], "GPA must be between 0.0 and 5.0");
        assert_eq!(body["field_errors"]["other"], "GPA must be a number");
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Class name is required");
        errors.add("name", "something else");
        let body = errors.into_result("bad").unwrap_err().to_json();
        assert_eq!(body["field_errors"]["name"], "Class name is required");
    }

    #[test]
    fn clean_list_drops_blanks() {
        let cleaned = clean_list(vec![" calculus ".into(), "".into(), "  ".into(), "limits".into()]);
        assert_eq!(cleaned, vec!["calculus", "limits"]);
    }
}
