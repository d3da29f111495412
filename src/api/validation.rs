//! Field-level checks run before any backend call.

use regex::Regex;
use std::collections::BTreeMap;

use crate::backend::types::{LoginRequest, RegisterRequest};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Field name to reason.
pub type FieldErrors = BTreeMap<String, String>;

/// Basic email format check.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !valid_email(email.trim()) {
        errors.insert("email".to_string(), "Invalid email address".to_string());
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// # Errors
/// Returns every failing field.
pub fn sign_in(request: &LoginRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &request.email);
    if request.password.is_empty() {
        errors.insert("password".to_string(), "Password is required".to_string());
    }
    finish(errors)
}

/// # Errors
/// Returns every failing field.
pub fn sign_up(request: &RegisterRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if request.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }
    check_email(&mut errors, &request.email);
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert(
            "password".to_string(),
            format!("Password must be at least {MIN_PASSWORD_CHARS} characters"),
        );
    }
    if let Some(business) = &request.business {
        if business.name.trim().is_empty() {
            errors.insert("business.name".to_string(), "Business name is required".to_string());
        }
        for (index, branch) in business.branches.iter().enumerate() {
            if branch.name.trim().is_empty() {
                errors.insert(
                    format!("business.branches.{index}.name"),
                    "Branch name is required".to_string(),
                );
            }
        }
    }
    finish(errors)
}

/// # Errors
/// Returns the email error.
pub fn resend_verification(email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    finish(errors)
}

/// # Errors
/// Returns the file error.
pub fn upload(file: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if file.trim().is_empty() {
        errors.insert("file".to_string(), "File is required".to_string());
    }
    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{BranchRegistration, BusinessRegistration};

    fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
            role: None,
            business: None,
        }
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn sign_in_requires_email_and_password() {
        let errors = sign_in(&LoginRequest {
            email: String::new(),
            password: String::new(),
        })
        .err()
        .unwrap_or_default();
        assert_eq!(errors.get("email").map(String::as_str), Some("Email is required"));
        assert_eq!(
            errors.get("password").map(String::as_str),
            Some("Password is required")
        );
    }

    #[test]
    fn sign_in_accepts_padded_email() {
        let request = LoginRequest {
            email: "  a@example.com ".to_string(),
            password: "x".to_string(),
        };
        assert!(sign_in(&request).is_ok());
    }

    #[test]
    fn sign_up_checks_password_length() {
        let errors = sign_up(&register("Ana", "ana@example.com", "short"))
            .err()
            .unwrap_or_default();
        assert!(errors.contains_key("password"));
        assert_eq!(errors.len(), 1);
        assert!(sign_up(&register("Ana", "ana@example.com", "long enough")).is_ok());
    }

    #[test]
    fn sign_up_checks_business_fields() {
        let mut request = register("Ana", "ana@example.com", "password1");
        request.business = Some(BusinessRegistration {
            name: " ".to_string(),
            registration_number: None,
            address: None,
            phone: None,
            branches: vec![BranchRegistration {
                name: String::new(),
                address: None,
                phone: None,
            }],
        });
        let errors = sign_up(&request).err().unwrap_or_default();
        assert!(errors.contains_key("business.name"));
        assert!(errors.contains_key("business.branches.0.name"));
    }

    #[test]
    fn resend_and_upload_checks() {
        assert!(resend_verification("bad").is_err());
        assert!(resend_verification("ok@example.com").is_ok());
        assert!(upload("").is_err());
        assert!(upload("data:image/png;base64,AAAA").is_ok());
    }
}
