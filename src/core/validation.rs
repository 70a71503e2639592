use crate::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::core::errors::NeosecError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Trims and lowercases an email, rejecting anything that is not `x@y.z`.
pub fn normalize_email(email: &str) -> Result<String, NeosecError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(NeosecError::MissingEmail);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(NeosecError::InvalidEmail(email.to_string()));
    }
    Ok(email.to_lowercase())
}

pub fn validate_string_input(field: &str, value: &str, max_length: usize) -> Result<(), NeosecError> {
    if value.trim().is_empty() {
        return Err(NeosecError::invalid_input(
            field,
            format!("Invalid {}", field),
            format!("{} cannot be empty", field),
        ));
    }
    if value.chars().count() > max_length {
        return Err(NeosecError::invalid_input(
            field,
            format!("{} Too Long", field),
            format!("{} cannot exceed {} characters", field, max_length),
        ));
    }
    if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
        return Err(NeosecError::invalid_input(
            field,
            format!("Invalid {}", field),
            format!("{} contains invalid characters", field),
        ));
    }
    Ok(())
}

pub fn validate_optional_text(field: &str, value: Option<&str>, max_length: usize) -> Result<(), NeosecError> {
    match value {
        Some(text) if text.chars().count() > max_length => Err(NeosecError::invalid_input(
            field,
            format!("{} Too Long", field),
            format!("{} cannot exceed {} characters", field, max_length),
        )),
        _ => Ok(()),
    }
}

pub fn validate_password(field: &str, password: &str) -> Result<(), NeosecError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH || len > MAX_PASSWORD_LENGTH {
        return Err(NeosecError::invalid_input(
            field,
            "Invalid password",
            format!(
                "Password must be between {} and {} characters long",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            ),
        ));
    }
    Ok(())
}

pub fn validate_ip_address(value: &str) -> Result<(), NeosecError> {
    value.trim().parse::<IpAddr>().map(|_| ()).map_err(|_| {
        NeosecError::invalid_input(
            "ipAddress",
            "Invalid IP address",
            format!("{} is not a valid IPv4 or IPv6 address", value),
        )
    })
}

pub fn validate_port(port: u32) -> Result<(), NeosecError> {
    if !(1..=65535).contains(&port) {
        return Err(NeosecError::invalid_input(
            "port",
            "Invalid port",
            "Port must be between 1 and 65535",
        ));
    }
    Ok(())
}
