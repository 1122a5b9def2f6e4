//! Field rules shared by registration, profile edits and posts.

use regex::Regex;
use std::sync::OnceLock;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("regex {pattern:?} failed to compile: {error}"))
    })
}

fn username_regex() -> &'static Regex {
    cached(&USERNAME_RE, r"^[a-zA-Z0-9_]{3,20}$")
}

fn email_regex() -> &'static Regex {
    cached(&EMAIL_RE, r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
}

/// Mainland mobile numbers: 11 digits, `1` then `3`-`9`.
fn phone_regex() -> &'static Regex {
    cached(&PHONE_RE, r"^1[3-9][0-9]{9}$")
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        Err("username must be 3 to 20 letters, digits or '_'".to_string())
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(6..=30).contains(&len) {
        return Err("password must be 6 to 30 characters".to_string());
    }
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err("password needs an upper-case letter, a lower-case letter and a digit".to_string());
    }
    Ok(())
}

pub fn validate_nickname(nickname: &str) -> Result<(), String> {
    let len = nickname.chars().count();
    if !(2..=30).contains(&len) {
        return Err("nickname must be 2 to 30 characters".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(format!("invalid email: {email}"))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(format!("invalid phone: {phone}"))
    }
}

pub fn validate_post(title: &str, content: &str) -> Result<(), String> {
    let title_len = title.trim().chars().count();
    if title_len == 0 || title.chars().count() > 255 {
        return Err("title must be 1 to 255 characters".to_string());
    }
    let content_len = content.trim().chars().count();
    if content_len == 0 || content.chars().count() > 255 {
        return Err("content must be 1 to 255 characters".to_string());
    }
    Ok(())
}
