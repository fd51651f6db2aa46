//! 输入校验

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{5,16}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

// 科目代码：字母开头，字母数字或 `-`/`_`
static SUBJECT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{1,19}$").expect("Invalid subject code regex"));

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "letmein1",
    "welcome1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 5-16 characters of letters, numbers, underscores or hyphens",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_subject_code(code: &str) -> Result<(), &'static str> {
    if !SUBJECT_CODE_RE.is_match(code) {
        return Err(
            "Subject code must be 2-20 characters, start with a letter and contain only letters, numbers, '-' or '_'",
        );
    }
    Ok(())
}

/// 密码策略：至少 8 位，同时包含大写、小写字母和数字，且不是常见弱密码。
/// 返回所有不满足的规则，便于前端一次性提示。
pub fn validate_password(password: &str) -> Result<(), Vec<&'static str>> {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// 便于直接放进响应消息的版本
pub fn validate_password_message(password: &str) -> Result<(), String> {
    validate_password(password).map_err(|errors| errors.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("a-very-long-username-x").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("teacher@school.edu").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("x@y").is_err());
    }

    #[test]
    fn test_subject_code() {
        assert!(validate_subject_code("MATH101").is_ok());
        assert!(validate_subject_code("cs-intro").is_ok());
        assert!(validate_subject_code("1MATH").is_err());
        assert!(validate_subject_code("M").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("MyP@ssw0rd").is_ok());
    }

    #[test]
    fn test_password_reports_every_rule() {
        let errors = validate_password("abc").unwrap_err();
        assert!(errors.contains(&"Password must be at least 8 characters long"));
        assert!(errors.contains(&"Password must contain at least one uppercase letter"));
        assert!(errors.contains(&"Password must contain at least one digit"));
        assert!(!errors.contains(&"Password must contain at least one lowercase letter"));
    }

    #[test]
    fn test_common_password() {
        let errors = validate_password("Password1").unwrap_err();
        assert_eq!(
            errors,
            vec!["Password is too common, please choose a stronger password"]
        );
    }
}
