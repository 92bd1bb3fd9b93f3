// ABOUTME: Application name used as the naming prefix for containers and images.
// ABOUTME: Restricted to lowercase DNS labels so derived names are valid for the runtime.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppNameError {
    #[error("application name cannot be empty")]
    Empty,

    #[error("application name exceeds maximum length of 57 characters")]
    TooLong,

    #[error("application name must start with a lowercase letter or digit")]
    BadStart,

    #[error("application name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("invalid character in application name: '{0}'")]
    InvalidChar(char),
}

/// Prefix for every container (`{app}-{color}`) and image (`{app}:{color}`).
///
/// The length limit leaves room for the `-green` suffix within a 63 byte label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        let first = value.chars().next().ok_or(AppNameError::Empty)?;

        if value.len() > 57 {
            return Err(AppNameError::TooLong);
        }

        if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
            return Err(AppNameError::BadStart);
        }

        if value.ends_with('-') {
            return Err(AppNameError::EndsWithHyphen);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(AppNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dns_label() {
        assert_eq!(
            AppName::new("flask-ml-app").unwrap().as_str(),
            "flask-ml-app"
        );
        assert!(AppName::new("app2").is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(AppName::new(""), Err(AppNameError::Empty));
        assert_eq!(AppName::new("-app"), Err(AppNameError::BadStart));
        assert_eq!(AppName::new("app-"), Err(AppNameError::EndsWithHyphen));
        assert_eq!(AppName::new("My-App"), Err(AppNameError::BadStart));
        assert_eq!(AppName::new("my_app"), Err(AppNameError::InvalidChar('_')));
        assert_eq!(AppName::new(&"a".repeat(58)), Err(AppNameError::TooLong));
    }
}
