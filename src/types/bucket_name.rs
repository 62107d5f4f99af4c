// ABOUTME: Object storage bucket name validation.
// ABOUTME: Enforces S3 bucket naming rules before any request is made.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketNameError {
    #[error("bucket name cannot be empty")]
    Empty,

    #[error("bucket name must be between 3 and 63 characters")]
    BadLength,

    #[error("bucket name must start and end with a letter or digit")]
    BadBoundary,

    #[error("bucket name cannot contain consecutive dots")]
    ConsecutiveDots,

    #[error("bucket name must be lowercase")]
    NotLowercase,

    #[error("invalid character in bucket name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(value: &str) -> Result<Self, BucketNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(BucketNameError::Empty);
        }

        if !(3..=63).contains(&value.len()) {
            return Err(BucketNameError::BadLength);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(BucketNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '.' {
                return Err(BucketNameError::InvalidChar(c));
            }
        }

        let boundary_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        if !boundary_ok(value.chars().next()) || !boundary_ok(value.chars().last()) {
            return Err(BucketNameError::BadBoundary);
        }

        if value.contains("..") {
            return Err(BucketNameError::ConsecutiveDots);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Static website endpoint for this bucket in the given region.
    pub fn website_url(&self, region: &str) -> String {
        format!("http://{}.s3-website-{}.amazonaws.com", self.0, region)
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
