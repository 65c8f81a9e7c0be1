//! Common data types used throughout the application

use serde::{Deserialize, Serialize};

use crate::errors::{AptMapError, Result};

/// Service key for the administrative-registry / trade-record API family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatagoCredentials {
    pub service_key: String,
}

impl DatagoCredentials {
    /// Build credentials, rejecting empty keys up front.
    pub fn new(service_key: impl Into<String>) -> Result<Self> {
        let service_key = service_key.into();
        if service_key.trim().is_empty() {
            return Err(AptMapError::Config("registry service key is empty".to_string()));
        }
        Ok(Self { service_key })
    }
}

/// Consumer key/secret pair for the statistical-geography API family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgisCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl SgisCredentials {
    /// Build credentials, rejecting empty keys up front.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Result<Self> {
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();
        if consumer_key.trim().is_empty() {
            return Err(AptMapError::Config("geography consumer key is empty".to_string()));
        }
        if consumer_secret.trim().is_empty() {
            return Err(AptMapError::Config("geography consumer secret is empty".to_string()));
        }
        Ok(Self { consumer_key, consumer_secret })
    }
}

/// Resolved credential set for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub datago: DatagoCredentials,
    pub sgis: SgisCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_service_key() {
        let err = DatagoCredentials::new("").unwrap_err();
        assert!(matches!(err, AptMapError::Config(_)));

        let err = DatagoCredentials::new("   ").unwrap_err();
        assert!(matches!(err, AptMapError::Config(_)));
    }

    #[test]
    fn rejects_empty_consumer_pair() {
        assert!(SgisCredentials::new("", "secret").is_err());
        assert!(SgisCredentials::new("key", "").is_err());
        assert!(SgisCredentials::new("key", "secret").is_ok());
    }

    #[test]
    fn accepts_valid_key() {
        let creds = DatagoCredentials::new("abc123").unwrap();
        assert_eq!(creds.service_key, "abc123");
    }
}
