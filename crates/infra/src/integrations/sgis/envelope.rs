//! Envelope classification for the geography service
//!
//! Every response from this family embeds an `errCd` on failure: `-401`
//! means the token is stale or invalid, anything else non-zero is a request
//! problem. Success responses either omit `errCd` entirely (the boundary
//! feature collection) or carry `errCd == 0`.

use aptmap_domain::{AptMapError, Result};
use serde_json::Value;

use crate::integrations::value_util::text_of;

/// The distinguished code meaning the access token was rejected.
pub(crate) const STALE_TOKEN_CODE: &str = "-401";

/// Check a decoded response for an embedded failure code.
pub(crate) fn classify(decoded: &Value) -> Result<()> {
    let Some(envelope) = decoded.as_object() else {
        return Err(AptMapError::MalformedResponse(
            "geography response is not an object".to_string(),
        ));
    };

    let Some(err_cd) = envelope.get("errCd") else {
        return Ok(());
    };

    let code = text_of(Some(err_cd));
    if code.is_empty() || code == "0" {
        return Ok(());
    }

    let message = text_of(envelope.get("errMsg"));
    if code == STALE_TOKEN_CODE {
        return Err(AptMapError::Auth { code, message });
    }
    Err(AptMapError::Api { code, message })
}
