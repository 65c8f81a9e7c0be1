//! Envelope parsing for the registry and trade response shapes

use aptmap_domain::{AptMapError, Result};
use serde_json::Value;

use crate::http::paging::Page;
use crate::integrations::value_util::{as_count, normalize_items, text_of};

/// Parse one page of the registry envelope.
///
/// Success is a `StanReginCd` key holding `[head, rows]`; a `RESULT` key
/// signals a classified failure; anything else is malformed.
pub(crate) fn parse_registry_page(decoded: &Value) -> Result<Page<Value>> {
    let Some(envelope) = decoded.as_object() else {
        return Err(malformed(decoded));
    };

    if let Some(sections) = envelope.get("StanReginCd") {
        let parts = sections.as_array().filter(|parts| parts.len() == 2).ok_or_else(|| {
            AptMapError::MalformedResponse(
                "registry envelope is not the [head, rows] pair".to_string(),
            )
        })?;

        let total_count = parts[0]
            .get("head")
            .and_then(Value::as_array)
            .and_then(|head| head.first())
            .and_then(|first| first.get("totalCount"))
            .and_then(as_count)
            .ok_or_else(|| {
                AptMapError::MalformedResponse("registry head carries no totalCount".to_string())
            })?;

        let items = normalize_items(parts[1].get("row"));
        return Ok(Page { items, total_count });
    }

    if let Some(result) = envelope.get("RESULT") {
        return Err(AptMapError::Api {
            code: text_of(result.get("resultCode")),
            message: text_of(result.get("resultMsg")),
        });
    }

    Err(malformed(decoded))
}

/// Parse one page of the trade envelope (`response.header.resultCode`).
pub(crate) fn parse_trade_page(decoded: &Value) -> Result<Page<Value>> {
    let header = decoded
        .get("response")
        .and_then(|response| response.get("header"))
        .ok_or_else(|| malformed(decoded))?;

    let code = text_of(header.get("resultCode"));
    if code != "000" {
        return Err(AptMapError::Api { code, message: text_of(header.get("resultMsg")) });
    }

    let body = decoded
        .get("response")
        .and_then(|response| response.get("body"))
        .ok_or_else(|| malformed(decoded))?;

    let items = normalize_items(body.get("items").and_then(|items| items.get("item")));
    let total_count = body.get("totalCount").and_then(as_count).unwrap_or(0);

    Ok(Page { items, total_count })
}

fn malformed(decoded: &Value) -> AptMapError {
    let mut shape = decoded.to_string();
    if shape.len() > 200 {
        shape.truncate(200);
        shape.push_str("...");
    }
    AptMapError::MalformedResponse(format!("unrecognized envelope: {shape}"))
}
