//! Response body decoding
//!
//! The registry and trade services declare JSON but fall back to XML bodies
//! for some error paths, and the trade endpoint ships XML outright. Decoding
//! is therefore two-staged: a JSON parse first, then an XML parse converted
//! into the same nested-map shape. When both fail the body is surfaced as a
//! transport error carrying both parse failures, never as an empty success.
//!
//! XML conversion rules (matching the conventional record-oriented mapping):
//! - element with children → object of child name → value
//! - repeated sibling tags → array, in document order
//! - attributes → `"@name"` keys
//! - text inside a mixed element → `"#text"`
//! - text-only element → string; empty element → null

use aptmap_domain::{AptMapError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Decode a raw response body into a structured value.
pub fn decode_response(body: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(value),
        Err(json_err) => match xml_to_value(body) {
            Ok(value) => Ok(value),
            Err(xml_err) => Err(AptMapError::Network(format!(
                "undecodable response body (json: {json_err}; xml: {xml_err})"
            ))),
        },
    }
}

type XmlFrame = (String, Map<String, Value>, String);

fn xml_to_value(body: &str) -> std::result::Result<Value, String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    // A virtual root frame collects the document element.
    let mut stack: Vec<XmlFrame> = vec![(String::new(), Map::new(), String::new())];

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let mut children = Map::new();
                for attr in start.attributes() {
                    let attr = attr.map_err(|e| e.to_string())?;
                    let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
                    let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
                    children.insert(key, Value::String(value));
                }
                stack.push((name, children, String::new()));
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                let top = stack.last_mut().ok_or("unbalanced document")?;
                insert_child(&mut top.1, name, Value::Null);
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(|e| e.to_string())?;
                let top = stack.last_mut().ok_or("unbalanced document")?;
                top.2.push_str(&unescaped);
            }
            Event::CData(cdata) => {
                let raw = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                let top = stack.last_mut().ok_or("unbalanced document")?;
                top.2.push_str(&raw);
            }
            Event::End(_) => {
                let (name, mut children, text) = stack.pop().ok_or("unbalanced document")?;
                let value = if children.is_empty() {
                    if text.is_empty() {
                        Value::Null
                    } else {
                        Value::String(text)
                    }
                } else {
                    if !text.is_empty() {
                        children.insert("#text".to_string(), Value::String(text));
                    }
                    Value::Object(children)
                };
                let parent = stack.last_mut().ok_or("unbalanced document")?;
                insert_child(&mut parent.1, name, value);
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no data
            _ => {}
        }
    }

    let (_, root, _) = stack.pop().ok_or("unbalanced document")?;
    if !stack.is_empty() {
        return Err("unbalanced document".to_string());
    }
    if root.is_empty() {
        return Err("no document element".to_string());
    }
    Ok(Value::Object(root))
}

fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}
