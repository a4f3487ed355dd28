//! Response normalization.
//!
//! The web service answers over two transports with different shapes: the
//! native SOAP path yields a structured mapping, the XML-over-HTTP path a
//! raw document. Both are reduced here to one uniform model: `Ok` with the
//! result payload, or [`EyeMoveError::RequestFailed`] carrying the
//! service's error strings. A response that lacks the expected result key
//! or element is a protocol mismatch and fails loudly with
//! [`EyeMoveError::MissingResult`].

use crate::error::{EyeMoveError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;

/// Normalized result payload.
///
/// The XML path coerces the result text (`add` ids become integers,
/// `"true"` becomes a boolean); the SOAP path passes the structured
/// `Resultaat` value through untouched as [`ResponseValue::Data`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Int(i64),
    Bool(bool),
    Text(String),
    Data(Value),
}

impl ResponseValue {
    /// Interpret the payload as a record id.
    pub fn into_int(self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(n),
            Self::Data(Value::Number(ref n)) if n.is_i64() => Ok(n.as_i64().unwrap_or_default()),
            Self::Data(Value::String(ref s)) if s.parse::<i64>().is_ok() => {
                Ok(s.parse().unwrap_or_default())
            }
            other => Err(other.type_error("integer")),
        }
    }

    /// Interpret the payload as an acknowledgement flag.
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(b),
            Self::Text(ref s) if s == "true" || s == "false" => Ok(s == "true"),
            Self::Data(Value::Bool(b)) => Ok(b),
            Self::Data(Value::String(ref s)) if s == "true" || s == "false" => Ok(s == "true"),
            other => Err(other.type_error("boolean")),
        }
    }

    /// Interpret the payload as a structured listing value.
    pub fn into_data(self) -> Result<Value> {
        match self {
            Self::Data(value) => Ok(value),
            Self::Int(n) => Ok(Value::from(n)),
            Self::Bool(b) => Ok(Value::from(b)),
            Self::Text(s) => Ok(Value::from(s)),
        }
    }

    fn type_error(&self, expected: &'static str) -> EyeMoveError {
        EyeMoveError::UnexpectedResultType {
            expected,
            actual: format!("{:?}", self),
        }
    }
}

/// Normalize a structured SOAP response.
///
/// Looks up `result_key` in the response mapping; a falsy `Succeeded` flag
/// turns the mapping's `Errors` into a [`EyeMoveError::RequestFailed`],
/// otherwise the `Resultaat` value is returned as-is.
pub fn normalize_soap(response: &Value, result_key: &str) -> Result<ResponseValue> {
    let result = response
        .get(result_key)
        .ok_or_else(|| EyeMoveError::MissingResult(result_key.to_string()))?;

    if !is_truthy(result.get("Succeeded")) {
        return Err(EyeMoveError::RequestFailed {
            errors: error_strings(result.get("Errors")),
        });
    }

    Ok(ResponseValue::Data(
        result.get("Resultaat").cloned().unwrap_or(Value::Null),
    ))
}

/// Truthiness of the `Succeeded` flag.
///
/// The SOAP transport produces string leaves, so `"false"`, `"0"` and the
/// empty string count as falsy next to JSON `false`/`null`/`0`.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Flatten an `Errors` value into a list of strings.
///
/// SOAP serializers wrap repeated strings in a container element, so
/// arrays and objects are flattened recursively in document order.
fn error_strings(value: Option<&Value>) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(value) = value {
        collect_error_strings(value, &mut errors);
    }
    errors
}

fn collect_error_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => {
            for item in items {
                collect_error_strings(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_error_strings(item, out);
            }
        }
    }
}

/// Normalize a raw XML response body.
///
/// Locates the first element named `result_element`, reads its `Resultaat`
/// text and, when present, the children of its `Errors` container. An
/// `Errors` container is a failure even when empty; the service should not
/// produce that shape, but the behavior is kept as observed.
pub fn normalize_xml(body: &str, result_element: &str) -> Result<ResponseValue> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    // Depth inside the result element; 0 means outside.
    let mut in_result = 0usize;
    let mut seen_result = false;

    let mut resultaat: Option<String> = None;
    let mut in_resultaat = 0usize;

    let mut errors: Option<Vec<String>> = None;
    let mut in_errors = 0usize;
    let mut current_error: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = local_name(e);
                if in_result == 0 {
                    if !seen_result && name == result_element {
                        seen_result = true;
                        in_result = 1;
                    }
                } else {
                    in_result += 1;
                    if in_resultaat > 0 {
                        in_resultaat += 1;
                    } else if in_errors > 0 {
                        if in_errors == 1 {
                            current_error = Some(String::new());
                        }
                        in_errors += 1;
                    } else if name == "Resultaat" && resultaat.is_none() {
                        in_resultaat = 1;
                        resultaat = Some(String::new());
                    } else if name == "Errors" && errors.is_none() {
                        in_errors = 1;
                        errors = Some(Vec::new());
                    }
                }
            }

            Event::Empty(ref e) => {
                let name = local_name(e);
                if in_result == 0 {
                    if !seen_result && name == result_element {
                        // Self-closing result element: nothing inside.
                        seen_result = true;
                        break;
                    }
                } else if in_resultaat > 0 {
                    // Empty nested element contributes no text.
                } else if in_errors == 1 {
                    if let Some(list) = errors.as_mut() {
                        list.push(String::new());
                    }
                } else if in_errors == 0 && name == "Resultaat" && resultaat.is_none() {
                    resultaat = Some(String::new());
                } else if in_errors == 0 && name == "Errors" && errors.is_none() {
                    errors = Some(Vec::new());
                }
            }

            Event::End(_) => {
                if in_result > 0 {
                    if in_resultaat > 0 {
                        in_resultaat -= 1;
                    } else if in_errors > 0 {
                        in_errors -= 1;
                        if in_errors == 1 {
                            if let (Some(err), Some(list)) =
                                (current_error.take(), errors.as_mut())
                            {
                                list.push(err);
                            }
                        }
                    }
                    in_result -= 1;
                    if in_result == 0 {
                        break;
                    }
                }
            }

            Event::Text(ref t) => {
                let text = t.decode().map_err(quick_xml::Error::Encoding)?;
                if in_resultaat > 0 {
                    if let Some(buf) = resultaat.as_mut() {
                        buf.push_str(&text);
                    }
                } else if let Some(err) = current_error.as_mut() {
                    err.push_str(&text);
                }
            }

            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if in_resultaat > 0 {
                    if let Some(buf) = resultaat.as_mut() {
                        buf.push_str(&text);
                    }
                } else if let Some(err) = current_error.as_mut() {
                    err.push_str(&text);
                }
            }

            Event::Eof => break,

            _ => {}
        }
    }

    if !seen_result {
        return Err(EyeMoveError::MissingResult(result_element.to_string()));
    }

    if let Some(errors) = errors {
        return Err(EyeMoveError::RequestFailed { errors });
    }

    let text = resultaat.ok_or_else(|| EyeMoveError::MissingResult("Resultaat".to_string()))?;
    Ok(coerce(&text))
}

/// Coerce a result text: numeric strings become integers (floats truncate
/// toward zero), the literal `"true"` becomes a boolean, anything else
/// passes through as text.
fn coerce(text: &str) -> ResponseValue {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return ResponseValue::Int(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return ResponseValue::Int(f as i64);
        }
    }
    if trimmed == "true" {
        return ResponseValue::Bool(true);
    }
    ResponseValue::Text(text.to_string())
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}
