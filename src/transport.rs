//! Transport collaborators.
//!
//! Two boundaries exist between the client and the wire: a native SOAP
//! call (method name plus parameters, answered with a structured mapping)
//! and a raw XML POST (pre-composed body, answered with the response text).
//! Both are traits so that tests and alternative HTTP stacks can slot in;
//! the default implementations are blocking `ureq` callers.

use crate::client::Credentials;
use crate::envelope::compose_call;
use crate::error::{EyeMoveError, Result};
use crate::fields::FieldMap;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use ureq::Agent;
use xmltree::Element;

/// A raw HTTP response: body text plus response headers.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: String,
    pub headers: Vec<(String, String)>,
}

/// Wire diagnostics recorded by a SOAP transport across its last call.
///
/// The request XML is stored unredacted; redaction happens when a
/// [`DebugInfo`](crate::debug::DebugInfo) snapshot is derived from it.
#[derive(Debug, Clone, Default)]
pub struct DebugCapture {
    pub last_request_xml: Option<String>,
    pub last_request_headers: Option<String>,
    pub last_response_body: Option<String>,
    pub last_response_headers: Option<String>,
}

/// A native SOAP endpoint: service URL plus header/data namespace.
#[derive(Debug, Clone)]
pub struct SoapEndpoint {
    pub url: String,
    pub namespace: String,
}

/// Executes native SOAP calls against one endpoint.
pub trait SoapTransport {
    /// Invoke `method` with a single parameter mapping. Returns the
    /// response body content as a structured mapping keyed by element
    /// name, or a transport-level error.
    fn call(&mut self, method: &str, params: &FieldMap) -> Result<Value>;

    /// Diagnostics recorded for the last call.
    fn capture(&self) -> &DebugCapture;
}

/// Posts pre-composed XML bodies.
pub trait HttpTransport {
    fn post_xml(&mut self, url: &str, body: &str) -> Result<HttpResponse>;
}

/// Blocking SOAP transport over `ureq`.
pub struct UreqSoapTransport {
    endpoint: SoapEndpoint,
    credentials: Credentials,
    timeout: Duration,
    capture: DebugCapture,
}

impl UreqSoapTransport {
    pub fn new(endpoint: SoapEndpoint, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            endpoint,
            credentials,
            timeout,
            capture: DebugCapture::default(),
        }
    }
}

impl SoapTransport for UreqSoapTransport {
    fn call(&mut self, method: &str, params: &FieldMap) -> Result<Value> {
        let xml = compose_call(&self.endpoint.namespace, method, &self.credentials, params)?;
        let action = format!(
            "{}/{}",
            self.endpoint.namespace.trim_end_matches('/'),
            method
        );

        debug!(method, url = %self.endpoint.url, "SOAP call");

        self.capture.last_request_xml = Some(xml.clone());
        self.capture.last_request_headers = Some(format!(
            "POST {} HTTP/1.1\r\nContent-Type: text/xml; charset=utf-8\r\nSOAPAction: \"{}\"\r\n",
            self.endpoint.url, action
        ));
        self.capture.last_response_body = None;
        self.capture.last_response_headers = None;

        let agent = make_agent(self.timeout);
        let mut response = agent
            .post(&self.endpoint.url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", &format!("\"{}\"", action))
            .send(xml)
            .map_err(|e| EyeMoveError::Transport(e.to_string()))?;

        let headers = format_response_headers(&response);
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| EyeMoveError::Transport(e.to_string()))?;

        self.capture.last_response_body = Some(body.clone());
        self.capture.last_response_headers = Some(headers);

        parse_soap_body(&body)
    }

    fn capture(&self) -> &DebugCapture {
        &self.capture
    }
}

/// Blocking XML-POST transport over `ureq`.
///
/// A fresh agent is configured per call; the transport itself carries no
/// connection state.
pub struct UreqHttpTransport {
    timeout: Duration,
}

impl UreqHttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl HttpTransport for UreqHttpTransport {
    fn post_xml(&mut self, url: &str, body: &str) -> Result<HttpResponse> {
        debug!(url, bytes = body.len(), "POST XML");

        let agent = make_agent(self.timeout);
        let mut response = agent
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .send(body)
            .map_err(|e| EyeMoveError::Transport(e.to_string()))?;

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| EyeMoveError::Transport(e.to_string()))?;

        Ok(HttpResponse { body, headers })
    }
}

/// Agent with the configured timeout that does not turn 4xx/5xx statuses
/// into errors, so SOAP fault bodies remain readable.
fn make_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

fn format_response_headers(response: &ureq::http::Response<ureq::Body>) -> String {
    let mut out = format!("{:?} {}\r\n", response.version(), response.status());
    for (name, value) in response.headers() {
        out.push_str(&format!(
            "{}: {}\r\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
    out
}

/// Parse a SOAP response body into a mapping of the response element's
/// children, keyed by local element name.
///
/// A `Fault` body surfaces as a transport-level error, mirroring how a
/// WSDL-backed client would raise it before any result processing.
pub(crate) fn parse_soap_body(body: &str) -> Result<Value> {
    let root = Element::parse(body.as_bytes())?;

    let body_element = root
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|e| e.name == "Body")
        .ok_or_else(|| EyeMoveError::MissingResult("Body".to_string()))?;

    let response_element = body_element
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .next()
        .ok_or_else(|| EyeMoveError::MissingResult("response element".to_string()))?;

    if response_element.name == "Fault" {
        let fault_string = response_element
            .get_child("faultstring")
            .and_then(|e| e.get_text())
            .map(|t| t.into_owned())
            .unwrap_or_else(|| "SOAP fault".to_string());
        return Err(EyeMoveError::Transport(fault_string));
    }

    Ok(element_to_value(response_element))
}

/// Convert an element subtree into a JSON-like value: leaves become their
/// text, branches become objects, repeated names become arrays.
fn element_to_value(element: &Element) -> Value {
    let children: Vec<&Element> = element
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .collect();

    if children.is_empty() {
        return Value::String(
            element
                .get_text()
                .map(|t| t.into_owned())
                .unwrap_or_default(),
        );
    }

    let mut map = Map::new();
    for child in children {
        let value = element_to_value(child);
        match map.get_mut(&child.name) {
            None => {
                map.insert(child.name.clone(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_soap_body_maps_result() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <DeleteResponse xmlns="http://ws.eye-move.nl/Foto">
      <DeleteResult>
        <Succeeded>true</Succeeded>
        <Resultaat>true</Resultaat>
      </DeleteResult>
    </DeleteResponse>
  </soap:Body>
</soap:Envelope>"#;

        let value = parse_soap_body(body).unwrap();
        assert_eq!(
            value,
            json!({
                "DeleteResult": {
                    "Succeeded": "true",
                    "Resultaat": "true",
                }
            })
        );
    }

    #[test]
    fn test_parse_soap_body_repeated_elements_become_array() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <RetrieveResponse xmlns="http://ws.eye-move.nl/Objecten">
      <RetrieveResult>
        <Succeeded>true</Succeeded>
        <Resultaat>
          <Woning>11</Woning>
          <Woning>12</Woning>
        </Resultaat>
      </RetrieveResult>
    </RetrieveResponse>
  </soap:Body>
</soap:Envelope>"#;

        let value = parse_soap_body(body).unwrap();
        assert_eq!(
            value["RetrieveResult"]["Resultaat"]["Woning"],
            json!(["11", "12"])
        );
    }

    #[test]
    fn test_parse_soap_body_fault_is_transport_error() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Unable to process request</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

        let err = parse_soap_body(body).unwrap_err();
        assert!(matches!(
            err,
            EyeMoveError::Transport(ref msg) if msg == "Unable to process request"
        ));
    }

    #[test]
    fn test_parse_soap_body_without_body_is_protocol_mismatch() {
        let body = r#"<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/"></Envelope>"#;
        let err = parse_soap_body(body).unwrap_err();
        assert!(matches!(err, EyeMoveError::MissingResult(ref k) if k == "Body"));
    }
}
