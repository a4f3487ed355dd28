//! Wire diagnostics with credential redaction.

use crate::transport::DebugCapture;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Tag names whose text content is replaced before a request is exposed,
/// paired with their placeholder.
const REDACTED_TAGS: [(&str, &str); 4] = [
    ("Username", "username"),
    ("Password", "password"),
    ("Customer", "customer"),
    ("Bestand", "data"),
];

/// Snapshot of the last request/response exchange on the SOAP transport.
///
/// The request XML is redacted; everything else is exposed as captured.
/// Recomputed on demand and not retained, so repeated calls without an
/// intervening operation return identical snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    /// Last request XML with credentials and binary payload redacted.
    pub last_request: Option<String>,
    pub last_request_headers: Option<String>,
    pub last_response: Option<String>,
    pub last_response_headers: Option<String>,
}

impl DebugInfo {
    pub(crate) fn from_capture(capture: &DebugCapture) -> Self {
        Self {
            last_request: capture
                .last_request_xml
                .as_deref()
                .map(clean_request),
            last_request_headers: capture.last_request_headers.clone(),
            last_response: capture.last_response_body.clone(),
            last_response_headers: capture.last_response_headers.clone(),
        }
    }
}

/// Redact a request XML string.
///
/// Replaces the text content of the first `Username`, `Password`,
/// `Customer` and `Bestand` element (matched by local tag name anywhere in
/// the document) with fixed placeholders. Diagnostics must never fail on a
/// malformed capture: an empty or unparseable input is returned unchanged.
pub fn clean_request(request: &str) -> String {
    if request.is_empty() {
        return request.to_string();
    }

    let mut root = match Element::parse(request.as_bytes()) {
        Ok(root) => root,
        Err(_) => return request.to_string(),
    };

    for (tag, placeholder) in REDACTED_TAGS {
        if let Some(element) = find_first_mut(&mut root, tag) {
            element.children = vec![XMLNode::Text(placeholder.to_string())];
        }
    }

    let mut buf = Vec::new();
    let config = EmitterConfig::new().write_document_declaration(true);
    match root.write_with_config(&mut buf, config) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => request.to_string(),
    }
}

/// Depth-first search for the first element with the given local name.
fn find_first_mut<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    if element.name == name {
        return Some(element);
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            if let Some(found) = find_first_mut(child, name) {
                return Some(found);
            }
        }
    }
    None
}
