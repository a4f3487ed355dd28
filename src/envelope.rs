//! Request envelope composition.
//!
//! Every call to the web service, over either transport, is wrapped in a
//! `SOAP-ENV:Envelope` whose header carries the authentication credentials
//! and whose body holds exactly one operation element. The body shape is
//! fixed by the operation at composition time:
//!
//! - `list`: an empty operation element, or one holding only the owning
//!   object id for families keyed by object;
//! - `show`: the operation element holding a single identifier element;
//! - `add`: the operation element holding one nested `Gegevens` data
//!   element;
//! - `update`: the identifier element first, then `Gegevens`.

use crate::client::Credentials;
use crate::error::Result;
use crate::fields::{write_fields, FieldMap};
use xmltree::{Element, EmitterConfig, XMLNode};

/// SOAP envelope namespace.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Prefix used for the envelope elements.
const ENV_PREFIX: &str = "SOAP-ENV";

/// Prefix used for data elements, bound to the resource family namespace.
const DATA_PREFIX: &str = "ns1";

/// Compose an envelope for one file-resource operation.
///
/// `namespace` is the resource family namespace bound to the data prefix,
/// `operation` the operation element name (`List`, `GetAll`, `Get`, `Add`,
/// `Update`). `identifier` is appended first when present; `data` becomes
/// a nested `Gegevens` element populated from the field map.
pub fn compose_operation(
    namespace: &str,
    operation: &str,
    credentials: &Credentials,
    identifier: Option<(&str, i64)>,
    data: Option<&FieldMap>,
) -> Result<String> {
    let mut body = Element::new(&format!("{}:Body", ENV_PREFIX));
    let mut op = Element::new(&format!("{}:{}", DATA_PREFIX, operation));

    if let Some((tag, id)) = identifier {
        op.children.push(XMLNode::Element(text_element(tag, &id.to_string())));
    }

    if let Some(fields) = data {
        let mut gegevens = Element::new(&format!("{}:Gegevens", DATA_PREFIX));
        write_fields(&mut gegevens, fields, &format!("{}:", DATA_PREFIX));
        op.children.push(XMLNode::Element(gegevens));
    }

    body.children.push(XMLNode::Element(op));

    write_envelope(namespace, credentials, body)
}

/// Compose an envelope for a native SOAP method call.
///
/// The body holds one element named after the method, with one child per
/// parameter field.
pub fn compose_call(
    namespace: &str,
    method: &str,
    credentials: &Credentials,
    params: &FieldMap,
) -> Result<String> {
    let mut body = Element::new(&format!("{}:Body", ENV_PREFIX));
    let mut op = Element::new(&format!("{}:{}", DATA_PREFIX, method));
    write_fields(&mut op, params, &format!("{}:", DATA_PREFIX));
    body.children.push(XMLNode::Element(op));

    write_envelope(namespace, credentials, body)
}

/// Assemble the envelope root with the auth header and the given body, and
/// serialize it with an XML declaration.
fn write_envelope(namespace: &str, credentials: &Credentials, body: Element) -> Result<String> {
    let mut envelope = Element::new(&format!("{}:Envelope", ENV_PREFIX));
    envelope.attributes.insert(
        format!("xmlns:{}", ENV_PREFIX),
        SOAP_ENV_NS.to_string(),
    );
    envelope
        .attributes
        .insert(format!("xmlns:{}", DATA_PREFIX), namespace.to_string());

    envelope
        .children
        .push(XMLNode::Element(auth_header(credentials)));
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new().write_document_declaration(true);
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// The `SOAP-ENV:Header` element holding the `ns1:AuthHeader` credentials.
fn auth_header(credentials: &Credentials) -> Element {
    let mut fields = FieldMap::new();
    fields.insert("Username", credentials.username());
    fields.insert("Password", credentials.password());
    fields.insert("Customer", credentials.customer());

    let mut auth = Element::new(&format!("{}:AuthHeader", DATA_PREFIX));
    write_fields(&mut auth, &fields, &format!("{}:", DATA_PREFIX));

    let mut header = Element::new(&format!("{}:Header", ENV_PREFIX));
    header.children.push(XMLNode::Element(auth));
    header
}

fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(&format!("{}:{}", DATA_PREFIX, name));
    element.children.push(XMLNode::Text(text.to_string()));
    element
}
