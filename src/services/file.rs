//! Generic CRUD over file resources (photos, documents).
//!
//! Both file families speak the same protocol with different field
//! schemas, endpoints and transport quirks: list/show/add/update go over
//! raw XML POSTs, delete over a native SOAP call. One engine implements
//! the five operations; everything family-specific lives in a
//! [`FileSchema`] value.

use crate::client::Credentials;
use crate::config::EyeMoveConfig;
use crate::debug::DebugInfo;
use crate::envelope::compose_operation;
use crate::error::Result;
use crate::fields::{FieldMap, FieldValue};
use crate::response::{normalize_soap, normalize_xml, ResponseValue};
use crate::transport::{
    HttpTransport, SoapEndpoint, SoapTransport, UreqHttpTransport, UreqSoapTransport,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

/// How the family's `list` operation is shaped.
#[derive(Debug, Clone, Copy)]
pub struct ListCall {
    /// Operation element name (`List`, `GetAll`).
    pub operation: &'static str,
    /// Identifier element for the owning object, when the listing is keyed
    /// by object.
    pub object_id_tag: Option<&'static str>,
    /// Result element name in the response.
    pub result_key: &'static str,
}

/// Which identifier the family's `show` operation sends.
#[derive(Debug, Clone, Copy)]
pub enum ShowId {
    /// The owning object id, under the given tag.
    Object(&'static str),
    /// The file record id, under the given tag.
    Record(&'static str),
}

/// Everything that distinguishes one file family from another. Pure data;
/// the operations themselves are shared.
#[derive(Debug, Clone, Copy)]
pub struct FileSchema {
    /// Family name, for diagnostics.
    pub name: &'static str,
    /// Namespace and endpoint path for add/update and the SOAP delete.
    pub namespace: &'static str,
    pub endpoint_path: &'static str,
    /// Namespace and endpoint path for list/show. Families without a
    /// separate query service repeat the values above.
    pub query_namespace: &'static str,
    pub query_path: &'static str,
    /// Wrapper tag for the binary payload (`Fotobestand`,
    /// `WoningDocumentBestand`).
    pub file_wrapper_tag: &'static str,
    pub list: ListCall,
    pub show_id: ShowId,
}

/// Generic file-resource service: the five operations of the protocol,
/// parameterized by a [`FileSchema`].
///
/// One SOAP transport is created lazily on first use and cached for the
/// lifetime of the service; at most one in-flight call per instance is
/// supported. Callers wanting concurrency use separate instances.
pub struct FileService {
    schema: &'static FileSchema,
    credentials: Credentials,
    config: EyeMoveConfig,
    http: Box<dyn HttpTransport>,
    soap: Option<Box<dyn SoapTransport>>,
}

impl FileService {
    pub(crate) fn new(
        schema: &'static FileSchema,
        credentials: Credentials,
        config: EyeMoveConfig,
    ) -> Self {
        let http = Box::new(UreqHttpTransport::new(config.timeout()));
        Self {
            schema,
            credentials,
            config,
            http,
            soap: None,
        }
    }

    /// Construct with explicit transports. This is the seam tests and
    /// alternative HTTP stacks use.
    pub(crate) fn with_transports(
        schema: &'static FileSchema,
        credentials: Credentials,
        config: EyeMoveConfig,
        http: Box<dyn HttpTransport>,
        soap: Box<dyn SoapTransport>,
    ) -> Self {
        Self {
            schema,
            credentials,
            config,
            http,
            soap: Some(soap),
        }
    }

    /// List file records.
    pub fn list(&mut self, object_id: Option<i64>) -> Result<ResponseValue> {
        let identifier = self.schema.list.object_id_tag.zip(object_id);

        let xml = compose_operation(
            self.schema.query_namespace,
            self.schema.list.operation,
            &self.credentials,
            identifier,
            None,
        )?;

        debug!(family = self.schema.name, "list");
        let url = self.config.url(self.schema.query_path);
        let response = self.http.post_xml(&url, &xml)?;
        normalize_xml(&response.body, self.schema.list.result_key)
    }

    /// Show one file record.
    pub fn show(&mut self, object_id: i64, record_id: i64) -> Result<ResponseValue> {
        let identifier = match self.schema.show_id {
            ShowId::Object(tag) => (tag, object_id),
            ShowId::Record(tag) => (tag, record_id),
        };

        let xml = compose_operation(
            self.schema.query_namespace,
            "Get",
            &self.credentials,
            Some(identifier),
            None,
        )?;

        debug!(family = self.schema.name, object_id, record_id, "show");
        let url = self.config.url(self.schema.query_path);
        let response = self.http.post_xml(&url, &xml)?;
        normalize_xml(&response.body, "GetResult")
    }

    /// Add a file; returns the new record id.
    pub fn add(
        &mut self,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: FieldMap,
    ) -> Result<i64> {
        let fields = self.request_data(object_id, order, filename, file_data, options);
        let xml = compose_operation(
            self.schema.namespace,
            "Add",
            &self.credentials,
            None,
            Some(&fields),
        )?;

        debug!(family = self.schema.name, object_id, order, "add");
        let url = self.config.url(self.schema.endpoint_path);
        let response = self.http.post_xml(&url, &xml)?;
        normalize_xml(&response.body, "AddResult")?.into_int()
    }

    /// Update a file record; returns the service acknowledgement.
    pub fn update(
        &mut self,
        record_id: i64,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: FieldMap,
    ) -> Result<bool> {
        let fields = self.request_data(object_id, order, filename, file_data, options);
        let xml = compose_operation(
            self.schema.namespace,
            "Update",
            &self.credentials,
            Some(("RecID", record_id)),
            Some(&fields),
        )?;

        debug!(family = self.schema.name, record_id, object_id, "update");
        let url = self.config.url(self.schema.endpoint_path);
        let response = self.http.post_xml(&url, &xml)?;
        normalize_xml(&response.body, "UpdateResult")?.into_bool()
    }

    /// Delete a file record via the native SOAP path.
    pub fn delete(&mut self, record_id: i64) -> Result<bool> {
        let mut params = FieldMap::new();
        params.insert("RecID", record_id);

        debug!(family = self.schema.name, record_id, "delete");
        let response = self.soap_transport().call("Delete", &params)?;
        normalize_soap(&response, "DeleteResult")?.into_bool()
    }

    /// Diagnostics for the last SOAP-path call, with credentials and the
    /// binary payload redacted.
    pub fn debug_info(&mut self) -> DebugInfo {
        DebugInfo::from_capture(self.soap_transport().capture())
    }

    /// The request data for add/update: required fields first, then the
    /// family's present optional fields. The binary payload is
    /// base64-encoded here, before any XML serialization.
    fn request_data(
        &self,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: FieldMap,
    ) -> FieldMap {
        let mut file = FieldMap::new();
        file.insert("Bestandsnaam", filename);
        file.insert("Bestand", BASE64.encode(file_data));

        let mut fields = FieldMap::new();
        fields.insert("WoningID", object_id);
        fields.insert("Volgorde", order);
        fields.insert(self.schema.file_wrapper_tag, FieldValue::Map(file));
        fields.extend(options);
        fields
    }

    /// Get-or-create the cached SOAP transport.
    fn soap_transport(&mut self) -> &mut dyn SoapTransport {
        let endpoint = SoapEndpoint {
            url: self.config.url(self.schema.endpoint_path),
            namespace: self.schema.namespace.to_string(),
        };
        let credentials = self.credentials.clone();
        let timeout = self.config.timeout();
        self.soap
            .get_or_insert_with(|| Box::new(UreqSoapTransport::new(endpoint, credentials, timeout)))
            .as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EyeMoveError;
    use crate::services::photo::PHOTO_SCHEMA;
    use crate::transport::{DebugCapture, HttpResponse};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct MockHttp {
        requests: Rc<RefCell<Vec<(String, String)>>>,
        response: String,
    }

    impl HttpTransport for MockHttp {
        fn post_xml(&mut self, url: &str, body: &str) -> Result<HttpResponse> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), body.to_string()));
            Ok(HttpResponse {
                body: self.response.clone(),
                headers: vec![("Content-Type".to_string(), "text/xml".to_string())],
            })
        }
    }

    struct MockSoap {
        calls: Rc<RefCell<Vec<(String, FieldMap)>>>,
        response: Value,
        capture: DebugCapture,
    }

    impl SoapTransport for MockSoap {
        fn call(&mut self, method: &str, params: &FieldMap) -> Result<Value> {
            self.calls
                .borrow_mut()
                .push((method.to_string(), params.clone()));
            self.capture.last_request_xml =
                Some("<Envelope><Username>u</Username></Envelope>".to_string());
            Ok(self.response.clone())
        }

        fn capture(&self) -> &DebugCapture {
            &self.capture
        }
    }

    fn service(http_response: &str, soap_response: Value) -> (FileService, Rc<RefCell<Vec<(String, String)>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let http = MockHttp {
            requests: Rc::clone(&requests),
            response: http_response.to_string(),
        };
        let soap = MockSoap {
            calls: Rc::new(RefCell::new(Vec::new())),
            response: soap_response,
            capture: DebugCapture::default(),
        };
        let service = FileService::with_transports(
            &PHOTO_SCHEMA,
            Credentials::new("u", "p", "c"),
            EyeMoveConfig::default(),
            Box::new(http),
            Box::new(soap),
        );
        (service, requests)
    }

    fn success_response(result_key: &str, resultaat: &str) -> String {
        format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <Response xmlns="http://ws.eye-move.nl/Foto">
      <{key}><Resultaat>{val}</Resultaat></{key}>
    </Response>
  </soap:Body>
</soap:Envelope>"#,
            key = result_key,
            val = resultaat
        )
    }

    #[test]
    fn test_add_posts_envelope_and_returns_id() {
        let (mut service, requests) = service(&success_response("AddResult", "321"), Value::Null);

        let id = service
            .add(12, 1, "a.jpg", b"bytes", FieldMap::new())
            .unwrap();
        assert_eq!(id, 321);

        let requests = requests.borrow();
        let (url, body) = &requests[0];
        assert_eq!(url, "https://ws.eye-move.nl/foto.asmx");
        assert!(body.contains(r#"xmlns:ns1="http://ws.eye-move.nl/Foto""#));
        assert!(body.contains("<ns1:Add>"));
        assert!(body.contains("<ns1:Gegevens>"));
        assert!(body.contains("<ns1:WoningID>12</ns1:WoningID>"));
        assert!(body.contains("<ns1:Volgorde>1</ns1:Volgorde>"));
        assert!(body.contains("<ns1:Bestandsnaam>a.jpg</ns1:Bestandsnaam>"));
        assert!(body.contains(&format!("<ns1:Bestand>{}</ns1:Bestand>", BASE64.encode(b"bytes"))));
        assert!(!body.contains("RecID"));
    }

    #[test]
    fn test_update_sends_record_id_before_data() {
        let (mut service, requests) =
            service(&success_response("UpdateResult", "true"), Value::Null);

        let ok = service
            .update(7, 12, 1, "a.jpg", b"bytes", FieldMap::new())
            .unwrap();
        assert!(ok);

        let requests = requests.borrow();
        let (_, body) = &requests[0];
        let rec_id = body.find("<ns1:RecID>7</ns1:RecID>").unwrap();
        let data = body.find("<ns1:Gegevens>").unwrap();
        assert!(rec_id < data);
    }

    #[test]
    fn test_list_uses_query_endpoint() {
        let (mut service, requests) = service(&success_response("ListResult", "abc"), Value::Null);

        let result = service.list(None).unwrap();
        assert_eq!(result, ResponseValue::Text("abc".to_string()));

        let requests = requests.borrow();
        let (url, body) = &requests[0];
        assert_eq!(url, "https://ws.eye-move.nl/fotos.asmx");
        assert!(body.contains("<ns1:List"));
        assert!(!body.contains("WoningID"));
    }

    #[test]
    fn test_show_sends_object_id_for_photos() {
        let (mut service, requests) = service(&success_response("GetResult", "abc"), Value::Null);

        service.show(12, 999).unwrap();

        let requests = requests.borrow();
        let (_, body) = &requests[0];
        // The photo family keys `show` by owning object, not record.
        assert!(body.contains("<ns1:WoningID>12</ns1:WoningID>"));
        assert!(!body.contains("999"));
    }

    #[test]
    fn test_delete_goes_over_soap() {
        let soap_response = json!({
            "DeleteResult": {"Succeeded": "true", "Resultaat": "true"}
        });
        let (mut service, requests) = service("unused", soap_response);

        let ok = service.delete(55).unwrap();
        assert!(ok);
        assert!(requests.borrow().is_empty());
    }

    #[test]
    fn test_failure_response_propagates_errors() {
        let body = r#"<Envelope><AddResult>
            <Resultaat></Resultaat>
            <Errors><string>object not found</string></Errors>
        </AddResult></Envelope>"#;
        let (mut service, _) = service(body, Value::Null);

        let err = service
            .add(12, 1, "a.jpg", b"bytes", FieldMap::new())
            .unwrap_err();
        assert_eq!(
            err.request_errors(),
            Some(&["object not found".to_string()][..])
        );
    }

    #[test]
    fn test_transport_error_propagates_unmodified() {
        struct FailingHttp;
        impl HttpTransport for FailingHttp {
            fn post_xml(&mut self, _: &str, _: &str) -> Result<HttpResponse> {
                Err(EyeMoveError::Transport("connection refused".to_string()))
            }
        }
        let soap = MockSoap {
            calls: Rc::new(RefCell::new(Vec::new())),
            response: Value::Null,
            capture: DebugCapture::default(),
        };
        let mut service = FileService::with_transports(
            &PHOTO_SCHEMA,
            Credentials::new("u", "p", "c"),
            EyeMoveConfig::default(),
            Box::new(FailingHttp),
            Box::new(soap),
        );

        let err = service.list(None).unwrap_err();
        assert!(matches!(err, EyeMoveError::Transport(_)));
    }

    #[test]
    fn test_debug_info_is_stable_between_operations() {
        let soap_response = json!({
            "DeleteResult": {"Succeeded": "true", "Resultaat": "true"}
        });
        let (mut service, _) = service("unused", soap_response);

        service.delete(55).unwrap();
        let first = service.debug_info();
        let second = service.debug_info();
        assert_eq!(first, second);
        assert!(first.last_request.unwrap().contains("username"));
    }
}
