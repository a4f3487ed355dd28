//! Object (property listing) service.
//!
//! Objects are read-only and speak native SOAP exclusively. Two endpoints
//! are involved: a collection service for listing and a single-object
//! service for retrieval by record id, each with its own namespace.

use crate::client::Credentials;
use crate::config::EyeMoveConfig;
use crate::debug::DebugInfo;
use crate::error::Result;
use crate::fields::FieldMap;
use crate::response::normalize_soap;
use crate::transport::{SoapEndpoint, SoapTransport, UreqSoapTransport};
use serde_json::Value;
use tracing::debug;

/// Which of the two object endpoints a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectEndpoint {
    /// `/object.asmx`, retrieval of one object by record id.
    Single,
    /// `/objecten.asmx`, the full listing.
    Collection,
}

impl ObjectEndpoint {
    fn path(self) -> &'static str {
        match self {
            ObjectEndpoint::Single => "/object.asmx",
            ObjectEndpoint::Collection => "/objecten.asmx",
        }
    }

    fn namespace(self) -> &'static str {
        match self {
            ObjectEndpoint::Single => "http://ws.eye-move.nl/Object",
            ObjectEndpoint::Collection => "http://ws.eye-move.nl/Objecten",
        }
    }
}

/// Service for property objects.
///
/// One SOAP transport per endpoint, created lazily on first use and cached
/// for the lifetime of the service.
pub struct ObjectService {
    credentials: Credentials,
    config: EyeMoveConfig,
    single: Option<Box<dyn SoapTransport>>,
    collection: Option<Box<dyn SoapTransport>>,
}

impl ObjectService {
    pub(crate) fn new(credentials: Credentials, config: EyeMoveConfig) -> Self {
        Self {
            credentials,
            config,
            single: None,
            collection: None,
        }
    }

    /// Construct with explicit transports (tests, alternative stacks).
    pub fn with_transports(
        credentials: Credentials,
        config: EyeMoveConfig,
        single: Box<dyn SoapTransport>,
        collection: Box<dyn SoapTransport>,
    ) -> Self {
        Self {
            credentials,
            config,
            single: Some(single),
            collection: Some(collection),
        }
    }

    /// List all objects of the customer.
    pub fn list(&mut self) -> Result<Value> {
        debug!("object list");
        let params = FieldMap::new();
        let response = self
            .transport(ObjectEndpoint::Collection)
            .call("Retrieve", &params)?;
        normalize_soap(&response, "RetrieveResult")?.into_data()
    }

    /// Retrieve one object by record id.
    pub fn show(&mut self, record_id: i64) -> Result<Value> {
        debug!(record_id, "object show");
        let mut params = FieldMap::new();
        params.insert("RecID", record_id);
        let response = self
            .transport(ObjectEndpoint::Single)
            .call("Retrieve", &params)?;
        normalize_soap(&response, "RetrieveResult")?.into_data()
    }

    /// Redacted diagnostics for the last listing call.
    pub fn debug_info(&mut self) -> DebugInfo {
        DebugInfo::from_capture(self.transport(ObjectEndpoint::Collection).capture())
    }

    /// Get-or-create the cached transport for one endpoint.
    fn transport(&mut self, endpoint: ObjectEndpoint) -> &mut dyn SoapTransport {
        let soap_endpoint = SoapEndpoint {
            url: self.config.url(endpoint.path()),
            namespace: endpoint.namespace().to_string(),
        };
        let credentials = self.credentials.clone();
        let timeout = self.config.timeout();
        let slot = match endpoint {
            ObjectEndpoint::Single => &mut self.single,
            ObjectEndpoint::Collection => &mut self.collection,
        };
        slot.get_or_insert_with(|| {
            Box::new(UreqSoapTransport::new(soap_endpoint, credentials, timeout))
        })
        .as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EyeMoveError;
    use crate::transport::DebugCapture;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct MockSoap {
        calls: Rc<RefCell<Vec<(String, FieldMap)>>>,
        response: Value,
        capture: DebugCapture,
    }

    impl MockSoap {
        fn new(response: Value) -> (Self, Rc<RefCell<Vec<(String, FieldMap)>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    calls: Rc::clone(&calls),
                    response,
                    capture: DebugCapture::default(),
                },
                calls,
            )
        }
    }

    impl SoapTransport for MockSoap {
        fn call(&mut self, method: &str, params: &FieldMap) -> Result<Value> {
            self.calls
                .borrow_mut()
                .push((method.to_string(), params.clone()));
            Ok(self.response.clone())
        }

        fn capture(&self) -> &DebugCapture {
            &self.capture
        }
    }

    fn service(
        single_response: Value,
        collection_response: Value,
    ) -> (
        ObjectService,
        Rc<RefCell<Vec<(String, FieldMap)>>>,
        Rc<RefCell<Vec<(String, FieldMap)>>>,
    ) {
        let (single, single_calls) = MockSoap::new(single_response);
        let (collection, collection_calls) = MockSoap::new(collection_response);
        let service = ObjectService::with_transports(
            Credentials::new("u", "p", "c"),
            EyeMoveConfig::default(),
            Box::new(single),
            Box::new(collection),
        );
        (service, single_calls, collection_calls)
    }

    #[test]
    fn test_list_retrieves_from_collection_endpoint() {
        let response = json!({
            "RetrieveResult": {
                "Succeeded": "true",
                "Resultaat": {"Woning": ["11", "12"]}
            }
        });
        let (mut service, single_calls, collection_calls) = service(Value::Null, response);

        let data = service.list().unwrap();
        assert_eq!(data["Woning"], json!(["11", "12"]));

        assert!(single_calls.borrow().is_empty());
        let calls = collection_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Retrieve");
        assert!(calls[0].1.is_empty());
    }

    #[test]
    fn test_show_sends_record_id_to_single_endpoint() {
        let response = json!({
            "RetrieveResult": {
                "Succeeded": "true",
                "Resultaat": {"RecID": "42", "Adres": "Main St 1"}
            }
        });
        let (mut service, single_calls, collection_calls) = service(response, Value::Null);

        let data = service.show(42).unwrap();
        assert_eq!(data["Adres"], json!("Main St 1"));

        assert!(collection_calls.borrow().is_empty());
        let calls = single_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Retrieve");
        let params: Vec<(&str, String)> = calls[0]
            .1
            .iter()
            .map(|(name, value)| (name, value.as_text().unwrap()))
            .collect();
        assert_eq!(params, vec![("RecID", "42".to_string())]);
    }

    #[test]
    fn test_failed_retrieve_surfaces_errors() {
        let response = json!({
            "RetrieveResult": {
                "Succeeded": "false",
                "Errors": {"string": "unknown object"}
            }
        });
        let (mut service, _, _) = service(response, Value::Null);

        let err = service.show(1).unwrap_err();
        assert_eq!(
            err.request_errors(),
            Some(&["unknown object".to_string()][..])
        );
    }

    #[test]
    fn test_missing_result_key_is_protocol_mismatch() {
        let (mut service, _, _) = service(Value::Null, json!({"Other": {}}));

        let err = service.list().unwrap_err();
        assert!(matches!(err, EyeMoveError::MissingResult(ref k) if k == "RetrieveResult"));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(ObjectEndpoint::Single.path(), "/object.asmx");
        assert_eq!(ObjectEndpoint::Collection.path(), "/objecten.asmx");
        assert_eq!(
            ObjectEndpoint::Collection.namespace(),
            "http://ws.eye-move.nl/Objecten"
        );
    }
}
