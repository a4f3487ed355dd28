//! Document service.

use crate::client::Credentials;
use crate::config::EyeMoveConfig;
use crate::debug::DebugInfo;
use crate::error::Result;
use crate::fields::FieldMap;
use crate::response::ResponseValue;
use crate::services::file::{FileSchema, FileService, ListCall, ShowId};
use crate::transport::{HttpTransport, SoapTransport};
use chrono::NaiveDateTime;

/// Wire format for the document date fields.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Schema of the document family: one endpoint for every operation,
/// listing keyed by owning object, `show` keyed by record id.
pub(crate) static DOCUMENT_SCHEMA: FileSchema = FileSchema {
    name: "document",
    namespace: "http://ws.eye-move.nl/WoningDocument",
    endpoint_path: "/WoningDocument.asmx",
    query_namespace: "http://ws.eye-move.nl/WoningDocument",
    query_path: "/WoningDocument.asmx",
    file_wrapper_tag: "WoningDocumentBestand",
    list: ListCall {
        operation: "GetAll",
        object_id_tag: Some("WoningID"),
        result_key: "GetAllResult",
    },
    show_id: ShowId::Record("RecID"),
};

/// Optional document fields, mapped to their wire names in schema order.
/// Unset fields are left out of the request entirely.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    /// `RecID`
    pub record_id: Option<i64>,
    /// `WoningDocumentType`
    pub document_type: Option<String>,
    /// `Omschrijving`
    pub description: Option<String>,
    /// `OorspronkelijkeBestandsnaam`
    pub original_filename: Option<String>,
    /// `NaarFunda`
    pub to_funda: Option<bool>,
    /// `DocumentStatus`
    pub document_status: Option<String>,
    /// `Invoerdatum`
    pub created_at: Option<NaiveDateTime>,
    /// `DatumLaatsteWijziging`
    pub updated_at: Option<NaiveDateTime>,
}

impl DocumentOptions {
    pub(crate) fn wire_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert_opt("RecID", self.record_id);
        fields.insert_opt("WoningDocumentType", self.document_type.clone());
        fields.insert_opt("Omschrijving", self.description.clone());
        fields.insert_opt(
            "OorspronkelijkeBestandsnaam",
            self.original_filename.clone(),
        );
        fields.insert_opt("NaarFunda", self.to_funda);
        fields.insert_opt("DocumentStatus", self.document_status.clone());
        fields.insert_opt(
            "Invoerdatum",
            self.created_at.map(|d| d.format(DATE_FORMAT).to_string()),
        );
        fields.insert_opt(
            "DatumLaatsteWijziging",
            self.updated_at.map(|d| d.format(DATE_FORMAT).to_string()),
        );
        fields
    }
}

/// Service for object documents.
///
/// Holds one lazily-created SOAP transport; at most one in-flight call per
/// instance.
pub struct DocumentService {
    inner: FileService,
}

impl DocumentService {
    pub(crate) fn new(credentials: Credentials, config: EyeMoveConfig) -> Self {
        Self {
            inner: FileService::new(&DOCUMENT_SCHEMA, credentials, config),
        }
    }

    /// Construct with explicit transports (tests, alternative stacks).
    pub fn with_transports(
        credentials: Credentials,
        config: EyeMoveConfig,
        http: Box<dyn HttpTransport>,
        soap: Box<dyn SoapTransport>,
    ) -> Self {
        Self {
            inner: FileService::with_transports(&DOCUMENT_SCHEMA, credentials, config, http, soap),
        }
    }

    /// List the documents of one object.
    pub fn list(&mut self, object_id: i64) -> Result<ResponseValue> {
        self.inner.list(Some(object_id))
    }

    /// Show one document record.
    pub fn show(&mut self, record_id: i64) -> Result<ResponseValue> {
        self.inner.show(0, record_id)
    }

    /// Add a document to an object; returns the new document id.
    pub fn add(
        &mut self,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: &DocumentOptions,
    ) -> Result<i64> {
        self.inner
            .add(object_id, order, filename, file_data, options.wire_fields())
    }

    /// Update a document.
    pub fn update(
        &mut self,
        record_id: i64,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: &DocumentOptions,
    ) -> Result<bool> {
        self.inner.update(
            record_id,
            object_id,
            order,
            filename,
            file_data,
            options.wire_fields(),
        )
    }

    /// Delete a document.
    pub fn delete(&mut self, record_id: i64) -> Result<bool> {
        self.inner.delete(record_id)
    }

    /// Redacted diagnostics for the last SOAP-path call.
    pub fn debug_info(&mut self) -> DebugInfo {
        self.inner.debug_info()
    }
}
