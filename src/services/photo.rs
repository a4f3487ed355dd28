//! Photo service.

use crate::client::Credentials;
use crate::config::EyeMoveConfig;
use crate::debug::DebugInfo;
use crate::error::Result;
use crate::fields::FieldMap;
use crate::response::ResponseValue;
use crate::services::file::{FileSchema, FileService, ListCall, ShowId};
use crate::transport::{HttpTransport, SoapTransport};

/// Schema of the photo family.
///
/// Photos are served by two endpoints: `foto.asmx` for add/update/delete
/// and `fotos.asmx` for queries. Listing takes no object id, and `show`
/// is keyed by the owning object rather than the photo record.
pub(crate) static PHOTO_SCHEMA: FileSchema = FileSchema {
    name: "photo",
    namespace: "http://ws.eye-move.nl/Foto",
    endpoint_path: "/foto.asmx",
    query_namespace: "http://ws.eye-move.nl/Fotos",
    query_path: "/fotos.asmx",
    file_wrapper_tag: "Fotobestand",
    list: ListCall {
        operation: "List",
        object_id_tag: None,
        result_key: "ListResult",
    },
    show_id: ShowId::Object("WoningID"),
};

/// Optional photo fields, mapped to their wire names in schema order.
/// Unset fields are left out of the request entirely.
#[derive(Debug, Clone, Default)]
pub struct PhotoOptions {
    /// `NVMMediaType`
    pub nvm_media_type: Option<String>,
    /// `MediaID`
    pub media_id: Option<i64>,
    /// `Fototype`
    pub photo_type: Option<String>,
    /// `Bijschrift`
    pub description: Option<String>,
    /// `Hoofdfoto`
    pub main_photo: Option<bool>,
    /// `Funda`
    pub funda: Option<bool>,
}

impl PhotoOptions {
    pub(crate) fn wire_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert_opt("NVMMediaType", self.nvm_media_type.clone());
        fields.insert_opt("MediaID", self.media_id);
        fields.insert_opt("Fototype", self.photo_type.clone());
        fields.insert_opt("Bijschrift", self.description.clone());
        fields.insert_opt("Hoofdfoto", self.main_photo);
        fields.insert_opt("Funda", self.funda);
        fields
    }
}

/// Service for object photos.
///
/// Holds one lazily-created SOAP transport; at most one in-flight call per
/// instance.
pub struct PhotoService {
    inner: FileService,
}

impl PhotoService {
    pub(crate) fn new(credentials: Credentials, config: EyeMoveConfig) -> Self {
        Self {
            inner: FileService::new(&PHOTO_SCHEMA, credentials, config),
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
            inner: FileService::with_transports(&PHOTO_SCHEMA, credentials, config, http, soap),
        }
    }

    /// List photos.
    pub fn list(&mut self) -> Result<ResponseValue> {
        self.inner.list(None)
    }

    /// Show the photos of one object.
    pub fn show(&mut self, object_id: i64) -> Result<ResponseValue> {
        self.inner.show(object_id, 0)
    }

    /// Add a photo to an object; returns the new photo id.
    pub fn add(
        &mut self,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: &PhotoOptions,
    ) -> Result<i64> {
        self.inner
            .add(object_id, order, filename, file_data, options.wire_fields())
    }

    /// Update a photo.
    pub fn update(
        &mut self,
        record_id: i64,
        object_id: i64,
        order: i64,
        filename: &str,
        file_data: &[u8],
        options: &PhotoOptions,
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

    /// Delete a photo.
    pub fn delete(&mut self, record_id: i64) -> Result<bool> {
        self.inner.delete(record_id)
    }

    /// Redacted diagnostics for the last SOAP-path call.
    pub fn debug_info(&mut self) -> DebugInfo {
        self.inner.debug_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_fields_keep_schema_order_and_drop_unset() {
        let options = PhotoOptions {
            media_id: Some(4),
            main_photo: Some(true),
            ..Default::default()
        };

        let fields = options.wire_fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["MediaID", "Hoofdfoto"]);
    }

    #[test]
    fn test_wire_fields_empty_when_no_options_set() {
        assert!(PhotoOptions::default().wire_fields().is_empty());
    }
}
