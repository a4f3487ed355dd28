//! Top-level client and authentication credentials.

use crate::config::EyeMoveConfig;
use crate::services::{DocumentService, ObjectService, PhotoService};
use std::fmt;

/// Authentication credentials for the web service.
///
/// Created once at authentication and copied into every resource service;
/// they are sent in the envelope header of every call and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    customer: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        customer: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            customer: customer.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("customer", &self.customer)
            .finish()
    }
}

/// Entry point: authenticate once, then obtain per-resource services.
///
/// Each service owns its own copy of the credentials and its own transport
/// state; services are independent and can be created freely.
///
/// ```no_run
/// use eyemove_client::EyeMoveClient;
///
/// let client = EyeMoveClient::authenticate("user", "secret", "customer");
/// let mut photos = client.photos();
/// let photo_ids = photos.list()?;
/// # Ok::<(), eyemove_client::EyeMoveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EyeMoveClient {
    credentials: Credentials,
    config: EyeMoveConfig,
}

impl EyeMoveClient {
    /// Authenticate against the default endpoints.
    pub fn authenticate(
        username: impl Into<String>,
        password: impl Into<String>,
        customer: impl Into<String>,
    ) -> Self {
        Self::with_config(
            Credentials::new(username, password, customer),
            EyeMoveConfig::default(),
        )
    }

    /// Authenticate with explicit configuration.
    pub fn with_config(credentials: Credentials, config: EyeMoveConfig) -> Self {
        Self {
            credentials,
            config,
        }
    }

    /// The object service (property listings).
    pub fn objects(&self) -> ObjectService {
        ObjectService::new(self.credentials.clone(), self.config.clone())
    }

    /// The photo service.
    pub fn photos(&self) -> PhotoService {
        PhotoService::new(self.credentials.clone(), self.config.clone())
    }

    /// The document service.
    pub fn documents(&self) -> DocumentService {
        DocumentService::new(self.credentials.clone(), self.config.clone())
    }
}
