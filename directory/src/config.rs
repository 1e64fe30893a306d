//! Directory client configuration loaded via OrthoConfig.
//!
//! Values come from `EMPLOYEE_DIRECTORY_*` environment variables, CLI
//! arguments and configuration files. Accessors apply the defaults.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

/// Backend the client talks to when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/";
/// Per-request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Configuration values for the directory client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EMPLOYEE_DIRECTORY")]
pub struct DirectorySettings {
    /// Root URL of the REST backend.
    pub api_base_url: Option<String>,
    /// Request timeout in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_seconds: u64,
    /// Directory for the durable draft mirror; in-memory when unset.
    pub mirror_dir: Option<PathBuf>,
}

impl DirectorySettings {
    /// Configured base URL, falling back to the local development server.
    ///
    /// A trailing slash is added so endpoints resolve below the base path.
    ///
    /// # Errors
    ///
    /// Returns the parse failure for a malformed URL.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Configured request timeout; zero is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    /// Configured mirror directory, if any.
    pub fn mirror_dir(&self) -> Option<&PathBuf> {
        self.mirror_dir.as_ref()
    }
}
