//! Admin context shared by every console screen.

use std::sync::Arc;

use bazaar_api::ApiClient;

use crate::config::AdminConfig;
use crate::error::Result;
use crate::table::TableState;

/// Admin console state.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Admin {
    inner: Arc<AdminInner>,
}

struct AdminInner {
    config: AdminConfig,
    api: ApiClient,
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Admin {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(AdminInner { config, api }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// A fresh table at the configured page size.
    #[must_use]
    pub fn table(&self) -> TableState {
        TableState::new(self.config().page_size)
    }
}
