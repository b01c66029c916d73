//! Error conversion helpers for provider API calls and file I/O

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::error::ApiResult;

/// Extension trait for converting `ApiResult` to `ApplicationResult` with context.
pub trait ApiResultExt<T> {
    /// Describe the call that failed.
    ///
    /// # Example
    /// ```ignore
    /// self.zones.list_zones(&self.account, None)
    ///     .with_api_context("list zones")?;
    /// ```
    fn with_api_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> ApiResultExt<T> for ApiResult<T> {
    fn with_api_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Api {
            context: action.to_string(),
            source,
        })
    }
}

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
