//! Server test utilities.

use dropslot_core::AppConfig;
use dropslot_server::{create_router, AppState};
use dropslot_storage::{FileRepository, Repository};
use std::sync::Arc;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::for_testing();
        modifier(&mut config);

        let repository: Arc<dyn Repository> = Arc::new(
            FileRepository::in_temp_dir().expect("failed to create temp repository"),
        );

        let state = AppState::new(config, repository);
        let router = create_router(state.clone());

        Self { router, state }
    }
}
