use std::sync::Arc;

use roster_core::StudentStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StudentStore>,
}

impl AppState {
    pub fn new(store: StudentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
