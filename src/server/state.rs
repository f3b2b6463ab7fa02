use std::sync::Arc;

use crate::catalog::LibraryCatalog;
use crate::config::Settings;

pub struct AppState {
    pub catalog: Arc<dyn LibraryCatalog>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(catalog: Arc<dyn LibraryCatalog>, settings: Settings) -> Arc<Self> {
        Arc::new(Self { catalog, settings })
    }
}
