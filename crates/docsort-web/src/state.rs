use std::path::PathBuf;
use std::sync::Arc;

use docsort_core::{Classifier, Config, Engines};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub bank: Arc<Classifier>,
    pub salary: Arc<Classifier>,
    /// Where uploads are written before classification.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config, engines: Engines) -> Self {
        let upload_dir = config.scratch_root.clone();
        let config = Arc::new(config);
        Self {
            bank: Arc::new(Classifier::bank_statement(config.clone(), engines.clone())),
            salary: Arc::new(Classifier::salary_slip(config, engines)),
            upload_dir,
        }
    }
}
