use std::sync::Arc;

use crate::pipeline::{Analyzer, Session};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub session: Arc<Session>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            session: Arc::new(Session::new()),
        }
    }
}
