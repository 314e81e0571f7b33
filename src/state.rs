use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::availability::OperatingWindow;
use crate::services::snapshot::SnapshotFeed;
use crate::services::storage::FileStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub files: Box<dyn FileStore>,
    pub snapshots: SnapshotFeed,
    pub window: OperatingWindow,
}
