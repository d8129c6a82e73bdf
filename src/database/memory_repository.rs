use crate::models::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-lifetime storage for notes and sessions. Everything is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    pub(crate) notes: Arc<RwLock<HashMap<String, String>>>,
    pub(crate) sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}
