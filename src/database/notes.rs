use crate::database::memory_repository::MemoryRepository;
use crate::error::app_error::AppError;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait NotesRepository: Send + Sync {
    /// Returns the stored note, or an empty string for meetings never saved.
    async fn get_notes(&self, meeting_id: &str) -> Result<String, AppError>;
    /// Overwrites the note for `meeting_id`.
    async fn save_notes(&self, meeting_id: &str, notes: String) -> Result<(), AppError>;
}

pub type SharedNotesRepository = Arc<dyn NotesRepository>;

#[async_trait::async_trait]
impl NotesRepository for MemoryRepository {
    async fn get_notes(&self, meeting_id: &str) -> Result<String, AppError> {
        let notes = self.notes.read().await;
        Ok(notes.get(meeting_id).cloned().unwrap_or_default())
    }

    async fn save_notes(&self, meeting_id: &str, notes: String) -> Result<(), AppError> {
        self.notes.write().await.insert(meeting_id.to_string(), notes);
        Ok(())
    }
}
