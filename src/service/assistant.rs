use crate::database::notes::NotesRepository;
use crate::error::app_error::AppError;
use crate::models::agenda::AgendaOutcome;
use crate::service::completion::{CompletionClient, CompletionRequest};
use crate::service::parsing::{parse_agenda, parse_brief};
use tracing::{error, info, warn};

/// Turns the stored notes of a meeting into an agenda or a context brief.
pub struct MeetingAssistant<'a> {
    pub notes: &'a dyn NotesRepository,
    pub completion: &'a dyn CompletionClient,
}

impl<'a> MeetingAssistant<'a> {
    pub fn new(notes: &'a dyn NotesRepository, completion: &'a dyn CompletionClient) -> Self {
        Self { notes, completion }
    }

    pub async fn suggest_agenda(&self, meeting_id: &str) -> Result<AgendaOutcome, AppError> {
        let notes = self.notes.get_notes(meeting_id).await?;
        let raw = self
            .completion
            .complete(&CompletionRequest::agenda(&notes))
            .await
            .inspect_err(|e| error!(meeting_id = %meeting_id, error = %e, "Agenda generation failed"))?;

        let outcome = parse_agenda(&raw);
        if outcome.is_shortfall() {
            warn!(
                meeting_id = %meeting_id,
                items = outcome.items().len(),
                source = ?outcome.source(),
                "Completion did not contain five agenda bullets"
            );
        } else {
            info!(meeting_id = %meeting_id, "Agenda generated");
        }

        Ok(outcome)
    }

    pub async fn generate_brief(&self, meeting_id: &str) -> Result<String, AppError> {
        let notes = self.notes.get_notes(meeting_id).await?;
        let raw = self
            .completion
            .complete(&CompletionRequest::brief(&notes))
            .await
            .inspect_err(|e| error!(meeting_id = %meeting_id, error = %e, "Brief generation failed"))?;

        Ok(parse_brief(&raw))
    }
}
