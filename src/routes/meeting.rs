use crate::database::notes::SharedNotesRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::agenda::AgendaResponse;
use crate::models::brief::BriefResponse;
use crate::models::notes::{NotesPayload, SaveNotesResponse};
use crate::service::assistant::MeetingAssistant;
use crate::service::completion::SharedCompletionClient;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;

/// Notes saved for a meeting, or an empty string
#[openapi(tag = "Meeting")]
#[get("/<id>/notes")]
pub async fn get_notes(notes: &State<SharedNotesRepository>, id: &str) -> Result<Json<NotesPayload>, AppError> {
    let notes = notes.get_notes(id).await?;
    Ok(Json(NotesPayload { notes }))
}

/// Overwrite the notes of a meeting
#[openapi(tag = "Meeting")]
#[post("/<id>/notes", data = "<payload>")]
pub async fn save_notes(notes: &State<SharedNotesRepository>, id: &str, payload: JsonBody<NotesPayload>) -> Result<Json<SaveNotesResponse>, AppError> {
    notes.save_notes(id, payload.into_inner().notes).await?;
    Ok(Json(SaveNotesResponse::ok()))
}

/// Ask the completion endpoint for five agenda items based on the saved notes
#[openapi(tag = "Meeting")]
#[post("/<id>/agenda")]
pub async fn suggest_agenda(
    notes: &State<SharedNotesRepository>,
    completion: &State<SharedCompletionClient>,
    id: &str,
) -> Result<Json<AgendaResponse>, AppError> {
    let assistant = MeetingAssistant::new(notes.inner().as_ref(), completion.inner().as_ref());
    let outcome = assistant.suggest_agenda(id).await?;
    Ok(Json(outcome.into()))
}

/// Ask the completion endpoint for a 2-3 sentence context brief based on the saved notes
#[openapi(tag = "Meeting")]
#[post("/<id>/brief")]
pub async fn generate_brief(
    notes: &State<SharedNotesRepository>,
    completion: &State<SharedCompletionClient>,
    id: &str,
) -> Result<Json<BriefResponse>, AppError> {
    let assistant = MeetingAssistant::new(notes.inner().as_ref(), completion.inner().as_ref());
    let brief = assistant.generate_brief(id).await?;
    Ok(Json(BriefResponse { brief }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_notes, save_notes, suggest_agenda, generate_brief]
}
