//! The in-page panel as a view-state machine.
//!
//! Every user action returns the [`Pending`] message it needs sent; replies are fed back through
//! [`Sidebar::complete`]. View transitions issue a fresh [`ViewToken`] so replies addressed to a view
//! the user already left are ignored.

use crate::extension::message::ExtensionMessage;
use crate::extension::router::Messenger;
use crate::models::meeting::MeetingEvent;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

pub const NOTES_SAVED: &str = "Notes saved";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Events,
    Notes,
    Save,
    Agenda,
    Brief,
}

/// A message waiting to be sent on behalf of the view identified by `token`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending {
    pub token: ViewToken,
    pub kind: PendingKind,
    pub message: ExtensionMessage,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorView {
    pub meeting_id: String,
    pub title: String,
    pub notes: String,
    pub agenda: Vec<String>,
    pub brief: Option<String>,
    pub agenda_busy: bool,
    pub brief_busy: bool,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Closed,
    Loading,
    List { events: Vec<MeetingEvent> },
    LoginPrompt { login_url: String },
    Editor(EditorView),
}

pub struct Sidebar {
    view: View,
    token: ViewToken,
    login_url: String,
}

impl Sidebar {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            view: View::Closed,
            token: ViewToken::default(),
            login_url: login_url.into(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn editor(&self) -> Option<&EditorView> {
        match &self.view {
            View::Editor(editor) => Some(editor),
            _ => None,
        }
    }

    /// Opens the panel on a freshly fetched meeting list.
    pub fn open(&mut self) -> Pending {
        self.load_events()
    }

    /// Leaves the editor for a re-fetched meeting list.
    pub fn back(&mut self) -> Option<Pending> {
        if !matches!(self.view, View::Editor(_)) {
            return None;
        }
        Some(self.load_events())
    }

    pub fn close(&mut self) {
        self.transition(View::Closed);
    }

    /// Opens the editor for one of the listed meetings.
    pub fn select(&mut self, meeting_id: &str) -> Option<Pending> {
        let event = match &self.view {
            View::List { events } => events.iter().find(|event| event.id == meeting_id)?.clone(),
            _ => return None,
        };

        let token = self.transition(View::Editor(EditorView {
            meeting_id: event.id.clone(),
            title: event.label().to_string(),
            ..EditorView::default()
        }));

        Some(Pending {
            token,
            kind: PendingKind::Notes,
            message: ExtensionMessage::GetNotes { id: event.id },
        })
    }

    pub fn edit_notes(&mut self, text: impl Into<String>) {
        if let View::Editor(editor) = &mut self.view {
            editor.notes = text.into();
            editor.status = None;
        }
    }

    pub fn save(&mut self) -> Option<Pending> {
        let editor = self.editor()?;
        Some(Pending {
            token: self.token,
            kind: PendingKind::Save,
            message: ExtensionMessage::SaveNotes {
                id: editor.meeting_id.clone(),
                notes: editor.notes.clone(),
            },
        })
    }

    /// `None` while a previous agenda request is still running.
    pub fn suggest_agenda(&mut self) -> Option<Pending> {
        let token = self.token;
        match &mut self.view {
            View::Editor(editor) if !editor.agenda_busy => {
                editor.agenda_busy = true;
                Some(Pending {
                    token,
                    kind: PendingKind::Agenda,
                    message: ExtensionMessage::GetAgenda {
                        id: editor.meeting_id.clone(),
                    },
                })
            }
            _ => None,
        }
    }

    /// `None` while a previous brief request is still running.
    pub fn generate_brief(&mut self) -> Option<Pending> {
        let token = self.token;
        match &mut self.view {
            View::Editor(editor) if !editor.brief_busy => {
                editor.brief_busy = true;
                Some(Pending {
                    token,
                    kind: PendingKind::Brief,
                    message: ExtensionMessage::GetBrief {
                        id: editor.meeting_id.clone(),
                    },
                })
            }
            _ => None,
        }
    }

    /// Applies a reply. Returns `false` when it belongs to a view that is no longer shown.
    pub fn complete(&mut self, pending: &Pending, response: Value) -> bool {
        if pending.token != self.token {
            debug!(kind = ?pending.kind, "Dropping reply for a stale view");
            return false;
        }

        let failed = response.get("error").is_some();

        if pending.kind == PendingKind::Events {
            if self.view != View::Loading {
                return false;
            }
            self.view = match response.as_array() {
                Some(items) if !failed => View::List {
                    events: items.iter().filter_map(MeetingEvent::from_value).collect(),
                },
                _ => View::LoginPrompt {
                    login_url: self.login_url.clone(),
                },
            };
            return true;
        }

        match (pending.kind, &mut self.view) {
            (PendingKind::Notes, View::Editor(editor)) => {
                if !failed {
                    editor.notes = response.get("notes").and_then(Value::as_str).unwrap_or_default().to_string();
                }
            }
            (PendingKind::Save, View::Editor(editor)) => {
                if response.get("success").and_then(Value::as_bool) == Some(true) {
                    editor.status = Some(NOTES_SAVED.to_string());
                }
            }
            (PendingKind::Agenda, View::Editor(editor)) => {
                editor.agenda_busy = false;
                if let Some(items) = response.get("items").and_then(Value::as_array) {
                    editor.agenda = items.iter().filter_map(Value::as_str).map(str::to_string).collect();
                }
            }
            (PendingKind::Brief, View::Editor(editor)) => {
                editor.brief_busy = false;
                match response.get("brief").and_then(Value::as_str) {
                    Some(brief) if !brief.is_empty() => editor.brief = Some(brief.to_string()),
                    _ => {}
                }
            }
            _ => return false,
        }

        true
    }

    fn load_events(&mut self) -> Pending {
        let token = self.transition(View::Loading);
        Pending {
            token,
            kind: PendingKind::Events,
            message: ExtensionMessage::GetEvents,
        }
    }

    fn transition(&mut self, view: View) -> ViewToken {
        self.token = ViewToken(self.token.0 + 1);
        self.view = view;
        self.token
    }
}

/// Sends pending messages and feeds the replies back into a shared sidebar.
pub struct SidebarDriver<M: Messenger> {
    messenger: M,
    sidebar: Mutex<Sidebar>,
}

impl<M: Messenger> SidebarDriver<M> {
    pub fn new(messenger: M, sidebar: Sidebar) -> Self {
        Self {
            messenger,
            sidebar: Mutex::new(sidebar),
        }
    }

    pub fn sidebar(&self) -> &Mutex<Sidebar> {
        &self.sidebar
    }

    /// The sidebar lock is not held while the message is in flight, so the user can keep navigating.
    pub async fn run(&self, pending: Option<Pending>) -> bool {
        let Some(pending) = pending else {
            return false;
        };

        let response = self.messenger.send(pending.message.clone()).await;
        self.sidebar.lock().await.complete(&pending, response)
    }

    pub async fn open(&self) -> bool {
        let pending = self.sidebar.lock().await.open();
        self.run(Some(pending)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    const LOGIN: &str = "http://localhost:3000/api/auth/url";

    /// Replies by message type and records what was sent.
    struct ScriptedMessenger {
        replies: HashMap<&'static str, Value>,
        sent: StdMutex<Vec<ExtensionMessage>>,
    }

    impl ScriptedMessenger {
        fn new(replies: &[(&'static str, Value)]) -> Self {
            Self {
                replies: replies.iter().cloned().collect(),
                sent: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Messenger for ScriptedMessenger {
        async fn send(&self, message: ExtensionMessage) -> Value {
            let kind = message.kind();
            self.sent.lock().unwrap().push(message);
            self.replies.get(kind).cloned().unwrap_or_else(|| json!({ "error": "no reply" }))
        }
    }

    fn events() -> Value {
        json!([
            { "id": "evt123", "summary": "Quarterly planning" },
            { "id": "evt456" }
        ])
    }

    #[test]
    fn list_renders_titles_with_placeholder() {
        let mut sidebar = Sidebar::new(LOGIN);
        let pending = sidebar.open();
        assert_eq!(sidebar.view(), &View::Loading);

        assert!(sidebar.complete(&pending, events()));
        match sidebar.view() {
            View::List { events } => {
                let labels: Vec<&str> = events.iter().map(MeetingEvent::label).collect();
                assert_eq!(labels, vec!["Quarterly planning", "(No title)"]);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn error_or_non_list_reply_shows_login_prompt() {
        for reply in [json!({ "error": "No token" }), json!({ "items": [] })] {
            let mut sidebar = Sidebar::new(LOGIN);
            let pending = sidebar.open();
            sidebar.complete(&pending, reply);
            assert_eq!(
                sidebar.view(),
                &View::LoginPrompt {
                    login_url: LOGIN.to_string()
                }
            );
        }
    }

    #[test]
    fn agenda_trigger_is_disabled_while_in_flight() {
        let mut sidebar = Sidebar::new(LOGIN);
        let pending = sidebar.open();
        sidebar.complete(&pending, events());
        sidebar.select("evt123").expect("editor");

        let agenda = sidebar.suggest_agenda().expect("first request");
        assert!(sidebar.editor().unwrap().agenda_busy);
        assert!(sidebar.suggest_agenda().is_none());

        sidebar.complete(&agenda, json!({ "error": "Azure OpenAI error 500: boom" }));
        let editor = sidebar.editor().unwrap();
        assert!(!editor.agenda_busy);
        assert!(editor.agenda.is_empty());
    }

    #[test]
    fn stale_reply_after_back_is_ignored() {
        let mut sidebar = Sidebar::new(LOGIN);
        let pending = sidebar.open();
        sidebar.complete(&pending, events());
        sidebar.select("evt123").expect("editor");

        let brief = sidebar.generate_brief().expect("brief request");
        let reload = sidebar.back().expect("back re-fetches");

        assert!(!sidebar.complete(&brief, json!({ "brief": "Late answer." })));
        assert_eq!(sidebar.view(), &View::Loading);

        assert!(sidebar.complete(&reload, events()));
        assert!(matches!(sidebar.view(), View::List { .. }));
    }

    #[test]
    fn select_unknown_meeting_stays_on_list() {
        let mut sidebar = Sidebar::new(LOGIN);
        let pending = sidebar.open();
        sidebar.complete(&pending, events());
        assert!(sidebar.select("missing").is_none());
        assert!(matches!(sidebar.view(), View::List { .. }));
    }

    #[tokio::test]
    async fn editor_flow_through_driver() {
        let messenger = ScriptedMessenger::new(&[
            ("GET_EVENTS", events()),
            ("GET_NOTES", json!({ "notes": "Discuss Q3 budget" })),
            ("SAVE_NOTES", json!({ "success": true })),
            ("GET_AGENDA", json!({ "items": ["Budget", "Hiring"] })),
            ("GET_BRIEF", json!({ "brief": "Budget is tight." })),
        ]);
        let driver = SidebarDriver::new(messenger, Sidebar::new(LOGIN));

        assert!(driver.open().await);
        let pending = driver.sidebar().lock().await.select("evt123");
        assert!(driver.run(pending).await);
        assert_eq!(driver.sidebar().lock().await.editor().unwrap().notes, "Discuss Q3 budget");

        driver.sidebar().lock().await.edit_notes("Discuss Q3 budget and hiring");
        let pending = driver.sidebar().lock().await.save();
        assert!(driver.run(pending).await);

        let pending = driver.sidebar().lock().await.suggest_agenda();
        assert!(driver.run(pending).await);
        let pending = driver.sidebar().lock().await.generate_brief();
        assert!(driver.run(pending).await);

        let sidebar = driver.sidebar().lock().await;
        let editor = sidebar.editor().unwrap();
        assert_eq!(editor.title, "Quarterly planning");
        assert_eq!(editor.status.as_deref(), Some(NOTES_SAVED));
        assert_eq!(editor.agenda, vec!["Budget", "Hiring"]);
        assert_eq!(editor.brief.as_deref(), Some("Budget is tight."));

        let sent = driver.messenger.sent.lock().unwrap();
        assert!(sent.contains(&ExtensionMessage::SaveNotes {
            id: "evt123".to_string(),
            notes: "Discuss Q3 budget and hiring".to_string()
        }));
    }

    #[tokio::test]
    async fn reopening_refetches_events() {
        let driver = SidebarDriver::new(ScriptedMessenger::new(&[("GET_EVENTS", events())]), Sidebar::new(LOGIN));
        driver.open().await;
        driver.sidebar().lock().await.close();
        driver.open().await;

        let sent = driver.messenger.sent.lock().unwrap();
        assert_eq!(sent.iter().filter(|m| **m == ExtensionMessage::GetEvents).count(), 2);
    }
}
