use crate::database::memory_repository::MemoryRepository;
use crate::error::app_error::AppError;
use crate::models::session::{Session, SessionTokens};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    async fn get_session(&self, id: &Uuid) -> Result<Option<Session>, AppError>;
    /// Stores tokens on an existing session, creating it when `id` is unknown.
    async fn store_tokens(&self, id: &Uuid, tokens: SessionTokens) -> Result<Session, AppError>;
}

pub type SharedSessionRepository = Arc<dyn SessionRepository>;

#[async_trait::async_trait]
impl SessionRepository for MemoryRepository {
    async fn get_session(&self, id: &Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn store_tokens(&self, id: &Uuid, tokens: SessionTokens) -> Result<Session, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(*id).or_insert_with(|| Session::new(*id));
        session.tokens = Some(tokens);
        Ok(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str) -> SessionTokens {
        SessionTokens {
            access_token: access.to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn unknown_session_is_none() {
        let repo = MemoryRepository::new();
        assert!(repo.get_session(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_tokens_creates_then_updates() {
        let repo = MemoryRepository::new();
        let id = Uuid::new_v4();

        let created = repo.store_tokens(&id, tokens("first")).await.unwrap();
        assert_eq!(created.id, id);

        repo.store_tokens(&id, tokens("second")).await.unwrap();
        let session = repo.get_session(&id).await.unwrap().expect("session");
        assert_eq!(session.tokens.expect("tokens").access_token, "second");
        assert_eq!(session.created_at, created.created_at);
    }
}
