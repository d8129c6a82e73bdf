pub mod agenda;
pub mod auth;
pub mod brief;
pub mod health;
pub mod meeting;
pub mod notes;
pub mod session;
