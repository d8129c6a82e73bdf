pub mod memory_repository;
pub mod notes;
pub mod session;
