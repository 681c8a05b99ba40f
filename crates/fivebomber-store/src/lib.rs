//! Five Bomber — storage implementations.
//!
//! PostgreSQL repositories for sessions and connection leases, plus a
//! directory-of-JSON-documents question repository standing in for external
//! object storage.

pub mod fs_question_repository;
pub mod pg_connection_repository;
pub mod pg_session_repository;
pub mod schema;

pub use fs_question_repository::FsQuestionRepository;
pub use pg_connection_repository::PgConnectionRepository;
pub use pg_session_repository::PgSessionRepository;
