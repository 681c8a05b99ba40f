//! Shared test fakes and fixtures for the Five Bomber engine.

mod clock;
mod fixtures;
mod repository;
mod transport;

pub use clock::FixedClock;
pub use fixtures::{prefecture_question, sample_connection};
pub use repository::{
    FailingConnectionRepository, FailingSessionRepository, InMemoryConnectionRepository,
    InMemorySessionRepository, StaticQuestionRepository,
};
pub use transport::RecordingTransport;
