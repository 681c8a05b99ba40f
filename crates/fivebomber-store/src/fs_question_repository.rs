//! Directory-backed implementation of `QuestionRepository`.
//!
//! Question documents live as `<dir>/<id>.json`, one file per question —
//! the same layout the game's object-storage bucket uses, served locally.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use fivebomber_core::error::GameError;
use fivebomber_core::model::Question;
use fivebomber_core::repository::QuestionRepository;

/// Read-only question lookup over a directory of JSON documents.
#[derive(Debug, Clone)]
pub struct FsQuestionRepository {
    base_dir: PathBuf,
}

impl FsQuestionRepository {
    /// Creates a repository rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// Question IDs become file names; anything that could climb out of the
/// base directory is rejected up front.
fn validate_id(question_id: &str) -> Result<(), GameError> {
    if question_id.is_empty()
        || question_id.contains(['/', '\\'])
        || question_id.contains("..")
    {
        return Err(GameError::Validation(format!(
            "invalid question id: {question_id}"
        )));
    }
    Ok(())
}

#[async_trait]
impl QuestionRepository for FsQuestionRepository {
    async fn get_question_by_id(&self, question_id: &str) -> Result<Question, GameError> {
        validate_id(question_id)?;

        let path = self.base_dir.join(format!("{question_id}.json"));
        debug!(question_id, path = %path.display(), "loading question document");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GameError::QuestionNotFound(question_id.to_owned()));
            }
            Err(e) => {
                return Err(GameError::Connection(format!(
                    "question storage read failed: {e}"
                )));
            }
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| GameError::Parse(format!("question document {question_id}: {e}")))
    }
}
