use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::catalog::CatalogError;
use crate::model::ids::QuizId;

/// Question count used when the trainer does not provide one.
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("module has no quiz attached")]
    NoQuiz,

    #[error("quiz unlocks once every content item has been viewed")]
    Locked,

    #[error("quiz already passed")]
    AlreadyPassed,

    #[error("no quiz is pending for this module")]
    NotPending,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Pass/fail gate attached to a module. At most one per module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    id: QuizId,
    title: String,
    #[serde(rename = "questions")]
    question_count: u32,
}

impl Quiz {
    pub(crate) fn new(id: QuizId, title: String, question_count: u32) -> Self {
        Self {
            id,
            title,
            question_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }
}
