//! Domain models: extraction inputs (paragraphs/runs), the extraction Draft,
//! and the stored quiz / play-session entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used when a document yields no title of its own.
pub const DEFAULT_TITLE: &str = "Imported Quiz";

/// A contiguous span of text within a paragraph sharing uniform formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
  pub text: String,
  pub bold: bool,
}

/// One paragraph as delivered by the document reader. The extraction core
/// only ever reads these; it never opens files or archives itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawParagraph {
  /// Concatenation of all run texts, in order.
  pub text: String,
  /// Display name of the paragraph style (e.g. "List Number 2"). Empty if none.
  pub style_name: String,
  /// Direct list-numbering nesting index, when the document carries one.
  pub list_level: Option<usize>,
  pub runs: Vec<Run>,
}

impl RawParagraph {
  /// Convenience for plain text without list metadata or formatting.
  pub fn plain(text: &str) -> Self {
    RawParagraph {
      text: text.to_string(),
      runs: vec![Run { text: text.to_string(), bold: false }],
      ..Default::default()
    }
  }
}

/// One answer option inside a drafted question.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AnswerOption {
  pub text: String,
  #[serde(rename = "isCorrect")]
  pub is_correct: bool,
}

/// One drafted question with its options in encounter order.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DraftQuestion {
  pub text: String,
  pub options: Vec<AnswerOption>,
}

/// The in-memory extraction result prior to any persistence.
/// Field names and nesting are the stable wire contract.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Draft {
  pub title: String,
  pub questions: Vec<DraftQuestion>,
  pub warnings: Vec<String>,
}

impl Draft {
  pub fn empty() -> Self {
    Draft { title: DEFAULT_TITLE.to_string(), questions: vec![], warnings: vec![] }
  }
}

//
// Stored entities (identity assigned by the store, not by extraction).
//

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredOption {
  pub id: Uuid,
  pub text: String,
  pub is_correct: bool,
  pub position: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredQuestion {
  pub id: Uuid,
  pub text: String,
  pub position: u32,
  pub options: Vec<StoredOption>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quiz {
  pub id: Uuid,
  pub title: String,
  pub owner_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub questions: Vec<StoredQuestion>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayResponse {
  pub id: Uuid,
  pub question_id: Uuid,
  pub selected_option_id: Uuid,
  pub is_correct: bool,
  pub answered_at: DateTime<Utc>,
}

/// One play-through of a quiz, with progress/pause bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaySession {
  pub id: Uuid,
  pub quiz_id: Uuid,
  pub user_id: Option<Uuid>,
  pub started_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
  pub current_index: u32,
  pub is_paused: bool,
  pub responses: Vec<PlayResponse>,
}

impl PlaySession {
  pub fn is_completed(&self) -> bool {
    self.completed_at.is_some()
  }
}
