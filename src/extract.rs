//! The MCQ extraction core: a single pass over an ordered paragraph sequence.
//!
//! This includes:
//!   - Resolving list nesting levels (direct numbering metadata, then style names)
//!   - Detecting marked-correct answers (bold runs)
//!   - Classifying paragraphs (list structure first, lexical patterns second)
//!   - Assembling questions/options through a small state machine
//!   - Validating the assembled draft into non-fatal warnings
//!
//! Nothing here does I/O or holds state across calls; anomalies surface as
//! warning strings on the Draft, never as errors.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::{AnswerOption, Draft, DraftQuestion, RawParagraph};

// Anchored fallbacks for manually numbered/lettered documents:
// "Question 3", "Q3", "3." or "3)" open a question; "A." / "b)" open an option.
static QUESTION_PREFIX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^(question\s*\d+|q\s*\d+|\d+[.)])\s+").expect("fixed pattern"));
static OPTION_PREFIX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^[a-h][.)]\s+").expect("fixed pattern"));

/// Semantic role of a single paragraph. Closed set so every consumer is
/// forced to handle all four cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
  Empty,
  Question,
  Option,
  Other,
}

/// List nesting level of a paragraph, if it is a list item we recognize.
///
/// Direct numbering metadata wins; otherwise the style name is inspected:
/// "List Number" is level 0, "List Number 2" level 1, "List Number 3" level 2.
fn resolve_list_level(p: &RawParagraph) -> Option<usize> {
  if let Some(lvl) = p.list_level {
    return Some(lvl);
  }

  let style = p.style_name.to_lowercase();
  if style.starts_with("list number") {
    if let Some(n) = style.split_whitespace().last().and_then(|t| t.parse::<usize>().ok()) {
      return Some(n.saturating_sub(1));
    }
    return Some(0);
  }

  None
}

/// True iff at least one run carries non-whitespace text and is bold.
/// Whitespace-only bold runs are formatting artifacts, not answers.
fn is_correct_option(p: &RawParagraph) -> bool {
  p.runs.iter().any(|r| !r.text.trim().is_empty() && r.bold)
}

/// Classify one paragraph into (Kind, normalized text).
/// Structural list metadata is trusted first; lexical prefixes are the
/// fallback for plain manually-numbered documents.
fn classify(p: &RawParagraph) -> (Kind, String) {
  let text = p.text.trim();
  if text.is_empty() {
    return (Kind::Empty, String::new());
  }

  match resolve_list_level(p) {
    Some(0) => return (Kind::Question, text.to_string()),
    Some(1) => return (Kind::Option, text.to_string()),
    _ => {}
  }

  if let Some(m) = QUESTION_PREFIX.find(text) {
    return (Kind::Question, text[m.end()..].trim().to_string());
  }
  if let Some(m) = OPTION_PREFIX.find(text) {
    return (Kind::Option, text[m.end()..].trim().to_string());
  }

  (Kind::Other, text.to_string())
}

/// Extract a quiz Draft from an ordered paragraph sequence.
///
/// Pure and deterministic: the Draft depends only on the given paragraphs.
/// Zero paragraphs yield an empty Draft with zero warnings.
#[instrument(level = "debug", skip(paragraphs), fields(paragraphs = paragraphs.len()))]
pub fn extract(paragraphs: &[RawParagraph]) -> Draft {
  let mut draft = Draft::empty();
  let mut current: Option<usize> = None;
  let mut last_kind: Option<Kind> = None;

  for p in paragraphs {
    let (mut kind, text) = classify(p);
    if kind == Kind::Empty {
      continue;
    }

    // A level-0 style on an answer line is indistinguishable from a genuine
    // new question; without an interrogative marker or manual numbering we
    // treat it as an option of the current question instead.
    if kind == Kind::Question && current.is_some() {
      let looks_like_question = text.contains('?') || QUESTION_PREFIX.is_match(p.text.trim());
      if !looks_like_question {
        debug!(target: "extract", text = %text, "downgrading question-classified line to option");
        kind = Kind::Option;
      }
    }

    match kind {
      Kind::Empty => {} // skipped above
      Kind::Question => {
        draft.questions.push(DraftQuestion { text, options: vec![] });
        current = Some(draft.questions.len() - 1);
        last_kind = Some(Kind::Question);
      }
      Kind::Option => {
        let Some(qi) = current else {
          let preview: String = text.chars().take(40).collect();
          draft.warnings.push(format!("Option without a question: {}", preview));
          continue;
        };
        draft.questions[qi]
          .options
          .push(AnswerOption { text, is_correct: is_correct_option(p) });
        last_kind = Some(Kind::Option);
      }
      Kind::Other => {
        // Wrapped continuation line: attach to the most recent item.
        // With no current question this is leading front matter; drop it.
        let Some(qi) = current else { continue };
        let q = &mut draft.questions[qi];
        match q.options.last_mut() {
          Some(opt) if last_kind == Some(Kind::Option) => {
            opt.text.push(' ');
            opt.text.push_str(&text);
          }
          _ => {
            q.text.push(' ');
            q.text.push_str(&text);
          }
        }
      }
    }
  }

  validate(&mut draft);
  debug!(
    target: "extract",
    questions = draft.questions.len(),
    warnings = draft.warnings.len(),
    "extraction finished"
  );
  draft
}

/// Structural checks over the assembled draft. Appends warnings only;
/// questions and options are never removed or altered here.
fn validate(draft: &mut Draft) {
  for (i, q) in draft.questions.iter().enumerate() {
    if q.options.len() < 2 {
      draft.warnings.push(format!("Question {} has <2 options.", i + 1));
    }
    let correct = q.options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
      draft
        .warnings
        .push(format!("Question {} does not have exactly 1 bold answer.", i + 1));
    }
  }
}
