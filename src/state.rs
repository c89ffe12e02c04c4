//! Application state: the in-memory quiz store and play-session bookkeeping.
//!
//! This module owns:
//!   - the quiz store (by id), with identity assignment on insert
//!   - play sessions (by id), including progress/pause/completion tracking
//!
//! Everything is process-local (`Arc<RwLock<HashMap>>`); durability is a
//! non-goal, the store exists so uploads can be played immediately.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_server_config_from_env, ServerConfig};
use crate::domain::{PlayResponse, PlaySession, Quiz, StoredOption, StoredQuestion};
use crate::protocol::QuizCreate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Quiz not found")]
    QuizNotFound,
    #[error("Session not found")]
    SessionNotFound,
    #[error("Invalid option for question")]
    InvalidOption,
}

#[derive(Clone)]
pub struct AppState {
    pub quizzes: Arc<RwLock<HashMap<Uuid, Quiz>>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, PlaySession>>>,
    pub config: ServerConfig,
}

impl AppState {
    /// Build state from env: load server config, start with empty stores.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_server_config_from_env().unwrap_or_default();
        info!(target: "quizzz_backend", port = config.port, "In-memory quiz store initialized");
        Self {
            quizzes: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Persist a quiz payload, assigning fresh ids to the quiz and every
    /// question/option. Question and option order is kept as given.
    #[instrument(level = "info", skip(self, payload), fields(title = %payload.title, questions = payload.questions.len()))]
    pub async fn create_quiz(&self, payload: QuizCreate) -> Quiz {
        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: payload.title,
            owner_id: payload.owner_id,
            created_at: Utc::now(),
            questions: payload
                .questions
                .into_iter()
                .map(|q| StoredQuestion {
                    id: Uuid::new_v4(),
                    text: q.text,
                    position: q.position,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| StoredOption {
                            id: Uuid::new_v4(),
                            text: o.text,
                            is_correct: o.is_correct,
                            position: o.position,
                        })
                        .collect(),
                })
                .collect(),
        };
        info!(target: "quiz", id = %quiz.id, title = %quiz.title, "Quiz created");
        self.quizzes.write().await.insert(quiz.id, quiz.clone());
        quiz
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_quiz(&self, id: Uuid) -> Option<Quiz> {
        self.quizzes.read().await.get(&id).cloned()
    }

    /// Start a play session against an existing quiz.
    #[instrument(level = "info", skip(self), fields(%quiz_id))]
    pub async fn start_session(
        &self,
        quiz_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<PlaySession, StoreError> {
        if !self.quizzes.read().await.contains_key(&quiz_id) {
            return Err(StoreError::QuizNotFound);
        }
        let session = PlaySession {
            id: Uuid::new_v4(),
            quiz_id,
            user_id,
            started_at: Utc::now(),
            completed_at: None,
            current_index: 0,
            is_paused: false,
            responses: vec![],
        };
        info!(target: "quiz", id = %session.id, %quiz_id, "Play session started");
        self.sessions.write().await.insert(session.id, session.clone());
        Ok(session)
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: Uuid) -> Option<PlaySession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Record one answer. The selected option must belong to the named
    /// question of the session's quiz; correctness is copied from the
    /// stored option, never recomputed. Completion is reached once every
    /// question of the quiz has at least one response.
    #[instrument(level = "info", skip(self), fields(%session_id, %question_id, %selected_option_id))]
    pub async fn record_answer(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        selected_option_id: Uuid,
    ) -> Result<PlaySession, StoreError> {
        let quiz_id = self
            .sessions
            .read()
            .await
            .get(&session_id)
            .map(|s| s.quiz_id)
            .ok_or(StoreError::SessionNotFound)?;

        let (is_correct, question_count) = {
            let quizzes = self.quizzes.read().await;
            let quiz = quizzes.get(&quiz_id).ok_or(StoreError::QuizNotFound)?;
            let question = quiz
                .questions
                .iter()
                .find(|q| q.id == question_id)
                .ok_or(StoreError::InvalidOption)?;
            let option = question
                .options
                .iter()
                .find(|o| o.id == selected_option_id)
                .ok_or(StoreError::InvalidOption)?;
            (option.is_correct, quiz.questions.len())
        };

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or(StoreError::SessionNotFound)?;
        session.responses.push(PlayResponse {
            id: Uuid::new_v4(),
            question_id,
            selected_option_id,
            is_correct,
            answered_at: Utc::now(),
        });
        session.current_index += 1;

        let mut answered: Vec<Uuid> = session.responses.iter().map(|r| r.question_id).collect();
        answered.sort();
        answered.dedup();
        if answered.len() >= question_count && session.completed_at.is_none() {
            session.completed_at = Some(Utc::now());
            info!(target: "quiz", id = %session.id, "Play session completed");
        }

        Ok(session.clone())
    }

    /// Pause or resume a session.
    #[instrument(level = "info", skip(self), fields(%session_id, paused))]
    pub async fn set_paused(
        &self,
        session_id: Uuid,
        paused: bool,
    ) -> Result<PlaySession, StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or(StoreError::SessionNotFound)?;
        session.is_paused = paused;
        Ok(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{OptionCreate, QuestionCreate};

    fn sample_payload() -> QuizCreate {
        QuizCreate {
            title: "Imported Quiz".into(),
            owner_id: None,
            questions: vec![
                QuestionCreate {
                    text: "What is 2+2?".into(),
                    position: 0,
                    options: vec![
                        OptionCreate { text: "3".into(), is_correct: false, position: 0 },
                        OptionCreate { text: "4".into(), is_correct: true, position: 1 },
                    ],
                },
                QuestionCreate {
                    text: "Capital of France?".into(),
                    position: 1,
                    options: vec![
                        OptionCreate { text: "Paris".into(), is_correct: true, position: 0 },
                        OptionCreate { text: "Lyon".into(), is_correct: false, position: 1 },
                    ],
                },
            ],
        }
    }

    #[tokio::test]
    async fn create_and_fetch_quiz_preserves_order() {
        let state = AppState::new();
        let quiz = state.create_quiz(sample_payload()).await;
        let fetched = state.get_quiz(quiz.id).await.unwrap();
        assert_eq!(fetched.questions.len(), 2);
        assert_eq!(fetched.questions[0].text, "What is 2+2?");
        assert_eq!(fetched.questions[1].options[0].text, "Paris");
    }

    #[tokio::test]
    async fn session_flow_answers_to_completion() {
        let state = AppState::new();
        let quiz = state.create_quiz(sample_payload()).await;
        let session = state.start_session(quiz.id, None).await.unwrap();
        assert_eq!(session.current_index, 0);
        assert!(!session.is_completed());

        let q0 = &quiz.questions[0];
        let s = state
            .record_answer(session.id, q0.id, q0.options[1].id)
            .await
            .unwrap();
        assert_eq!(s.current_index, 1);
        assert!(s.responses[0].is_correct);
        assert!(!s.is_completed());

        let q1 = &quiz.questions[1];
        let s = state
            .record_answer(session.id, q1.id, q1.options[1].id)
            .await
            .unwrap();
        assert!(!s.responses[1].is_correct);
        assert!(s.is_completed());
    }

    #[tokio::test]
    async fn option_must_belong_to_question() {
        let state = AppState::new();
        let quiz = state.create_quiz(sample_payload()).await;
        let session = state.start_session(quiz.id, None).await.unwrap();
        let err = state
            .record_answer(session.id, quiz.questions[0].id, quiz.questions[1].options[0].id)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidOption);
    }

    #[tokio::test]
    async fn unknown_quiz_and_session_are_not_found() {
        let state = AppState::new();
        assert_eq!(
            state.start_session(Uuid::new_v4(), None).await.unwrap_err(),
            StoreError::QuizNotFound
        );
        assert_eq!(
            state.set_paused(Uuid::new_v4(), true).await.unwrap_err(),
            StoreError::SessionNotFound
        );
    }

    #[tokio::test]
    async fn pause_and_resume_toggle() {
        let state = AppState::new();
        let quiz = state.create_quiz(sample_payload()).await;
        let session = state.start_session(quiz.id, None).await.unwrap();
        let s = state.set_paused(session.id, true).await.unwrap();
        assert!(s.is_paused);
        let s = state.set_paused(session.id, false).await.unwrap();
        assert!(!s.is_paused);
    }
}
