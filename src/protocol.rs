//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PlayResponse, PlaySession, Quiz};

//
// Quiz creation / retrieval DTOs
//

#[derive(Debug, Deserialize)]
pub struct OptionCreate {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    pub position: u32,
}

#[derive(Debug, Deserialize)]
pub struct QuestionCreate {
    pub text: String,
    pub position: u32,
    pub options: Vec<OptionCreate>,
}

#[derive(Debug, Deserialize)]
pub struct QuizCreate {
    pub title: String,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub questions: Vec<QuestionCreate>,
}

#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
}

pub fn to_summary(q: &Quiz) -> QuizSummary {
    QuizSummary { id: q.id, title: q.title.clone() }
}

//
// Play-session DTOs
//

#[derive(Debug, Deserialize)]
pub struct PlayStart {
    pub quiz_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PlayAnswer {
    pub selected_option_id: Uuid,
    pub question_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PlayResponseOut {
    pub id: Uuid,
    pub question_id: Uuid,
    pub selected_option_id: Uuid,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaySessionOut {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub is_completed: bool,
    pub current_index: u32,
    pub is_paused: bool,
    pub responses: Vec<PlayResponseOut>,
}

/// Convert the stored session (internal) to the public DTO.
pub fn to_session_out(s: &PlaySession) -> PlaySessionOut {
    PlaySessionOut {
        id: s.id,
        quiz_id: s.quiz_id,
        is_completed: s.is_completed(),
        current_index: s.current_index,
        is_paused: s.is_paused,
        responses: s.responses.iter().map(to_response_out).collect(),
    }
}

fn to_response_out(r: &PlayResponse) -> PlayResponseOut {
    PlayResponseOut {
        id: r.id,
        question_id: r.question_id,
        selected_option_id: r.selected_option_id,
        is_correct: r.is_correct,
    }
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn session_dto_maps_completion_and_responses() {
        let session = PlaySession {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            user_id: None,
            started_at: Utc::now(),
            completed_at: Some(Utc::now()),
            current_index: 1,
            is_paused: true,
            responses: vec![PlayResponse {
                id: Uuid::new_v4(),
                question_id: Uuid::new_v4(),
                selected_option_id: Uuid::new_v4(),
                is_correct: true,
                answered_at: Utc::now(),
            }],
        };
        let out = to_session_out(&session);
        assert!(out.is_completed);
        assert!(out.is_paused);
        assert_eq!(out.current_index, 1);
        assert_eq!(out.responses.len(), 1);
        assert!(out.responses[0].is_correct);
    }

    #[test]
    fn dtos_are_debug_loggable() {
        assert_eq!(format!("{:?}", HealthOut { ok: true }), "HealthOut { ok: true }");
    }
}
