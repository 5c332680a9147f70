//! Quiz models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quiz attached to a lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(lesson_id: Uuid, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            lesson_id,
            title,
            created_at: Utc::now(),
        }
    }
}

/// A multiple-choice question; choices are stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_index: u32,
    pub position: u32,
}

impl QuizQuestion {
    pub fn new(
        quiz_id: Uuid,
        prompt: String,
        choices: Vec<String>,
        correct_index: u32,
        position: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id,
            prompt,
            choices,
            correct_index,
            position,
        }
    }

    pub fn is_correct(&self, answer_index: u32) -> bool {
        answer_index == self.correct_index
    }
}
