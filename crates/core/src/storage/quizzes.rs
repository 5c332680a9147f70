//! Quiz storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_string_list, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Quiz, QuizQuestion};

pub struct QuizStore<'a> {
    conn: &'a Connection,
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    Ok(Quiz {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        lesson_id: parse_uuid(&row.get::<_, String>(1)?)?,
        title: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
    })
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<QuizQuestion> {
    Ok(QuizQuestion {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        quiz_id: parse_uuid(&row.get::<_, String>(1)?)?,
        prompt: row.get(2)?,
        choices: parse_string_list(&row.get::<_, String>(3)?)?,
        correct_index: row.get(4)?,
        position: row.get(5)?,
    })
}

impl<'a> QuizStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new quiz
    #[instrument(skip(self, quiz), fields(title = %quiz.title, lesson_id = %quiz.lesson_id))]
    pub fn create(&self, quiz: &Quiz) -> Result<()> {
        self.conn.execute(
            "INSERT INTO quizzes (id, lesson_id, title, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                quiz.id.to_string(),
                quiz.lesson_id.to_string(),
                quiz.title,
                quiz.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find quiz by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Quiz>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, lesson_id, title, created_at FROM quizzes WHERE id = ?1")?;

        let quiz = stmt
            .query_row(params![id.to_string()], quiz_from_row)
            .optional()?;

        Ok(quiz)
    }

    /// Quizzes attached to a lesson
    #[instrument(skip(self))]
    pub fn list_for_lesson(&self, lesson_id: Uuid) -> Result<Vec<Quiz>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lesson_id, title, created_at FROM quizzes
             WHERE lesson_id = ?1 ORDER BY created_at",
        )?;

        let quizzes = stmt
            .query_map(params![lesson_id.to_string()], quiz_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(quizzes)
    }

    /// Delete quiz (questions cascade)
    #[instrument(skip(self))]
    pub fn delete(&self, quiz_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM quizzes WHERE id = ?1",
            params![quiz_id.to_string()],
        )?;
        Ok(())
    }

    /// Add a question to a quiz
    #[instrument(skip(self, question), fields(quiz_id = %question.quiz_id))]
    pub fn add_question(&self, question: &QuizQuestion) -> Result<()> {
        let choices = serde_json::to_string(&question.choices)?;
        self.conn.execute(
            "INSERT INTO quiz_questions (id, quiz_id, prompt, choices, correct_index, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                question.id.to_string(),
                question.quiz_id.to_string(),
                question.prompt,
                choices,
                question.correct_index,
                question.position,
            ],
        )?;
        Ok(())
    }

    /// Questions of a quiz in position order
    #[instrument(skip(self))]
    pub fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, quiz_id, prompt, choices, correct_index, position
             FROM quiz_questions WHERE quiz_id = ?1 ORDER BY position",
        )?;

        let questions = stmt
            .query_map(params![quiz_id.to_string()], question_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(questions)
    }

    /// Delete a single question
    #[instrument(skip(self))]
    pub fn delete_question(&self, question_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM quiz_questions WHERE id = ?1",
            params![question_id.to_string()],
        )?;
        Ok(())
    }
}
