//! Lesson storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Lesson;

pub struct LessonStore<'a> {
    conn: &'a Connection,
}

fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<Lesson> {
    Ok(Lesson {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        course_id: parse_uuid(&row.get::<_, String>(1)?)?,
        title: row.get(2)?,
        position: row.get(3)?,
        is_free: row.get::<_, i32>(4)? != 0,
        media_key: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}

const LESSON_COLUMNS: &str = "id, course_id, title, position, is_free, media_key, created_at";

impl<'a> LessonStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new lesson
    #[instrument(skip(self, lesson), fields(title = %lesson.title, course_id = %lesson.course_id))]
    pub fn create(&self, lesson: &Lesson) -> Result<()> {
        self.conn.execute(
            "INSERT INTO lessons (id, course_id, title, position, is_free, media_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                lesson.id.to_string(),
                lesson.course_id.to_string(),
                lesson.title,
                lesson.position,
                lesson.is_free as i32,
                lesson.media_key,
                lesson.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find lesson by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Lesson>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1"))?;

        let lesson = stmt
            .query_row(params![id.to_string()], lesson_from_row)
            .optional()?;

        Ok(lesson)
    }

    /// Check whether a lesson id exists
    pub fn exists(&self, id: Uuid) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM lessons WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the owning course id for a lesson, if the lesson exists
    #[instrument(skip(self))]
    pub fn course_of(&self, lesson_id: Uuid) -> Result<Option<Uuid>> {
        let mut stmt = self
            .conn
            .prepare("SELECT course_id FROM lessons WHERE id = ?1")?;

        let course_id = stmt
            .query_row(params![lesson_id.to_string()], |row| {
                parse_uuid(&row.get::<_, String>(0)?)
            })
            .optional()?;

        Ok(course_id)
    }

    /// Update lesson fields
    #[instrument(skip(self, lesson), fields(lesson_id = %lesson.id))]
    pub fn update(&self, lesson: &Lesson) -> Result<()> {
        self.conn.execute(
            "UPDATE lessons SET title = ?1, position = ?2, is_free = ?3, media_key = ?4 WHERE id = ?5",
            params![
                lesson.title,
                lesson.position,
                lesson.is_free as i32,
                lesson.media_key,
                lesson.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Delete lesson
    #[instrument(skip(self))]
    pub fn delete(&self, lesson_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM lessons WHERE id = ?1",
            params![lesson_id.to_string()],
        )?;
        Ok(())
    }

    /// List lessons of a course in position order
    #[instrument(skip(self))]
    pub fn list_for_course(&self, course_id: Uuid) -> Result<Vec<Lesson>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = ?1 ORDER BY position"
        ))?;

        let lessons = stmt
            .query_map(params![course_id.to_string()], lesson_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(lessons)
    }
}
