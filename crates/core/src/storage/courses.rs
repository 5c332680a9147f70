//! Course storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Course;

pub struct CourseStore<'a> {
    conn: &'a Connection,
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
    })
}

impl<'a> CourseStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new course
    #[instrument(skip(self, course), fields(title = %course.title))]
    pub fn create(&self, course: &Course) -> Result<()> {
        self.conn.execute(
            "INSERT INTO courses (id, title, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                course.id.to_string(),
                course.title,
                course.description,
                course.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find course by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, description, created_at FROM courses WHERE id = ?1")?;

        let course = stmt
            .query_row(params![id.to_string()], course_from_row)
            .optional()?;

        Ok(course)
    }

    /// Check whether a course id exists
    pub fn exists(&self, id: Uuid) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM courses WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Update course title and description
    #[instrument(skip(self, course), fields(course_id = %course.id))]
    pub fn update(&self, course: &Course) -> Result<()> {
        self.conn.execute(
            "UPDATE courses SET title = ?1, description = ?2 WHERE id = ?3",
            params![course.title, course.description, course.id.to_string()],
        )?;
        Ok(())
    }

    /// Delete course
    #[instrument(skip(self))]
    pub fn delete(&self, course_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM courses WHERE id = ?1",
            params![course_id.to_string()],
        )?;
        Ok(())
    }

    /// List all courses ordered by title
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, description, created_at FROM courses ORDER BY title")?;

        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(courses)
    }
}
