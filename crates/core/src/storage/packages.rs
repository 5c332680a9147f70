//! Package storage operations, including course containment
//!
//! Package membership is mutable over the system's lifetime, so containment
//! queries always hit the join table fresh rather than a cached view.

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Course, Package};

pub struct PackageStore<'a> {
    conn: &'a Connection,
}

fn package_from_row(row: &Row<'_>) -> rusqlite::Result<Package> {
    Ok(Package {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price_cents: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
    })
}

impl<'a> PackageStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new package
    #[instrument(skip(self, package), fields(title = %package.title))]
    pub fn create(&self, package: &Package) -> Result<()> {
        self.conn.execute(
            "INSERT INTO packages (id, title, description, price_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                package.id.to_string(),
                package.title,
                package.description,
                package.price_cents,
                package.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find package by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Package>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, price_cents, created_at FROM packages WHERE id = ?1",
        )?;

        let package = stmt
            .query_row(params![id.to_string()], package_from_row)
            .optional()?;

        Ok(package)
    }

    /// Check whether a package id exists
    pub fn exists(&self, id: Uuid) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM packages WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Update package fields
    #[instrument(skip(self, package), fields(package_id = %package.id))]
    pub fn update(&self, package: &Package) -> Result<()> {
        self.conn.execute(
            "UPDATE packages SET title = ?1, description = ?2, price_cents = ?3 WHERE id = ?4",
            params![
                package.title,
                package.description,
                package.price_cents,
                package.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Delete package
    #[instrument(skip(self))]
    pub fn delete(&self, package_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM packages WHERE id = ?1",
            params![package_id.to_string()],
        )?;
        Ok(())
    }

    /// List all packages ordered by title
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Package>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, price_cents, created_at FROM packages ORDER BY title",
        )?;

        let packages = stmt
            .query_map([], package_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(packages)
    }

    /// Add a course to a package (no-op if already present)
    #[instrument(skip(self))]
    pub fn add_course(&self, package_id: Uuid, course_id: Uuid) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO package_courses (package_id, course_id, added_at)
             VALUES (?1, ?2, ?3)",
            params![
                package_id.to_string(),
                course_id.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Remove a course from a package
    #[instrument(skip(self))]
    pub fn remove_course(&self, package_id: Uuid, course_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM package_courses WHERE package_id = ?1 AND course_id = ?2",
            params![package_id.to_string(), course_id.to_string()],
        )?;
        Ok(())
    }

    /// List the courses bundled in a package
    #[instrument(skip(self))]
    pub fn courses_in_package(&self, package_id: Uuid) -> Result<Vec<Course>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.title, c.description, c.created_at
             FROM courses c
             INNER JOIN package_courses pc ON pc.course_id = c.id
             WHERE pc.package_id = ?1
             ORDER BY c.title",
        )?;

        let courses = stmt
            .query_map(params![package_id.to_string()], |row| {
                Ok(Course {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    /// Ids of every package containing the given course
    ///
    /// A course in zero packages yields an empty list, not an error.
    #[instrument(skip(self))]
    pub fn packages_containing_course(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        let mut stmt = self
            .conn
            .prepare("SELECT package_id FROM package_courses WHERE course_id = ?1")?;

        let ids = stmt
            .query_map(params![course_id.to_string()], |row| {
                parse_uuid(&row.get::<_, String>(0)?)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ids)
    }
}
