//! Catalog models: packages, courses, lessons
//!
//! A package bundles courses (many-to-many, via the package_courses join
//! table), a course owns its lessons (one-to-many). The join lives in
//! storage, not on these structs, so containment is always read fresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable bundle of courses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: u32,
    pub created_at: DateTime<Utc>,
}

impl Package {
    pub fn new(title: String, description: Option<String>, price_cents: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            price_cents,
            created_at: Utc::now(),
        }
    }
}

/// A course made up of ordered lessons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(title: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            created_at: Utc::now(),
        }
    }
}

/// A single lesson within a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: u32,
    /// Free lessons are viewable without any subscription
    pub is_free: bool,
    /// Object-storage key for the lesson video, if uploaded
    pub media_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(course_id: Uuid, title: String, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id,
            title,
            position,
            is_free: false,
            media_key: None,
            created_at: Utc::now(),
        }
    }

    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    pub fn with_media_key(mut self, key: String) -> Self {
        self.media_key = Some(key);
        self
    }
}
