//! SQLite storage layer for Lektora

mod courses;
mod lessons;
mod migrations;
mod packages;
mod parse;
mod quizzes;
mod subscriptions;
mod traits;
mod users;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Course, Lesson, Package, Quiz, QuizQuestion, Session, Subscription, User};

pub use courses::CourseStore;
pub use lessons::LessonStore;
pub use packages::PackageStore;
pub use quizzes::QuizStore;
pub use subscriptions::SubscriptionStore;
pub use traits::{
    CatalogRepository, QuizRepository, Storage, SubscriptionRepository, UserRepository,
};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get package store
    pub fn packages(&self) -> PackageStore<'_> {
        PackageStore::new(&self.conn)
    }

    /// Get course store
    pub fn courses(&self) -> CourseStore<'_> {
        CourseStore::new(&self.conn)
    }

    /// Get lesson store
    pub fn lessons(&self) -> LessonStore<'_> {
        LessonStore::new(&self.conn)
    }

    /// Get subscription store
    pub fn subscriptions(&self) -> SubscriptionStore<'_> {
        SubscriptionStore::new(&self.conn)
    }

    /// Get quiz store
    pub fn quizzes(&self) -> QuizStore<'_> {
        QuizStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users().find_by_username(username)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users().find_by_email(email)
    }

    fn user_exists(&self, id: Uuid) -> Result<bool> {
        self.users().exists(id)
    }

    fn update_last_login(&self, user_id: Uuid) -> Result<()> {
        self.users().update_last_login(user_id)
    }

    fn create_session(&self, session: &Session) -> Result<()> {
        self.users().create_session(session)
    }

    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.users().find_valid_session(session_id)
    }

    fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.users().delete_session(session_id)
    }

    fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.users().cleanup_expired_sessions()
    }
}

impl CatalogRepository for Database {
    fn create_package(&self, package: &Package) -> Result<()> {
        self.packages().create(package)
    }

    fn find_package_by_id(&self, id: Uuid) -> Result<Option<Package>> {
        self.packages().find_by_id(id)
    }

    fn package_exists(&self, id: Uuid) -> Result<bool> {
        self.packages().exists(id)
    }

    fn update_package(&self, package: &Package) -> Result<()> {
        self.packages().update(package)
    }

    fn delete_package(&self, package_id: Uuid) -> Result<()> {
        self.packages().delete(package_id)
    }

    fn list_packages(&self) -> Result<Vec<Package>> {
        self.packages().list()
    }

    fn create_course(&self, course: &Course) -> Result<()> {
        self.courses().create(course)
    }

    fn find_course_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        self.courses().find_by_id(id)
    }

    fn course_exists(&self, id: Uuid) -> Result<bool> {
        self.courses().exists(id)
    }

    fn update_course(&self, course: &Course) -> Result<()> {
        self.courses().update(course)
    }

    fn delete_course(&self, course_id: Uuid) -> Result<()> {
        self.courses().delete(course_id)
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        self.courses().list()
    }

    fn create_lesson(&self, lesson: &Lesson) -> Result<()> {
        self.lessons().create(lesson)
    }

    fn find_lesson_by_id(&self, id: Uuid) -> Result<Option<Lesson>> {
        self.lessons().find_by_id(id)
    }

    fn lesson_exists(&self, id: Uuid) -> Result<bool> {
        self.lessons().exists(id)
    }

    fn update_lesson(&self, lesson: &Lesson) -> Result<()> {
        self.lessons().update(lesson)
    }

    fn delete_lesson(&self, lesson_id: Uuid) -> Result<()> {
        self.lessons().delete(lesson_id)
    }

    fn list_lessons_for_course(&self, course_id: Uuid) -> Result<Vec<Lesson>> {
        self.lessons().list_for_course(course_id)
    }

    fn lesson_course(&self, lesson_id: Uuid) -> Result<Option<Uuid>> {
        self.lessons().course_of(lesson_id)
    }

    fn add_course_to_package(&self, package_id: Uuid, course_id: Uuid) -> Result<()> {
        self.packages().add_course(package_id, course_id)
    }

    fn remove_course_from_package(&self, package_id: Uuid, course_id: Uuid) -> Result<()> {
        self.packages().remove_course(package_id, course_id)
    }

    fn courses_in_package(&self, package_id: Uuid) -> Result<Vec<Course>> {
        self.packages().courses_in_package(package_id)
    }

    fn packages_containing_course(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        self.packages().packages_containing_course(course_id)
    }
}

impl SubscriptionRepository for Database {
    fn create_subscription(&self, sub: &Subscription) -> Result<()> {
        self.subscriptions().create(sub)
    }

    fn find_subscription_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        self.subscriptions().find_by_id(id)
    }

    fn list_subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        self.subscriptions().list_for_user(user_id)
    }

    fn list_subscriptions_for_user_package(
        &self,
        user_id: Uuid,
        package_id: Uuid,
    ) -> Result<Vec<Subscription>> {
        self.subscriptions().list_for_user_package(user_id, package_id)
    }

    fn delete_subscription(&self, subscription_id: Uuid) -> Result<()> {
        self.subscriptions().delete(subscription_id)
    }
}

impl QuizRepository for Database {
    fn create_quiz(&self, quiz: &Quiz) -> Result<()> {
        self.quizzes().create(quiz)
    }

    fn find_quiz_by_id(&self, id: Uuid) -> Result<Option<Quiz>> {
        self.quizzes().find_by_id(id)
    }

    fn list_quizzes_for_lesson(&self, lesson_id: Uuid) -> Result<Vec<Quiz>> {
        self.quizzes().list_for_lesson(lesson_id)
    }

    fn delete_quiz(&self, quiz_id: Uuid) -> Result<()> {
        self.quizzes().delete(quiz_id)
    }

    fn add_quiz_question(&self, question: &QuizQuestion) -> Result<()> {
        self.quizzes().add_question(question)
    }

    fn list_quiz_questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>> {
        self.quizzes().list_questions(quiz_id)
    }

    fn delete_quiz_question(&self, question_id: Uuid) -> Result<()> {
        self.quizzes().delete_question(question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::{Duration, Utc};

    fn make_user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
            Role::Student,
        )
    }

    #[test]
    fn test_user_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let user = make_user("alice");
        db.users().create(&user).unwrap();

        let found = db.users().find_by_id(user.id).unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.role, Role::Student);
        assert!(db.users().exists(user.id).unwrap());
        assert!(!db.users().exists(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.users().create(&make_user("bob")).unwrap();

        let dup = User::new(
            "bob".to_string(),
            "other@example.com".to_string(),
            "hash".to_string(),
            Role::Student,
        );
        assert!(db.users().create(&dup).is_err());
    }

    #[test]
    fn test_containment_queries() {
        let db = Database::open_in_memory().unwrap();

        let p1 = Package::new("Starter".into(), None, 4900);
        let p2 = Package::new("Complete".into(), None, 9900);
        let course = Course::new("Rust Basics".into(), None);
        db.packages().create(&p1).unwrap();
        db.packages().create(&p2).unwrap();
        db.courses().create(&course).unwrap();

        db.packages().add_course(p1.id, course.id).unwrap();
        db.packages().add_course(p2.id, course.id).unwrap();
        // Adding twice is a no-op
        db.packages().add_course(p1.id, course.id).unwrap();

        let mut containing = db.packages().packages_containing_course(course.id).unwrap();
        containing.sort();
        let mut expected = vec![p1.id, p2.id];
        expected.sort();
        assert_eq!(containing, expected);

        db.packages().remove_course(p1.id, course.id).unwrap();
        let containing = db.packages().packages_containing_course(course.id).unwrap();
        assert_eq!(containing, vec![p2.id]);
    }

    #[test]
    fn test_orphan_course_has_no_packages() {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("Orphan".into(), None);
        db.courses().create(&course).unwrap();

        let containing = db.packages().packages_containing_course(course.id).unwrap();
        assert!(containing.is_empty());
    }

    #[test]
    fn test_lesson_owner_lookup() {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("Rust Basics".into(), None);
        db.courses().create(&course).unwrap();

        let lesson = Lesson::new(course.id, "Ownership".into(), 1);
        db.lessons().create(&lesson).unwrap();

        assert_eq!(db.lessons().course_of(lesson.id).unwrap(), Some(course.id));
        assert_eq!(db.lessons().course_of(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_lessons_ordered_by_position() {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("Rust Basics".into(), None);
        db.courses().create(&course).unwrap();

        db.lessons()
            .create(&Lesson::new(course.id, "Second".into(), 2))
            .unwrap();
        db.lessons()
            .create(&Lesson::new(course.id, "First".into(), 1))
            .unwrap();

        let lessons = db.lessons().list_for_course(course.id).unwrap();
        let titles: Vec<_> = lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_subscription_rows_unfiltered_by_time() {
        let db = Database::open_in_memory().unwrap();
        let user = make_user("carol");
        let package = Package::new("Complete".into(), None, 9900);
        db.users().create(&user).unwrap();
        db.packages().create(&package).unwrap();

        let now = Utc::now();
        let mut expired = Subscription::purchase(user.id, package.id, now - Duration::days(400));
        expired.end_date = now - Duration::days(35);
        let active = Subscription::purchase(user.id, package.id, now);
        db.subscriptions().create(&expired).unwrap();
        db.subscriptions().create(&active).unwrap();

        // The store returns every row; activity is the engine's decision
        let rows = db
            .subscriptions()
            .list_for_user_package(user.id, package.id)
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_quiz_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("Rust Basics".into(), None);
        db.courses().create(&course).unwrap();
        let lesson = Lesson::new(course.id, "Ownership".into(), 1);
        db.lessons().create(&lesson).unwrap();

        let quiz = Quiz::new(lesson.id, "Ownership check".into());
        db.quizzes().create(&quiz).unwrap();

        let question = QuizQuestion::new(
            quiz.id,
            "Who owns a moved value?".into(),
            vec!["The caller".into(), "The new binding".into()],
            1,
            1,
        );
        db.quizzes().add_question(&question).unwrap();

        let questions = db.quizzes().list_questions(quiz.id).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].choices.len(), 2);
        assert!(questions[0].is_correct(1));
    }

    #[test]
    fn test_cascade_on_course_delete() {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("Doomed".into(), None);
        db.courses().create(&course).unwrap();
        let lesson = Lesson::new(course.id, "Gone soon".into(), 1);
        db.lessons().create(&lesson).unwrap();

        db.courses().delete(course.id).unwrap();
        assert!(db.lessons().find_by_id(lesson.id).unwrap().is_none());
    }
}
