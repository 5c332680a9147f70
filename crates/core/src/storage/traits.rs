//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future network backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Course, Lesson, Package, Quiz, QuizQuestion, Session, Subscription, User};

/// User repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Find user by username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find user by email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Check whether a user id exists
    fn user_exists(&self, id: Uuid) -> Result<bool>;

    /// Update user's last login time
    fn update_last_login(&self, user_id: Uuid) -> Result<()>;

    /// Create a session
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Find a valid (non-expired) session
    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Delete a session
    fn delete_session(&self, session_id: Uuid) -> Result<()>;

    /// Clean up expired sessions
    fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// Catalog repository operations: packages, courses, lessons, containment
pub trait CatalogRepository {
    /// Create a new package
    fn create_package(&self, package: &Package) -> Result<()>;

    /// Find package by ID
    fn find_package_by_id(&self, id: Uuid) -> Result<Option<Package>>;

    /// Check whether a package id exists
    fn package_exists(&self, id: Uuid) -> Result<bool>;

    /// Update a package
    fn update_package(&self, package: &Package) -> Result<()>;

    /// Delete a package
    fn delete_package(&self, package_id: Uuid) -> Result<()>;

    /// List all packages
    fn list_packages(&self) -> Result<Vec<Package>>;

    /// Create a new course
    fn create_course(&self, course: &Course) -> Result<()>;

    /// Find course by ID
    fn find_course_by_id(&self, id: Uuid) -> Result<Option<Course>>;

    /// Check whether a course id exists
    fn course_exists(&self, id: Uuid) -> Result<bool>;

    /// Update a course
    fn update_course(&self, course: &Course) -> Result<()>;

    /// Delete a course
    fn delete_course(&self, course_id: Uuid) -> Result<()>;

    /// List all courses
    fn list_courses(&self) -> Result<Vec<Course>>;

    /// Create a new lesson
    fn create_lesson(&self, lesson: &Lesson) -> Result<()>;

    /// Find lesson by ID
    fn find_lesson_by_id(&self, id: Uuid) -> Result<Option<Lesson>>;

    /// Check whether a lesson id exists
    fn lesson_exists(&self, id: Uuid) -> Result<bool>;

    /// Update a lesson
    fn update_lesson(&self, lesson: &Lesson) -> Result<()>;

    /// Delete a lesson
    fn delete_lesson(&self, lesson_id: Uuid) -> Result<()>;

    /// List lessons of a course in position order
    fn list_lessons_for_course(&self, course_id: Uuid) -> Result<Vec<Lesson>>;

    /// Get the owning course id for a lesson
    fn lesson_course(&self, lesson_id: Uuid) -> Result<Option<Uuid>>;

    /// Add a course to a package
    fn add_course_to_package(&self, package_id: Uuid, course_id: Uuid) -> Result<()>;

    /// Remove a course from a package
    fn remove_course_from_package(&self, package_id: Uuid, course_id: Uuid) -> Result<()>;

    /// List the courses bundled in a package
    fn courses_in_package(&self, package_id: Uuid) -> Result<Vec<Course>>;

    /// Ids of every package containing the given course
    fn packages_containing_course(&self, course_id: Uuid) -> Result<Vec<Uuid>>;
}

/// Subscription repository operations
pub trait SubscriptionRepository {
    /// Create a new subscription
    fn create_subscription(&self, sub: &Subscription) -> Result<()>;

    /// Find subscription by ID
    fn find_subscription_by_id(&self, id: Uuid) -> Result<Option<Subscription>>;

    /// All subscriptions held by a user
    fn list_subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>>;

    /// All subscriptions a user holds for one package
    fn list_subscriptions_for_user_package(
        &self,
        user_id: Uuid,
        package_id: Uuid,
    ) -> Result<Vec<Subscription>>;

    /// Delete a subscription
    fn delete_subscription(&self, subscription_id: Uuid) -> Result<()>;
}

/// Quiz repository operations
pub trait QuizRepository {
    /// Create a new quiz
    fn create_quiz(&self, quiz: &Quiz) -> Result<()>;

    /// Find quiz by ID
    fn find_quiz_by_id(&self, id: Uuid) -> Result<Option<Quiz>>;

    /// Quizzes attached to a lesson
    fn list_quizzes_for_lesson(&self, lesson_id: Uuid) -> Result<Vec<Quiz>>;

    /// Delete a quiz
    fn delete_quiz(&self, quiz_id: Uuid) -> Result<()>;

    /// Add a question to a quiz
    fn add_quiz_question(&self, question: &QuizQuestion) -> Result<()>;

    /// Questions of a quiz in position order
    fn list_quiz_questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>>;

    /// Delete a single question
    fn delete_quiz_question(&self, question_id: Uuid) -> Result<()>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage:
    UserRepository + CatalogRepository + SubscriptionRepository + QuizRepository
{
}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository + CatalogRepository + SubscriptionRepository + QuizRepository
{
}
