use crate::common::error::Result;
use crate::domain::{
    Category, DisciplineRef, Instructor, InstructorAssignment, InstructorGroup, NewTest, TermGroup,
};
use async_trait::async_trait;
use std::fmt;

/// Bearer credential for the catalog service
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Whether the user holds a credential. Passed explicitly to every operation
/// that talks to the service; never looked up globally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(SessionToken),
}

impl Session {
    /// Blank tokens count as no token
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Session::Authenticated(SessionToken::new(t.trim())),
            _ => Session::Unauthenticated,
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            Session::Authenticated(token) => Some(token),
            Session::Unauthenticated => None,
        }
    }
}

/// Names of the `CatalogSource` operations, used for logs and metric labels
pub mod operation {
    pub const CATEGORIES: &str = "categories";
    pub const DISCIPLINE_REFERENCES: &str = "discipline_references";
    pub const INSTRUCTORS: &str = "instructors";
    pub const INSTRUCTORS_FOR_DISCIPLINE: &str = "instructors_for_discipline";
    pub const TESTS_BY_DISCIPLINE: &str = "tests_by_discipline";
    pub const TESTS_FOR_DISCIPLINE: &str = "tests_for_discipline";
    pub const TESTS_BY_INSTRUCTOR: &str = "tests_by_instructor";
    pub const TESTS_FOR_INSTRUCTOR: &str = "tests_for_instructor";
    pub const SUBMIT_TEST: &str = "submit_test";
    pub const NOTIFY_TEST_VIEWED: &str = "notify_test_viewed";
}

/// Everything the catalog core needs from the remote service
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_categories(&self, token: &SessionToken) -> Result<Vec<Category>>;

    async fn fetch_discipline_references(&self, token: &SessionToken) -> Result<Vec<DisciplineRef>>;

    async fn fetch_instructors(&self, token: &SessionToken) -> Result<Vec<Instructor>>;

    async fn fetch_instructors_for_discipline(
        &self,
        token: &SessionToken,
        discipline_id: i64,
    ) -> Result<Vec<InstructorAssignment>>;

    async fn fetch_tests_grouped_by_discipline(&self, token: &SessionToken) -> Result<Vec<TermGroup>>;

    async fn fetch_tests_for_discipline(&self, token: &SessionToken, discipline_id: i64) -> Result<Vec<TermGroup>>;

    async fn fetch_tests_grouped_by_instructor(&self, token: &SessionToken) -> Result<Vec<InstructorGroup>>;

    async fn fetch_tests_for_instructor(
        &self,
        token: &SessionToken,
        instructor_id: i64,
    ) -> Result<Vec<InstructorGroup>>;

    async fn submit_test(&self, token: &SessionToken, payload: &NewTest) -> Result<()>;

    /// Bump a test's view counter. The credential is attached when present.
    async fn notify_test_viewed(&self, token: Option<&SessionToken>, test_id: i64) -> Result<()>;
}

/// Result of an operation that needs a credential
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ready(T),
    /// No credential yet; nothing was requested
    NotReady,
}

impl<T> Outcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::NotReady => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }
}
