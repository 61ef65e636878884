use crate::app::ports::{operation, CatalogSource, SessionToken};
use crate::common::error::{CatalogError, Result};
use crate::domain::{
    Category, DisciplineRef, Instructor, InstructorAssignment, InstructorGroup, NewTest, TermGroup,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory catalog for development/testing.
///
/// Records every call it receives, and can be told to fail individual
/// operations (by name from `ports::operation`).
#[derive(Default)]
pub struct InMemoryCatalog {
    categories: Vec<Category>,
    disciplines: Vec<DisciplineRef>,
    instructors: Vec<Instructor>,
    assignments: HashMap<i64, Vec<InstructorAssignment>>,
    term_groups: Vec<TermGroup>,
    instructor_groups: Vec<InstructorGroup>,
    calls: Mutex<Vec<&'static str>>,
    submitted: Mutex<Vec<NewTest>>,
    viewed: Mutex<Vec<i64>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_disciplines(mut self, disciplines: Vec<DisciplineRef>) -> Self {
        self.disciplines = disciplines;
        self
    }

    pub fn with_instructors(mut self, instructors: Vec<Instructor>) -> Self {
        self.instructors = instructors;
        self
    }

    /// Instructor pairings answered for one discipline
    pub fn with_assignments(mut self, discipline_id: i64, assignments: Vec<InstructorAssignment>) -> Self {
        self.assignments.insert(discipline_id, assignments);
        self
    }

    pub fn with_term_groups(mut self, groups: Vec<TermGroup>) -> Self {
        self.term_groups = groups;
        self
    }

    pub fn with_instructor_groups(mut self, groups: Vec<InstructorGroup>) -> Self {
        self.instructor_groups = groups;
        self
    }

    pub async fn fail_on(&self, op: &'static str) {
        self.failing.lock().await.insert(op);
    }

    pub async fn recover(&self, op: &'static str) {
        self.failing.lock().await.remove(op);
    }

    /// Operation names in the order they were called
    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }

    pub async fn submitted(&self) -> Vec<NewTest> {
        self.submitted.lock().await.clone()
    }

    pub async fn viewed(&self) -> Vec<i64> {
        self.viewed.lock().await.clone()
    }

    async fn enter(&self, op: &'static str) -> Result<()> {
        debug!(op, "in-memory catalog call");
        self.calls.lock().await.push(op);
        if self.failing.lock().await.contains(op) {
            return Err(CatalogError::Api {
                status: 503,
                message: format!("{op} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn fetch_categories(&self, _token: &SessionToken) -> Result<Vec<Category>> {
        self.enter(operation::CATEGORIES).await?;
        Ok(self.categories.clone())
    }

    async fn fetch_discipline_references(&self, _token: &SessionToken) -> Result<Vec<DisciplineRef>> {
        self.enter(operation::DISCIPLINE_REFERENCES).await?;
        Ok(self.disciplines.clone())
    }

    async fn fetch_instructors(&self, _token: &SessionToken) -> Result<Vec<Instructor>> {
        self.enter(operation::INSTRUCTORS).await?;
        Ok(self.instructors.clone())
    }

    async fn fetch_instructors_for_discipline(
        &self,
        _token: &SessionToken,
        discipline_id: i64,
    ) -> Result<Vec<InstructorAssignment>> {
        self.enter(operation::INSTRUCTORS_FOR_DISCIPLINE).await?;
        Ok(self.assignments.get(&discipline_id).cloned().unwrap_or_default())
    }

    async fn fetch_tests_grouped_by_discipline(&self, _token: &SessionToken) -> Result<Vec<TermGroup>> {
        self.enter(operation::TESTS_BY_DISCIPLINE).await?;
        Ok(self.term_groups.clone())
    }

    async fn fetch_tests_for_discipline(&self, _token: &SessionToken, discipline_id: i64) -> Result<Vec<TermGroup>> {
        self.enter(operation::TESTS_FOR_DISCIPLINE).await?;
        let groups = self
            .term_groups
            .iter()
            .filter_map(|group| {
                let disciplines: Vec<_> = group
                    .disciplines
                    .iter()
                    .filter(|d| d.id == discipline_id)
                    .cloned()
                    .collect();
                (!disciplines.is_empty()).then(|| TermGroup {
                    disciplines,
                    ..group.clone()
                })
            })
            .collect();
        Ok(groups)
    }

    async fn fetch_tests_grouped_by_instructor(&self, _token: &SessionToken) -> Result<Vec<InstructorGroup>> {
        self.enter(operation::TESTS_BY_INSTRUCTOR).await?;
        Ok(self.instructor_groups.clone())
    }

    async fn fetch_tests_for_instructor(
        &self,
        _token: &SessionToken,
        instructor_id: i64,
    ) -> Result<Vec<InstructorGroup>> {
        self.enter(operation::TESTS_FOR_INSTRUCTOR).await?;
        Ok(self
            .instructor_groups
            .iter()
            .filter(|g| g.instructor.id == instructor_id)
            .cloned()
            .collect())
    }

    async fn submit_test(&self, _token: &SessionToken, payload: &NewTest) -> Result<()> {
        self.enter(operation::SUBMIT_TEST).await?;
        self.submitted.lock().await.push(payload.clone());
        Ok(())
    }

    async fn notify_test_viewed(&self, _token: Option<&SessionToken>, test_id: i64) -> Result<()> {
        self.enter(operation::NOTIFY_TEST_VIEWED).await?;
        self.viewed.lock().await.push(test_id);
        Ok(())
    }
}
