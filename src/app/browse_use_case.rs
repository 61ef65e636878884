use crate::app::alert::Alert;
use crate::app::ports::{operation, CatalogSource, Outcome, Session, SessionToken};
use crate::catalog::filter::{category_breakdown, orphan_category_ids, CategorySection};
use crate::catalog::normalize::{group_by_instructor, group_by_term, BrowseNode, TermSection};
use crate::common::error::Result;
use crate::domain::{Category, DisciplineRef, Instructor};
use crate::observability::metrics;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Tests grouped by term and discipline, plus what the filter picker needs
#[derive(Debug, Clone, PartialEq)]
pub struct DisciplineCatalog {
    pub terms: Vec<TermSection>,
    pub categories: Vec<Category>,
    pub disciplines: Vec<DisciplineRef>,
}

impl DisciplineCatalog {
    pub fn sections(&self, discipline: &BrowseNode) -> Vec<CategorySection> {
        category_breakdown(&self.categories, discipline)
    }
}

/// Tests grouped by instructor, plus what the filter picker needs
#[derive(Debug, Clone, PartialEq)]
pub struct InstructorCatalog {
    pub instructors: Vec<BrowseNode>,
    pub categories: Vec<Category>,
    pub all_instructors: Vec<Instructor>,
}

impl InstructorCatalog {
    pub fn sections(&self, instructor: &BrowseNode) -> Vec<CategorySection> {
        category_breakdown(&self.categories, instructor)
    }
}

/// Loads the two browse views. Fetches within a view run one after the
/// other: tests, then categories, then the picker's reference list.
pub struct BrowseUseCase {
    source: Arc<dyn CatalogSource>,
}

async fn tracked<T, F>(op: &'static str, fut: F) -> std::result::Result<T, Alert>
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => {
            metrics::fetch::success(op);
            Ok(value)
        }
        Err(e) => {
            metrics::fetch::error(op);
            warn!(op, "catalog fetch failed: {}", e);
            Err(Alert::from(&e))
        }
    }
}

fn require_token<'a>(session: &'a Session, op: &'static str) -> Option<&'a SessionToken> {
    let token = session.token();
    if token.is_none() {
        metrics::fetch::skipped_unauthenticated(op);
        info!(op, "no session credential yet, skipping fetch");
    }
    token
}

fn warn_orphans(categories: &[Category], nodes: &[BrowseNode]) {
    let orphans = orphan_category_ids(categories, nodes);
    if !orphans.is_empty() {
        warn!(?orphans, "tests reference categories missing from the category list");
    }
}

impl BrowseUseCase {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    async fn term_sections(
        &self,
        token: &SessionToken,
        discipline_id: Option<i64>,
    ) -> std::result::Result<Vec<TermSection>, Alert> {
        let groups = match discipline_id {
            Some(id) => {
                tracked(
                    operation::TESTS_FOR_DISCIPLINE,
                    self.source.fetch_tests_for_discipline(token, id),
                )
                .await?
            }
            None => {
                tracked(
                    operation::TESTS_BY_DISCIPLINE,
                    self.source.fetch_tests_grouped_by_discipline(token),
                )
                .await?
            }
        };
        Ok(group_by_term(&groups))
    }

    async fn instructor_nodes(
        &self,
        token: &SessionToken,
        instructor_id: Option<i64>,
    ) -> std::result::Result<Vec<BrowseNode>, Alert> {
        let groups = match instructor_id {
            Some(id) => {
                tracked(
                    operation::TESTS_FOR_INSTRUCTOR,
                    self.source.fetch_tests_for_instructor(token, id),
                )
                .await?
            }
            None => {
                tracked(
                    operation::TESTS_BY_INSTRUCTOR,
                    self.source.fetch_tests_grouped_by_instructor(token),
                )
                .await?
            }
        };
        Ok(group_by_instructor(&groups))
    }

    /// Browse by term and discipline, optionally narrowed to one discipline.
    #[instrument(skip(self, session))]
    pub async fn load_by_discipline(
        &self,
        session: &Session,
        discipline_id: Option<i64>,
    ) -> std::result::Result<Outcome<DisciplineCatalog>, Alert> {
        let Some(token) = require_token(session, operation::TESTS_BY_DISCIPLINE) else {
            return Ok(Outcome::NotReady);
        };

        let terms = self.term_sections(token, discipline_id).await?;
        let categories = tracked(operation::CATEGORIES, self.source.fetch_categories(token)).await?;
        let disciplines = tracked(
            operation::DISCIPLINE_REFERENCES,
            self.source.fetch_discipline_references(token),
        )
        .await?;

        let nodes: Vec<BrowseNode> = terms.iter().flat_map(|t| t.disciplines.iter().cloned()).collect();
        warn_orphans(&categories, &nodes);
        info!(terms = terms.len(), categories = categories.len(), "loaded discipline view");

        Ok(Outcome::Ready(DisciplineCatalog {
            terms,
            categories,
            disciplines,
        }))
    }

    /// Re-fetch only the tests for one discipline. On failure the catalog is
    /// left exactly as it was.
    #[instrument(skip(self, session, catalog))]
    pub async fn filter_by_discipline(
        &self,
        session: &Session,
        catalog: &mut DisciplineCatalog,
        discipline_id: i64,
    ) -> std::result::Result<Outcome<()>, Alert> {
        let Some(token) = require_token(session, operation::TESTS_FOR_DISCIPLINE) else {
            return Ok(Outcome::NotReady);
        };
        catalog.terms = self.term_sections(token, Some(discipline_id)).await?;
        Ok(Outcome::Ready(()))
    }

    /// Browse by instructor, optionally narrowed to one instructor.
    #[instrument(skip(self, session))]
    pub async fn load_by_instructor(
        &self,
        session: &Session,
        instructor_id: Option<i64>,
    ) -> std::result::Result<Outcome<InstructorCatalog>, Alert> {
        let Some(token) = require_token(session, operation::TESTS_BY_INSTRUCTOR) else {
            return Ok(Outcome::NotReady);
        };

        let instructors = self.instructor_nodes(token, instructor_id).await?;
        let categories = tracked(operation::CATEGORIES, self.source.fetch_categories(token)).await?;
        let all_instructors = tracked(operation::INSTRUCTORS, self.source.fetch_instructors(token)).await?;

        warn_orphans(&categories, &instructors);
        info!(
            instructors = instructors.len(),
            categories = categories.len(),
            "loaded instructor view"
        );

        Ok(Outcome::Ready(InstructorCatalog {
            instructors,
            categories,
            all_instructors,
        }))
    }

    /// Re-fetch only the tests for one instructor. On failure the catalog is
    /// left exactly as it was.
    #[instrument(skip(self, session, catalog))]
    pub async fn filter_by_instructor(
        &self,
        session: &Session,
        catalog: &mut InstructorCatalog,
        instructor_id: i64,
    ) -> std::result::Result<Outcome<()>, Alert> {
        let Some(token) = require_token(session, operation::TESTS_FOR_INSTRUCTOR) else {
            return Ok(Outcome::NotReady);
        };
        catalog.instructors = self.instructor_nodes(token, Some(instructor_id)).await?;
        Ok(Outcome::Ready(()))
    }

    /// Categories on their own, for pickers outside the browse views
    pub async fn categories(&self, session: &Session) -> std::result::Result<Outcome<Vec<Category>>, Alert> {
        let Some(token) = require_token(session, operation::CATEGORIES) else {
            return Ok(Outcome::NotReady);
        };
        let categories = tracked(operation::CATEGORIES, self.source.fetch_categories(token)).await?;
        Ok(Outcome::Ready(categories))
    }
}
