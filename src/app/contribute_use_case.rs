use crate::app::alert::Alert;
use crate::app::ports::{operation, CatalogSource, Outcome, Session};
use crate::catalog::selector::{ContributionFlow, FetchRequest};
use crate::common::constants::SUBMIT_SUCCESS_MESSAGE;
use crate::common::error::CatalogError;
use crate::domain::{Category, NewTest};
use crate::observability::metrics;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Drives a `ContributionFlow` against the catalog service.
///
/// Each step runs its fetch to completion before returning, so the next
/// step's fetch can never be issued ahead of it. Failures come back as
/// alerts; the flow stays where it was and the user can simply retry.
pub struct ContributeUseCase {
    source: Arc<dyn CatalogSource>,
    session: Session,
    flow: ContributionFlow,
}

type StepResult<T> = std::result::Result<Outcome<T>, Alert>;

impl ContributeUseCase {
    pub fn new(source: Arc<dyn CatalogSource>, session: Session) -> Self {
        Self {
            source,
            session,
            flow: ContributionFlow::new(),
        }
    }

    pub fn flow(&self) -> &ContributionFlow {
        &self.flow
    }

    pub fn categories(&self) -> &[Category] {
        self.flow.categories()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.flow.set_name(name);
    }

    pub fn set_document_url(&mut self, document_url: impl Into<String>) {
        self.flow.set_document_url(document_url);
    }

    fn skip(op: &'static str) {
        metrics::fetch::skipped_unauthenticated(op);
        info!(op, "no session credential yet, skipping");
    }

    fn fetch_failed(&mut self, op: &'static str, request: FetchRequest, err: CatalogError) -> Alert {
        metrics::fetch::error(op);
        warn!(op, "selector fetch failed: {}", err);
        self.flow.fetch_failed(request.ticket());
        Alert::from(&err)
    }

    /// Load the category options shown in the first selector
    #[instrument(skip(self))]
    pub async fn load_categories(&mut self) -> StepResult<()> {
        let Some(token) = self.session.token() else {
            Self::skip(operation::CATEGORIES);
            return Ok(Outcome::NotReady);
        };
        match self.source.fetch_categories(token).await {
            Ok(categories) => {
                metrics::fetch::success(operation::CATEGORIES);
                self.flow.categories_loaded(categories);
                Ok(Outcome::Ready(()))
            }
            Err(e) => {
                metrics::fetch::error(operation::CATEGORIES);
                warn!("category fetch failed: {}", e);
                Err(Alert::from(&e))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn choose_category(&mut self, category_id: i64) -> StepResult<()> {
        let Some(token) = self.session.token() else {
            Self::skip(operation::DISCIPLINE_REFERENCES);
            return Ok(Outcome::NotReady);
        };
        let request = self.flow.choose_category(category_id).map_err(|e| Alert::from(&e))?;
        metrics::selector::transition(self.flow.state().name());

        let fetched = self.source.fetch_discipline_references(token).await;
        match fetched {
            Ok(disciplines) => {
                metrics::fetch::success(operation::DISCIPLINE_REFERENCES);
                if !self.flow.disciplines_loaded(request.ticket(), disciplines) {
                    metrics::selector::stale_response();
                }
                metrics::selector::transition(self.flow.state().name());
                Ok(Outcome::Ready(()))
            }
            Err(e) => Err(self.fetch_failed(operation::DISCIPLINE_REFERENCES, request, e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn choose_discipline(&mut self, discipline_id: i64) -> StepResult<()> {
        let Some(token) = self.session.token() else {
            Self::skip(operation::INSTRUCTORS_FOR_DISCIPLINE);
            return Ok(Outcome::NotReady);
        };
        let request = self.flow.choose_discipline(discipline_id).map_err(|e| Alert::from(&e))?;
        metrics::selector::transition(self.flow.state().name());

        let fetched = self
            .source
            .fetch_instructors_for_discipline(token, discipline_id)
            .await;
        match fetched {
            Ok(assignments) => {
                metrics::fetch::success(operation::INSTRUCTORS_FOR_DISCIPLINE);
                if !self.flow.instructors_loaded(request.ticket(), assignments) {
                    metrics::selector::stale_response();
                }
                metrics::selector::transition(self.flow.state().name());
                Ok(Outcome::Ready(()))
            }
            Err(e) => Err(self.fetch_failed(operation::INSTRUCTORS_FOR_DISCIPLINE, request, e)),
        }
    }

    /// Pick the instructor-discipline pairing; returns the candidate payload.
    #[instrument(skip(self))]
    pub fn choose_instructor_discipline(&mut self, teacher_discipline_id: i64) -> std::result::Result<NewTest, Alert> {
        let payload = self
            .flow
            .choose_instructor_discipline(teacher_discipline_id)
            .map_err(|e| Alert::from(&e))?;
        metrics::selector::transition(self.flow.state().name());
        Ok(payload)
    }

    /// Validate and send the assembled payload. Validation failures are
    /// reported before anything is sent; a rejected submission leaves every
    /// selection in place for a retry. An accepted one closes the flow.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> StepResult<Alert> {
        let Some(token) = self.session.token() else {
            Self::skip(operation::SUBMIT_TEST);
            return Ok(Outcome::NotReady);
        };

        let payload = match self.flow.validated_payload() {
            Ok(payload) => payload,
            Err(e) => {
                if matches!(e, CatalogError::Validation(_)) {
                    metrics::selector::validation_rejected();
                }
                return Err(Alert::from(&e));
            }
        };

        match self.source.submit_test(token, &payload).await {
            Ok(()) => {
                metrics::selector::submission_success();
                info!(name = %payload.name, "test submitted");
                if let Err(e) = self.flow.mark_submitted() {
                    warn!("flow could not be closed after submission: {}", e);
                }
                metrics::selector::transition(self.flow.state().name());
                Ok(Outcome::Ready(Alert::success(SUBMIT_SUCCESS_MESSAGE)))
            }
            Err(e) => {
                metrics::selector::submission_rejected();
                warn!("submission rejected: {}", e);
                Err(Alert::from(&e))
            }
        }
    }
}
