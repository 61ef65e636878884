//! Dependent category → discipline → instructor-discipline selector.
//!
//! `ContributionFlow` is a pure value: choosing an option returns the fetch the
//! caller must perform, and the caller feeds the result back through
//! `disciplines_loaded` / `instructors_loaded` / `fetch_failed`. A selector
//! unlocks only once its option list has arrived, never when the upstream
//! value is merely chosen.
//!
//! Once a selector is unlocked it stays unlocked: re-choosing an upstream
//! option re-fetches the downstream list but does not re-lock anything. An
//! option list that arrives empty leaves its selector locked.
//!
//! A successful submission moves the flow to `Submitted`, after which every
//! choice and any further submission is refused.
//!
//! Each issued fetch carries a `Ticket`; a completion whose ticket is not the
//! latest one issued for that step is dropped, so a slow response for an
//! earlier choice cannot overwrite the list for a newer one.

use crate::common::constants::REQUIRED_FIELDS_MESSAGE;
use crate::common::error::{CatalogError, Result};
use crate::domain::{Category, DisciplineRef, InstructorAssignment, NewTest};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Work the caller must do after a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    DisciplineReferences { ticket: Ticket },
    InstructorsForDiscipline { ticket: Ticket, discipline_id: i64 },
}

impl FetchRequest {
    pub fn ticket(&self) -> Ticket {
        match self {
            FetchRequest::DisciplineReferences { ticket } => *ticket,
            FetchRequest::InstructorsForDiscipline { ticket, .. } => *ticket,
        }
    }
}

/// Progress through the flow. Choosing an instructor-discipline pairing
/// assembles the payload synchronously, so that choice lands directly in
/// `Submittable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectorState {
    #[default]
    Idle,
    CategoryChosen {
        category_id: i64,
    },
    DisciplinesLoaded {
        category_id: i64,
    },
    DisciplineChosen {
        category_id: i64,
        discipline_id: i64,
    },
    InstructorsLoaded {
        category_id: i64,
        discipline_id: i64,
    },
    Submittable {
        category_id: i64,
        discipline_id: i64,
        teacher_discipline_id: i64,
    },
    /// Terminal: the service accepted the test
    Submitted {
        category_id: i64,
        discipline_id: i64,
        teacher_discipline_id: i64,
    },
}

impl SelectorState {
    pub fn name(&self) -> &'static str {
        match self {
            SelectorState::Idle => "idle",
            SelectorState::CategoryChosen { .. } => "category_chosen",
            SelectorState::DisciplinesLoaded { .. } => "disciplines_loaded",
            SelectorState::DisciplineChosen { .. } => "discipline_chosen",
            SelectorState::InstructorsLoaded { .. } => "instructors_loaded",
            SelectorState::Submittable { .. } => "submittable",
            SelectorState::Submitted { .. } => "submitted",
        }
    }

    fn category_id(&self) -> Option<i64> {
        match self {
            SelectorState::Idle => None,
            SelectorState::CategoryChosen { category_id }
            | SelectorState::DisciplinesLoaded { category_id }
            | SelectorState::DisciplineChosen { category_id, .. }
            | SelectorState::InstructorsLoaded { category_id, .. }
            | SelectorState::Submittable { category_id, .. }
            | SelectorState::Submitted { category_id, .. } => Some(*category_id),
        }
    }

    fn with_category(&self, category_id: i64) -> SelectorState {
        match *self {
            SelectorState::Submitted { .. } => *self,
            SelectorState::Idle | SelectorState::CategoryChosen { .. } => {
                SelectorState::CategoryChosen { category_id }
            }
            SelectorState::DisciplinesLoaded { .. } => SelectorState::DisciplinesLoaded { category_id },
            SelectorState::DisciplineChosen { discipline_id, .. } => SelectorState::DisciplineChosen {
                category_id,
                discipline_id,
            },
            SelectorState::InstructorsLoaded { discipline_id, .. } => SelectorState::InstructorsLoaded {
                category_id,
                discipline_id,
            },
            SelectorState::Submittable {
                discipline_id,
                teacher_discipline_id,
                ..
            } => SelectorState::Submittable {
                category_id,
                discipline_id,
                teacher_discipline_id,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContributionFlow {
    state: SelectorState,
    name: String,
    document_url: String,
    categories: Option<Vec<Category>>,
    disciplines: Option<Vec<DisciplineRef>>,
    instructors: Option<Vec<InstructorAssignment>>,
    pending_disciplines: Option<Ticket>,
    pending_instructors: Option<Ticket>,
    next_ticket: u64,
}

impl ContributionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Category options; empty until the list arrives
    pub fn categories(&self) -> &[Category] {
        self.categories.as_deref().unwrap_or(&[])
    }

    /// Discipline options; empty until the first list arrives
    pub fn disciplines(&self) -> &[DisciplineRef] {
        self.disciplines.as_deref().unwrap_or(&[])
    }

    /// Instructor options; empty until the first list arrives
    pub fn instructors(&self) -> &[InstructorAssignment] {
        self.instructors.as_deref().unwrap_or(&[])
    }

    pub fn category_selector_enabled(&self) -> bool {
        !self.is_submitted() && !self.categories().is_empty()
    }

    pub fn discipline_selector_enabled(&self) -> bool {
        !self.is_submitted() && !self.disciplines().is_empty()
    }

    pub fn instructor_selector_enabled(&self) -> bool {
        !self.is_submitted() && !self.instructors().is_empty()
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SelectorState::Submitted { .. })
    }

    pub fn submit_enabled(&self) -> bool {
        matches!(self.state, SelectorState::Submittable { .. })
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_document_url(&mut self, document_url: impl Into<String>) {
        self.document_url = document_url.into();
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn transition(&mut self, next: SelectorState) {
        if next != self.state {
            debug!(from = self.state.name(), to = next.name(), "selector transition");
        }
        self.state = next;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_submitted() {
            return Err(CatalogError::Locked("the test was already submitted".to_string()));
        }
        Ok(())
    }

    /// Deliver the category list. Categories are loaded once, up front, so no
    /// ticket is involved.
    pub fn categories_loaded(&mut self, categories: Vec<Category>) {
        self.categories = Some(categories);
    }

    /// Record a category and ask for the discipline list.
    pub fn choose_category(&mut self, category_id: i64) -> Result<FetchRequest> {
        self.ensure_open()?;
        if !self.category_selector_enabled() {
            return Err(CatalogError::Locked(
                "category options have not loaded yet".to_string(),
            ));
        }
        if !self.categories().iter().any(|c| c.id == category_id) {
            return Err(CatalogError::Validation(format!(
                "unknown category {category_id}"
            )));
        }

        let next = self.state.with_category(category_id);
        self.transition(next);
        let ticket = self.issue_ticket();
        self.pending_disciplines = Some(ticket);
        Ok(FetchRequest::DisciplineReferences { ticket })
    }

    /// Deliver the discipline list. Returns false when the response was stale
    /// and got dropped.
    pub fn disciplines_loaded(&mut self, ticket: Ticket, disciplines: Vec<DisciplineRef>) -> bool {
        if self.pending_disciplines != Some(ticket) {
            debug!(?ticket, "dropping stale discipline list");
            return false;
        }
        self.pending_disciplines = None;
        self.disciplines = Some(disciplines);
        if let SelectorState::CategoryChosen { category_id } = self.state {
            self.transition(SelectorState::DisciplinesLoaded { category_id });
        }
        true
    }

    /// Record a discipline and ask for its instructor pairings.
    pub fn choose_discipline(&mut self, discipline_id: i64) -> Result<FetchRequest> {
        self.ensure_open()?;
        if !self.discipline_selector_enabled() {
            return Err(CatalogError::Locked(
                "discipline options have not loaded yet".to_string(),
            ));
        }
        if !self.disciplines().iter().any(|d| d.id == discipline_id) {
            return Err(CatalogError::Validation(format!(
                "unknown discipline {discipline_id}"
            )));
        }
        let category_id = self.state.category_id().ok_or_else(|| {
            CatalogError::Locked("no category chosen".to_string())
        })?;

        let next = match self.state {
            SelectorState::InstructorsLoaded { .. } => SelectorState::InstructorsLoaded {
                category_id,
                discipline_id,
            },
            SelectorState::Submittable {
                teacher_discipline_id,
                ..
            } => SelectorState::Submittable {
                category_id,
                discipline_id,
                teacher_discipline_id,
            },
            _ => SelectorState::DisciplineChosen {
                category_id,
                discipline_id,
            },
        };
        self.transition(next);

        let ticket = self.issue_ticket();
        self.pending_instructors = Some(ticket);
        Ok(FetchRequest::InstructorsForDiscipline {
            ticket,
            discipline_id,
        })
    }

    /// Deliver the instructor pairings. Returns false when the response was
    /// stale and got dropped.
    pub fn instructors_loaded(&mut self, ticket: Ticket, instructors: Vec<InstructorAssignment>) -> bool {
        if self.pending_instructors != Some(ticket) {
            debug!(?ticket, "dropping stale instructor list");
            return false;
        }
        self.pending_instructors = None;
        self.instructors = Some(instructors);
        if let SelectorState::DisciplineChosen {
            category_id,
            discipline_id,
        } = self.state
        {
            self.transition(SelectorState::InstructorsLoaded {
                category_id,
                discipline_id,
            });
        }
        true
    }

    /// A fetch failed: forget it and stay where we are.
    pub fn fetch_failed(&mut self, ticket: Ticket) {
        if self.pending_disciplines == Some(ticket) {
            self.pending_disciplines = None;
        }
        if self.pending_instructors == Some(ticket) {
            self.pending_instructors = None;
        }
    }

    /// Pick the instructor-discipline pairing; this unlocks submission.
    pub fn choose_instructor_discipline(&mut self, teacher_discipline_id: i64) -> Result<NewTest> {
        self.ensure_open()?;
        if !self.instructor_selector_enabled() {
            return Err(CatalogError::Locked(
                "instructor options have not loaded yet".to_string(),
            ));
        }
        if !self
            .instructors()
            .iter()
            .any(|a| a.teacher_discipline_id == teacher_discipline_id)
        {
            return Err(CatalogError::Validation(format!(
                "unknown instructor-discipline pairing {teacher_discipline_id}"
            )));
        }
        let (category_id, discipline_id) = match self.state {
            SelectorState::DisciplineChosen {
                category_id,
                discipline_id,
            }
            | SelectorState::InstructorsLoaded {
                category_id,
                discipline_id,
            }
            | SelectorState::Submittable {
                category_id,
                discipline_id,
                ..
            } => (category_id, discipline_id),
            _ => return Err(CatalogError::Locked("no discipline chosen".to_string())),
        };

        self.transition(SelectorState::Submittable {
            category_id,
            discipline_id,
            teacher_discipline_id,
        });
        self.candidate_payload()
            .ok_or_else(|| CatalogError::Locked("submission is not available".to_string()))
    }

    /// The payload as it would be submitted right now, if submission is unlocked
    pub fn candidate_payload(&self) -> Option<NewTest> {
        match self.state {
            SelectorState::Submittable {
                category_id,
                teacher_discipline_id,
                ..
            } => Some(NewTest {
                name: self.name.clone(),
                document_url: self.document_url.clone(),
                category_id,
                teacher_discipline_id,
            }),
            _ => None,
        }
    }

    /// The payload to send, after checking both free-text fields are filled.
    pub fn validated_payload(&self) -> Result<NewTest> {
        self.ensure_open()?;
        let payload = self
            .candidate_payload()
            .ok_or_else(|| CatalogError::Locked("submission is not available".to_string()))?;
        if payload.name.trim().is_empty() || payload.document_url.trim().is_empty() {
            return Err(CatalogError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        Ok(payload)
    }

    /// The service accepted the submission; close the flow.
    pub fn mark_submitted(&mut self) -> Result<()> {
        match self.state {
            SelectorState::Submittable {
                category_id,
                discipline_id,
                teacher_discipline_id,
            } => {
                self.transition(SelectorState::Submitted {
                    category_id,
                    discipline_id,
                    teacher_discipline_id,
                });
                Ok(())
            }
            _ => Err(CatalogError::Locked("submission is not available".to_string())),
        }
    }
}
