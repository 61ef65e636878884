//! Catalog entities as delivered by the catalog service.
//!
//! Field names follow the service's JSON (`pdfUrl`, `views`, `teacher`,
//! `teacherDisciplines`). Nested fields that one grouping shape omits are
//! defaulted so both shapes deserialize into the same types.

use serde::{Deserialize, Serialize};

/// A tag classifying a test (exam, assignment list, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instructor {
    pub id: i64,
    pub name: String,
}

/// Lightweight discipline used to populate pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineRef {
    pub id: i64,
    pub name: String,
}

/// Academic period; `number` orders terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(rename = "teacherDisciplines", default)]
    pub teacher_disciplines: Vec<TeacherDiscipline>,
}

impl Discipline {
    /// Number of tests held by all of this discipline's instructor pairings
    pub fn test_count(&self) -> usize {
        self.teacher_disciplines.iter().map(|td| td.tests.len()).sum()
    }
}

/// Binds one instructor to one discipline; every test hangs off exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherDiscipline {
    pub id: i64,
    #[serde(rename = "teacher")]
    pub instructor: Instructor,
    #[serde(default)]
    pub discipline: Option<Discipline>,
    #[serde(default)]
    pub tests: Vec<Test>,
}

impl TeacherDiscipline {
    /// Discipline name, or an empty string when the shape omits the discipline
    pub fn discipline_name(&self) -> &str {
        self.discipline.as_ref().map(|d| d.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: i64,
    pub name: String,
    #[serde(rename = "pdfUrl")]
    pub document_url: String,
    pub category: Category,
    #[serde(rename = "views", default)]
    pub view_count: i64,
}

impl Test {
    pub fn is_of_category(&self, category_id: i64) -> bool {
        self.category.id == category_id
    }
}

/// Term-rooted grouping returned for discipline browsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermGroup {
    pub id: i64,
    pub number: i64,
    #[serde(default)]
    pub disciplines: Vec<Discipline>,
}

impl TermGroup {
    pub fn term(&self) -> Term {
        Term {
            id: self.id,
            number: self.number,
        }
    }
}

/// Instructor-rooted grouping: one entry per discipline an instructor teaches
pub type InstructorGroup = TeacherDiscipline;

/// Instructor option for the contribution flow, carrying the joining
/// TeacherDiscipline id that a submission must reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorAssignment {
    #[serde(rename = "id")]
    pub teacher_discipline_id: i64,
    #[serde(rename = "teacher")]
    pub instructor: Instructor,
}

/// Payload for contributing a new test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTest {
    pub name: String,
    #[serde(rename = "pdfUrl")]
    pub document_url: String,
    #[serde(rename = "categoryId")]
    pub category_id: i64,
    #[serde(rename = "teacherDisciplineId")]
    pub teacher_discipline_id: i64,
}

/// Sign-up / sign-in body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
