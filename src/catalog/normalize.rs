//! Reshapes the two grouping shapes the service returns into one traversal.
//!
//! Term-rooted data becomes terms of discipline nodes whose leaves are labelled
//! with the instructor name; instructor-rooted data becomes one node per
//! instructor whose leaves are labelled with the discipline name. Identity
//! fields pass through untouched and every function here is pure, so callers
//! simply re-run them after each re-fetch.

use crate::domain::{Discipline, Instructor, InstructorGroup, TeacherDiscipline, Term, TermGroup, Test};
use std::collections::{HashMap, HashSet};

/// Tests under one instructor-discipline pairing, with the label that tells
/// sibling leaves apart.
#[derive(Debug, Clone, PartialEq)]
pub struct TestLeaf {
    pub teacher_discipline_id: i64,
    pub label: String,
    pub tests: Vec<Test>,
}

/// A browsable node (a discipline, or an instructor) holding test leaves
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseNode {
    pub id: i64,
    pub name: String,
    pub leaves: Vec<TestLeaf>,
}

impl BrowseNode {
    pub fn test_count(&self) -> usize {
        self.leaves.iter().map(|leaf| leaf.tests.len()).sum()
    }

    /// A node is empty when it holds no tests at any depth
    pub fn is_empty(&self) -> bool {
        self.test_count() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermSection {
    pub term: Term,
    pub disciplines: Vec<BrowseNode>,
}

impl TermSection {
    pub fn test_count(&self) -> usize {
        self.disciplines.iter().map(BrowseNode::test_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.test_count() == 0
    }
}

fn leaf_labelled_by_instructor(td: &TeacherDiscipline) -> TestLeaf {
    TestLeaf {
        teacher_discipline_id: td.id,
        label: td.instructor.name.clone(),
        tests: td.tests.clone(),
    }
}

fn leaf_labelled_by_discipline(td: &TeacherDiscipline) -> TestLeaf {
    TestLeaf {
        teacher_discipline_id: td.id,
        label: td.discipline_name().to_string(),
        tests: td.tests.clone(),
    }
}

/// One discipline as a node whose leaves are its instructors
pub fn discipline_node(discipline: &Discipline) -> BrowseNode {
    BrowseNode {
        id: discipline.id,
        name: discipline.name.clone(),
        leaves: discipline
            .teacher_disciplines
            .iter()
            .map(leaf_labelled_by_instructor)
            .collect(),
    }
}

/// Term-rooted collection, in the order the service delivered it
pub fn group_by_term(groups: &[TermGroup]) -> Vec<TermSection> {
    groups
        .iter()
        .map(|group| TermSection {
            term: group.term(),
            disciplines: group.disciplines.iter().map(discipline_node).collect(),
        })
        .collect()
}

/// Distinct instructors in first-occurrence order.
///
/// Several records may describe the same instructor (one per discipline they
/// teach); they collapse onto one entry keyed by instructor id.
pub fn unique_instructors(groups: &[InstructorGroup]) -> Vec<Instructor> {
    let mut seen = HashSet::new();
    let mut instructors = Vec::new();
    for group in groups {
        if seen.insert(group.instructor.id) {
            instructors.push(group.instructor.clone());
        }
    }
    instructors
}

pub fn unique_instructor_names(groups: &[InstructorGroup]) -> Vec<String> {
    unique_instructors(groups)
        .into_iter()
        .map(|instructor| instructor.name)
        .collect()
}

/// Instructor-rooted collection folded into one node per instructor; each
/// node keeps that instructor's pairings in input order as its leaves.
pub fn group_by_instructor(groups: &[InstructorGroup]) -> Vec<BrowseNode> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut nodes: Vec<BrowseNode> = Vec::new();

    for group in groups {
        let slot = *index.entry(group.instructor.id).or_insert_with(|| {
            nodes.push(BrowseNode {
                id: group.instructor.id,
                name: group.instructor.name.clone(),
                leaves: Vec::new(),
            });
            nodes.len() - 1
        });
        nodes[slot].leaves.push(leaf_labelled_by_discipline(group));
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn sample_test(id: i64, category_id: i64) -> Test {
        Test {
            id,
            name: format!("T{id}"),
            document_url: format!("http://x/{id}.pdf"),
            category: Category {
                id: category_id,
                name: format!("C{category_id}"),
            },
            view_count: 0,
        }
    }

    fn pairing(id: i64, instructor: (i64, &str), discipline: &str, tests: Vec<Test>) -> TeacherDiscipline {
        TeacherDiscipline {
            id,
            instructor: Instructor {
                id: instructor.0,
                name: instructor.1.to_string(),
            },
            discipline: Some(Discipline {
                id: id * 100,
                name: discipline.to_string(),
                term: None,
                teacher_disciplines: Vec::new(),
            }),
            tests,
        }
    }

    #[test]
    fn test_unique_instructors_first_occurrence_order() {
        let groups = vec![
            pairing(1, (1, "A"), "Calculus", vec![]),
            pairing(2, (1, "A"), "Physics", vec![]),
            pairing(3, (2, "B"), "Calculus", vec![]),
        ];
        assert_eq!(unique_instructor_names(&groups), vec!["A", "B"]);
    }

    #[test]
    fn test_unique_instructors_empty_input() {
        assert!(unique_instructors(&[]).is_empty());
    }

    #[test]
    fn test_group_by_instructor_merges_pairings() {
        let groups = vec![
            pairing(1, (1, "A"), "Calculus", vec![sample_test(10, 1)]),
            pairing(3, (2, "B"), "Calculus", vec![]),
            pairing(2, (1, "A"), "Physics", vec![sample_test(11, 2)]),
        ];

        let nodes = group_by_instructor(&groups);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "A");
        let labels: Vec<_> = nodes[0].leaves.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Calculus", "Physics"]);
        assert_eq!(nodes[0].test_count(), 2);
        assert!(nodes[1].is_empty());
    }

    #[test]
    fn test_group_by_term_labels_leaves_with_instructor() {
        let mut td = pairing(42, (3, "Ada"), "Calculus", vec![sample_test(10, 1)]);
        td.discipline = None;
        let groups = vec![
            TermGroup {
                id: 1,
                number: 1,
                disciplines: vec![Discipline {
                    id: 7,
                    name: "Calculus".to_string(),
                    term: Some(Term { id: 1, number: 1 }),
                    teacher_disciplines: vec![td],
                }],
            },
            TermGroup {
                id: 2,
                number: 2,
                disciplines: vec![],
            },
        ];

        let sections = group_by_term(&groups);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].disciplines[0].leaves[0].label, "Ada");
        assert_eq!(sections[0].disciplines[0].leaves[0].teacher_discipline_id, 42);
        assert!(!sections[0].is_empty());
        assert!(sections[1].is_empty());
    }

    #[test]
    fn test_normalizer_is_repeatable() {
        let groups = vec![pairing(1, (1, "A"), "Calculus", vec![sample_test(10, 1)])];
        assert_eq!(group_by_instructor(&groups), group_by_instructor(&groups));
    }
}
