//! Category filtering over groups of tests.
//!
//! Groups hold their tests one level down (a discipline holds pairings, an
//! instructor node holds leaves), so "does this group have a test of category
//! C" is a two-level existence check. Nothing here caches: callers re-run the
//! filters on every render from whatever data they currently hold.

use crate::catalog::normalize::{BrowseNode, TestLeaf};
use crate::domain::{Category, Discipline, TeacherDiscipline, Test};
use std::collections::HashSet;

/// A group whose tests sit in one or more lists directly beneath it
pub trait HasTests {
    fn test_lists(&self) -> Vec<&[Test]>;
}

impl HasTests for TeacherDiscipline {
    fn test_lists(&self) -> Vec<&[Test]> {
        vec![self.tests.as_slice()]
    }
}

impl HasTests for TestLeaf {
    fn test_lists(&self) -> Vec<&[Test]> {
        vec![self.tests.as_slice()]
    }
}

impl HasTests for Discipline {
    fn test_lists(&self) -> Vec<&[Test]> {
        self.teacher_disciplines
            .iter()
            .map(|td| td.tests.as_slice())
            .collect()
    }
}

impl HasTests for BrowseNode {
    fn test_lists(&self) -> Vec<&[Test]> {
        self.leaves.iter().map(|leaf| leaf.tests.as_slice()).collect()
    }
}

fn group_has_category<G: HasTests>(group: &G, category_id: i64) -> bool {
    group
        .test_lists()
        .into_iter()
        .any(|tests| tests.iter().any(|test| test.is_of_category(category_id)))
}

/// The categories, in their given order, that at least one test in `groups`
/// belongs to. Empty `groups` always yields an empty result.
pub fn categories_with_tests<G: HasTests>(categories: &[Category], groups: &[G]) -> Vec<Category> {
    categories
        .iter()
        .filter(|category| groups.iter().any(|group| group_has_category(group, category.id)))
        .cloned()
        .collect()
}

/// Tests of exactly `category_id`, in input order
pub fn tests_of_category(tests: &[Test], category_id: i64) -> Vec<&Test> {
    tests
        .iter()
        .filter(|test| test.is_of_category(category_id))
        .collect()
}

/// Category ids referenced by tests in `groups` but missing from `categories`.
/// Such tests are never shown, since sections are driven by the category list.
pub fn orphan_category_ids<G: HasTests>(categories: &[Category], groups: &[G]) -> Vec<i64> {
    let known: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    let mut seen = HashSet::new();
    let mut orphans = Vec::new();
    for group in groups {
        for tests in group.test_lists() {
            for test in tests {
                let id = test.category.id;
                if !known.contains(&id) && seen.insert(id) {
                    orphans.push(id);
                }
            }
        }
    }
    orphans
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelledTest {
    pub label: String,
    pub test: Test,
}

/// One category's tests within a node
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySection {
    pub category: Category,
    pub tests: Vec<LabelledTest>,
}

/// Per-category listing of a node's tests, each tagged with its leaf label.
///
/// Only categories that actually have tests in the node get a section, and an
/// empty node gets no sections at all.
pub fn category_breakdown(categories: &[Category], node: &BrowseNode) -> Vec<CategorySection> {
    if node.is_empty() {
        return Vec::new();
    }

    categories_with_tests(categories, &node.leaves)
        .into_iter()
        .map(|category| {
            let tests = node
                .leaves
                .iter()
                .flat_map(|leaf| {
                    tests_of_category(&leaf.tests, category.id)
                        .into_iter()
                        .map(move |test| LabelledTest {
                            label: leaf.label.clone(),
                            test: test.clone(),
                        })
                })
                .collect();
            CategorySection { category, tests }
        })
        .collect()
}
