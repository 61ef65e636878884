//! Plain-text rendering of the browse trees for the command line.

use crate::app::browse_use_case::{DisciplineCatalog, InstructorCatalog};
use crate::catalog::filter::CategorySection;
use crate::catalog::normalize::BrowseNode;
use crate::common::constants::{EMPTY_DISCIPLINE_MESSAGE, EMPTY_INSTRUCTOR_MESSAGE, EMPTY_TERM_MESSAGE};
use std::fmt::Write;

const INDENT: &str = "  ";

fn push_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn render_sections(out: &mut String, depth: usize, sections: &[CategorySection]) {
    for section in sections {
        push_line(out, depth, &section.category.name);
        for entry in &section.tests {
            let mut line = String::new();
            let _ = write!(
                line,
                "[{}] {} ({}) | {} views | {}",
                entry.test.id, entry.test.name, entry.label, entry.test.view_count, entry.test.document_url
            );
            push_line(out, depth + 1, &line);
        }
    }
}

fn render_node(out: &mut String, depth: usize, node: &BrowseNode, sections: &[CategorySection], empty: &str) {
    push_line(out, depth, &node.name);
    if node.is_empty() {
        push_line(out, depth + 1, empty);
    } else {
        render_sections(out, depth + 1, sections);
    }
}

/// Terms, then disciplines, then category sections
pub fn discipline_catalog(catalog: &DisciplineCatalog) -> String {
    let mut out = String::new();
    for term in &catalog.terms {
        push_line(&mut out, 0, &format!("{} Period", term.term.number));
        if term.disciplines.is_empty() {
            push_line(&mut out, 1, EMPTY_TERM_MESSAGE);
            continue;
        }
        for discipline in &term.disciplines {
            let sections = catalog.sections(discipline);
            render_node(&mut out, 1, discipline, &sections, EMPTY_DISCIPLINE_MESSAGE);
        }
    }
    out
}

/// Instructors, then category sections
pub fn instructor_catalog(catalog: &InstructorCatalog) -> String {
    let mut out = String::new();
    for instructor in &catalog.instructors {
        let sections = catalog.sections(instructor);
        render_node(&mut out, 0, instructor, &sections, EMPTY_INSTRUCTOR_MESSAGE);
    }
    out
}
