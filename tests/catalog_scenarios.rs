use anyhow::Result;
use exam_catalog::app::alert::Alert;
use exam_catalog::app::browse_use_case::BrowseUseCase;
use exam_catalog::app::contribute_use_case::ContributeUseCase;
use exam_catalog::app::ports::{operation, Outcome, Session, SessionToken};
use exam_catalog::catalog::filter::{categories_with_tests, tests_of_category};
use exam_catalog::catalog::normalize::{group_by_term, unique_instructor_names};
use exam_catalog::catalog::selector::{ContributionFlow, SelectorState};
use exam_catalog::common::constants::REQUIRED_FIELDS_MESSAGE;
use exam_catalog::domain::{
    Category, Discipline, DisciplineRef, Instructor, InstructorAssignment, NewTest, TeacherDiscipline, TermGroup,
    Test,
};
use exam_catalog::infra::in_memory::InMemoryCatalog;
use std::sync::Arc;

fn prova() -> Category {
    Category {
        id: 1,
        name: "Prova".to_string(),
    }
}

fn lista() -> Category {
    Category {
        id: 2,
        name: "Lista".to_string(),
    }
}

fn ada() -> Instructor {
    Instructor {
        id: 3,
        name: "Ada".to_string(),
    }
}

fn exam(id: i64, category: Category) -> Test {
    Test {
        id,
        name: format!("P{id}"),
        document_url: format!("http://x/{id}.pdf"),
        category,
        view_count: 0,
    }
}

fn calculus_term() -> TermGroup {
    TermGroup {
        id: 1,
        number: 1,
        disciplines: vec![Discipline {
            id: 7,
            name: "Calculus".to_string(),
            term: None,
            teacher_disciplines: vec![TeacherDiscipline {
                id: 42,
                instructor: ada(),
                discipline: None,
                tests: vec![exam(10, prova())],
            }],
        }],
    }
}

fn contribution_source() -> Arc<InMemoryCatalog> {
    Arc::new(
        InMemoryCatalog::new()
            .with_categories(vec![prova(), lista()])
            .with_disciplines(vec![DisciplineRef {
                id: 7,
                name: "Calculus".to_string(),
            }])
            .with_assignments(
                7,
                vec![InstructorAssignment {
                    teacher_discipline_id: 42,
                    instructor: ada(),
                }],
            ),
    )
}

fn signed_in() -> Session {
    Session::Authenticated(SessionToken::new("token-1"))
}

#[test]
fn categories_with_tests_keeps_only_used_categories() {
    let categories = vec![prova(), lista()];
    let terms = group_by_term(&[calculus_term()]);
    let disciplines = &terms[0].disciplines;

    assert_eq!(categories_with_tests(&categories, disciplines), vec![prova()]);
    assert!(categories_with_tests::<TeacherDiscipline>(&categories, &[]).is_empty());
}

#[test]
fn tests_of_category_preserves_order() {
    let tests = vec![exam(1, prova()), exam(2, lista()), exam(3, prova())];
    let ids: Vec<i64> = tests_of_category(&tests, 1).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(tests_of_category(&tests, 99).is_empty());
    assert!(tests_of_category(&[], 1).is_empty());
}

#[test]
fn unique_instructors_in_first_occurrence_order() {
    let pairing = |id: i64, instructor_id: i64, name: &str| TeacherDiscipline {
        id,
        instructor: Instructor {
            id: instructor_id,
            name: name.to_string(),
        },
        discipline: None,
        tests: vec![],
    };
    let groups = vec![pairing(1, 1, "A"), pairing(2, 1, "A"), pairing(3, 2, "B")];
    assert_eq!(unique_instructor_names(&groups), vec!["A", "B"]);
}

#[test]
fn discipline_choice_before_fetch_resolves_keeps_instructors_locked() -> Result<()> {
    let mut flow = ContributionFlow::new();
    flow.categories_loaded(vec![prova(), lista()]);
    let _pending = flow.choose_category(1)?;

    assert!(flow.choose_discipline(7).is_err());
    assert!(!flow.instructor_selector_enabled());
    assert_eq!(flow.state(), &SelectorState::CategoryChosen { category_id: 1 });
    Ok(())
}

#[tokio::test]
async fn discipline_view_end_to_end() -> Result<()> {
    let source = Arc::new(
        InMemoryCatalog::new()
            .with_categories(vec![prova(), lista()])
            .with_term_groups(vec![calculus_term()]),
    );
    let browse = BrowseUseCase::new(source.clone());

    let catalog = browse
        .load_by_discipline(&signed_in(), None)
        .await
        .map_err(|a| anyhow::anyhow!(a.text))?
        .ready()
        .ok_or_else(|| anyhow::anyhow!("view not ready"))?;

    let sections = catalog.sections(&catalog.terms[0].disciplines[0]);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].category, prova());
    assert_eq!(sections[0].tests[0].label, "Ada");
    assert_eq!(
        source.calls().await,
        vec![
            operation::TESTS_BY_DISCIPLINE,
            operation::CATEGORIES,
            operation::DISCIPLINE_REFERENCES
        ]
    );
    Ok(())
}

#[tokio::test]
async fn contribution_builds_expected_payload() -> Result<()> {
    let source = contribution_source();
    let mut use_case = ContributeUseCase::new(source.clone(), signed_in());
    use_case.set_name("P1");
    use_case.set_document_url("http://x/p1.pdf");

    assert_eq!(use_case.load_categories().await, Ok(Outcome::Ready(())));
    assert_eq!(use_case.choose_category(1).await, Ok(Outcome::Ready(())));
    assert!(use_case.flow().discipline_selector_enabled());
    assert_eq!(use_case.choose_discipline(7).await, Ok(Outcome::Ready(())));
    assert!(use_case.flow().instructor_selector_enabled());

    let expected = NewTest {
        name: "P1".to_string(),
        document_url: "http://x/p1.pdf".to_string(),
        category_id: 1,
        teacher_discipline_id: 42,
    };
    assert_eq!(use_case.choose_instructor_discipline(42), Ok(expected.clone()));

    let submitted = use_case.submit().await;
    assert!(matches!(submitted, Ok(Outcome::Ready(ref alert)) if !alert.is_error()));
    assert_eq!(use_case.flow().state().name(), "submitted");

    // the flow is closed, so a second submit sends nothing
    assert!(use_case.submit().await.is_err());
    assert_eq!(source.submitted().await, vec![expected]);
    Ok(())
}

#[tokio::test]
async fn blank_name_is_blocked_before_submission() -> Result<()> {
    let source = contribution_source();
    let mut use_case = ContributeUseCase::new(source.clone(), signed_in());
    use_case.set_name("");
    use_case.set_document_url("http://x/p1.pdf");

    use_case.load_categories().await.map_err(|a| anyhow::anyhow!(a.text))?;
    use_case.choose_category(1).await.map_err(|a| anyhow::anyhow!(a.text))?;
    use_case.choose_discipline(7).await.map_err(|a| anyhow::anyhow!(a.text))?;
    use_case
        .choose_instructor_discipline(42)
        .map_err(|a| anyhow::anyhow!(a.text))?;

    assert_eq!(use_case.submit().await, Err(Alert::blocking(REQUIRED_FIELDS_MESSAGE)));
    assert!(!source.calls().await.contains(&operation::SUBMIT_TEST));
    assert!(source.submitted().await.is_empty());
    Ok(())
}
