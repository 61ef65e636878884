use anyhow::Context;
use clap::{Parser, Subcommand};
use exam_catalog::app::alert::Alert;
use exam_catalog::app::browse_use_case::BrowseUseCase;
use exam_catalog::app::contribute_use_case::ContributeUseCase;
use exam_catalog::app::ports::{CatalogSource, Outcome, Session};
use exam_catalog::catalog::view_counter::ViewCounter;
use exam_catalog::config::{session_from_env, Config};
use exam_catalog::domain::Credentials;
use exam_catalog::infra::http_client::ReqwestCatalog;
use exam_catalog::observability::{init_logging, metrics};
use exam_catalog::render;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "exam_catalog")]
#[command(about = "Browse and contribute to a shared catalog of exam files")]
#[command(version = "0.1.0")]
struct Cli {
    /// Session token; overrides EXAM_CATALOG_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and print the session token
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Browse tests by term and discipline
    Disciplines {
        #[arg(long)]
        discipline_id: Option<i64>,
    },
    /// Browse tests by instructor
    Instructors {
        #[arg(long)]
        instructor_id: Option<i64>,
    },
    /// List test categories
    Categories,
    /// Contribute a new test
    Add {
        #[arg(long)]
        name: String,
        /// Link to the test document
        #[arg(long)]
        url: String,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        discipline: i64,
        /// Instructor-discipline pairing id (see the instructor list for the discipline)
        #[arg(long)]
        teacher_discipline: i64,
    },
    /// Record that a test's document was opened
    View { test_id: i64 },
}

fn report_alert(alert: &Alert) {
    if alert.is_error() {
        eprintln!("{}", alert);
    } else {
        println!("{}", alert);
    }
}

/// Print a step outcome; returns the value when the step completed
fn settle<T>(step: Result<Outcome<T>, Alert>) -> Option<T> {
    match step {
        Ok(Outcome::Ready(value)) => Some(value),
        Ok(Outcome::NotReady) => {
            eprintln!("🔒 Not signed in. Run `exam_catalog sign-in` and pass --token or set EXAM_CATALOG_TOKEN.");
            None
        }
        Err(alert) => {
            report_alert(&alert);
            None
        }
    }
}

async fn add_test(
    source: Arc<dyn CatalogSource>,
    session: Session,
    name: String,
    url: String,
    category: i64,
    discipline: i64,
    teacher_discipline: i64,
) {
    let mut use_case = ContributeUseCase::new(source, session);
    use_case.set_name(name);
    use_case.set_document_url(url);

    if settle(use_case.load_categories().await).is_none() {
        return;
    }
    if settle(use_case.choose_category(category).await).is_none() {
        return;
    }
    if settle(use_case.choose_discipline(discipline).await).is_none() {
        let options: Vec<String> = use_case
            .flow()
            .disciplines()
            .iter()
            .map(|d| format!("{} ({})", d.name, d.id))
            .collect();
        if !options.is_empty() {
            eprintln!("Disciplines: {}", options.join(", "));
        }
        return;
    }
    if let Err(alert) = use_case.choose_instructor_discipline(teacher_discipline) {
        report_alert(&alert);
        for option in use_case.flow().instructors() {
            eprintln!(
                "  {} -> --teacher-discipline {}",
                option.instructor.name, option.teacher_discipline_id
            );
        }
        return;
    }
    if let Some(alert) = settle(use_case.submit().await) {
        report_alert(&alert);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load().context("loading configuration")?;
    let _log_guard = init_logging(&config.logging.directory);
    if let Some(port) = config.metrics.port {
        metrics::init(port);
    }

    let client = ReqwestCatalog::from_config(&config.api).context("building catalog client")?;
    info!(base_url = %client.base_url(), "catalog client ready");
    let session = session_from_env(cli.token);
    let source: Arc<dyn CatalogSource> = Arc::new(client.clone());

    match cli.command {
        Commands::SignUp { email, password } => match client.sign_up(&Credentials { email, password }).await {
            Ok(()) => println!("✅ Account created, you can sign in now"),
            Err(e) => {
                error!("Sign-up failed: {}", e);
                report_alert(&Alert::from(e));
            }
        },
        Commands::SignIn { email, password } => match client.sign_in(&Credentials { email, password }).await {
            Ok(token) => println!("{}", token.as_str()),
            Err(e) => {
                error!("Sign-in failed: {}", e);
                report_alert(&Alert::from(e));
            }
        },
        Commands::Disciplines { discipline_id } => {
            let browse = BrowseUseCase::new(source);
            if let Some(catalog) = settle(browse.load_by_discipline(&session, discipline_id).await) {
                print!("{}", render::discipline_catalog(&catalog));
            }
        }
        Commands::Instructors { instructor_id } => {
            let browse = BrowseUseCase::new(source);
            if let Some(catalog) = settle(browse.load_by_instructor(&session, instructor_id).await) {
                print!("{}", render::instructor_catalog(&catalog));
            }
        }
        Commands::Categories => {
            let browse = BrowseUseCase::new(source);
            if let Some(categories) = settle(browse.categories(&session).await) {
                for category in categories {
                    println!("{}\t{}", category.id, category.name);
                }
            }
        }
        Commands::Add {
            name,
            url,
            category,
            discipline,
            teacher_discipline,
        } => {
            add_test(source, session, name, url, category, discipline, teacher_discipline).await;
        }
        Commands::View { test_id } => {
            // The trigger is fire-and-forget; wait here only so the process
            // does not exit before the request goes out.
            let handle = ViewCounter::new(source).trigger(&session, test_id);
            if let Err(e) = handle.await {
                error!("View trigger task failed: {}", e);
            }
        }
    }
    Ok(())
}
