/// Service routes and environment names used across the client
// Default service location
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// Environment variables
pub const ENV_CONFIG_PATH: &str = "EXAM_CATALOG_CONFIG";
pub const ENV_API_URL: &str = "EXAM_CATALOG_API_URL";
pub const ENV_TOKEN: &str = "EXAM_CATALOG_TOKEN";
pub const ENV_METRICS_PORT: &str = "EXAM_CATALOG_METRICS_PORT";

// Routes (relative to the base URL)
pub const SIGN_UP_PATH: &str = "sign-up";
pub const SIGN_IN_PATH: &str = "sign-in";
pub const CATEGORIES_PATH: &str = "categories";
pub const DISCIPLINES_PATH: &str = "disciplines";
pub const TEACHERS_PATH: &str = "teachers";
pub const TESTS_PATH: &str = "tests";
pub const NEW_TEST_PATH: &str = "test";

// Query values for `GET /tests?groupBy=`
pub const GROUP_BY_DISCIPLINES: &str = "disciplines";
pub const GROUP_BY_TEACHERS: &str = "teachers";

// User-facing alert texts
pub const REQUIRED_FIELDS_MESSAGE: &str = "All fields are required!";
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Test submitted successfully!";
pub const EMPTY_TERM_MESSAGE: &str = "No tests for this term...";
pub const EMPTY_DISCIPLINE_MESSAGE: &str = "No tests for this discipline...";
pub const EMPTY_INSTRUCTOR_MESSAGE: &str = "No tests for this instructor...";

/// Route for the tests of one discipline
pub fn tests_for_discipline_path(discipline_id: i64) -> String {
    format!("{TESTS_PATH}/{DISCIPLINES_PATH}/{discipline_id}")
}

/// Route for the tests of one instructor
pub fn tests_for_instructor_path(instructor_id: i64) -> String {
    format!("{TESTS_PATH}/{TEACHERS_PATH}/{instructor_id}")
}

/// Route for the instructor-discipline pairings of one discipline
pub fn teachers_for_discipline_path(discipline_id: i64) -> String {
    format!("{TEACHERS_PATH}/{DISCIPLINES_PATH}/{discipline_id}")
}

/// Route that bumps the view counter of one test
pub fn update_view_path(test_id: i64) -> String {
    format!("{TESTS_PATH}/{test_id}/update-view")
}
