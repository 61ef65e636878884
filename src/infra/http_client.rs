use crate::app::ports::{operation, CatalogSource, SessionToken};
use crate::common::constants::*;
use crate::common::error::{CatalogError, Result};
use crate::config::ApiConfig;
use crate::domain::{
    Category, Credentials, DisciplineRef, Instructor, InstructorAssignment, InstructorGroup, NewTest,
    TermGroup,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct DisciplinesEnvelope {
    disciplines: Vec<DisciplineRef>,
}

#[derive(Deserialize)]
struct TeachersEnvelope<T> {
    teachers: Vec<T>,
}

#[derive(Deserialize)]
struct TestsEnvelope<T> {
    tests: Vec<T>,
}

#[derive(Deserialize)]
struct TokenEnvelope {
    token: String,
}

/// `CatalogSource` backed by the catalog service's REST API
#[derive(Clone)]
pub struct ReqwestCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| CatalogError::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::Config(format!("Invalid route '{}': {}", path, e)))
    }

    /// Turn a non-2xx response into `CatalogError::Api`
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("could not read error body: {}", e);
                String::new()
            }
        };
        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send(&self, op: &'static str, request: RequestBuilder) -> Result<Response> {
        let outcome = match request.send().await {
            Ok(response) => Self::check(response).await,
            Err(e) => Err(CatalogError::Http(e)),
        };
        if let Err(e) = &outcome {
            warn!(op, "catalog request failed: {}", e);
        }
        outcome
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        token: &SessionToken,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path)?;
        debug!(op, %url, "GET");
        let request = self.client.get(url).bearer_auth(token.as_str()).query(query);
        let response = self.send(op, request).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<()> {
        let request = self.client.post(self.url(SIGN_UP_PATH)?).json(credentials);
        self.send("sign_up", request).await?;
        Ok(())
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SessionToken> {
        let request = self.client.post(self.url(SIGN_IN_PATH)?).json(credentials);
        let response = self.send("sign_in", request).await?;
        let envelope: TokenEnvelope = serde_json::from_str(&response.text().await?)?;
        Ok(SessionToken::new(envelope.token))
    }
}

#[async_trait]
impl CatalogSource for ReqwestCatalog {
    #[instrument(skip(self, token))]
    async fn fetch_categories(&self, token: &SessionToken) -> Result<Vec<Category>> {
        let envelope: CategoriesEnvelope = self
            .get_json(operation::CATEGORIES, token, CATEGORIES_PATH, &[])
            .await?;
        Ok(envelope.categories)
    }

    #[instrument(skip(self, token))]
    async fn fetch_discipline_references(&self, token: &SessionToken) -> Result<Vec<DisciplineRef>> {
        let envelope: DisciplinesEnvelope = self
            .get_json(operation::DISCIPLINE_REFERENCES, token, DISCIPLINES_PATH, &[])
            .await?;
        Ok(envelope.disciplines)
    }

    #[instrument(skip(self, token))]
    async fn fetch_instructors(&self, token: &SessionToken) -> Result<Vec<Instructor>> {
        let envelope: TeachersEnvelope<Instructor> = self
            .get_json(operation::INSTRUCTORS, token, TEACHERS_PATH, &[])
            .await?;
        Ok(envelope.teachers)
    }

    #[instrument(skip(self, token))]
    async fn fetch_instructors_for_discipline(
        &self,
        token: &SessionToken,
        discipline_id: i64,
    ) -> Result<Vec<InstructorAssignment>> {
        let path = teachers_for_discipline_path(discipline_id);
        let envelope: TeachersEnvelope<InstructorAssignment> = self
            .get_json(operation::INSTRUCTORS_FOR_DISCIPLINE, token, &path, &[])
            .await?;
        Ok(envelope.teachers)
    }

    #[instrument(skip(self, token))]
    async fn fetch_tests_grouped_by_discipline(&self, token: &SessionToken) -> Result<Vec<TermGroup>> {
        let envelope: TestsEnvelope<TermGroup> = self
            .get_json(
                operation::TESTS_BY_DISCIPLINE,
                token,
                TESTS_PATH,
                &[("groupBy", GROUP_BY_DISCIPLINES)],
            )
            .await?;
        Ok(envelope.tests)
    }

    #[instrument(skip(self, token))]
    async fn fetch_tests_for_discipline(&self, token: &SessionToken, discipline_id: i64) -> Result<Vec<TermGroup>> {
        let path = tests_for_discipline_path(discipline_id);
        let envelope: TestsEnvelope<TermGroup> = self
            .get_json(operation::TESTS_FOR_DISCIPLINE, token, &path, &[])
            .await?;
        Ok(envelope.tests)
    }

    #[instrument(skip(self, token))]
    async fn fetch_tests_grouped_by_instructor(&self, token: &SessionToken) -> Result<Vec<InstructorGroup>> {
        let envelope: TestsEnvelope<InstructorGroup> = self
            .get_json(
                operation::TESTS_BY_INSTRUCTOR,
                token,
                TESTS_PATH,
                &[("groupBy", GROUP_BY_TEACHERS)],
            )
            .await?;
        Ok(envelope.tests)
    }

    #[instrument(skip(self, token))]
    async fn fetch_tests_for_instructor(
        &self,
        token: &SessionToken,
        instructor_id: i64,
    ) -> Result<Vec<InstructorGroup>> {
        let path = tests_for_instructor_path(instructor_id);
        let envelope: TestsEnvelope<InstructorGroup> = self
            .get_json(operation::TESTS_FOR_INSTRUCTOR, token, &path, &[])
            .await?;
        Ok(envelope.tests)
    }

    #[instrument(skip(self, token, payload))]
    async fn submit_test(&self, token: &SessionToken, payload: &NewTest) -> Result<()> {
        let request = self
            .client
            .post(self.url(NEW_TEST_PATH)?)
            .bearer_auth(token.as_str())
            .json(payload);
        self.send(operation::SUBMIT_TEST, request).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn notify_test_viewed(&self, token: Option<&SessionToken>, test_id: i64) -> Result<()> {
        let mut request = self.client.put(self.url(&update_view_path(test_id))?);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }
        self.send(operation::NOTIFY_TEST_VIEWED, request).await?;
        Ok(())
    }
}
