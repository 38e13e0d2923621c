use exam_model::{
    ContentFilters, Question, QuestionCountRequest, QuestionCountResponse, QuestionsQuery,
    SessionCreationPayload,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::envelope::{decode_items, extract_list, extract_session_id};
use crate::{ApiConfig, ApiError, CreatedSession, QuestionBank};

const CONTENT_FILTERS_PATH: &str = "content/filters";
const QUESTION_COUNT_PATH: &str = "questions/count";
const QUESTIONS_PATH: &str = "questions/by-selection";
const SESSIONS_PATH: &str = "sessions";

#[derive(Clone, Debug)]
pub struct HttpQuestionBank {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpQuestionBank {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.endpoint(path));
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<serde_json::Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::debug!("question bank answered {status}: {body}");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_as<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let value = self.send(builder).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl QuestionBank for HttpQuestionBank {
    async fn content_filters(&self) -> Result<ContentFilters, ApiError> {
        let value = self
            .send(self.request(Method::GET, CONTENT_FILTERS_PATH))
            .await?;
        // Sometimes wrapped in `data`.
        let value = match value {
            serde_json::Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    async fn question_count(
        &self,
        request: &QuestionCountRequest,
    ) -> Result<QuestionCountResponse, ApiError> {
        self.send_as(self.request(Method::POST, QUESTION_COUNT_PATH).json(request))
            .await
    }

    async fn questions(&self, query: &QuestionsQuery) -> Result<Vec<Question>, ApiError> {
        let value = self
            .send(self.request(Method::POST, QUESTIONS_PATH).json(query))
            .await?;
        let Some(items) = extract_list(value) else {
            log::warn!("questions response contained no list, treating as empty");
            return Ok(Vec::new());
        };
        Ok(decode_items(items))
    }

    async fn create_session(
        &self,
        payload: &SessionCreationPayload,
    ) -> Result<CreatedSession, ApiError> {
        let value = self
            .send(self.request(Method::POST, SESSIONS_PATH).json(payload))
            .await?;
        let session_id = extract_session_id(&value);
        if session_id.is_none() {
            log::warn!("session created but no identifier found in response: {value}");
        }
        Ok(CreatedSession { session_id })
    }
}
