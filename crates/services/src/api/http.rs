use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, multipart};
use tracing::{debug, instrument};
use url::Url;

use quiz_core::model::{
    DocumentFormat, DocumentUpload, Quiz, QuizId, QuizMode, QuizResult, QuizSummary,
    StoredResult, SubmissionPayload,
};

use super::QuizApi;
use super::wire::{
    QuizResponse, QuizSummaryDto, ResultResponse, SubmitRequest, SubmitResponse, UploadResponse,
};
use crate::error::ApiError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        // `Url::join` drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }
}

/// `QuizApi` over the backend's REST endpoints.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    config: ApiConfig,
}

impl HttpQuizApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn quiz_url(&self, quiz_id: &QuizId, suffix: &str) -> Result<Url, ApiError> {
        let mut url = self.config.endpoint("quiz/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidResponse("base url cannot hold a path".into()))?
            .pop_if_empty()
            .push(quiz_id.as_str());
        if !suffix.is_empty() {
            url.path_segments_mut()
                .map_err(|()| ApiError::InvalidResponse("base url cannot hold a path".into()))?
                .push(suffix);
        }
        Ok(url)
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        status if !status.is_success() => Err(ApiError::HttpStatus(status)),
        _ => Ok(response),
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    #[instrument(skip(self), fields(quiz_id = %quiz_id))]
    async fn get_quiz(&self, quiz_id: &QuizId) -> Result<Quiz, ApiError> {
        let url = self.quiz_url(quiz_id, "")?;
        let response = check_status(self.client.get(url).send().await?)?;
        let body: QuizResponse = response.json().await?;
        let quiz = body.into_quiz()?;
        debug!(questions = quiz.total_questions(), "quiz fetched");
        Ok(quiz)
    }

    #[instrument(skip_all, fields(quiz_id = %payload.quiz_id, mode = %payload.mode))]
    async fn submit_quiz(&self, payload: &SubmissionPayload) -> Result<StoredResult, ApiError> {
        let url = self.config.endpoint("quiz/submit-quiz")?;
        let response = check_status(
            self.client
                .post(url)
                .json(&SubmitRequest::from(payload))
                .send()
                .await?,
        )?;
        // Some backends answer 201 with an empty body.
        let bytes = response.bytes().await?;
        let body: SubmitResponse = if bytes.is_empty() {
            SubmitResponse::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|err| ApiError::InvalidResponse(err.to_string()))?
        };
        Ok(body.into_stored(payload))
    }

    #[instrument(skip(self), fields(quiz_id = %quiz_id))]
    async fn get_quiz_result(
        &self,
        quiz_id: &QuizId,
        mode: QuizMode,
    ) -> Result<QuizResult, ApiError> {
        let mut url = self.quiz_url(quiz_id, "results")?;
        url.query_pairs_mut().append_pair("mode", mode.as_str());
        let response = check_status(self.client.get(url).send().await?)?;
        let body: ResultResponse = response.json().await?;
        Ok(body.into_result(quiz_id, mode))
    }

    #[instrument(skip(self))]
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, ApiError> {
        let url = self.config.endpoint("quiz")?;
        let response = check_status(self.client.get(url).send().await?)?;
        let body: Vec<QuizSummaryDto> = response.json().await?;
        Ok(body.into_iter().map(QuizSummary::from).collect())
    }

    #[instrument(skip_all, fields(file = upload.file_name(), questions = upload.question_count()))]
    async fn upload_and_generate(&self, upload: &DocumentUpload) -> Result<Quiz, ApiError> {
        let url = self.config.endpoint("documents/upload-and-generate")?;
        let document = multipart::Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new()
            .part("document", document)
            .text("noOfQuestions", upload.question_count().to_string())
            .text("difficultyLevel", upload.difficulty().as_str());
        let response = check_status(self.client.post(url).multipart(form).send().await?)?;
        let body: UploadResponse = response.json().await?;
        body.into_quiz()
    }

    #[instrument(skip(self), fields(quiz_id = %quiz_id))]
    async fn download_quiz(
        &self,
        quiz_id: &QuizId,
        format: DocumentFormat,
    ) -> Result<Vec<u8>, ApiError> {
        let mut url = self.quiz_url(quiz_id, "download")?;
        url.query_pairs_mut()
            .append_pair("format", format.extension());
        let response = check_status(self.client.get(url).send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let config = ApiConfig::new("http://example.test/api").unwrap();
        assert_eq!(
            config.endpoint("quiz/submit-quiz").unwrap().as_str(),
            "http://example.test/api/quiz/submit-quiz"
        );
    }

    #[test]
    fn quiz_urls_escape_ids_and_append_suffix() {
        let api = HttpQuizApi::new(ApiConfig::new("http://localhost:3333").unwrap());
        let url = api.quiz_url(&QuizId::new("a b"), "results").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/quiz/a%20b/results");
        let url = api.quiz_url(&QuizId::new("abc"), "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/quiz/abc");
    }

    #[test]
    fn default_base_url_parses() {
        let config = ApiConfig::new("http://localhost:3333").unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:3333/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
