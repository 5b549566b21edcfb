//! JSON shapes of the quiz backend (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    QuestionDraft, QuestionId, Quiz, QuizId, QuizMode, QuizResult, QuizSummary, ResultQuestion,
    StoredResult, SubmissionPayload,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuestionDto {
    id: String,
    question_number: u32,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    explanation: String,
}

impl QuestionDto {
    fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(self.id),
            number: self.question_number,
            prompt: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
        }
    }
}

fn build_quiz(
    id: String,
    document_name: String,
    questions: Vec<QuestionDto>,
) -> Result<Quiz, quiz_core::Error> {
    let questions = questions
        .into_iter()
        .map(|q| q.into_draft().validate())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Quiz::new(QuizId::new(id), document_name, questions)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DocumentDto {
    document_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuizResponse {
    id: String,
    document: DocumentDto,
    questions: Vec<QuestionDto>,
}

impl QuizResponse {
    pub(super) fn into_quiz(self) -> Result<Quiz, ApiError> {
        Ok(build_quiz(self.id, self.document.document_name, self.questions)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeneratedQuizDto {
    id: String,
    document_name: String,
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponse {
    data: GeneratedQuizDto,
}

impl UploadResponse {
    pub(super) fn into_quiz(self) -> Result<Quiz, ApiError> {
        Ok(build_quiz(
            self.data.id,
            self.data.document_name,
            self.data.questions,
        )?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnswerDto<'a> {
    question_id: &'a str,
    selected_option_index: usize,
    correct_option_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubmitRequest<'a> {
    quiz_id: &'a str,
    mode: QuizMode,
    total_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_spent: Option<u64>,
    answers: Vec<AnswerDto<'a>>,
}

impl<'a> From<&'a SubmissionPayload> for SubmitRequest<'a> {
    fn from(payload: &'a SubmissionPayload) -> Self {
        Self {
            quiz_id: payload.quiz_id.as_str(),
            mode: payload.mode,
            total_questions: payload.total_questions,
            time_spent: payload.time_spent,
            answers: payload
                .answers
                .iter()
                .map(|a| AnswerDto {
                    question_id: a.question_id.as_str(),
                    selected_option_index: a.selected_option_index,
                    correct_option_index: a.correct_option_index,
                })
                .collect(),
        }
    }
}

/// The stored result body is loosely specified; missing fields fall back to
/// what was submitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct SubmitResponse {
    score: Option<u32>,
    total_questions: Option<u32>,
}

impl SubmitResponse {
    pub(super) fn into_stored(self, payload: &SubmissionPayload) -> StoredResult {
        StoredResult {
            quiz_id: payload.quiz_id.clone(),
            mode: payload.mode,
            score: self.score.unwrap_or(0),
            total_questions: self.total_questions.unwrap_or(payload.total_questions),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ResultQuestionDto {
    id: String,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, alias = "selectedOptionIndex", alias = "userAnswer")]
    selected_option: Option<usize>,
    correct_answer: usize,
    #[serde(default)]
    explanation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ResultResponse {
    score: u32,
    percentage: u32,
    total_questions: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    #[serde(default)]
    document_name: Option<String>,
    #[serde(default)]
    questions: Vec<ResultQuestionDto>,
}

impl ResultResponse {
    pub(super) fn into_result(self, quiz_id: &QuizId, mode: QuizMode) -> QuizResult {
        QuizResult {
            quiz_id: quiz_id.clone(),
            mode,
            document_name: self.document_name.unwrap_or_else(|| "Quiz".to_string()),
            score: self.score,
            percentage: self.percentage,
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
            incorrect_answers: self.incorrect_answers,
            questions: self
                .questions
                .into_iter()
                .map(|q| ResultQuestion {
                    id: QuestionId::new(q.id),
                    prompt: q.question,
                    options: q.options,
                    selected_option: q.selected_option,
                    correct_answer: q.correct_answer,
                    explanation: q.explanation,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuizSummaryDto {
    id: String,
    document_name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    total_questions: u32,
}

impl From<QuizSummaryDto> for QuizSummary {
    fn from(dto: QuizSummaryDto) -> Self {
        Self {
            id: QuizId::new(dto.id),
            document_name: dto.document_name,
            created_at: dto.created_at,
            total_questions: dto.total_questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::SubmittedAnswer;

    #[test]
    fn quiz_response_maps_into_domain() {
        let body = r#"{
            "id": "quiz-9",
            "document": { "documentName": "biology.pdf" },
            "questions": [
                { "id": "a", "questionNumber": 1, "question": "Cell?", "options": ["x", "y"],
                  "correctAnswer": 1, "explanation": "y is right" }
            ]
        }"#;
        let quiz = serde_json::from_str::<QuizResponse>(body)
            .unwrap()
            .into_quiz()
            .unwrap();
        assert_eq!(quiz.id().as_str(), "quiz-9");
        assert_eq!(quiz.document_name(), "biology.pdf");
        assert_eq!(quiz.question(1).unwrap().correct_answer(), 1);
    }

    #[test]
    fn invalid_question_is_rejected() {
        let body = r#"{
            "id": "quiz-9",
            "document": { "documentName": "biology.pdf" },
            "questions": [
                { "id": "a", "questionNumber": 1, "question": "Cell?", "options": ["x", "y"],
                  "correctAnswer": 5 }
            ]
        }"#;
        let response = serde_json::from_str::<QuizResponse>(body).unwrap();
        assert!(matches!(response.into_quiz(), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn submit_request_uses_camel_case_and_omits_missing_time() {
        let payload = SubmissionPayload {
            quiz_id: QuizId::new("quiz-1"),
            mode: QuizMode::Study,
            total_questions: 2,
            time_spent: None,
            answers: vec![SubmittedAnswer {
                question_id: QuestionId::new("q1"),
                selected_option_index: 0,
                correct_option_index: 1,
            }],
        };
        let json = serde_json::to_value(SubmitRequest::from(&payload)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "quizId": "quiz-1",
                "mode": "study",
                "totalQuestions": 2,
                "answers": [
                    { "questionId": "q1", "selectedOptionIndex": 0, "correctOptionIndex": 1 }
                ]
            })
        );
    }

    #[test]
    fn result_accepts_selected_option_aliases() {
        let body = r#"{
            "score": 1, "percentage": 50, "totalQuestions": 2,
            "correctAnswers": 1, "incorrectAnswers": 1,
            "questions": [
                { "id": "a", "question": "?", "options": ["x", "y"], "userAnswer": 1, "correctAnswer": 1 }
            ]
        }"#;
        let result = serde_json::from_str::<ResultResponse>(body)
            .unwrap()
            .into_result(&QuizId::new("quiz-1"), QuizMode::Exam);
        assert!(result.questions[0].is_correct());
        assert_eq!(result.document_name, "Quiz");
    }
}
