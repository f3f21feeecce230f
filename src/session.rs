//! Session state: the form values, the visible transcript and the model-side
//! chat, plus the last failure to show the user.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::constants::API_KEY_HINT;
use crate::error::PlannerResult;
use crate::gemini::{ChatSession, GeminiClient};
use crate::prompts::{chat_prompt, QuickAction};
use crate::transcript::Transcript;
use crate::wedding::{DetailsError, DetailsForm, WeddingDetails};

/// The session behind a lock. Holding the guard across the model call keeps
/// one request in flight at a time.
pub type SharedSession = Arc<Mutex<PlannerSession>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct PlannerSession {
    pub details: WeddingDetails,
    transcript: Transcript,
    chat: ChatSession,
    last_error: Option<ErrorNotice>,
}

impl PlannerSession {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            details: WeddingDetails::default(),
            transcript: Transcript::new(),
            chat: ChatSession::new(client),
            last_error: None,
        }
    }

    pub fn shared(client: GeminiClient) -> SharedSession {
        Arc::new(Mutex::new(Self::new(client)))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn last_error(&self) -> Option<&ErrorNotice> {
        self.last_error.as_ref()
    }

    pub fn update_details(&mut self, form: &DetailsForm, today: NaiveDate) -> Result<(), DetailsError> {
        match self.details.apply(form, today) {
            Ok(()) => {
                info!(details = %self.details, "Wedding details updated");
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Rejected wedding details");
                self.last_error = Some(ErrorNotice {
                    message: e.to_string(),
                    hint: None,
                });
                Err(e)
            }
        }
    }

    /// Sends the action's canned prompt. The prompt is recorded as the user's turn.
    pub async fn run_action(&mut self, action: QuickAction) -> PlannerResult<String> {
        info!(action = action.slug(), "{}", action.progress());
        let prompt = action.prompt(&self.details);
        self.transcript.push_user(prompt.clone());
        self.send(&prompt).await
    }

    /// Asks a free-text question. The transcript shows the question alone while
    /// the model receives it wrapped in the planner context. Blank input is
    /// ignored and returns `Ok(None)`.
    pub async fn ask(&mut self, question: &str) -> PlannerResult<Option<String>> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }
        self.transcript.push_user(question);
        let prompt = chat_prompt(&self.details, question);
        self.send(&prompt).await.map(Some)
    }

    async fn send(&mut self, prompt: &str) -> PlannerResult<String> {
        debug!(%prompt, "Sending prompt to Gemini");
        match self.chat.send_message(prompt).await {
            Ok(reply) => {
                self.transcript.push_assistant(reply.clone());
                self.last_error = None;
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "Planner request failed");
                self.last_error = Some(ErrorNotice {
                    message: format!("An error occurred: {}", e),
                    hint: Some(API_KEY_HINT.to_string()),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::gemini::GeminiConfig;
    use crate::transcript::Role;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> PlannerSession {
        let config = GeminiConfig::new(Some("test-key".to_string()))
            .with_model("test-model")
            .with_base_url(&server.uri());
        PlannerSession::new(GeminiClient::new(config).unwrap())
    }

    async fn answering(text: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            })))
            .mount(&server)
            .await;
        server
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    #[tokio::test]
    async fn test_ask_records_question_and_reply() {
        let server = answering("Book the venue first.").await;
        let mut session = session_for(&server);

        let reply = session.ask("  Where do we start?  ").await.unwrap();
        assert_eq!(reply.as_deref(), Some("Book the venue first."));

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Where do we start?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Book the venue first.");
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_ask_wraps_question_in_context_for_model() {
        let server = answering("ok").await;
        let mut session = session_for(&server);
        session
            .update_details(
                &DetailsForm {
                    wedding_date: "2027-02-14".to_string(),
                    guest_count: "80".to_string(),
                    budget: "900000".to_string(),
                },
                today(),
            )
            .unwrap();

        session.ask("Any venue tips?").await.unwrap();

        let sent = session.chat().history()[0].text();
        assert!(sent.contains("- Wedding Date: 2027-02-14"));
        assert!(sent.contains("- Guest Count: 80"));
        assert!(sent.ends_with("User question: Any venue tips?"));
    }

    #[tokio::test]
    async fn test_blank_question_is_ignored() {
        let server = MockServer::start().await;
        let mut session = session_for(&server);

        assert_eq!(session.ask("   ").await.unwrap(), None);
        assert!(session.transcript().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_action_records_prompt_as_user_turn() {
        let server = answering("Spend 40% on the venue and catering.").await;
        let mut session = session_for(&server);

        session.run_action(QuickAction::BudgetBreakdown).await.unwrap();

        let messages = session.transcript().messages();
        assert_eq!(
            messages[0].content,
            "Provide a detailed budget breakdown for a wedding with 50 guests and a total budget of ₹500000."
        );
        assert_eq!(messages[1].content, "Spend 40% on the venue and catering.");
        assert_eq!(session.chat().history()[0].text(), messages[0].content);
    }

    #[tokio::test]
    async fn test_failure_keeps_user_turn_and_records_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"message": "Permission denied"}
            })))
            .mount(&server)
            .await;
        let mut session = session_for(&server);

        let err = session.run_action(QuickAction::ThemeDecor).await.unwrap_err();
        assert!(matches!(err, PlannerError::Api { status: 403, .. }));

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().messages()[0].role, Role::User);
        assert!(session.chat().history().is_empty());

        let notice = session.last_error().unwrap();
        assert_eq!(
            notice.message,
            "An error occurred: Gemini API returned 403: Permission denied"
        );
        assert_eq!(notice.hint.as_deref(), Some(API_KEY_HINT));
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let server = answering("Fine.").await;
        let config = GeminiConfig::new(None).with_base_url(&server.uri());
        let mut session = PlannerSession::new(GeminiClient::new(config).unwrap());

        assert!(matches!(
            session.ask("hello").await,
            Err(PlannerError::MissingApiKey)
        ));
        assert!(session.last_error().is_some());

        session.chat = ChatSession::new(
            GeminiClient::new(
                GeminiConfig::new(Some("k".to_string())).with_base_url(&server.uri()),
            )
            .unwrap(),
        );
        session.ask("hello again").await.unwrap();
        assert!(session.last_error().is_none());
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_details_keep_previous_values() {
        let server = MockServer::start().await;
        let mut session = session_for(&server);

        let result = session.update_details(
            &DetailsForm {
                wedding_date: String::new(),
                guest_count: "0".to_string(),
                budget: "100".to_string(),
            },
            today(),
        );

        assert_eq!(result, Err(DetailsError::TooFewGuests(0)));
        assert_eq!(session.details, WeddingDetails::default());
        assert!(session.last_error().unwrap().hint.is_none());
    }
}
