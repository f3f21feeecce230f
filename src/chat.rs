// Terminal front-end over the same planner session the web UI uses.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

use crate::prompts::QuickAction;
use crate::session::PlannerSession;

const HELP: &str = "\
Type a question to ask the planner, or one of:
  /actions            list quick actions
  /<action>           run a quick action, e.g. /venue-suggestions
  /date YYYY-MM-DD    set the wedding date (empty to clear)
  /guests N           set the number of guests
  /budget N           set the budget in rupees
  /details            show the current details
  /help               show this help
  /quit               leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Action(QuickAction),
    ListActions,
    SetDate(String),
    SetGuests(String),
    SetBudget(String),
    ShowDetails,
    Help,
    Quit,
    Unknown(String),
}

/// Returns `None` for blank lines.
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(ChatCommand::Ask(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim().to_string()),
        None => (rest, String::new()),
    };

    let command = match name {
        "actions" => ChatCommand::ListActions,
        "date" => ChatCommand::SetDate(arg),
        "guests" => ChatCommand::SetGuests(arg),
        "budget" => ChatCommand::SetBudget(arg),
        "details" => ChatCommand::ShowDetails,
        "help" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        other => match other.parse::<QuickAction>() {
            Ok(action) => ChatCommand::Action(action),
            Err(_) => ChatCommand::Unknown(other.to_string()),
        },
    };
    Some(command)
}

pub async fn run_chat<R, W>(session: &mut PlannerSession, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!("Starting terminal chat session...");
    writeln!(out, "💒 AI Wedding Planner. Type /help for commands.")?;
    writeln!(out, "Current details: {}", session.details)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            ChatCommand::Quit => break,
            ChatCommand::Help => writeln!(out, "{}", HELP)?,
            ChatCommand::ListActions => {
                for action in QuickAction::ALL {
                    writeln!(out, "  /{:<24} {}", action.slug(), action)?;
                }
            }
            ChatCommand::ShowDetails => writeln!(out, "{}", session.details)?,
            ChatCommand::SetDate(raw) => {
                let today = chrono::Local::now().date_naive();
                report_details(&mut out, session.details.set_date(&raw, today), session)?;
            }
            ChatCommand::SetGuests(raw) => {
                report_details(&mut out, session.details.set_guest_count(&raw), session)?;
            }
            ChatCommand::SetBudget(raw) => {
                report_details(&mut out, session.details.set_budget(&raw), session)?;
            }
            ChatCommand::Action(action) => {
                writeln!(out, "{}", action.progress())?;
                let result = session.run_action(action).await;
                report_reply(&mut out, result, session)?;
            }
            ChatCommand::Ask(question) => {
                writeln!(out, "💫 Planning your perfect wedding...")?;
                let result = session.ask(&question).await.map(|r| r.unwrap_or_default());
                report_reply(&mut out, result, session)?;
            }
            ChatCommand::Unknown(name) => {
                writeln!(out, "Unknown command '/{}'. Type /help for commands.", name)?;
            }
        }
    }

    info!("Chat session finished.");
    Ok(())
}

fn report_details<W: Write, E: std::fmt::Display>(
    out: &mut W,
    result: std::result::Result<(), E>,
    session: &PlannerSession,
) -> Result<()> {
    match result {
        Ok(()) => writeln!(out, "Updated: {}", session.details)?,
        Err(e) => writeln!(out, "Error: {}", e)?,
    }
    Ok(())
}

fn report_reply<W: Write>(
    out: &mut W,
    result: crate::error::PlannerResult<String>,
    session: &PlannerSession,
) -> Result<()> {
    match result {
        Ok(reply) => writeln!(out, "\n{}\n", reply)?,
        Err(e) => {
            error!("Planner request failed: {}", e);
            if let Some(notice) = session.last_error() {
                writeln!(out, "{}", notice.message)?;
                if let Some(hint) = &notice.hint {
                    writeln!(out, "{}", hint)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{GeminiClient, GeminiConfig};
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_plain_question() {
        assert_eq!(
            parse_command("  What about a beach wedding? "),
            Some(ChatCommand::Ask("What about a beach wedding?".to_string()))
        );
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/actions"), Some(ChatCommand::ListActions));
        assert_eq!(
            parse_command("/guests  120"),
            Some(ChatCommand::SetGuests("120".to_string()))
        );
        assert_eq!(parse_command("/date"), Some(ChatCommand::SetDate(String::new())));
        assert_eq!(
            parse_command("/catering-menu"),
            Some(ChatCommand::Action(QuickAction::CateringMenu))
        );
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(
            parse_command("/dance"),
            Some(ChatCommand::Unknown("dance".to_string()))
        );
    }

    #[tokio::test]
    async fn test_run_chat_script() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Try a garden venue."}]}}]
            })))
            .expect(2)
            .mount(&server)
            .await;
        let config = GeminiConfig::new(Some("k".to_string())).with_base_url(&server.uri());
        let mut session = PlannerSession::new(GeminiClient::new(config).unwrap());

        let script = "/guests 200\n/guests zero\nWhere should we hold it?\n/venue-suggestions\n/quit\nnever read\n";
        let mut out = Vec::new();
        run_chat(&mut session, script.as_bytes(), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(session.details.guest_count, 200);
        assert!(out.contains("Updated: date: a date yet to be decided, guests: 200"));
        assert!(out.contains("Error: invalid guest count 'zero'"));
        assert!(out.contains("Try a garden venue."));
        assert!(out.contains("Finding venue suggestions..."));
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_run_chat_reports_missing_key() {
        let config = GeminiConfig::new(None);
        let mut session = PlannerSession::new(GeminiClient::new(config).unwrap());

        let mut out = Vec::new();
        run_chat(&mut session, "hello\n".as_bytes(), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("An error occurred: Gemini API key is not configured"));
        assert!(out.contains("Please make sure you have set up your API key in the .env file."));
    }
}
