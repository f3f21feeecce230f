use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    serve, Form, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::constants::BUDGET_STEP;
use crate::markdown;
use crate::prompts::{ActionGroup, ActionView, QuickAction};
use crate::session::{ErrorNotice, SharedSession};
use crate::transcript::{ChatMessage, Role, Transcript};
use crate::wedding::{DetailsForm, WeddingDetails};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    session: SharedSession,
}

impl AppState {
    pub fn new(templates_dir: impl Into<PathBuf>, session: SharedSession) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(templates_dir.into())),
            session,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
struct SessionView<'a> {
    details: &'a WeddingDetails,
    transcript: &'a Transcript,
    last_error: Option<&'a ErrorNotice>,
}

/// A transcript entry as the page shows it. Assistant turns carry rendered markdown.
#[derive(Serialize)]
struct MessageView<'a> {
    role: Role,
    content: &'a str,
    html: Option<String>,
}

impl<'a> From<&'a ChatMessage> for MessageView<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        let html = match message.role {
            Role::Assistant => Some(markdown::render(&message.content)),
            Role::User => None,
        };
        Self {
            role: message.role,
            content: &message.content,
            html,
        }
    }
}

#[derive(Serialize)]
struct ChatReply {
    reply: String,
}

#[derive(Serialize)]
struct ErrorReply {
    error: String,
}

// Minijinja Environment setup
fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates_dir));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn actions_in(group: ActionGroup) -> Vec<ActionView> {
    QuickAction::in_group(group).map(ActionView::from).collect()
}

async fn index_handler(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    let details = &session.details;
    let messages: Vec<MessageView> = session
        .transcript()
        .messages()
        .iter()
        .map(MessageView::from)
        .collect();

    let context = minijinja::context! {
        title => "Wedding Planner AI",
        wedding_date => details.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        min_date => today().format("%Y-%m-%d").to_string(),
        guest_count => details.guest_count,
        budget => details.budget,
        budget_step => BUDGET_STEP,
        sidebar_actions => actions_in(ActionGroup::Sidebar),
        left_actions => actions_in(ActionGroup::ServicesLeft),
        right_actions => actions_in(ActionGroup::ServicesRight),
        messages => messages,
        error => session.last_error(),
    };

    let rendered = state.templates.acquire_env().and_then(|env| {
        env.get_template("index.html")
            .and_then(|tmpl| tmpl.render(context))
    });

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
                .into_response()
        }
    }
}

async fn details_handler(
    State(state): State<AppState>,
    Form(form): Form<DetailsForm>,
) -> Redirect {
    let mut session = state.session.lock().await;
    // Rejections are kept on the session and shown on the page.
    let _ = session.update_details(&form, today());
    Redirect::to("/")
}

async fn action_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let action = match slug.parse::<QuickAction>() {
        Ok(action) => action,
        Err(e) => {
            warn!("{}", e);
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };

    let mut session = state.session.lock().await;
    if let Err(e) = session.run_action(action).await {
        error!(action = action.slug(), "Quick action failed: {}", e);
    }
    Redirect::to("/").into_response()
}

async fn chat_handler(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Redirect {
    let mut session = state.session.lock().await;
    if let Err(e) = session.ask(&form.message).await {
        error!("Chat request failed: {}", e);
    }
    Redirect::to("/")
}

async fn api_session_handler(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    Json(SessionView {
        details: &session.details,
        transcript: session.transcript(),
        last_error: session.last_error(),
    })
    .into_response()
}

async fn api_chat_handler(
    State(state): State<AppState>,
    Json(form): Json<ChatForm>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorReply>)> {
    let mut session = state.session.lock().await;
    match session.ask(&form.message).await {
        Ok(Some(reply)) => Ok(Json(ChatReply { reply })),
        Ok(None) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorReply {
                error: "message must not be empty".to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorReply {
                error: e.to_string(),
            }),
        )),
    }
}

pub fn build_router(state: AppState, static_dir: impl Into<PathBuf>) -> Router {
    let static_files_service = ServeDir::new(static_dir.into()).not_found_service(
        tower::service_fn(|_req: Request| async {
            Ok::<_, Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        }),
    );

    Router::new()
        .route("/", get(index_handler))
        .route("/details", post(details_handler))
        .route("/actions/:slug", post(action_handler))
        .route("/chat", post(chat_handler))
        .route("/api/session", get(api_session_handler))
        .route("/api/chat", post(api_chat_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(config: ServerConfig, session: SharedSession) -> Result<()> {
    let state = AppState::new(config.templates_dir.clone(), session);
    let app = build_router(state, config.static_dir.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
