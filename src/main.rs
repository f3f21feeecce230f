use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use wedding_planner::{
    chat, constants,
    gemini::{GeminiClient, GeminiConfig},
    prompts::QuickAction,
    web_server::{self, ServerConfig},
    PlannerSession,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Gemini API key.
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model to chat with.
    #[arg(long, global = true, default_value_t = constants::GEMINI_MODEL.clone())]
    model: String,

    /// Base URL of the Gemini API.
    #[arg(long, global = true, default_value_t = constants::GEMINI_BASE_URL.clone())]
    base_url: String,

    /// Seconds to wait for the model before giving up.
    #[arg(long, global = true, default_value_t = *constants::GEMINI_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the wedding planner web UI.
    Serve {
        #[arg(long, default_value = "127.0.0.1", help = "Address to listen on.")]
        host: String,
        #[arg(long, default_value_t = *constants::PLANNER_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, default_value = constants::TEMPLATES_DIR.as_str(), help = "Directory holding index.html.")]
        templates_dir: PathBuf,
        #[arg(long, default_value = constants::STATIC_DIR.as_str(), help = "Directory served under /static.")]
        static_dir: PathBuf,
    },
    /// Plan your wedding in a text-based chat session.
    Chat {
        #[arg(long, help = "Wedding date (YYYY-MM-DD).")]
        date: Option<String>,
        #[arg(long, help = "Number of guests.")]
        guests: Option<String>,
        #[arg(long, help = "Budget in rupees.")]
        budget: Option<String>,
    },
    /// List the quick actions available in the UI.
    Actions,
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GEMINI_API_KEY and friends)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,wedding_planner=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("Wedding planner starting with command: {:?}", cli.command);

    let config = GeminiConfig::new(cli.api_key)
        .with_model(cli.model)
        .with_base_url(&cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if config.api_key.is_none() {
        info!("GEMINI_API_KEY is not set; requests will fail until it is configured");
    }
    let client = GeminiClient::new(config).context("Failed to build Gemini client")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            templates_dir,
            static_dir,
        } => {
            info!("Starting wedding planner on {}:{}...", host, port);
            let session = PlannerSession::shared(client);
            let server_config = ServerConfig {
                host,
                port,
                templates_dir,
                static_dir,
            };

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(server_config, session).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            // Pin the ctrl_c future to the stack so its address is stable
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat {
            date,
            guests,
            budget,
        } => {
            let mut session = PlannerSession::new(client);
            let today = chrono::Local::now().date_naive();
            if let Some(date) = date {
                session.details.set_date(&date, today)?;
            }
            if let Some(guests) = guests {
                session.details.set_guest_count(&guests)?;
            }
            if let Some(budget) = budget {
                session.details.set_budget(&budget)?;
            }

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run_chat(&mut session, stdin, std::io::stdout())
                .await
                .context("Chat session failed")?;
        }
        Commands::Actions => {
            for action in QuickAction::ALL {
                println!("{:<24} {}", action.slug(), action);
            }
        }
    }

    Ok(())
}
