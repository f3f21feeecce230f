pub mod chat;
pub mod constants;
pub mod error;
pub mod gemini;
pub mod markdown;
pub mod prompts;
pub mod session;
pub mod transcript;
pub mod web_server;
pub mod wedding;

pub use error::{PlannerError, PlannerResult};
pub use session::{PlannerSession, SharedSession};
