// Defaults for the planner, overridable through the environment (or a .env file).

use std::env;

/// Guest count shown in the form before the user changes it.
pub const DEFAULT_GUEST_COUNT: u32 = 50;
/// Budget in rupees shown in the form before the user changes it.
pub const DEFAULT_BUDGET: u64 = 500_000;
/// Increment used by the budget field's spinner.
pub const BUDGET_STEP: u64 = 50_000;
/// Minimum number of guests the form accepts.
pub const MIN_GUEST_COUNT: u32 = 1;

/// Shown next to any error coming back from the model.
pub const API_KEY_HINT: &str = "Please make sure you have set up your API key in the .env file.";

lazy_static::lazy_static! {
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string());
    pub static ref GEMINI_BASE_URL: String = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| "https://generativelanguage.googleapis.com/".to_string());
    pub static ref GEMINI_TIMEOUT_SECS: u64 = env::var("GEMINI_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    pub static ref PLANNER_PORT: u16 = env::var("PLANNER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8501);
    pub static ref TEMPLATES_DIR: String = env::var("PLANNER_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("PLANNER_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}
