//! Prompt construction from the current wedding details.
//!
//! Free-text questions are wrapped in [`planner_context`] so the model always
//! sees the latest form values. Quick actions carry their own canned prompt
//! and are sent as-is.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::wedding::WeddingDetails;

/// Instruction block prepended to every free-text question.
pub fn planner_context(details: &WeddingDetails) -> String {
    format!(
        "You are a friendly and experienced AI wedding planner.\n\
         Current wedding details:\n\
         - Wedding Date: {}\n\
         - Guest Count: {}\n\
         - Budget: {}\n\
         \n\
         Please provide detailed, practical, and personalized wedding planning advice.\n\
         Focus on creating a memorable and well-organized wedding experience.",
        details.date_display(),
        details.guest_count,
        details.budget_display()
    )
}

pub fn chat_prompt(details: &WeddingDetails, question: &str) -> String {
    format!("{}\n\nUser question: {}", planner_context(details), question)
}

/// Where an action's button is shown on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGroup {
    Sidebar,
    ServicesLeft,
    ServicesRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    CreateTimeline,
    BudgetBreakdown,
    ThemeSuggestions,
    MusicIdeas,
    CateringIdeas,
    TimelineChecklist,
    BudgetPlanning,
    VenueSuggestions,
    ThemeDecor,
    VendorRecommendations,
    MusicEntertainment,
    CateringMenu,
    AdditionalServices,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quick action '{0}'")]
pub struct UnknownAction(pub String);

impl QuickAction {
    pub const ALL: [QuickAction; 13] = [
        QuickAction::CreateTimeline,
        QuickAction::BudgetBreakdown,
        QuickAction::ThemeSuggestions,
        QuickAction::MusicIdeas,
        QuickAction::CateringIdeas,
        QuickAction::TimelineChecklist,
        QuickAction::BudgetPlanning,
        QuickAction::VenueSuggestions,
        QuickAction::ThemeDecor,
        QuickAction::VendorRecommendations,
        QuickAction::MusicEntertainment,
        QuickAction::CateringMenu,
        QuickAction::AdditionalServices,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            QuickAction::CreateTimeline => "create-timeline",
            QuickAction::BudgetBreakdown => "budget-breakdown",
            QuickAction::ThemeSuggestions => "theme-suggestions",
            QuickAction::MusicIdeas => "music-ideas",
            QuickAction::CateringIdeas => "catering-ideas",
            QuickAction::TimelineChecklist => "timeline-checklist",
            QuickAction::BudgetPlanning => "budget-planning",
            QuickAction::VenueSuggestions => "venue-suggestions",
            QuickAction::ThemeDecor => "theme-decor",
            QuickAction::VendorRecommendations => "vendor-recommendations",
            QuickAction::MusicEntertainment => "music-entertainment",
            QuickAction::CateringMenu => "catering-menu",
            QuickAction::AdditionalServices => "additional-services",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            QuickAction::CreateTimeline => "📋",
            QuickAction::BudgetBreakdown | QuickAction::BudgetPlanning => "💰",
            QuickAction::ThemeSuggestions | QuickAction::ThemeDecor => "🎨",
            QuickAction::MusicIdeas | QuickAction::MusicEntertainment => "🎵",
            QuickAction::CateringIdeas | QuickAction::CateringMenu => "🍽️",
            QuickAction::TimelineChecklist => "📅",
            QuickAction::VenueSuggestions => "🏰",
            QuickAction::VendorRecommendations => "👥",
            QuickAction::AdditionalServices => "💝",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::CreateTimeline => "Create Timeline",
            QuickAction::BudgetBreakdown => "Budget Breakdown",
            QuickAction::ThemeSuggestions => "Theme Suggestions",
            QuickAction::MusicIdeas => "Music & Entertainment",
            QuickAction::CateringIdeas => "Catering Ideas",
            QuickAction::TimelineChecklist => "Timeline & Checklist",
            QuickAction::BudgetPlanning => "Budget Planning",
            QuickAction::VenueSuggestions => "Venue Suggestions",
            QuickAction::ThemeDecor => "Theme & Decor",
            QuickAction::VendorRecommendations => "Vendor Recommendations",
            QuickAction::MusicEntertainment => "Music & Entertainment",
            QuickAction::CateringMenu => "Catering & Menu",
            QuickAction::AdditionalServices => "Additional Services",
        }
    }

    /// Caption shown while the request is in flight.
    pub fn progress(&self) -> &'static str {
        match self {
            QuickAction::CreateTimeline => "Creating timeline...",
            QuickAction::BudgetBreakdown => "Creating budget breakdown...",
            QuickAction::ThemeSuggestions => "Generating theme ideas...",
            QuickAction::MusicIdeas => "Suggesting entertainment options...",
            QuickAction::CateringIdeas | QuickAction::CateringMenu => "Creating menu suggestions...",
            QuickAction::TimelineChecklist => "Creating timeline and checklist...",
            QuickAction::BudgetPlanning => "Creating budget plan...",
            QuickAction::VenueSuggestions => "Finding venue suggestions...",
            QuickAction::ThemeDecor => "Creating theme suggestions...",
            QuickAction::VendorRecommendations => "Finding vendor recommendations...",
            QuickAction::MusicEntertainment => "Planning entertainment...",
            QuickAction::AdditionalServices => "Finding additional services...",
        }
    }

    pub fn group(&self) -> ActionGroup {
        match self {
            QuickAction::CreateTimeline
            | QuickAction::BudgetBreakdown
            | QuickAction::ThemeSuggestions
            | QuickAction::MusicIdeas
            | QuickAction::CateringIdeas => ActionGroup::Sidebar,
            QuickAction::TimelineChecklist
            | QuickAction::BudgetPlanning
            | QuickAction::VenueSuggestions
            | QuickAction::ThemeDecor => ActionGroup::ServicesLeft,
            QuickAction::VendorRecommendations
            | QuickAction::MusicEntertainment
            | QuickAction::CateringMenu
            | QuickAction::AdditionalServices => ActionGroup::ServicesRight,
        }
    }

    pub fn in_group(group: ActionGroup) -> impl Iterator<Item = QuickAction> {
        Self::ALL.into_iter().filter(move |a| a.group() == group)
    }

    pub fn prompt(&self, details: &WeddingDetails) -> String {
        let date = details.date_display();
        let guests = details.guest_count;
        let budget = details.budget_display();
        match self {
            QuickAction::CreateTimeline => format!(
                "Create a detailed wedding planning timeline for a wedding on {date} with {guests} guests and a budget of {budget}."
            ),
            QuickAction::BudgetBreakdown => format!(
                "Provide a detailed budget breakdown for a wedding with {guests} guests and a total budget of {budget}."
            ),
            QuickAction::ThemeSuggestions => {
                "Suggest some wedding themes and color schemes that would work well for our wedding.".to_string()
            }
            QuickAction::MusicIdeas => {
                "Suggest some wedding music and entertainment options that would work well for our wedding.".to_string()
            }
            QuickAction::CateringIdeas => format!(
                "Suggest catering options and menu ideas for {guests} guests with a budget of {budget}."
            ),
            QuickAction::TimelineChecklist => format!(
                "Create a detailed wedding planning timeline and checklist for a wedding on {date} with {guests} guests. \
                 Include all major milestones and tasks."
            ),
            QuickAction::BudgetPlanning => format!(
                "Provide a detailed budget breakdown and planning guide for a wedding with {guests} guests and a budget of {budget}. \
                 Include cost-saving tips and budget allocation recommendations."
            ),
            QuickAction::VenueSuggestions => format!(
                "Suggest suitable wedding venues for {guests} guests with a budget of {budget}. \
                 Include indoor and outdoor options, and consider the wedding date {date}."
            ),
            QuickAction::ThemeDecor => {
                "Suggest wedding themes and decoration ideas that would create a beautiful and memorable atmosphere. \
                 Include color schemes, floral arrangements, and lighting ideas."
                    .to_string()
            }
            QuickAction::VendorRecommendations => format!(
                "Recommend essential vendors for a wedding with {guests} guests and a budget of {budget}. \
                 Include photographers, videographers, makeup artists, and other key vendors."
            ),
            QuickAction::MusicEntertainment => {
                "Suggest wedding music and entertainment options. \
                 Include recommendations for ceremony music, reception entertainment, and DJ/band options."
                    .to_string()
            }
            QuickAction::CateringMenu => format!(
                "Suggest catering options and menu ideas for {guests} guests with a budget of {budget}. \
                 Include appetizers, main course, desserts, and beverage options."
            ),
            QuickAction::AdditionalServices => {
                "Suggest additional wedding services and ideas that could enhance the wedding experience. \
                 Include transportation, accommodation, wedding favors, and other special touches."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

impl FromStr for QuickAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.slug() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Template-facing view of an action button.
#[derive(Debug, Clone, Serialize)]
pub struct ActionView {
    pub slug: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub progress: &'static str,
    pub group: ActionGroup,
}

impl From<QuickAction> for ActionView {
    fn from(action: QuickAction) -> Self {
        Self {
            slug: action.slug(),
            icon: action.icon(),
            label: action.label(),
            progress: action.progress(),
            group: action.group(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn details() -> WeddingDetails {
        WeddingDetails {
            date: NaiveDate::from_ymd_opt(2027, 2, 14),
            guest_count: 120,
            budget: 1_500_000,
        }
    }

    #[test]
    fn test_context_includes_live_details() {
        let context = planner_context(&details());
        assert!(context.starts_with("You are a friendly and experienced AI wedding planner."));
        assert!(context.contains("- Wedding Date: 2027-02-14"));
        assert!(context.contains("- Guest Count: 120"));
        assert!(context.contains("- Budget: ₹1500000"));
    }

    #[test]
    fn test_chat_prompt_appends_question() {
        let prompt = chat_prompt(&details(), "Which flowers are in season?");
        assert!(prompt.starts_with(&planner_context(&details())));
        assert!(prompt.ends_with("\n\nUser question: Which flowers are in season?"));
    }

    #[test]
    fn test_context_with_unset_date() {
        let context = planner_context(&WeddingDetails::default());
        assert!(context.contains("- Wedding Date: a date yet to be decided"));
        assert!(context.contains("- Guest Count: 50"));
        assert!(context.contains("- Budget: ₹500000"));
    }

    #[test]
    fn test_timeline_prompt() {
        assert_eq!(
            QuickAction::CreateTimeline.prompt(&details()),
            "Create a detailed wedding planning timeline for a wedding on 2027-02-14 with 120 guests and a budget of ₹1500000."
        );
    }

    #[test]
    fn test_venue_prompt_mentions_all_details() {
        let prompt = QuickAction::VenueSuggestions.prompt(&details());
        assert!(prompt.contains("120 guests"));
        assert!(prompt.contains("₹1500000"));
        assert!(prompt.ends_with("consider the wedding date 2027-02-14."));
    }

    #[test]
    fn test_static_prompts_ignore_details() {
        for action in [
            QuickAction::ThemeSuggestions,
            QuickAction::MusicIdeas,
            QuickAction::ThemeDecor,
            QuickAction::MusicEntertainment,
            QuickAction::AdditionalServices,
        ] {
            assert_eq!(
                action.prompt(&details()),
                action.prompt(&WeddingDetails::default()),
                "{action:?} should not depend on the details"
            );
        }
    }

    #[test]
    fn test_slugs_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for action in QuickAction::ALL {
            assert!(seen.insert(action.slug()), "duplicate slug {}", action.slug());
            assert_eq!(action.slug().parse::<QuickAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_slug() {
        let err = "elope".parse::<QuickAction>().unwrap_err();
        assert_eq!(err, UnknownAction("elope".to_string()));
    }

    #[test]
    fn test_group_layout() {
        assert_eq!(QuickAction::in_group(ActionGroup::Sidebar).count(), 5);
        assert_eq!(QuickAction::in_group(ActionGroup::ServicesLeft).count(), 4);
        let right: Vec<_> = QuickAction::in_group(ActionGroup::ServicesRight).collect();
        assert_eq!(right.first(), Some(&QuickAction::VendorRecommendations));
        assert_eq!(right.last(), Some(&QuickAction::AdditionalServices));
    }
}
