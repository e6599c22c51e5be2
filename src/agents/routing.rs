// Keyword router mirroring the coordinator's delegation rules

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCategory {
    DataRetrieval,
    WeaknessAnalysis,
    SolutionResearch,
    StudyPlanning,
    ReportFormatting,
    Coordinator,
}

/// Specialist stages in pipeline order.
pub const PIPELINE: [RouteCategory; 5] = [
    RouteCategory::DataRetrieval,
    RouteCategory::WeaknessAnalysis,
    RouteCategory::SolutionResearch,
    RouteCategory::StudyPlanning,
    RouteCategory::ReportFormatting,
];

impl RouteCategory {
    pub fn agent_name(&self) -> &'static str {
        match self {
            RouteCategory::DataRetrieval => super::DATA_RETRIEVER_AGENT,
            RouteCategory::WeaknessAnalysis => super::WEAKNESS_ANALYZER_AGENT,
            RouteCategory::SolutionResearch => super::SOLUTION_RESEARCHER_AGENT,
            RouteCategory::StudyPlanning => super::STUDY_PLANNER_AGENT,
            RouteCategory::ReportFormatting => super::PRESENTATION_FORMATTER_AGENT,
            RouteCategory::Coordinator => super::ROOT_AGENT,
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            RouteCategory::DataRetrieval => &[
                "grade", "grades", "score", "scores", "rating", "ratings", "attendance",
                "teacher comment", "teacher comments", "report card data", "what did",
                "retrieve", "look up",
            ],
            RouteCategory::WeaknessAnalysis => &[
                "weakness", "weaknesses", "struggling", "struggle", "struggles", "gap", "gaps",
                "areas for improvement", "needs improvement", "analyze", "analyse", "performance",
            ],
            RouteCategory::SolutionResearch => &[
                "strategy", "strategies", "intervention", "interventions", "research",
                "evidence", "evidence-based", "best practice", "best practices", "how to help",
            ],
            RouteCategory::StudyPlanning => &[
                "study plan", "plan", "schedule", "activities", "activity", "practice",
                "worksheet", "worksheets", "weekly",
            ],
            RouteCategory::ReportFormatting => &[
                "report", "pdf", "format", "formatted", "printable", "print", "summary",
                "export",
            ],
            RouteCategory::Coordinator => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub category: RouteCategory,
    pub agent: String,
    /// Keywords that matched, for the chosen stage only
    pub matched: Vec<String>,
    pub fallback: bool,
}

// Whole-word (or whole-phrase) match against lowercased text
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric();
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        !before.map_or(false, is_word) && !after.map_or(false, is_word)
    })
}

/// Picks the specialist for `message`. When several stages match, the
/// earliest pipeline stage wins; nothing matching routes to the coordinator.
pub fn route_request(message: &str) -> RouteDecision {
    let text = message.to_lowercase();

    for stage in PIPELINE {
        let matched: Vec<String> = stage
            .keywords()
            .iter()
            .filter(|k| contains_phrase(&text, k))
            .map(|k| k.to_string())
            .collect();
        if !matched.is_empty() {
            return RouteDecision {
                category: stage,
                agent: stage.agent_name().to_string(),
                matched,
                fallback: false,
            };
        }
    }

    RouteDecision {
        category: RouteCategory::Coordinator,
        agent: RouteCategory::Coordinator.agent_name().to_string(),
        matched: Vec::new(),
        fallback: true,
    }
}
