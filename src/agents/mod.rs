//! Agent Definitions
//!
//! Declarative descriptions of the report card analysis team. They are
//! exported as JSON for the hosted agent runtime, which owns prompting and
//! model calls.
//!
//! ## Pipeline Overview
//!
//! ```text
//! User Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │ root_agent  │  → picks the earliest stage the request needs
//! └─────────────┘
//!      │
//!      ▼
//! data retriever → weakness analyzer → solution researcher
//!                                             │
//!                                             ▼
//!                      presentation formatter ← study planner
//! ```

pub mod prompts;
pub mod routing;

pub use routing::{route_request, RouteCategory, RouteDecision};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::AgentConfig;
use crate::types::{AppError, AppResult};

pub const ROOT_AGENT: &str = "root_agent";
pub const DATA_RETRIEVER_AGENT: &str = "data_retriever_agent";
pub const WEAKNESS_ANALYZER_AGENT: &str = "weakness_analyzer_agent";
pub const SOLUTION_RESEARCHER_AGENT: &str = "solution_researcher_agent";
pub const STUDY_PLANNER_AGENT: &str = "study_planner_agent";
pub const PRESENTATION_FORMATTER_AGENT: &str = "presentation_formatter_agent";
pub const RETRIEVAL_GROUNDING_AGENT: &str = "rag_retrieval_grounding";
pub const REPORT_CARD_RAG_AGENT: &str = "report_card_rag_agent";

pub const RETRIEVAL_TOOL: &str = "retrieve_student_report_data";
pub const RETRIEVAL_TOP_K: u32 = 5;
pub const RETRIEVAL_DISTANCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolSpec {
    /// Local session tool, dispatched through `tools::invoke`
    Function {
        name: String,
        description: String,
        parameters: Value,
    },
    /// Another agent exposed as a tool
    Agent { agent: String },
    /// Managed corpus retrieval
    Retrieval {
        name: String,
        description: String,
        rag_corpus: Option<String>,
        similarity_top_k: u32,
        vector_distance_threshold: f64,
    },
    /// The runtime's built-in web search
    WebSearch,
}

impl ToolSpec {
    pub fn label(&self) -> String {
        match self {
            ToolSpec::Function { name, .. } => name.clone(),
            ToolSpec::Agent { agent } => format!("agent:{}", agent),
            ToolSpec::Retrieval { name, .. } => format!("retrieval:{}", name),
            ToolSpec::WebSearch => "google_search".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    #[serde(default)]
    pub disallow_transfer_to_parent: bool,
    #[serde(default)]
    pub disallow_transfer_to_peers: bool,
}

impl AgentDefinition {
    fn new(name: &str, model: &str, description: &str, instruction: &str, tools: Vec<ToolSpec>) -> Self {
        Self {
            name: name.to_string(),
            model: model.to_string(),
            description: description.to_string(),
            instruction: instruction.to_string(),
            tools,
            output_key: None,
            disallow_transfer_to_parent: false,
            disallow_transfer_to_peers: false,
        }
    }

    /// Specialists answer through the coordinator only.
    fn specialist(mut self, output_key: Option<&str>) -> Self {
        self.output_key = output_key.map(str::to_string);
        self.disallow_transfer_to_parent = true;
        self.disallow_transfer_to_peers = true;
        self
    }
}

fn function(name: &str, description: &str, properties: Value, required: &[&str]) -> ToolSpec {
    ToolSpec::Function {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
    }
}

fn agent_tool(name: &str) -> ToolSpec {
    ToolSpec::Agent {
        agent: name.to_string(),
    }
}

fn retrieval_tool(rag_corpus: Option<&str>) -> ToolSpec {
    ToolSpec::Retrieval {
        name: RETRIEVAL_TOOL.to_string(),
        description: "Retrieves comprehensive report card data for analysis.".to_string(),
        rag_corpus: rag_corpus.map(str::to_string),
        similarity_top_k: RETRIEVAL_TOP_K,
        vector_distance_threshold: RETRIEVAL_DISTANCE_THRESHOLD,
    }
}

fn memory_tools() -> Vec<ToolSpec> {
    vec![
        function(
            "memorize_analysis",
            "Store analysis results in session memory",
            json!({
                "analysis_type": { "type": "string" },
                "analysis_data": { "type": "object" }
            }),
            &["analysis_type", "analysis_data"],
        ),
        function(
            "forget_analysis",
            "Remove one stored analysis from session memory",
            json!({ "analysis_type": { "type": "string" } }),
            &["analysis_type"],
        ),
        function("get_session_summary", "Summarize the data stored in the session", json!({}), &[]),
        function("clear_session_data", "Clear session data except system keys", json!({}), &[]),
    ]
}

fn validation_tools() -> Vec<ToolSpec> {
    vec![
        function(
            "validate_report_card",
            "Check that text looks like a Williamson County Schools report card",
            json!({ "report_text": { "type": "string" } }),
            &["report_text"],
        ),
        function(
            "ensure_data_consistency",
            "Check the session's profile and analyses for gaps",
            json!({}),
            &[],
        ),
        function("get_validation_summary", "Summarize validation and consistency results", json!({}), &[]),
    ]
}

/// Every agent definition, specialists first and the coordinator after them.
pub fn all_agents(config: &AgentConfig) -> Vec<AgentDefinition> {
    let model = config.model.as_str();
    let corpus = config.rag_corpus.as_deref();

    let grounding = AgentDefinition::new(
        RETRIEVAL_GROUNDING_AGENT,
        model,
        "Retrieval over the student report card corpus",
        prompts::RETRIEVAL_GROUNDING,
        vec![retrieval_tool(corpus)],
    );

    let data_retriever = AgentDefinition::new(
        DATA_RETRIEVER_AGENT,
        model,
        "Retrieves specific, factual data points from student report cards",
        prompts::DATA_RETRIEVER,
        vec![
            agent_tool(RETRIEVAL_GROUNDING_AGENT),
            function(
                "extract_student_info",
                "Store report card text and extract the student's name, grade and school",
                json!({ "report_data": { "type": "string" } }),
                &["report_data"],
            ),
            function(
                "store_analysis_results",
                "Store analysis results in session state",
                json!({
                    "analysis_type": { "type": "string" },
                    "results": { "type": "string" }
                }),
                &["analysis_type", "results"],
            ),
        ],
    )
    .specialist(None);

    let weakness_analyzer = AgentDefinition::new(
        WEAKNESS_ANALYZER_AGENT,
        model,
        "Analyzes report card data to identify academic weaknesses and areas needing improvement",
        prompts::WEAKNESS_ANALYZER,
        vec![agent_tool(RETRIEVAL_GROUNDING_AGENT)],
    )
    .specialist(Some("identified_weaknesses"));

    let solution_researcher = AgentDefinition::new(
        SOLUTION_RESEARCHER_AGENT,
        model,
        "Researches evidence-based strategies and resources for educational challenges",
        prompts::SOLUTION_RESEARCHER,
        vec![ToolSpec::WebSearch],
    )
    .specialist(Some("research_findings"));

    let study_planner = AgentDefinition::new(
        STUDY_PLANNER_AGENT,
        model,
        "Creates personalized study plans based on identified weaknesses and researched solutions",
        prompts::STUDY_PLANNER,
        vec![
            function(
                "find_educational_resources",
                "Find learning resources by subject, grade level and resource type",
                json!({
                    "subject": { "type": "string" },
                    "grade_level": { "type": "string" },
                    "resource_type": {
                        "type": "string",
                        "enum": ["practice_worksheets", "video_tutorials", "interactive_games"]
                    }
                }),
                &["subject", "grade_level", "resource_type"],
            ),
            function(
                "organize_study_schedule",
                "Spread resources over a weekly study schedule",
                json!({
                    "resources_list": { "type": "array", "items": { "type": "string" } },
                    "study_duration_weeks": { "type": "integer" }
                }),
                &["resources_list", "study_duration_weeks"],
            ),
            function(
                "store_study_plan",
                "Save the finished study plan to session state",
                json!({ "plan_content": { "type": "string" } }),
                &["plan_content"],
            ),
        ],
    )
    .specialist(Some("personalized_plan"));

    let mut formatter_tools = vec![
        function(
            "format_comprehensive_report",
            "Build the full markdown report from session data",
            json!({}),
            &[],
        ),
        function(
            "export_report_sections",
            "Build a report with only the requested sections",
            json!({ "sections": { "type": "array", "items": { "type": "string" } } }),
            &["sections"],
        ),
        function(
            "export_to_pdf",
            "Write the formatted report to a PDF file",
            json!({ "path": { "type": "string" } }),
            &["path"],
        ),
    ];
    formatter_tools.extend(memory_tools());
    formatter_tools.extend(validation_tools());

    let presentation_formatter = AgentDefinition::new(
        PRESENTATION_FORMATTER_AGENT,
        model,
        "Formats educational analysis into professional reports with memory and validation tools",
        prompts::PRESENTATION_FORMATTER,
        formatter_tools,
    )
    .specialist(Some("formatted_report"));

    let root = AgentDefinition::new(
        ROOT_AGENT,
        model,
        "Educational analysis coordinator for student report cards and improvement plans",
        prompts::COORDINATOR,
        routing::PIPELINE
            .iter()
            .map(|stage| agent_tool(stage.agent_name()))
            .collect(),
    );

    let assistant = AgentDefinition::new(
        REPORT_CARD_RAG_AGENT,
        model,
        "Single-agent assistant answering report card questions with corpus retrieval",
        prompts::REPORT_CARD_ASSISTANT,
        vec![retrieval_tool(corpus)],
    );

    vec![
        grounding,
        data_retriever,
        weakness_analyzer,
        solution_researcher,
        study_planner,
        presentation_formatter,
        root,
        assistant,
    ]
}

pub fn find_agent(config: &AgentConfig, name: &str) -> AppResult<AgentDefinition> {
    all_agents(config)
        .into_iter()
        .find(|a| a.name == name)
        .ok_or_else(|| AppError::NotFound(format!("agent '{}'", name)))
}

/// JSON document for the hosted runtime.
pub fn export(config: &AgentConfig) -> AppResult<String> {
    let document = json!({
        "root_agent": ROOT_AGENT,
        "agents": all_agents(config),
    });
    Ok(serde_json::to_string_pretty(&document)?)
}
