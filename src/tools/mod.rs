//! Session Tools
//!
//! Function tools the agents call against a per-conversation `SessionState`.
//! Each tool takes JSON arguments and returns a JSON result so the same
//! dispatch serves the CLI and the exported agent definitions.

pub mod memory;
pub mod report;
pub mod session;
pub mod student_data;
pub mod study_resources;
pub mod validation;

pub use session::SessionState;

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{AppError, AppResult};

pub const DEFAULT_SAMPLE_PROFILE: &str = "sample/sample_student_profile.json";

pub const TOOL_NAMES: [&str; 17] = [
    "extract_student_info",
    "store_analysis_results",
    "memorize_analysis",
    "forget_analysis",
    "get_session_summary",
    "clear_session_data",
    "load_sample_profile",
    "find_educational_resources",
    "organize_study_schedule",
    "store_study_plan",
    "validate_report_card",
    "ensure_data_consistency",
    "get_validation_summary",
    "format_comprehensive_report",
    "export_report_sections",
    "export_to_pdf",
    "retrieve_student_report_data",
];

fn str_arg<'a>(args: &'a Value, key: &str) -> AppResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidRequest(format!("missing string argument '{}'", key)))
}

fn string_list_arg(args: &Value, key: &str) -> AppResult<Vec<String>> {
    let items = args
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::InvalidRequest(format!("missing list argument '{}'", key)))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidRequest(format!("'{}' must contain strings", key)))
        })
        .collect()
}

/// Runs the tool `name` with `args` against `session`.
pub fn invoke(name: &str, args: &Value, session: &mut SessionState) -> AppResult<Value> {
    debug!(tool = name, session = %session.id, "Invoking session tool");

    let result = match name {
        "extract_student_info" => {
            student_data::extract_student_info(session, str_arg(args, "report_data")?)
        }
        "store_analysis_results" => student_data::store_analysis_results(
            session,
            str_arg(args, "analysis_type")?,
            str_arg(args, "results")?,
        ),
        "memorize_analysis" => {
            let data = match args.get("analysis_data") {
                Some(Value::Object(map)) => map.clone(),
                Some(_) => {
                    return Err(AppError::InvalidRequest(
                        "'analysis_data' must be an object".to_string(),
                    ))
                }
                None => Map::new(),
            };
            memory::memorize_analysis(session, str_arg(args, "analysis_type")?, data)
        }
        "forget_analysis" => memory::forget_analysis(session, str_arg(args, "analysis_type")?),
        "get_session_summary" => memory::get_session_summary(session),
        "clear_session_data" => memory::clear_session_data(session),
        "load_sample_profile" => {
            let path = args
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_SAMPLE_PROFILE);
            memory::load_sample_profile(session, Path::new(path));
            serde_json::json!({ "rag_initialized": session.rag_initialized })
        }
        "find_educational_resources" => study_resources::find_educational_resources(
            session,
            str_arg(args, "subject")?,
            str_arg(args, "grade_level")?,
            str_arg(args, "resource_type")?,
        ),
        "organize_study_schedule" => {
            let resources = string_list_arg(args, "resources_list")?;
            let weeks = match args.get("study_duration_weeks") {
                None | Some(Value::Null) => 0,
                Some(v) => v.as_i64().ok_or_else(|| {
                    AppError::InvalidRequest("'study_duration_weeks' must be an integer".to_string())
                })?,
            };
            study_resources::organize_study_schedule(session, &resources, weeks)?
        }
        "store_study_plan" => {
            study_resources::store_study_plan(session, str_arg(args, "plan_content")?)
        }
        "validate_report_card" => serde_json::to_value(validation::validate_report_card(
            session,
            str_arg(args, "report_text")?,
        ))?,
        "ensure_data_consistency" => {
            serde_json::to_value(validation::ensure_data_consistency(session))?
        }
        "get_validation_summary" => validation::get_validation_summary(session),
        "format_comprehensive_report" => report::format_comprehensive_report(session),
        "export_report_sections" => {
            report::export_report_sections(session, &string_list_arg(args, "sections")?)?
        }
        "export_to_pdf" => report::export_to_pdf(session, Path::new(str_arg(args, "path")?))?,
        "retrieve_student_report_data" => {
            return Err(AppError::InvalidRequest(
                "retrieve_student_report_data runs on the retrieval platform; use query-corpus"
                    .to_string(),
            ))
        }
        other => {
            return Err(AppError::NotFound(format!("tool '{}'", other)));
        }
    };

    Ok(result)
}
