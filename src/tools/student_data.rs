// Report card intake for the data retriever

use serde_json::{json, Value};

use super::session::{timestamp, SessionState};

/// Stores the raw report and pulls name, grade and school out of `key: value` lines.
pub fn extract_student_info(session: &mut SessionState, report_data: &str) -> Value {
    let now = timestamp();
    session.original_report_data = Some(report_data.to_string());
    session.analysis_timestamp = Some(now.clone());

    let profile = session.profile_mut();
    for line in report_data.lines() {
        let line = line.trim().to_lowercase();
        let value = || line.rsplit(':').next().unwrap_or_default().trim().to_string();

        if line.contains("student:") || line.contains("name:") {
            profile.name = value();
        } else if line.contains("grade:") && !line.contains("grade level") {
            profile.grade = value();
        } else if line.contains("school:") {
            profile.school = value();
        }
    }

    json!({
        "status": "Extracted student information and stored in session state",
        "timestamp": now,
        "student_name": profile.name,
    })
}

pub fn store_analysis_results(session: &mut SessionState, analysis_type: &str, results: &str) -> Value {
    session.analysis_results.insert(
        analysis_type.to_string(),
        json!({ "content": results, "timestamp": timestamp() }),
    );

    json!({
        "status": format!("Stored {} results in session state", analysis_type),
        "analysis_count": session.analysis_results.len(),
    })
}
