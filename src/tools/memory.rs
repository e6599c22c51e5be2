// Session memory: analyses, summaries, reset and sample profile seeding

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::session::{timestamp, SessionState};

pub fn memorize_analysis(
    session: &mut SessionState,
    analysis_type: &str,
    analysis_data: Map<String, Value>,
) -> Value {
    let points = analysis_data.len();
    let mut entry = analysis_data;
    entry.insert("timestamp".to_string(), json!(timestamp()));
    entry.insert("type".to_string(), json!(analysis_type));
    session
        .analysis_results
        .insert(analysis_type.to_string(), Value::Object(entry));

    json!({
        "status": format!("Stored analysis \"{}\" with {} data points", analysis_type, points)
    })
}

pub fn forget_analysis(session: &mut SessionState, analysis_type: &str) -> Value {
    match session.analysis_results.remove(analysis_type) {
        Some(_) => json!({ "status": format!("Removed analysis \"{}\"", analysis_type) }),
        None => json!({ "status": format!("Analysis \"{}\" not found in memory", analysis_type) }),
    }
}

pub fn get_session_summary(session: &SessionState) -> Value {
    json!({
        "student_profile": session.student_profile.clone().unwrap_or_default(),
        "analysis_count": session.analysis_results.len(),
        "analyses_available": session.analysis_results.keys().collect::<Vec<_>>(),
        "session_timestamp": session.analysis_timestamp.clone().unwrap_or_default(),
        "system_time": session.system_time.clone().unwrap_or_default(),
    })
}

/// Clears everything except the session id, `system_time` and `rag_initialized`.
pub fn clear_session_data(session: &mut SessionState) -> Value {
    let cleared = session.populated_items();
    *session = SessionState {
        id: session.id,
        system_time: session.system_time.take(),
        rag_initialized: session.rag_initialized,
        ..SessionState::default()
    };
    json!({ "status": format!("Cleared {} session data items", cleared) })
}

/// Seeds the session from a JSON profile once. Problems are logged, never returned.
pub fn load_sample_profile(session: &mut SessionState, path: &Path) {
    if !path.exists() {
        info!(path = %path.display(), "No sample profile found");
        return;
    }

    let data = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str::<Map<String, Value>>(&raw).map_err(|e| e.to_string()))
    {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not load sample profile");
            return;
        }
    };

    let student = data
        .get("student_name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("Unknown");
    info!(student, "Loading sample student profile");

    if session.system_time.is_none() {
        session.system_time = Some(timestamp());
    }
    if session.rag_initialized {
        return;
    }

    let snapshot = session.clone();
    if let Err(e) = session.merge(data) {
        warn!(path = %path.display(), error = %e, "Sample profile does not fit the session, ignoring it");
        *session = snapshot;
        return;
    }
    session.rag_initialized = true;
    session.analysis_timestamp = Some(timestamp());
}
