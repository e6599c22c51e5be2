// Report card plausibility and session consistency checks

use serde_json::{json, Value};

use super::session::{ConsistencyReport, ReportValidation, SessionState};

const REQUIRED_MARKERS: [(&str, &str); 4] = [
    ("Student Name:", "student identification"),
    ("Grade:", "grade level"),
    ("School:", "school identification"),
    ("Teacher:", "teacher information"),
];

const SUBJECTS: [&str; 8] = [
    "Reading",
    "Mathematics",
    "Science",
    "Social Studies",
    "Language Arts",
    "Writing",
    "Math",
    "ELA",
];

// Three recognised subjects are enough for full subject confidence
const EXPECTED_SUBJECTS: f64 = 3.0;
const VALID_THRESHOLD: f64 = 0.7;

pub fn validate_report_card(session: &mut SessionState, report_text: &str) -> ReportValidation {
    let text = report_text.to_lowercase();
    let mut result = ReportValidation::default();

    let mut found_markers = 0;
    for (marker, description) in REQUIRED_MARKERS {
        if text.contains(&marker.to_lowercase()) {
            found_markers += 1;
            result.strengths.push(format!("Found {}", description));
        } else {
            result.issues.push(format!("Missing {}", description));
        }
    }

    let found_subjects = SUBJECTS
        .iter()
        .filter(|s| text.contains(&s.to_lowercase()))
        .count();
    if found_subjects > 0 {
        result
            .strengths
            .push(format!("Found {} academic subjects", found_subjects));
    } else {
        result
            .issues
            .push("No recognizable academic subjects found".to_string());
    }

    let marker_confidence = found_markers as f64 / REQUIRED_MARKERS.len() as f64;
    let subject_confidence = (found_subjects as f64 / EXPECTED_SUBJECTS).min(1.0);
    result.confidence = (marker_confidence + subject_confidence) / 2.0;
    result.is_valid = result.confidence >= VALID_THRESHOLD;

    session.report_validation = Some(result.clone());
    result
}

pub fn ensure_data_consistency(session: &mut SessionState) -> ConsistencyReport {
    let mut report = ConsistencyReport {
        is_consistent: true,
        ..Default::default()
    };

    match &session.student_profile {
        None => report.issues.push("No student profile found in session".to_string()),
        Some(profile) => {
            for (field, value) in [
                ("name", &profile.name),
                ("grade", &profile.grade),
                ("school", &profile.school),
            ] {
                if value.trim().is_empty() {
                    report.issues.push(format!("Missing {} in student profile", field));
                }
            }
        }
    }

    for (analysis_type, data) in &session.analysis_results {
        let has = |key: &str| data.get(key).map_or(false, |v| !v.is_null() && v.as_str() != Some(""));
        if !has("timestamp") {
            report
                .warnings
                .push(format!("Analysis '{}' missing timestamp", analysis_type));
        }
        if !has("type") {
            report
                .warnings
                .push(format!("Analysis '{}' missing type field", analysis_type));
        }
    }

    if !session.analysis_results.is_empty() && session.analysis_timestamp.is_none() {
        report
            .warnings
            .push("Analysis results exist but no global timestamp found".to_string());
    }

    report.is_consistent = report.issues.is_empty();
    session.data_consistency = Some(report.clone());
    report
}

pub fn get_validation_summary(session: &SessionState) -> Value {
    json!({
        "report_validation": session.report_validation.clone().unwrap_or_default(),
        "data_consistency": session.data_consistency.clone().unwrap_or_default(),
        "validation_timestamp": session.analysis_timestamp.clone().unwrap_or_default(),
    })
}
