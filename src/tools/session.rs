use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::AppResult;

/// Per-conversation context shared by the agent tools.
///
/// Keys the hosted runtime does not know about survive in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_time: Option<String>,
    #[serde(default)]
    pub rag_initialized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_profile: Option<StudentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_report_data: Option<String>,
    #[serde(default)]
    pub analysis_results: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_weaknesses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_findings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalized_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_report: Option<String>,
    #[serde(default)]
    pub educational_resources: BTreeMap<String, ResourceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_schedule: Option<StudySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_validation: Option<ReportValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_consistency: Option<ConsistencyReport>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub name: String,
    pub grade: String,
    pub school: String,
    pub subjects: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub subject: String,
    pub grade_level: String,
    pub resource_type: String,
    pub resources: Vec<String>,
    pub grade_notes: String,
    pub recommended_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyWeek {
    pub week: u32,
    pub resources: Vec<String>,
    pub focus_areas: String,
    pub time_allocation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySchedule {
    pub total_weeks: u32,
    pub total_resources: usize,
    pub weekly_breakdown: Vec<StudyWeek>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportValidation {
    pub is_valid: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub is_consistent: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            system_time: None,
            rag_initialized: false,
            analysis_timestamp: None,
            student_profile: None,
            original_report_data: None,
            analysis_results: BTreeMap::new(),
            identified_weaknesses: None,
            research_findings: None,
            personalized_plan: None,
            formatted_report: None,
            educational_resources: BTreeMap::new(),
            study_schedule: None,
            report_validation: None,
            data_consistency: None,
            extra: Map::new(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overlays `source` onto the session, key by key.
    pub fn merge(&mut self, source: Map<String, Value>) -> AppResult<()> {
        let mut current = serde_json::to_value(&*self)?;
        if let Value::Object(ref mut fields) = current {
            fields.extend(source);
        }
        *self = serde_json::from_value(current)?;
        Ok(())
    }

    /// Number of populated entries other than `system_time` and `rag_initialized`.
    pub fn populated_items(&self) -> usize {
        [
            self.analysis_timestamp.is_some(),
            self.student_profile.is_some(),
            self.original_report_data.is_some(),
            !self.analysis_results.is_empty(),
            self.identified_weaknesses.is_some(),
            self.research_findings.is_some(),
            self.personalized_plan.is_some(),
            self.formatted_report.is_some(),
            !self.educational_resources.is_empty(),
            self.study_schedule.is_some(),
            self.report_validation.is_some(),
            self.data_consistency.is_some(),
        ]
        .iter()
        .filter(|populated| **populated)
        .count()
            + self.extra.len()
    }

    pub fn profile_mut(&mut self) -> &mut StudentProfile {
        self.student_profile.get_or_insert_with(StudentProfile::default)
    }
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}
