//! Parent-facing report assembly and PDF export.

use std::path::Path;

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Value};
use tracing::info;

use super::session::SessionState;
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    ExecutiveSummary,
    StudentProfile,
    Strategies,
    LearningPlan,
    ProgressMonitoring,
    NextSteps,
}

impl ReportSection {
    pub const ALL: [ReportSection; 6] = [
        ReportSection::ExecutiveSummary,
        ReportSection::StudentProfile,
        ReportSection::Strategies,
        ReportSection::LearningPlan,
        ReportSection::ProgressMonitoring,
        ReportSection::NextSteps,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ReportSection::ExecutiveSummary => "executive_summary",
            ReportSection::StudentProfile => "student_profile",
            ReportSection::Strategies => "strategies",
            ReportSection::LearningPlan => "learning_plan",
            ReportSection::ProgressMonitoring => "progress_monitoring",
            ReportSection::NextSteps => "next_steps",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::ExecutiveSummary => "Executive Summary",
            ReportSection::StudentProfile => "Student Profile & Areas for Growth",
            ReportSection::Strategies => "Evidence-Based Strategies",
            ReportSection::LearningPlan => "Personalized Learning Plan",
            ReportSection::ProgressMonitoring => "Progress Monitoring Suggestions",
            ReportSection::NextSteps => "Next Steps & Support",
        }
    }

    /// Accepts either the key or the title, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.key() == raw || s.title().to_lowercase() == raw)
    }

    fn body(&self, session: &SessionState) -> String {
        let profile = session.student_profile.clone().unwrap_or_default();
        let or_pending = |value: &Option<String>, pending: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| pending.to_string())
        };

        match self {
            ReportSection::ExecutiveSummary => {
                let student = non_empty(&profile.name).unwrap_or("The student");
                let mut lines = vec![format!(
                    "{} was reviewed across {} recorded analyses.",
                    student,
                    session.analysis_results.len()
                )];
                lines.push(if session.identified_weaknesses.is_some() {
                    "Areas for growth have been identified and matched with strategies below.".to_string()
                } else {
                    "No areas for growth have been recorded yet.".to_string()
                });
                if session.personalized_plan.is_some() {
                    lines.push("A personalized learning plan is ready to start.".to_string());
                }
                lines.join(" ")
            }
            ReportSection::StudentProfile => {
                let mut out = format!(
                    "- **Name:** {}\n- **Grade:** {}\n- **School:** {}\n\n### Areas for Growth\n\n{}",
                    non_empty(&profile.name).unwrap_or("Not recorded"),
                    non_empty(&profile.grade).unwrap_or("Not recorded"),
                    non_empty(&profile.school).unwrap_or("Not recorded"),
                    or_pending(&session.identified_weaknesses, "No weaknesses identified yet."),
                );
                if !profile.strengths.is_empty() {
                    out.push_str("\n\n### Strengths\n\n");
                    out.push_str(&bullets(&profile.strengths));
                }
                out
            }
            ReportSection::Strategies => {
                or_pending(&session.research_findings, "No research findings recorded yet.")
            }
            ReportSection::LearningPlan => {
                let mut out = or_pending(&session.personalized_plan, "No learning plan created yet.");
                if let Some(schedule) = &session.study_schedule {
                    out.push_str(&format!("\n\n### {}-Week Schedule\n", schedule.total_weeks));
                    for week in &schedule.weekly_breakdown {
                        out.push_str(&format!("\n**Week {}** ({})\n", week.week, week.time_allocation));
                        out.push_str(&bullets(&week.resources));
                        out.push('\n');
                    }
                }
                out
            }
            ReportSection::ProgressMonitoring => bullets(&[
                "Review the next report card against the standards flagged above".to_string(),
                "Keep a short weekly log of completed activities".to_string(),
                "Check in with the teacher at the midpoint of the quarter".to_string(),
            ]),
            ReportSection::NextSteps => bullets(&[
                "Share this report with the classroom teacher".to_string(),
                "Start with the first week of the learning plan".to_string(),
                "Ask the school about available intervention support".to_string(),
            ]),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(session: &SessionState, sections: &[ReportSection]) -> String {
    let student = session
        .student_profile
        .as_ref()
        .and_then(|p| non_empty(&p.name))
        .unwrap_or("Student");

    let mut out = format!(
        "# Learning Report: {}\n\n_Generated {}_\n",
        student,
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    for section in sections {
        out.push_str(&format!("\n## {}\n\n{}\n", section.title(), section.body(session)));
    }
    out
}

pub fn format_comprehensive_report(session: &mut SessionState) -> Value {
    let report = render(session, &ReportSection::ALL);
    session.formatted_report = Some(report.clone());
    json!({
        "status": "Comprehensive report formatted and stored in session state",
        "sections": ReportSection::ALL.iter().map(|s| s.title()).collect::<Vec<_>>(),
        "report": report,
    })
}

pub fn export_report_sections(session: &SessionState, requested: &[String]) -> AppResult<Value> {
    let mut sections = Vec::new();
    for raw in requested {
        let section = ReportSection::parse(raw)
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown report section '{}'", raw)))?;
        if !sections.contains(&section) {
            sections.push(section);
        }
    }
    if sections.is_empty() {
        return Err(AppError::InvalidRequest("no report sections requested".to_string()));
    }

    Ok(json!({
        "sections": sections.iter().map(|s| s.key()).collect::<Vec<_>>(),
        "report": render(session, &sections),
    }))
}

// PDF layout, A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 10;
const LEADING: i64 = 14;
const WRAP_COLUMNS: usize = 95;

/// Markdown to plain wrapped lines the base-14 Helvetica font can show.
fn pdf_lines(markdown: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in markdown.lines() {
        let plain: String = raw
            .trim_start_matches('#')
            .trim()
            .replace("**", "")
            .chars()
            .map(|c| if c.is_ascii() { c } else { '?' })
            .collect();

        if plain.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in plain.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > WRAP_COLUMNS {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

pub fn render_pdf(markdown: &str) -> AppResult<Vec<u8>> {
    let lines = pdf_lines(markdown);
    let per_page = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(per_page).collect()
    };

    for chunk in chunks {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for line in chunk {
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| AppError::Internal(format!("failed to encode PDF content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::Internal(format!("failed to write PDF: {}", e)))?;
    Ok(bytes)
}

/// Writes the formatted report (formatting it first if needed) to `path` as a PDF.
pub fn export_to_pdf(session: &mut SessionState, path: &Path) -> AppResult<Value> {
    if session.formatted_report.is_none() {
        format_comprehensive_report(session);
    }
    let markdown = session.formatted_report.clone().unwrap_or_default();
    let bytes = render_pdf(&markdown)?;
    std::fs::write(path, &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "Exported report PDF");
    Ok(json!({
        "status": format!("Report exported to {}", path.display()),
        "path": path.display().to_string(),
        "bytes": bytes.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_session() -> SessionState {
        let mut session = SessionState::new();
        let profile = session.profile_mut();
        profile.name = "emma johnson".to_string();
        profile.grade = "1".to_string();
        session.identified_weaknesses = Some("Subtraction within 20 rated 1".to_string());
        session.research_findings = Some("Use number lines and ten frames".to_string());
        session.personalized_plan = Some("10 minutes of ten-frame games daily".to_string());
        session
    }

    #[test]
    fn test_report_has_all_sections_in_order() {
        let mut session = populated_session();
        let result = format_comprehensive_report(&mut session);
        let report = result["report"].as_str().unwrap();

        let positions: Vec<usize> = ReportSection::ALL
            .iter()
            .map(|s| report.find(&format!("## {}", s.title())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(report.contains("Subtraction within 20"));
        assert!(report.contains("ten frames"));
        assert_eq!(session.formatted_report.as_deref(), Some(report));
    }

    #[test]
    fn test_empty_session_report_notes_pending_parts() {
        let mut session = SessionState::new();
        let result = format_comprehensive_report(&mut session);
        let report = result["report"].as_str().unwrap();
        assert!(report.contains("# Learning Report: Student"));
        assert!(report.contains("No research findings recorded yet."));
    }

    #[test]
    fn test_export_selected_sections_only() {
        let session = populated_session();
        let result = export_report_sections(
            &session,
            &["learning_plan".to_string(), "Executive Summary".to_string()],
        )
        .unwrap();
        let report = result["report"].as_str().unwrap();
        assert!(report.contains("## Personalized Learning Plan"));
        assert!(report.contains("## Executive Summary"));
        assert!(!report.contains("## Evidence-Based Strategies"));
        assert_eq!(result["sections"], json!(["learning_plan", "executive_summary"]));

        assert!(export_report_sections(&session, &["appendix".to_string()]).is_err());
        assert!(export_report_sections(&session, &[]).is_err());
    }

    #[test]
    fn test_pdf_lines_wrap_and_strip_markup() {
        let long = "word ".repeat(40);
        let lines = pdf_lines(&format!("## **Title**\n{}\nélève", long));
        assert_eq!(lines[0], "Title");
        assert!(lines.iter().all(|l| l.len() <= WRAP_COLUMNS));
        assert_eq!(lines.last().map(String::as_str), Some("?l?ve"));
    }

    #[test]
    fn test_pdf_is_loadable_and_paginated() {
        let markdown = (0..120).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let bytes = render_pdf(&markdown).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_export_to_pdf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let mut session = populated_session();
        let result = export_to_pdf(&mut session, &path).unwrap();
        assert!(session.formatted_report.is_some());
        assert!(path.exists());
        assert_eq!(result["bytes"], std::fs::metadata(&path).unwrap().len());
    }
}
