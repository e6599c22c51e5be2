// Resource catalog and weekly scheduling for the study planner

use serde_json::{json, Value};

use super::session::{timestamp, ResourceEntry, SessionState, StudySchedule, StudyWeek};
use crate::types::{AppError, AppResult};

const DEFAULT_WEEKS: u32 = 4;
/// One school year.
pub const MAX_WEEKS: u32 = 52;

fn catalog(subject: &str, resource_type: &str) -> &'static [&'static str] {
    match (subject, resource_type) {
        ("math", "practice_worksheets") => &[
            "Khan Academy Math Practice Worksheets",
            "IXL Math Skills Practice",
            "Math-Drills.com Worksheets",
            "Education.com Math Practice Sheets",
        ],
        ("math", "video_tutorials") => &[
            "Khan Academy Math Videos",
            "Professor Leonard Math Tutorials",
            "Math Antics Video Series",
            "Numberphile Educational Videos",
        ],
        ("math", "interactive_games") => &[
            "Prodigy Math Game",
            "Sumdog Math Games",
            "Math Playground Interactive Activities",
            "Cool Math Games Educational Section",
        ],
        ("reading", "practice_worksheets") => &[
            "Reading Comprehension Worksheets by grade",
            "Scholastic Reading Practice Sheets",
            "K5 Learning Reading Worksheets",
            "Super Teacher Worksheets Reading",
        ],
        ("reading", "video_tutorials") => &[
            "Reading Strategies Video Lessons",
            "Phonics and Decoding Video Tutorials",
            "Comprehension Strategy Videos",
            "Guided Reading Video Sessions",
        ],
        ("reading", "interactive_games") => &[
            "Epic! Digital Library Games",
            "Reading Eggs Interactive Activities",
            "Starfall Reading Games",
            "ABCmouse Reading Activities",
        ],
        ("science", "practice_worksheets") => &[
            "Science experiment worksheets",
            "Bill Nye Science Worksheets",
            "NASA Educational Activity Sheets",
            "National Geographic Kids Science Worksheets",
        ],
        ("science", "video_tutorials") => &[
            "Crash Course Science Videos",
            "Bill Nye the Science Guy Episodes",
            "SciShow Kids Educational Videos",
            "NASA STEM Video Series",
        ],
        ("science", "interactive_games") => &[
            "BrainPOP Science Games",
            "NASA Kids Club Interactive Activities",
            "Science4Us Digital Activities",
            "Mystery Science Interactive Lessons",
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
    Elementary,
    Middle,
    High,
}

impl GradeBand {
    pub fn from_grade(grade_level: &str) -> Self {
        match grade_level.trim() {
            "K" | "1" | "2" | "3" | "4" | "5" => GradeBand::Elementary,
            "6" | "7" | "8" => GradeBand::Middle,
            _ => GradeBand::High,
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            GradeBand::Elementary => "Focus on foundational skills and visual learning",
            GradeBand::Middle => "Include analytical thinking and problem-solving approaches",
            GradeBand::High => "Emphasize critical thinking and advanced concepts",
        }
    }
}

pub fn find_educational_resources(
    session: &mut SessionState,
    subject: &str,
    grade_level: &str,
    resource_type: &str,
) -> Value {
    let resources: Vec<String> = catalog(&subject.to_lowercase(), resource_type)
        .iter()
        .map(|r| r.to_string())
        .collect();
    let guidance = GradeBand::from_grade(grade_level).guidance();
    let key = format!("{}_{}_{}", subject, grade_level, resource_type);

    session.educational_resources.insert(
        key.clone(),
        ResourceEntry {
            subject: subject.to_string(),
            grade_level: grade_level.to_string(),
            resource_type: resource_type.to_string(),
            resources: resources.clone(),
            grade_notes: guidance.to_string(),
            recommended_count: resources.len(),
        },
    );

    json!({
        "subject": subject,
        "grade_level": grade_level,
        "resource_type": resource_type,
        "status": format!(
            "Found {} {} resources for {} at grade {}",
            resources.len(), resource_type, subject, grade_level
        ),
        "found_resources": resources,
        "grade_specific_guidance": guidance,
        "storage_key": key,
    })
}

/// Spreads `resources` over `weeks` in order; leftovers go to the last week.
/// Fewer than one week means the default; more than `MAX_WEEKS` is rejected.
pub fn build_schedule(resources: &[String], weeks: i64) -> AppResult<Vec<StudyWeek>> {
    let weeks = match u32::try_from(weeks) {
        _ if weeks < 1 => DEFAULT_WEEKS,
        Ok(weeks) if weeks <= MAX_WEEKS => weeks,
        _ => {
            return Err(AppError::InvalidRequest(format!(
                "study_duration_weeks must be at most {}, got {}",
                MAX_WEEKS, weeks
            )))
        }
    };
    let per_week = (resources.len() / weeks as usize).max(1);
    let mut remaining = resources.iter();

    Ok((1..=weeks)
        .map(|week| {
            let mut batch: Vec<String> = remaining.by_ref().take(per_week).cloned().collect();
            if week == weeks {
                batch.extend(remaining.by_ref().cloned());
            }
            StudyWeek {
                week,
                focus_areas: format!("Complete {} learning activities", batch.len()),
                time_allocation: "15-30 minutes per resource".to_string(),
                resources: batch,
            }
        })
        .collect())
}

pub fn organize_study_schedule(
    session: &mut SessionState,
    resources: &[String],
    weeks: i64,
) -> AppResult<Value> {
    let breakdown = build_schedule(resources, weeks)?;
    let total_weeks = breakdown.len() as u32;

    let by_label: serde_json::Map<String, Value> = breakdown
        .iter()
        .map(|w| {
            (
                format!("Week {}", w.week),
                json!({
                    "resources": w.resources,
                    "focus_areas": w.focus_areas,
                    "time_allocation": w.time_allocation,
                }),
            )
        })
        .collect();

    session.study_schedule = Some(StudySchedule {
        total_weeks,
        total_resources: resources.len(),
        weekly_breakdown: breakdown,
        created_at: session.analysis_timestamp.clone().unwrap_or_default(),
    });

    Ok(json!({
        "study_schedule": by_label,
        "total_duration": format!("{} weeks", total_weeks),
        "resources_organized": resources.len(),
        "status": format!(
            "Created {}-week study schedule with {} resources",
            total_weeks,
            resources.len()
        ),
    }))
}

pub fn store_study_plan(session: &mut SessionState, plan_content: &str) -> Value {
    session.analysis_results.insert(
        "study_plan".to_string(),
        json!({ "content": plan_content, "timestamp": timestamp() }),
    );
    session.personalized_plan = Some(plan_content.to_string());

    json!({
        "status": "Study plan stored in session state",
        "analysis_count": session.analysis_results.len(),
    })
}
