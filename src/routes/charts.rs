// Server-side SVG charts for the analytics tab

use plotters::prelude::*;

use crate::corpus::{file_type_distribution, size_series, upload_timeline};
use crate::models::Document;
use crate::types::{AppError, AppResult};

const WIDTH: u32 = 720;
const HEIGHT: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    FileTypes,
    Sizes,
    Timeline,
}

impl ChartKind {
    pub fn parse(slug: &str) -> AppResult<Self> {
        match slug {
            "file-types" => Ok(ChartKind::FileTypes),
            "sizes" => Ok(ChartKind::Sizes),
            "timeline" => Ok(ChartKind::Timeline),
            other => Err(AppError::NotFound(format!("chart '{}'", other))),
        }
    }
}

/// Bar labels and heights for `kind`.
pub fn chart_series(kind: ChartKind, documents: &[Document]) -> (Vec<String>, Vec<f64>) {
    match kind {
        ChartKind::FileTypes => file_type_distribution(documents)
            .into_iter()
            .map(|s| (s.file_type, s.count as f64))
            .unzip(),
        ChartKind::Sizes => size_series(documents)
            .into_iter()
            .map(|p| (p.document, p.size_mb))
            .unzip(),
        ChartKind::Timeline => upload_timeline(documents)
            .points
            .into_iter()
            .map(|p| (p.date.format("%Y-%m-%d").to_string(), p.documents as f64))
            .unzip(),
    }
}

fn chart_error<E: std::fmt::Display>(err: E) -> AppError {
    AppError::Internal(format!("chart rendering failed: {}", err))
}

pub fn render_chart(kind: ChartKind, documents: &[Document]) -> AppResult<String> {
    let (labels, values) = chart_series(kind, documents);
    let (title, y_desc) = match kind {
        ChartKind::FileTypes => ("Document Types", "Documents"),
        ChartKind::Sizes => ("Document Sizes", "Size (MB)"),
        ChartKind::Timeline => ("Upload Timeline", "Documents"),
    };

    let y_max = values.iter().copied().fold(0.0, f64::max).max(1.0) * 1.1;
    let slots = labels.len().max(1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d((0..slots).into_segmented(), 0f64..y_max)
            .map_err(chart_error)?;

        let label_for = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc(y_desc)
            .x_labels(slots)
            .x_label_formatter(&label_for)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(RGBColor(31, 119, 180).filled())
                    .margin(6)
                    .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
            )
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn doc(display: &str, size: u64, day: u32) -> Document {
        Document {
            name: format!("files/{}", display),
            display_name: display.to_string(),
            size_bytes: size,
            create_time: Some(Utc.with_ymd_and_hms(2024, 10, day, 8, 0, 0).unwrap()),
            update_time: None,
        }
    }

    #[test]
    fn test_parse_chart_kind() {
        assert_eq!(ChartKind::parse("file-types").unwrap(), ChartKind::FileTypes);
        assert_eq!(ChartKind::parse("timeline").unwrap(), ChartKind::Timeline);
        assert!(ChartKind::parse("pie").unwrap_err().is_not_found());
    }

    #[test]
    fn test_chart_series() {
        let docs = vec![doc("a.pdf", 1024 * 1024, 1), doc("b.pdf", 0, 1), doc("c.txt", 0, 3)];

        let (labels, values) = chart_series(ChartKind::FileTypes, &docs);
        assert_eq!(labels, vec!["PDF", "TXT"]);
        assert_eq!(values, vec![2.0, 1.0]);

        let (labels, values) = chart_series(ChartKind::Timeline, &docs);
        assert_eq!(labels, vec!["2024-10-01", "2024-10-03"]);
        assert_eq!(values, vec![2.0, 1.0]);

        let (_, values) = chart_series(ChartKind::Sizes, &docs);
        assert_eq!(values[0], 1.0);
    }
}
