// Series behind the analytics tab: file types, sizes and the upload timeline

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Document, FileTypeShare, SizePoint, SizeSummary, Timeline, TimelinePoint};
use crate::utils::format::{bytes_to_mb, file_extension, format_document_name, format_percentage};

const CHART_NAME_LENGTH: usize = 25;

pub fn file_type_distribution(documents: &[Document]) -> Vec<FileTypeShare> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
        *counts.entry(file_extension(&doc.display_name)).or_insert(0) += 1;
    }

    let total = documents.len() as f64;
    counts
        .into_iter()
        .map(|(file_type, count)| FileTypeShare {
            percentage: format_percentage(count as f64, total),
            file_type: file_type.to_uppercase(),
            count,
        })
        .collect()
}

pub fn size_series(documents: &[Document]) -> Vec<SizePoint> {
    documents
        .iter()
        .map(|doc| SizePoint {
            document: format_document_name(&doc.display_name, CHART_NAME_LENGTH),
            size_mb: bytes_to_mb(doc.size_bytes),
        })
        .collect()
}

pub fn size_summary(points: &[SizePoint]) -> SizeSummary {
    if points.is_empty() {
        return SizeSummary {
            total_mb: 0.0,
            average_mb: 0.0,
            largest_mb: 0.0,
            smallest_mb: 0.0,
        };
    }

    let total_mb: f64 = points.iter().map(|p| p.size_mb).sum();
    SizeSummary {
        total_mb,
        average_mb: total_mb / points.len() as f64,
        largest_mb: points.iter().map(|p| p.size_mb).fold(f64::MIN, f64::max),
        smallest_mb: points.iter().map(|p| p.size_mb).fold(f64::MAX, f64::min),
    }
}

/// Documents per upload day, oldest day first. Documents without a creation time are skipped.
pub fn upload_timeline(documents: &[Document]) -> Timeline {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for created in documents.iter().filter_map(|d| d.create_time) {
        *per_day.entry(created.date_naive()).or_insert(0) += 1;
    }

    let first_upload = per_day.keys().next().copied();
    let last_upload = per_day.keys().next_back().copied();
    let days_span = match (first_upload, last_upload) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    };

    Timeline {
        points: per_day
            .into_iter()
            .map(|(date, documents)| TimelinePoint { date, documents })
            .collect(),
        first_upload,
        last_upload,
        days_span,
    }
}
