// Display formatting shared by the CLI and the admin UI

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d %H:%M").to_string(),
        None => "Unknown".to_string(),
    }
}

/// Truncates on character boundaries and appends `...` when shortened.
pub fn format_document_name(name: &str, max_length: usize) -> String {
    if name.chars().count() <= max_length {
        return name.to_string();
    }
    let truncated: String = name.chars().take(max_length).collect();
    format!("{}...", truncated)
}

/// Lower-cased text after the last `.`, or `unknown`.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => "unknown".to_string(),
    }
}

pub fn format_resource_id(resource_name: &str) -> &str {
    resource_name.rsplit('/').next().unwrap_or(resource_name)
}

pub fn format_percentage(value: f64, total: f64) -> String {
    if total == 0.0 {
        return "0%".to_string();
    }
    format!("{:.1}%", value / total * 100.0)
}

pub fn pluralize<'a>(count: usize, singular: &'a str, plural: Option<&'a str>) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}s", singular))
    }
}

pub fn format_count_with_label(count: usize, label: &str) -> String {
    format!("{} {}", count, pluralize(count, label, None))
}

pub fn bytes_to_mb(size_bytes: u64) -> f64 {
    size_bytes as f64 / (1024.0 * 1024.0)
}
