//! Display strings and tokens derived from an [`AnalysisResult`].

use shared::domain::{AnalysisResult, DetailTab};

pub const HEALTHY_COLOR: &str = "#4CAF50";

const NO_DESCRIPTION: &str = "No description available.";
const NO_SYMPTOMS: &str = "No symptoms information available.";
const NO_TREATMENT: &str = "No treatment information available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconGlyph {
    Leaf,
    Bug,
    Fire,
    Disease,
    Seedling,
}

impl IconGlyph {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Leaf => "🍃",
            Self::Bug => "🐛",
            Self::Fire => "🔥",
            Self::Disease => "🦠",
            Self::Seedling => "🌱",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiseaseIcon {
    pub glyph: IconGlyph,
    pub color: &'static str,
}

pub fn icon_for(prediction: &str) -> DiseaseIcon {
    let (glyph, color) = match prediction.trim().to_lowercase().as_str() {
        "healthy" => (IconGlyph::Leaf, HEALTHY_COLOR),
        "citrus canker" => (IconGlyph::Bug, "#FF6B6B"),
        "red rust" => (IconGlyph::Fire, "#FF8E53"),
        "anthracnose" => (IconGlyph::Disease, "#8B4513"),
        "spiraling whitefly" => (IconGlyph::Bug, "#87CEEB"),
        "algal spot" => (IconGlyph::Seedling, "#9ACD32"),
        _ => (IconGlyph::Leaf, HEALTHY_COLOR),
    };
    DiseaseIcon { glyph, color }
}

/// Formats a confidence in `[0, 1]` as a whole percentage.
pub fn confidence_text(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

/// Human-readable size for the selected file, e.g. `1.5 MB`.
pub fn file_size_text(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        return format!("{bytes} B");
    }
    let (unit_size, unit_label) = if bytes < MB { (KB, "KB") } else { (MB, "MB") };
    let value_text = format!("{:.1}", bytes as f64 / unit_size as f64);
    let compact_value = value_text.strip_suffix(".0").unwrap_or(&value_text);
    format!("{compact_value} {unit_label}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub disease_name: String,
    pub confidence_text: String,
    pub severity_text: String,
    pub severity_color: String,
    pub icon: DiseaseIcon,
    pub description: String,
    pub symptoms: String,
    pub treatment: String,
}

impl ResultView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let info = &result.disease_info;
        let (severity_text, severity_color) = match info.severity.as_deref() {
            Some(severity) if !severity.is_empty() => (
                severity.to_string(),
                info.color
                    .clone()
                    .unwrap_or_else(|| HEALTHY_COLOR.to_string()),
            ),
            _ => ("None".to_string(), HEALTHY_COLOR.to_string()),
        };

        Self {
            disease_name: result.prediction.clone(),
            confidence_text: confidence_text(result.confidence),
            severity_text,
            severity_color,
            icon: icon_for(&result.prediction),
            description: non_empty_or(info.description.as_deref(), NO_DESCRIPTION),
            symptoms: non_empty_or(info.symptoms.as_deref(), NO_SYMPTOMS),
            treatment: non_empty_or(info.treatment.as_deref(), NO_TREATMENT),
        }
    }

    pub fn detail(&self, tab: DetailTab) -> &str {
        match tab {
            DetailTab::Description => &self.description,
            DetailTab::Symptoms => &self.symptoms,
            DetailTab::Treatment => &self.treatment,
        }
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

/// Parses a `#RRGGBB` display token.
pub fn parse_hex_color(token: &str) -> Option<(u8, u8, u8)> {
    let hex = token.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
