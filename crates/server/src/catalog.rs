//! Advisory content for every label the classifier can return.

use shared::domain::{DiseaseInfo, MediaType};

pub const CLASS_NAMES: [&str; 6] = [
    "Citrus Canker",
    "Red Rust",
    "Anthracnose",
    "Spiraling Whitefly",
    "Healthy",
    "Algal Spot",
];

pub fn disease_info(name: &str) -> Option<DiseaseInfo> {
    let (description, symptoms, treatment, severity, color) = match name {
        "Citrus Canker" => (
            "A serious bacterial disease that affects citrus plants, including guava trees.",
            "Raised, corky lesions on leaves, stems, and fruits with water-soaked margins.",
            "Remove infected plant parts, apply copper-based fungicides, and maintain good sanitation.",
            "High",
            "#FF6B6B",
        ),
        "Red Rust" => (
            "A fungal disease caused by Cephaleuros virescens that affects guava leaves.",
            "Circular to irregular reddish-brown spots on leaves, often with a velvety appearance.",
            "Improve air circulation, remove infected leaves, and apply fungicides if necessary.",
            "Medium",
            "#FF8E53",
        ),
        "Anthracnose" => (
            "A fungal disease caused by Colletotrichum gloeosporioides that affects guava fruits and leaves.",
            "Dark, sunken lesions on fruits and leaves, often with pink spore masses.",
            "Prune infected parts, apply fungicides, and maintain proper spacing between plants.",
            "Medium",
            "#8B4513",
        ),
        "Spiraling Whitefly" => (
            "An insect pest that feeds on guava leaves, causing damage and spreading diseases.",
            "Yellowing leaves, white waxy deposits, and stunted growth due to feeding damage.",
            "Use insecticidal soaps, neem oil, or introduce natural predators like ladybugs.",
            "Low",
            "#87CEEB",
        ),
        "Healthy" => (
            "The guava leaf shows no signs of disease or pest damage.",
            "Normal green color, uniform leaf structure, and healthy appearance.",
            "Continue with regular maintenance and monitoring for early detection.",
            "None",
            "#4CAF50",
        ),
        "Algal Spot" => (
            "A disease caused by algae that affects guava leaves, especially in humid conditions.",
            "Small, circular to irregular spots with a velvety texture, often greenish to reddish-brown.",
            "Improve air circulation, reduce humidity, and apply copper-based fungicides.",
            "Low",
            "#9ACD32",
        ),
        _ => return None,
    };
    Some(DiseaseInfo {
        severity: Some(severity.to_string()),
        color: Some(color.to_string()),
        description: Some(description.to_string()),
        symptoms: Some(symptoms.to_string()),
        treatment: Some(treatment.to_string()),
    })
}

/// Media type implied by an upload's file name, if its extension is allowed.
pub fn allowed_media_type(filename: &str) -> Option<MediaType> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some(MediaType::Png),
        "jpg" | "jpeg" => Some(MediaType::Jpeg),
        "gif" => Some(MediaType::Gif),
        "bmp" => Some(MediaType::Bmp),
        _ => None,
    }
}

/// Picks a stable label for an image: the configured one if it is known,
/// otherwise one derived from the bytes.
pub fn pick_label<'a>(configured: Option<&'a str>, bytes: &[u8]) -> &'a str {
    if let Some(label) = configured.and_then(|label| {
        CLASS_NAMES
            .iter()
            .copied()
            .find(|name| name.eq_ignore_ascii_case(label.trim()))
    }) {
        return label;
    }
    let digest = bytes
        .iter()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as usize));
    CLASS_NAMES[digest % CLASS_NAMES.len()]
}
