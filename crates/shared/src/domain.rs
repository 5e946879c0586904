use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{UnknownTab, ValidationError};

/// Largest image accepted for analysis (16 MiB).
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl MediaType {
    /// Parses a declared MIME string. `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn from_mime(declared: &str) -> Option<Self> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Declared media type for a file on disk, derived from its extension.
pub fn declared_mime_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// A file the user picked or dropped, before validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub filename: String,
    pub declared_mime: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(
        filename: impl Into<String>,
        declared_mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            declared_mime: declared_mime.into(),
            bytes,
        }
    }

    /// Candidate for bytes read from `path`; the MIME type is guessed from its extension.
    pub fn from_path(path: &Path, bytes: Vec<u8>) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(filename, declared_mime_for_path(path), bytes)
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn validate(self) -> Result<SelectedImage, ValidationError> {
        let media_type = MediaType::from_mime(&self.declared_mime).ok_or_else(|| {
            ValidationError::UnsupportedMediaType {
                declared: self.declared_mime.clone(),
            }
        })?;
        let size_bytes = self.size_bytes();
        if size_bytes > MAX_IMAGE_BYTES {
            return Err(ValidationError::TooLarge {
                size_bytes,
                max_bytes: MAX_IMAGE_BYTES,
            });
        }
        Ok(SelectedImage {
            filename: self.filename,
            media_type,
            bytes: self.bytes,
        })
    }
}

/// A validated image ready for submission. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    filename: String,
    media_type: MediaType,
    bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub prediction: String,
    pub confidence: f64,
    pub disease_info: DiseaseInfo,
}

/// Right-hand panel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Welcome,
    Loading,
    Results,
    Error,
}

/// Left-hand panel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidePanel {
    #[default]
    Upload,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetailTab {
    #[default]
    Description,
    Symptoms,
    Treatment,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [Self::Description, Self::Symptoms, Self::Treatment];

    pub fn name(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Symptoms => "symptoms",
            Self::Treatment => "treatment",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Symptoms => "Symptoms",
            Self::Treatment => "Treatment",
        }
    }
}

impl FromStr for DetailTab {
    type Err = UnknownTab;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.name() == name)
            .ok_or_else(|| UnknownTab {
                name: name.to_string(),
            })
    }
}
