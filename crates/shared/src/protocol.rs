use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisResult, DiseaseInfo};

/// Body returned by the classification service for `/predict` and `/upload`.
///
/// Error responses from the service may omit `success` entirely, so it
/// defaults to `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_info: Option<DiseaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn classified(prediction: impl Into<String>, confidence: f64, info: DiseaseInfo) -> Self {
        Self {
            success: true,
            prediction: Some(prediction.into()),
            confidence: Some(confidence),
            disease_info: Some(info),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn into_outcome(self) -> PredictOutcome {
        if !self.success {
            return PredictOutcome::Rejected(self.error.filter(|e| !e.trim().is_empty()));
        }
        let Some(prediction) = self.prediction else {
            return PredictOutcome::Rejected(self.error);
        };
        PredictOutcome::Classified(AnalysisResult {
            prediction,
            confidence: self.confidence.unwrap_or_default().clamp(0.0, 1.0),
            disease_info: self.disease_info.unwrap_or_default(),
        })
    }
}

/// Application-level reading of a response that made it back over the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictOutcome {
    Classified(AnalysisResult),
    Rejected(Option<String>),
}
