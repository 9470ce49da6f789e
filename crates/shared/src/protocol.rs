use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ExperimentId, VariationId};

/// Experiment record as the backend serializes it (gorm field casing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(rename = "ID")]
    pub id: ExperimentId,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Variations", default)]
    pub variations: Vec<Variation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    #[serde(rename = "ID")]
    pub id: VariationId,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Participants")]
    pub participants: u64,
    #[serde(rename = "Conversions")]
    pub conversions: u64,
    #[serde(rename = "ExperimentID")]
    pub experiment_id: ExperimentId,
}

/// Create request body. The backend requires at least two variation names;
/// that is not validated on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExperiment {
    pub name: String,
    pub variations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedVariation {
    pub variation_name: String,
    pub variation_id: VariationId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReceipt {
    pub message: String,
}
