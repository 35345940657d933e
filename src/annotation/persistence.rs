use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::annotation::drawing::CommittedAnnotation;
use crate::common::InspectError;

/// Persisted form: `{ "drawings": [...] }`, coordinates in image pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingsEnvelope {
    #[serde(default)]
    pub drawings: Vec<CommittedAnnotation>,
}

pub fn to_json(drawings: &[CommittedAnnotation]) -> Result<String, InspectError> {
    let envelope = DrawingsEnvelope { drawings: drawings.to_vec() };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parses an envelope. Records saved without an id get a fresh one.
pub fn from_json(json: &str) -> Result<Vec<CommittedAnnotation>, InspectError> {
    let envelope: DrawingsEnvelope = serde_json::from_str(json)?;
    Ok(envelope
        .drawings
        .into_iter()
        .map(|mut d| {
            if d.id.is_empty() {
                d.id = Uuid::new_v4().to_string();
            }
            d
        })
        .collect())
}

pub fn load_or_empty(json: &str) -> Vec<CommittedAnnotation> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    match from_json(json) {
        Ok(drawings) => drawings,
        Err(err) => {
            log::warn!("Discarding malformed drawings: {err}");
            Vec::new()
        }
    }
}
