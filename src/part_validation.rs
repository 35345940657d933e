//! Checks a cycle's detections against the parts expected for the capture
//! position the user was asked to photograph.

use serde::{Deserialize, Serialize};
use crate::common::Detection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub detected_parts: Vec<String>,
    pub message: String,
    pub detections: Vec<Detection>,
}

/// One named capture position and the labels that prove the camera faces it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturePosition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub expected: &'static [&'static str],
    pub min_matches: usize,
}

pub const CAPTURE_POSITIONS: &[CapturePosition] = &[
    CapturePosition {
        name: "Front",
        aliases: &["front view"],
        expected: &["front_bumper", "hood", "front_glass", "front_light"],
        min_matches: 2,
    },
    CapturePosition {
        name: "Right Front Fender",
        aliases: &[],
        expected: &["front_right_light", "front_bumper", "wheel", "hood"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Right Front Door",
        aliases: &[],
        expected: &["front_right_door", "front_door", "right_mirror", "wheel"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Right Rear Door",
        aliases: &[],
        expected: &["back_right_door", "back_door", "wheel"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Right Rear Fender",
        aliases: &[],
        expected: &["back_right_light", "back_bumper", "wheel"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Rear",
        aliases: &["rear view", "back", "back view"],
        expected: &["back_bumper", "back_glass", "back_light", "trunk", "tailgate"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Left Rear Fender",
        aliases: &[],
        expected: &["back_left_light", "back_bumper", "wheel"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Left Rear Door",
        aliases: &[],
        expected: &["back_left_door", "back_door", "wheel"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Left Front Door",
        aliases: &[],
        expected: &["front_left_door", "front_door", "left_mirror", "wheel"],
        min_matches: 1,
    },
    CapturePosition {
        name: "Left Front Fender",
        aliases: &[],
        expected: &["front_left_light", "front_bumper", "wheel", "hood"],
        min_matches: 1,
    },
];

/// Lower-cases and collapses spaces, underscores and dashes so that
/// `"Right_Front-Door"` and `"right front door"` are the same key.
fn normalize_key(position: &str) -> String {
    position
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn find_position(position: &str) -> Option<&'static CapturePosition> {
    let key = normalize_key(position);
    CAPTURE_POSITIONS.iter().find(|p| {
        normalize_key(p.name) == key || p.aliases.iter().any(|a| normalize_key(a) == key)
    })
}

/// Expected labels for a position, empty for unknown positions.
pub fn expected_parts(position: &str) -> &'static [&'static str] {
    find_position(position).map(|p| p.expected).unwrap_or(&[])
}

/// Classifies the detected labels for the requested position.
pub fn validate(position: &str, detections: Vec<Detection>) -> ValidationResult {
    let detected_parts: Vec<String> = detections.iter().map(|d| d.label.clone()).collect();
    let (is_valid, message) = classify(position, &detected_parts);

    ValidationResult {
        is_valid,
        detected_parts,
        message,
        detections,
    }
}

pub fn classify(position: &str, detected_parts: &[String]) -> (bool, String) {
    let Some(wanted) = find_position(position) else {
        return (false, format!("No car parts detected for unknown position '{position}'."));
    };

    let matched: Vec<&str> = wanted
        .expected
        .iter()
        .copied()
        .filter(|e| detected_parts.iter().any(|d| d == e))
        .collect();

    if matched.len() >= wanted.min_matches {
        (true, format!("{} view confirmed. Detected: {}", wanted.name, matched.join(", ")))
    } else if !detected_parts.is_empty() {
        (false, format!(
            "Wrong parts detected for {}. Expected at least {} of: {}.",
            wanted.name,
            wanted.min_matches,
            wanted.expected.join(", ")
        ))
    } else {
        (false, format!("No car parts detected. Point the camera at the {} of the vehicle.", wanted.name))
    }
}
