extern crate inspect_detect;

use inspect_detect::common::Detection;
use inspect_detect::part_validation::{expected_parts, validate, CAPTURE_POSITIONS};

fn detections(labels: &[&str]) -> Vec<Detection> {
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| Detection::new(i, l, 0.9 - i as f32 * 0.1))
        .collect()
}

#[test]
fn front_needs_two_expected_parts() {
    let result = validate("Front", detections(&["hood", "front_glass"]));
    assert!(result.is_valid);
    assert!(result.message.contains("hood"));
    assert!(result.message.contains("front_glass"));

    let result = validate("Front", detections(&["hood"]));
    assert!(!result.is_valid);
    assert!(result.message.starts_with("Wrong parts detected"));

    // Duplicates of one label do not count twice.
    let result = validate("Front", detections(&["hood", "hood"]));
    assert!(!result.is_valid);
}

#[test]
fn other_positions_need_one_expected_part() {
    let result = validate("Right Front Door", detections(&["wheel"]));
    assert!(result.is_valid);

    let result = validate("Rear", detections(&["trunk", "left_mirror"]));
    assert!(result.is_valid);

    let result = validate("Left Rear Door", detections(&["hood"]));
    assert!(!result.is_valid);
    assert_eq!(result.detected_parts, vec!["hood"]);
}

#[test]
fn no_detections_message() {
    let result = validate("Rear", Vec::new());
    assert!(!result.is_valid);
    assert!(result.message.starts_with("No car parts detected"));
}

#[test]
fn position_lookup_ignores_case_spacing_and_aliases() {
    assert_eq!(expected_parts("right_front-door"), expected_parts("Right Front Door"));
    assert_eq!(expected_parts("  FRONT  "), expected_parts("Front"));
    assert_eq!(expected_parts("Front View"), expected_parts("Front"));
    assert_eq!(expected_parts("back"), expected_parts("Rear"));
    assert_eq!(expected_parts("Back View"), expected_parts("Rear"));
    assert!(validate("rear view", detections(&["tailgate"])).is_valid);
}

#[test]
fn unknown_position_is_never_valid() {
    assert!(expected_parts("Roof").is_empty());

    let result = validate("Roof", detections(&["hood", "wheel"]));
    assert!(!result.is_valid);
    assert!(result.message.starts_with("No car parts detected"));
    assert_eq!(result.detections.len(), 2);
}

#[test]
fn every_position_is_reachable_by_name() {
    assert_eq!(CAPTURE_POSITIONS.len(), 10);
    for position in CAPTURE_POSITIONS {
        assert!(!expected_parts(position.name).is_empty());
        let required: Vec<&str> = position.expected.iter().copied().take(position.min_matches).collect();
        assert!(validate(position.name, detections(&required)).is_valid);
    }
}

#[test]
fn result_serializes_camel_case() {
    let result = validate("Front", detections(&["hood", "front_bumper"]));
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["isValid"], true);
    assert_eq!(json["detectedParts"][0], "hood");
    assert!(json["detections"][0]["box"].is_object());
    assert!(json["detections"][0]["boxNormalized"].is_object());
}
