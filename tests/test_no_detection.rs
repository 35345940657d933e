extern crate inspect_detect;

mod common;

use image::RgbImage;
use inspect_detect::common::InspectionFrame;
use common::{StubBackend, StubHit, StubModel};

#[tokio::test]
async fn no_detections() {
    let dir = tempfile::tempdir().unwrap();
    let model = StubModel {
        hits: vec![StubHit { anchor: 42, class: 22, score: 0.2, cxcywh: [100., 100., 50., 50.] }],
        transposed: false,
        delay_ms: 0,
        panics: false,
    };
    let path = common::write_model(dir.path(), "blank.onnx", &model);
    let config = common::config_for(&path);

    let mut detector = inspect_detect::init_detector_with::<StubBackend>(&config).await.unwrap();
    let frame = InspectionFrame::from(RgbImage::new(800, 600));

    for _ in 0..3 {
        let result = inspect_detect::run_detection(&mut detector, &frame, "Right Front Door").unwrap();
        assert!(result.detections.is_empty());
        assert!(result.detected_parts.is_empty());
        assert!(!result.is_valid);
        assert!(result.message.starts_with("No car parts detected"));
    }
}
