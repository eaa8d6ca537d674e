//! Tests for template matching on synthetic screenshots

use crate::test_support::{dim_noise, init_logging, noise, paste, png_bytes};
use crate::vision::{
    Frame, MatchConfig, Matcher, ScoreMethod, Template, TemplateStore, VisionError,
};
use image::{GrayImage, Luma};

const THRESHOLD: f32 = 0.7;

fn matcher_with(templates: Vec<(&str, GrayImage)>, method: ScoreMethod) -> Matcher {
    let store = TemplateStore::from_templates(
        templates
            .into_iter()
            .map(|(name, image)| Template::new(name, image))
            .collect(),
    );
    Matcher::new(
        store,
        MatchConfig {
            method,
            ..MatchConfig::default()
        },
    )
}

#[test]
fn test_exact_copy_scores_one_at_center() {
    init_logging();
    let template = noise(14, 10, 2);
    let mut screen = noise(120, 90, 1);
    paste(&mut screen, &template, 37, 51);
    let frame = Frame::from_gray(screen);

    for method in [
        ScoreMethod::ZeroMeanNormalized,
        ScoreMethod::CrossCorrelationNormalized,
    ] {
        let matcher = matcher_with(vec![("gauge_building", template.clone())], method);
        let found = matcher
            .locate(&frame, "gauge_building", THRESHOLD)
            .unwrap()
            .expect("exact copy must be found");

        assert!(found.score > 0.999, "{method:?} scored {}", found.score);
        assert_eq!(found.center(), (37 + 7, 51 + 5), "{method:?}");
        assert_eq!(found.template, "gauge_building");
    }
}

#[test]
fn test_odd_sized_template_at_frame_edges() {
    let template = noise(15, 9, 4);
    let matcher = matcher_with(vec![("edge", template.clone())], ScoreMethod::ZeroMeanNormalized);

    for (x, y) in [(0, 0), (105, 81)] {
        let mut screen = noise(120, 90, 3);
        paste(&mut screen, &template, x, y);
        let frame = Frame::from_gray(screen);

        let found = matcher.locate(&frame, "edge", THRESHOLD).unwrap().unwrap();
        assert_eq!(found.center(), (x + 7, y + 4));
        assert!(found.center_x < frame.width() && found.center_y < frame.height());
    }
}

#[test]
fn test_absent_template_is_not_found() {
    let matcher = matcher_with(vec![("button_help", noise(16, 16, 20))], ScoreMethod::ZeroMeanNormalized);
    let frame = Frame::from_gray(noise(120, 90, 21));

    assert_eq!(matcher.locate(&frame, "button_help", THRESHOLD).unwrap(), None);
}

#[test]
fn test_brightness_shift_still_matches() {
    let template = dim_noise(20, 12, 6, 200);
    let brighter = GrayImage::from_fn(20, 12, |x, y| Luma([template.get_pixel(x, y)[0] + 40]));
    let mut screen = noise(100, 80, 5);
    paste(&mut screen, &brighter, 60, 30);
    let matcher = matcher_with(vec![("button_tomap", template)], ScoreMethod::ZeroMeanNormalized);

    let found = matcher
        .locate(&Frame::from_gray(screen), "button_tomap", THRESHOLD)
        .unwrap()
        .unwrap();

    assert!(found.score > 0.999);
    assert_eq!(found.center(), (70, 36));
}

#[test]
fn test_partial_occlusion_is_gated_by_threshold() {
    let template = noise(24, 24, 8);
    let mut screen = noise(120, 90, 7);
    paste(&mut screen, &template, 40, 40);
    // cover the bottom quarter of the element
    paste(&mut screen, &noise(24, 6, 9), 40, 58);
    let frame = Frame::from_gray(screen);
    let matcher = matcher_with(vec![("button_close", template)], ScoreMethod::ZeroMeanNormalized);

    assert_eq!(matcher.locate(&frame, "button_close", 0.9).unwrap(), None);
    let found = matcher.locate(&frame, "button_close", 0.6).unwrap().unwrap();
    assert_eq!(found.center(), (52, 52));
    assert!(found.score < 0.9);
}

#[test]
fn test_unknown_template_name_is_error() {
    let matcher = matcher_with(vec![("a", noise(4, 4, 1))], ScoreMethod::ZeroMeanNormalized);
    let frame = Frame::from_gray(noise(20, 20, 2));

    let err = matcher.locate(&frame, "b", THRESHOLD).unwrap_err();
    assert!(matches!(err, VisionError::UnknownTemplate(name) if name == "b"));
}

#[test]
fn test_template_larger_than_frame_is_not_found() {
    let matcher = matcher_with(vec![("huge", noise(40, 40, 1))], ScoreMethod::ZeroMeanNormalized);
    let frame = Frame::from_gray(noise(30, 50, 2));

    assert_eq!(matcher.locate(&frame, "huge", 0.0).unwrap(), None);
}

#[test]
fn test_flat_template_never_matches() {
    let flat = GrayImage::from_pixel(8, 8, Luma([128]));
    let mut screen = noise(60, 60, 4);
    paste(&mut screen, &flat, 10, 10);
    let matcher = matcher_with(vec![("flat", flat)], ScoreMethod::ZeroMeanNormalized);

    assert_eq!(
        matcher.locate(&Frame::from_gray(screen), "flat", 0.1).unwrap(),
        None
    );
}

#[test]
fn test_locate_any_returns_first_grouped_match_in_store_order() {
    let variant_a = noise(12, 12, 30);
    let variant_b = noise(12, 12, 31);
    let variant_c = noise(12, 12, 32);
    let close = noise(12, 12, 33);
    let mut screen = noise(150, 100, 34);
    paste(&mut screen, &variant_c, 10, 10);
    paste(&mut screen, &variant_b, 100, 60);
    paste(&mut screen, &close, 60, 20);
    let frame = Frame::from_gray(screen);

    let matcher = matcher_with(
        vec![
            ("infirmary_c", variant_c),
            ("button_close", close),
            ("infirmary_a", variant_a),
            ("infirmary_b", variant_b),
        ],
        ScoreMethod::ZeroMeanNormalized,
    );

    // infirmary_a is absent and skipped; infirmary_b precedes infirmary_c
    let found = matcher.locate_any(&frame, "infirmary", THRESHOLD).unwrap();
    assert_eq!(found.template, "infirmary_b");
    assert_eq!(found.center(), (106, 66));
}

#[test]
fn test_locate_any_ignores_templates_outside_group() {
    let close = noise(12, 12, 40);
    let mut screen = noise(100, 100, 41);
    paste(&mut screen, &close, 30, 30);
    let matcher = matcher_with(
        vec![("button_close", close), ("infirmary_a", noise(12, 12, 42))],
        ScoreMethod::ZeroMeanNormalized,
    );

    assert_eq!(
        matcher.locate_any(&Frame::from_gray(screen), "infirmary", THRESHOLD),
        None
    );
}

#[test]
fn test_frame_decode_converts_to_luma() {
    let gray = noise(33, 17, 50);
    let frame = Frame::decode(&png_bytes(&gray)).unwrap();
    assert_eq!((frame.width(), frame.height()), (33, 17));
    assert_eq!(frame.image(), &gray);

    let err = Frame::decode(b"not an image").unwrap_err();
    assert!(matches!(err, VisionError::FrameDecode(_)));
}

#[test]
fn test_match_result_serializes() {
    let template = noise(10, 10, 60);
    let mut screen = noise(50, 50, 61);
    paste(&mut screen, &template, 5, 6);
    let matcher = matcher_with(vec![("button_help", template)], ScoreMethod::ZeroMeanNormalized);
    let found = matcher
        .locate(&Frame::from_gray(screen), "button_help", THRESHOLD)
        .unwrap()
        .unwrap();

    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json["template"], "button_help");
    assert_eq!(json["center_x"], 10);
    assert_eq!(json["center_y"], 11);
}

#[test]
fn test_match_config_defaults() {
    let config = MatchConfig::default();
    assert_eq!(config.default_threshold, 0.7);
    assert_eq!(config.method, ScoreMethod::ZeroMeanNormalized);
}

#[test]
fn test_missing_threshold_uses_configured_default() {
    let template = noise(24, 24, 8);
    let mut screen = noise(120, 90, 7);
    paste(&mut screen, &template, 40, 40);
    paste(&mut screen, &noise(24, 6, 9), 40, 58);
    let frame = Frame::from_gray(screen);
    let store = || TemplateStore::from_templates(vec![Template::new("button_close", template.clone())]);

    let strict = Matcher::new(
        store(),
        MatchConfig {
            default_threshold: 0.9,
            ..MatchConfig::default()
        },
    );
    assert_eq!(strict.threshold(None), 0.9);
    assert_eq!(strict.threshold(Some(0.6)), 0.6);
    assert_eq!(strict.locate(&frame, "button_close", None).unwrap(), None);
    assert_eq!(strict.locate_any(&frame, "button", None), None);
    // an explicit threshold still wins over the default
    assert!(strict.locate(&frame, "button_close", 0.6).unwrap().is_some());

    let lenient = Matcher::new(
        store(),
        MatchConfig {
            default_threshold: 0.6,
            ..MatchConfig::default()
        },
    );
    let found = lenient.locate(&frame, "button_close", None).unwrap().unwrap();
    assert_eq!(found.center(), (52, 52));
    assert!(lenient.locate_any(&frame, "button", None).is_some());
}
