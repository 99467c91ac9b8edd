//! End-to-end extraction tests: encoded images in, palettes and exports out.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use palette_extractor::{
    ChartKind, ContrastRule, ExtractError, ExtractorConfig, FilterThresholds, PaletteExtractor,
    RenderOptions, Rgb8, TextColor, extract_palette, render_png, text_report,
};
use proptest::prelude::*;

fn encode_png(img: RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Left 60% orange, right 40% teal, with a one pixel black frame.
fn framed_two_tone() -> RgbImage {
    RgbImage::from_fn(50, 20, |x, y| {
        if x == 0 || y == 0 || x == 49 || y == 19 {
            Rgb([0, 0, 0])
        } else if x < 30 {
            Rgb([230, 120, 30])
        } else {
            Rgb([20, 140, 140])
        }
    })
}

#[test]
fn test_png_bytes_to_palette() {
    let extractor = PaletteExtractor::default();
    let palette = extractor.extract_bytes(&encode_png(framed_two_tone()), 2).unwrap();

    assert_eq!(palette.len(), 2);
    // frame is filtered out: 48 x 18 interior
    assert_eq!(palette.sampled_pixels, 48 * 18);
    assert_eq!(palette.entries[0].rgb8(), Rgb8::new(230, 120, 30));
    assert_eq!(palette.entries[0].pixel_count, 29 * 18);
    assert_eq!(palette.entries[1].hex(), "#148c8c");
}

#[test]
fn test_all_black_image_falls_back() {
    let png = encode_png(RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])));
    let extractor = PaletteExtractor::new(ExtractorConfig {
        filter: Some(FilterThresholds::NARROW),
        ..Default::default()
    })
    .unwrap();

    let palette = extractor.extract_bytes(&png, 5).unwrap();
    assert!(palette.used_fallback);
    assert_eq!(palette.len(), 5);
    assert_eq!(palette.entries[0].percentage, 100.0);
    assert_eq!(palette.entries[0].text_color(&ContrastRule::weighted()), TextColor::White);
}

#[test]
fn test_undecodable_input() {
    let err = PaletteExtractor::default()
        .extract_bytes(b"\x89PNG but not really", 3)
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidInput { .. }));
}

#[test]
fn test_more_colors_than_pixels() {
    let png = encode_png(RgbImage::from_pixel(2, 2, Rgb([90, 90, 200])));
    let err = PaletteExtractor::default().extract_bytes(&png, 5).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidParameter { .. }));
}

#[test]
fn test_flat_buffer_must_be_triples() {
    let extractor = PaletteExtractor::default();
    assert!(matches!(
        extractor.extract_flat(&[10, 20, 30, 40], 1),
        Err(ExtractError::InvalidInput { .. })
    ));
    let palette = extractor.extract_flat(&[10, 200, 30, 40, 50, 60], 1).unwrap();
    assert_eq!(palette.len(), 1);
    assert!((palette.entries[0].rgb[0] - 25.0).abs() < 0.01);
}

#[test]
fn test_exports_from_gradient() {
    let img = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
    let palette = PaletteExtractor::default()
        .extract_bytes(&encode_png(img), 6)
        .unwrap();

    let report = text_report(&palette);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("Color 1: #"));
    assert!(lines[5].ends_with('%'));

    for kind in [ChartKind::Strip, ChartKind::Bar, ChartKind::Pie] {
        let options = RenderOptions::for_kind(kind);
        let png = render_png(&palette, &options).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (options.width, options.height));
    }
}

#[test]
fn test_max_side_bounds_sample() {
    let img = RgbImage::from_fn(400, 200, |x, _| {
        if x < 200 { Rgb([200, 50, 50]) } else { Rgb([50, 50, 200]) }
    });
    let extractor = PaletteExtractor::new(ExtractorConfig {
        max_side: Some(40),
        ..Default::default()
    })
    .unwrap();
    let palette = extractor.extract_bytes(&encode_png(img), 2).unwrap();
    assert_eq!(palette.sampled_pixels, 40 * 20);
    assert!((palette.entries[0].percentage - 50.0).abs() < 1e-3);
}

fn pixels_and_k() -> impl Strategy<Value = (Vec<[u8; 3]>, usize)> {
    prop::collection::vec(any::<[u8; 3]>(), 1..200)
        .prop_flat_map(|pixels| {
            let max_k = pixels.len().min(10);
            (Just(pixels), 1..=max_k)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_palette_invariants((pixels, k) in pixels_and_k()) {
        let palette = extract_palette(&pixels, k).unwrap();

        prop_assert_eq!(palette.len(), k);
        prop_assert!(palette.iter().all(|e| e.percentage >= 0.0));
        let sum: f32 = palette.iter().map(|e| e.percentage).sum();
        prop_assert!((sum - 100.0).abs() < 0.01, "sum was {}", sum);
        prop_assert!(palette.entries.windows(2).all(|w| w[0].percentage >= w[1].percentage));
        let counted: usize = palette.iter().map(|e| e.pixel_count).sum();
        prop_assert_eq!(counted, palette.sampled_pixels);
    }

    #[test]
    fn prop_deterministic((pixels, k) in pixels_and_k()) {
        prop_assert_eq!(extract_palette(&pixels, k).unwrap(), extract_palette(&pixels, k).unwrap());
    }

    #[test]
    fn prop_hex_round_trip(r in 0.0f32..=255.0, g in 0.0f32..=255.0, b in 0.0f32..=255.0) {
        let parsed: Rgb8 = palette_extractor::to_hex([r, g, b]).parse().unwrap();
        prop_assert_eq!(parsed, Rgb8::new(r as u8, g as u8, b as u8));
    }
}
