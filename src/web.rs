//! Browser entry points.
//!
//! The upload page hands the raw file bytes to [`extract_palette_js`] and gets
//! back everything it displays: the color boxes, the text report offered for
//! download and the palette PNG.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::color::{ContrastRule, to_hex};
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extract::PaletteExtractor;
use crate::render::{ChartKind, RenderOptions, render_png};
use crate::report::{summaries, text_report};

fn to_js(err: ExtractError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value)?;
    Ok(())
}

/// Extract `n_colors` dominant colors from an encoded image.
///
/// Returns `{ colors: [{ hex, rgb, percentage, textColor }], report, image }`
/// where `image` is a PNG (`Uint8Array`) of the requested chart kind
/// (`"strip"`, `"bar"` or `"pie"`, default strip).
#[wasm_bindgen]
pub fn extract_palette_js(
    input: Vec<u8>,
    n_colors: usize,
    chart: Option<String>,
) -> Result<Object, JsValue> {
    let kind = match chart {
        Some(s) => s.parse::<ChartKind>().map_err(to_js)?,
        None => ChartKind::default(),
    };

    let extractor = PaletteExtractor::new(ExtractorConfig::default()).map_err(to_js)?;
    let palette = extractor.extract_bytes(&input, n_colors).map_err(to_js)?;
    let rule = extractor.config().contrast;

    let colors_js = Array::new();
    for summary in summaries(&palette, &rule) {
        let color = Object::new();
        let rgb = Array::new();
        for c in summary.rgb {
            rgb.push(&JsValue::from(c));
        }
        set(&color, "hex", &JsValue::from_str(&summary.hex))?;
        set(&color, "rgb", &rgb)?;
        set(&color, "percentage", &JsValue::from(summary.percentage))?;
        set(&color, "textColor", &JsValue::from_str(summary.text_color.as_str()))?;
        colors_js.push(&color);
    }

    let png = render_png(&palette, &RenderOptions::for_kind(kind)).map_err(to_js)?;

    let result = Object::new();
    set(&result, "colors", &colors_js)?;
    set(&result, "report", &JsValue::from_str(&text_report(&palette)))?;
    set(&result, "image", &Uint8Array::from(png.as_slice()))?;
    Ok(result)
}

/// `#rrggbb` for a color given as floating 0-255 channels.
#[wasm_bindgen]
pub fn rgb_to_hex_js(r: f32, g: f32, b: f32) -> String {
    to_hex([r, g, b])
}

/// `"black"` or `"white"` text for a background color.
#[wasm_bindgen]
pub fn text_color_js(r: f32, g: f32, b: f32) -> String {
    ContrastRule::default().text_color([r, g, b]).as_str().to_string()
}
