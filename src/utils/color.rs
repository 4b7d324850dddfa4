//! Conversion of human-readable colours into the native calendar encoding.
//!
//! Colours are first normalised to `0xRRGGBBAA`, then rotated to
//! `0xAARRGGBB` and reinterpreted as a signed 32-bit integer, which is what
//! content stores keep in their colour columns.

use crate::error::{invalid_input, CalendarResult};

/// Names the bridge knows on top of the CSS colour keywords
const EXTRA_NAMED_COLORS: &[(&str, u32)] = &[("burntsienna", 0xea7e_5dff)];

/// Convert a colour string into the native signed ARGB value
pub fn to_native_color(input: &str) -> CalendarResult<i32> {
    let rgba = normalize_color(input)
        .ok_or_else(|| invalid_input(&format!("Unrecognized color: {}", input)))?;
    Ok(rgba.rotate_right(8) as i32)
}

/// Normalise a colour string to `0xRRGGBBAA`
pub fn normalize_color(input: &str) -> Option<u32> {
    let color = input.trim().to_ascii_lowercase();

    if let Some((_, rgba)) = EXTRA_NAMED_COLORS.iter().find(|(name, _)| *name == color) {
        return Some(*rgba);
    }

    let [r, g, b, a] = csscolorparser::parse(&color).ok()?.to_rgba8();
    Some(u32::from_be_bytes([r, g, b, a]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(normalize_color("#f00"), Some(0xff00_00ff));
        assert_eq!(normalize_color("#f008"), Some(0xff00_0088));
        assert_eq!(normalize_color("#00FF00"), Some(0x00ff_00ff));
        assert_eq!(normalize_color("#11223344"), Some(0x1122_3344));
        assert_eq!(normalize_color("#12345"), None);
        assert_eq!(normalize_color("#zzz"), None);
    }

    #[test]
    fn test_functional_forms() {
        assert_eq!(normalize_color("rgb(255, 0, 0)"), Some(0xff00_00ff));
        assert_eq!(normalize_color("rgba(0, 0, 255, 0.5)"), Some(0x0000_ff80));
        assert_eq!(normalize_color("hsl(120, 100%, 50%)"), Some(0x00ff_00ff));
        assert_eq!(normalize_color("hsla(0, 100%, 50%, 0)"), Some(0xff00_0000));
        assert_eq!(normalize_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(normalize_color("Tomato"), Some(0xff63_47ff));
        assert_eq!(normalize_color("burntsienna"), Some(0xea7e_5dff));
        assert_eq!(normalize_color("transparent"), Some(0));
        assert_eq!(normalize_color("not-a-color"), None);
    }

    #[test]
    fn test_native_encoding_is_signed_argb() {
        assert_eq!(to_native_color("#ff0000").unwrap(), -65536);
        assert_eq!(to_native_color("red").unwrap(), -65536);
        assert_eq!(to_native_color("#abc").unwrap(), -5_588_020);
        assert_eq!(to_native_color("rgba(0, 0, 255, 0.5)").unwrap(), -2_147_483_393);
        assert_eq!(to_native_color("transparent").unwrap(), 0);
        assert!(to_native_color("bogus").is_err());
    }
}
