//! Color codec: normalized float channels ↔ 8-bit display colors.
//!
//! Documents store colors as `[r, g, b, a?]` with every channel in `[0, 1]`.
//! Editing surfaces work with `RgbaColor`: 8-bit RGB plus the alpha channel
//! passed through unchanged. Two colors are the same color when their
//! displayed `r, g, b` integers and their alpha are identical.
//!
//! Rounding is half away from zero, then clamped to `[0, 255]`. Every 8-bit
//! value survives `to_display(to_storage(x))`; a stored value that did not
//! come from an 8-bit color (e.g. `0.5`) shifts once, to `128 / 255`, and is
//! stable from then on.

use serde::{Deserialize, Serialize};

use crate::model::{ColorProperty, ColorValue};

/// An editing-surface color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// Shown for fills/strokes whose color cannot be decoded, and for
/// shapes that carry no color at all.
pub const DEFAULT_COLOR: RgbaColor = RgbaColor::new(0, 0, 0, 1.0);

/// Exact identity of a displayed color, usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey {
    r: u8,
    g: u8,
    b: u8,
    alpha_bits: u64,
}

impl RgbaColor {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn key(&self) -> ColorKey {
        ColorKey {
            r: self.r,
            g: self.g,
            b: self.b,
            // Fold -0.0 into 0.0.
            alpha_bits: (self.a + 0.0).to_bits(),
        }
    }

    /// Exact equality by the grouping rule.
    pub fn same_as(&self, other: &RgbaColor) -> bool {
        self.key() == other.key()
    }

    /// Same alpha, new RGB.
    pub fn with_rgb(self, (r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b, ..self }
    }

    /// `#rrggbb`, lowercase. Alpha is not encoded.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The representative channels of a color property.
///
/// A static color yields its own array; an animated color yields the first
/// keyframe's start, single value, or end, in that order. Arrays with fewer
/// than three channels do not count.
pub fn decode(prop: &ColorProperty) -> Option<&[f64]> {
    match &prop.value {
        ColorValue::Static(channels) => usable(channels),
        ColorValue::Animated(keyframes) => {
            let first = keyframes.first()?;
            [&first.start, &first.value, &first.end]
                .into_iter()
                .flatten()
                .find_map(|channels| usable(channels))
        }
        ColorValue::Raw(_) => None,
    }
}

fn usable(channels: &[f64]) -> Option<&[f64]> {
    (channels.len() >= 3).then_some(channels)
}

/// Normalized channels to a display color. A missing alpha reads as `1`.
pub fn to_display(channels: &[f64]) -> RgbaColor {
    let channel = |i: usize| channels.get(i).copied().map_or(0, to_8bit);
    RgbaColor {
        r: channel(0),
        g: channel(1),
        b: channel(2),
        a: channels.get(3).copied().unwrap_or(1.0),
    }
}

/// Display color to normalized channels.
pub fn to_storage(color: RgbaColor) -> Vec<f64> {
    vec![
        f64::from(color.r) / 255.0,
        f64::from(color.g) / 255.0,
        f64::from(color.b) / 255.0,
        color.a,
    ]
}

/// Decoded display color of a property, if any.
pub fn display_color(prop: &ColorProperty) -> Option<RgbaColor> {
    decode(prop).map(to_display)
}

/// Whether a stored channel array displays as `color`.
pub fn channels_match(channels: &[f64], color: &RgbaColor) -> bool {
    usable(channels).is_some_and(|c| to_display(c).same_as(color))
}

fn to_8bit(channel: f64) -> u8 {
    // `as` saturates and maps NaN to 0.
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

// ─── Hex ─────────────────────────────────────────────────────────────────

/// Value of a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse `RGB` or `RRGGBB`, optionally prefixed by `#`, surrounding
/// whitespace ignored. The short form duplicates each digit.
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => {
            let r = hex_val(bytes[0])?;
            let g = hex_val(bytes[1])?;
            let b = hex_val(bytes[2])?;
            Some((r * 17, g * 17, b * 17))
        }
        6 => {
            let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
            let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
            let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
            Some((r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Keyframe;

    #[test]
    fn display_rounds_and_defaults_alpha() {
        assert_eq!(to_display(&[1.0, 0.0, 0.0, 1.0]), RgbaColor::new(255, 0, 0, 1.0));
        assert_eq!(to_display(&[0.5, 0.2, 0.0]), RgbaColor::new(128, 51, 0, 1.0));
        assert_eq!(to_display(&[0.0, 0.0, 0.0, 0.25]).a, 0.25);
    }

    #[test]
    fn out_of_range_channels_clamp() {
        assert_eq!(to_display(&[1.5, -0.2, f64::NAN, 1.0]), RgbaColor::new(255, 0, 0, 1.0));
    }

    #[test]
    fn every_8bit_value_roundtrips() {
        for v in 0..=255u8 {
            let c = RgbaColor::new(v, 255 - v, v / 2, 0.75);
            assert_eq!(to_display(&to_storage(c)), c, "channel value {v}");
        }
    }

    #[test]
    fn low_channel_boundary_is_exact() {
        // 1 → 1/255 → 0.99999... * 255 rounds back up to 1, never down to 0.
        let stored = to_storage(RgbaColor::new(1, 0, 0, 1.0));
        assert_eq!(stored[0], 1.0 / 255.0);
        assert_eq!(to_display(&stored).r, 1);
    }

    #[test]
    fn first_conversion_of_foreign_value_shifts_once() {
        // 0.5 * 255 = 127.5 rounds half away from zero.
        let first = to_display(&[0.5, 0.5, 0.5, 1.0]);
        assert_eq!(first.r, 128);
        let stored = to_storage(first);
        assert_ne!(stored[0], 0.5);
        assert_eq!(to_display(&stored), first);
        assert_eq!(to_display(&to_storage(to_display(&stored))), first);
    }

    #[test]
    fn decode_prefers_start_then_value_then_end() {
        let mut kf = Keyframe::at(0.0, vec![1.0, 0.0, 0.0, 1.0]);
        kf.value = Some(vec![0.0, 1.0, 0.0, 1.0]);
        kf.end = Some(vec![0.0, 0.0, 1.0, 1.0]);
        let prop = ColorProperty::animated(vec![kf.clone()]);
        assert_eq!(decode(&prop), Some(&[1.0, 0.0, 0.0, 1.0][..]));

        kf.start = None;
        let prop = ColorProperty::animated(vec![kf.clone()]);
        assert_eq!(decode(&prop), Some(&[0.0, 1.0, 0.0, 1.0][..]));

        kf.value = None;
        let prop = ColorProperty::animated(vec![kf]);
        assert_eq!(decode(&prop), Some(&[0.0, 0.0, 1.0, 1.0][..]));
    }

    #[test]
    fn decode_uses_only_first_keyframe() {
        let mut empty = Keyframe::at(0.0, vec![]);
        empty.start = None;
        let prop = ColorProperty::animated(vec![empty, Keyframe::at(10.0, vec![1.0, 1.0, 1.0])]);
        assert_eq!(decode(&prop), None);
        assert_eq!(decode(&ColorProperty::animated(vec![])), None);
    }

    #[test]
    fn decode_rejects_short_or_raw_values() {
        assert_eq!(decode(&ColorProperty::fixed(vec![1.0])), None);
        let raw = ColorProperty {
            value: ColorValue::Raw(serde_json::json!("red")),
            extra: Default::default(),
        };
        assert_eq!(display_color(&raw), None);
    }

    #[test]
    fn key_distinguishes_alpha_exactly() {
        let a = RgbaColor::new(10, 20, 30, 1.0);
        assert!(a.same_as(&RgbaColor::new(10, 20, 30, 1.0)));
        assert!(!a.same_as(&RgbaColor::new(10, 20, 30, 0.999)));
        assert!(RgbaColor::new(0, 0, 0, 0.0).same_as(&RgbaColor::new(0, 0, 0, -0.0)));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_rgb("f0a"), Some((0xff, 0x00, 0xaa)));
        assert_eq!(parse_hex_rgb("#F0A"), Some((0xff, 0x00, 0xaa)));
        assert_eq!(parse_hex_rgb(" #12ab9C "), Some((0x12, 0xab, 0x9c)));
        assert_eq!(parse_hex_rgb("zzz"), None);
        assert_eq!(parse_hex_rgb("#1234"), None);
        assert_eq!(parse_hex_rgb("##fff"), None);
        assert_eq!(parse_hex_rgb(""), None);
    }

    #[test]
    fn hex_formatting_is_lowercase_rgb() {
        assert_eq!(RgbaColor::new(255, 0, 170, 0.5).to_hex(), "#ff00aa");
        assert_eq!(RgbaColor::new(1, 2, 3, 1.0).to_hex(), "#010203");
    }
}
