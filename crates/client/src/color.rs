//! Display colours for remote participants.
//!
//! A participant's hue is derived from its name, so every client paints the
//! same participant in the same colour without coordinating.

use tandem_primitives::Range;

use crate::config::ColorConfig;

/// Maps a name to a hue in `[0, 1)`.
///
/// Folds the UTF-16 code units of `name` as `a = 17 * (a + c) mod 360`,
/// starting from 1.
pub fn hue_from_name(name: &str) -> f64 {
	let a = name.encode_utf16().fold(1u32, |a, c| 17 * (a + u32::from(c)) % 360);
	f64::from(a) / 360.0
}

/// Converts an HSL colour (all components in `[0, 1]`) to `#rrggbb`.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
	if s == 0.0 {
		return rgb_to_hex(l, l, l);
	}

	let q = if l < 0.5 { l * (1.0 + s) } else { (l + s) - (s * l) };
	let p = 2.0 * l - q;

	let channel = |mut t: f64| {
		if t < 0.0 {
			t += 1.0;
		}
		if t > 1.0 {
			t -= 1.0;
		}
		if 6.0 * t < 1.0 {
			p + (q - p) * 6.0 * t
		} else if 2.0 * t < 1.0 {
			q
		} else if 3.0 * t < 2.0 {
			p + (q - p) * 6.0 * (2.0 / 3.0 - t)
		} else {
			p
		}
	};

	rgb_to_hex(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
	let digit = |n: f64| (255.0 * n).round().clamp(0.0, 255.0) as u8;
	format!("#{:02x}{:02x}{:02x}", digit(r), digit(g), digit(b))
}

/// The two shades a participant is drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantColor {
	/// Hue in `[0, 1)`.
	pub hue: f64,
	/// Saturated shade used for cursors.
	pub primary: String,
	/// Pale shade used behind selected text.
	pub light: String,
}

impl ParticipantColor {
	/// Builds both shades of `hue`.
	pub fn from_hue(hue: f64, config: &ColorConfig) -> Self {
		Self {
			hue,
			primary: hsl_to_hex(hue, config.saturation, config.lightness),
			light: hsl_to_hex(hue, config.light_saturation, config.light_lightness),
		}
	}

	/// Colour of the participant called `name`.
	pub fn for_name(name: &str, config: &ColorConfig) -> Self {
		Self::from_hue(hue_from_name(name), config)
	}

	/// Shade to draw `range` in: cursors use the primary shade, spans the light one.
	pub fn for_range(&self, range: &Range) -> &str {
		if range.is_empty() { &self.primary } else { &self.light }
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn hue_is_stable_per_name() {
		assert_eq!(hue_from_name("ada"), 103.0 / 360.0);
		assert_eq!(hue_from_name("grace"), 91.0 / 360.0);
		assert_eq!(hue_from_name(""), 1.0 / 360.0);
	}

	#[test]
	fn named_colors() {
		let config = ColorConfig::default();
		let ada = ParticipantColor::for_name("ada", &config);
		assert_eq!(ada.primary, "#56df20");
		assert_eq!(ada.light, "#e0f2d9");

		let grace = ParticipantColor::for_name("grace", &config);
		assert_eq!(grace.primary, "#7cdf20");
		assert_eq!(grace.light, "#e5f2d9");
	}

	#[test]
	fn grey_when_unsaturated() {
		assert_eq!(hsl_to_hex(0.5, 0.0, 0.5), "#808080");
		assert_eq!(hsl_to_hex(0.0, 0.75, 0.5), "#df2020");
	}

	#[test]
	fn cursor_and_span_shades() {
		let color = ParticipantColor::for_name("7", &ColorConfig::default());
		assert_eq!(color.for_range(&Range::point(3)), "#2039df");
		assert_eq!(color.for_range(&Range::new(3, 5)), "#d9dcf2");
	}

	proptest! {
		#[test]
		fn prop_hue_in_unit_range(name in ".{0,24}") {
			let hue = hue_from_name(&name);
			prop_assert!((0.0..1.0).contains(&hue));
			let hex = hsl_to_hex(hue, 0.75, 0.5);
			prop_assert_eq!(hex.len(), 7);
			prop_assert!(hex.starts_with('#'));
		}
	}
}
