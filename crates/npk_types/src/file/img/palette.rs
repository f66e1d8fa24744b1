//! Palette block support for indexed images.
//!
//! Versions 4 and 5 store exactly one palette, version 6 stores a
//! count-prefixed list:
//!
//! ```text
//! v4/v5: [color_count: u32][A B G R] × color_count
//! v6:    [palette_count: u32] ([color_count: u32][A B G R] × color_count) × palette_count
//! ```
//!
//! Colors are stored with reversed channels and are remapped to RGBA on load.

use crate::file::canvas::Color;
use crate::file::npk::LoadConfig;
use crate::file::NpkError;

/// Size of a palette entry in bytes.
pub const PALETTE_ENTRY_SIZE: usize = 4;

/// Size of a count prefix in bytes.
const COUNT_SIZE: usize = 4;

/// A single color table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Palette {
	colors: Vec<Color>,
}

impl Palette {
	/// Creates a palette from already decoded colors.
	pub fn new(colors: Vec<Color>) -> Self {
		Self {
			colors,
		}
	}

	/// Parses one count-prefixed palette.
	///
	/// Returns the palette and the number of bytes consumed, or `None` if the
	/// data is shorter than the declared color count.
	fn parse(data: &[u8]) -> Option<(Self, usize)> {
		let count = read_count(data)?;
		let size = COUNT_SIZE.checked_add(count.checked_mul(PALETTE_ENTRY_SIZE)?)?;
		let entries = data.get(COUNT_SIZE..size)?;

		let colors = entries
			.chunks_exact(PALETTE_ENTRY_SIZE)
			.map(|c| Color::new(c[3], c[2], c[1], c[0]))
			.collect();
		Some((Self::new(colors), size))
	}

	/// Number of colors in the palette.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Returns `true` if the palette has no colors.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Returns the color at `index`.
	pub fn get(&self, index: usize) -> Option<Color> {
		self.colors.get(index).copied()
	}

	/// Returns all colors.
	pub fn colors(&self) -> &[Color] {
		&self.colors
	}
}

/// The palettes owned by one image.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaletteStore {
	palettes: Vec<Palette>,
}

impl PaletteStore {
	/// Creates a store from parsed palettes.
	pub fn new(palettes: Vec<Palette>) -> Self {
		Self {
			palettes,
		}
	}

	/// Parses the palette block of a version 4, 5 or 6 image.
	///
	/// Returns the store and the number of bytes consumed. A block shorter
	/// than its declared sizes yields an empty store that consumed nothing,
	/// unless `config` disallows malformed palettes.
	///
	/// # Errors
	///
	/// Returns [`NpkError::MalformedPalette`] for a short block when
	/// `config.tolerate_malformed_palettes` is `false`.
	pub fn load(data: &[u8], version: u32, config: &LoadConfig) -> Result<(Self, usize), NpkError> {
		let parsed = match version {
			4 | 5 => Palette::parse(data).map(|(palette, size)| (Self::new(vec![palette]), size)),
			6 => Self::parse_list(data),
			_ => Some((Self::default(), 0)),
		};

		match parsed {
			Some(result) => Ok(result),
			None if config.tolerate_malformed_palettes => {
				log::warn!("Palette block is shorter than declared ({} bytes), ignoring it", data.len());
				Ok((Self::default(), 0))
			}
			None => Err(NpkError::MalformedPalette {
				expected: Self::declared_size(data, version),
				actual: data.len(),
			}),
		}
	}

	fn parse_list(data: &[u8]) -> Option<(Self, usize)> {
		let count = read_count(data)?;
		let mut offset = COUNT_SIZE;
		let mut palettes = Vec::with_capacity(count.min(256));

		for _ in 0..count {
			let (palette, size) = Palette::parse(data.get(offset..)?)?;
			palettes.push(palette);
			offset += size;
		}
		Some((Self::new(palettes), offset))
	}

	/// Best-effort size the block claims to have, for error reporting.
	fn declared_size(data: &[u8], version: u32) -> usize {
		let single = |data: &[u8]| {
			read_count(data).map_or(COUNT_SIZE, |n| COUNT_SIZE.saturating_add(n.saturating_mul(PALETTE_ENTRY_SIZE)))
		};

		if version != 6 {
			return single(data);
		}

		let Some(count) = read_count(data) else {
			return COUNT_SIZE;
		};
		let mut offset = COUNT_SIZE;
		for _ in 0..count {
			match data.get(offset..) {
				Some(rest) if rest.len() >= COUNT_SIZE => offset = offset.saturating_add(single(rest)),
				_ => return offset.saturating_add(COUNT_SIZE),
			}
		}
		offset
	}

	/// Number of palettes.
	pub fn len(&self) -> usize {
		self.palettes.len()
	}

	/// Returns `true` if the store holds no palettes.
	pub fn is_empty(&self) -> bool {
		self.palettes.is_empty()
	}

	/// Returns the palette at `index`.
	pub fn palette(&self, index: usize) -> Option<&Palette> {
		self.palettes.get(index)
	}

	/// Looks up a color.
	///
	/// Out-of-range palette or color indices yield a transparent color and
	/// a warning, never a failure.
	pub fn color(&self, palette_index: usize, color_index: usize) -> Color {
		let Some(palette) = self.palettes.get(palette_index) else {
			log::warn!("Invalid palette index {palette_index} (palettes: {})", self.palettes.len());
			return Color::default();
		};

		palette.get(color_index).unwrap_or_else(|| {
			log::warn!("Invalid color index {color_index} (colors: {})", palette.len());
			Color::default()
		})
	}
}

fn read_count(data: &[u8]) -> Option<usize> {
	let bytes = data.get(..COUNT_SIZE)?;
	Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
}
