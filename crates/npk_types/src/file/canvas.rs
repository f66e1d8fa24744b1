//! Pixel grid with offset placement and clip support.
//!
//! A [`Canvas`] has a logical size (the bitmap being drawn) and a backing
//! size that may be larger. Every write is shifted by the draw offset, so a
//! frame can be placed inside its logical field:
//!
//! ```text
//!  backing (canvas_width × canvas_height)
//! ┌────────────────────────────┐
//! │        offset_y            │
//! │ offset_x ┌─────────┐       │
//! │          │ logical │       │
//! │          │ w × h   │       │
//! │          └─────────┘       │
//! └────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```
//! use npk_types::file::canvas::{Canvas, ClipRect, Color};
//!
//! let mut canvas = Canvas::with_layout(2, 2, 4, 4, 1, 1);
//! canvas.set_pixel(0, 0, Color::rgb(255, 0, 0));
//! assert_eq!(canvas.pixel(1, 1), Some(Color::rgb(255, 0, 0)));
//!
//! // Writes outside the logical size are dropped
//! canvas.set_pixel(2, 0, Color::rgb(0, 255, 0));
//! assert_eq!(canvas.pixel(3, 1), Some(Color::transparent()));
//!
//! let cropped = canvas.clip(ClipRect::new(0, 0, 2, 2)).unwrap();
//! assert_eq!(cropped.width(), 2);
//! ```

use std::fmt;

/// Largest backing buffer, in pixels, that [`Canvas::try_with_layout`] accepts.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
	/// Alpha component (0-255)
	pub a: u8,
}

impl Color {
	/// Creates a new RGBA color.
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Creates a new RGB color with full opacity.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::new(r, g, b, 255)
	}

	/// Creates a transparent black color.
	pub const fn transparent() -> Self {
		Self::new(0, 0, 0, 0)
	}

	/// Returns the color as `[r, g, b, a]`.
	pub const fn to_array(self) -> [u8; 4] {
		[self.r, self.g, self.b, self.a]
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::transparent()
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// Crop rectangle, right and bottom edges exclusive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipRect {
	/// Left edge
	pub left: u32,
	/// Top edge
	pub top: u32,
	/// Right edge (exclusive)
	pub right: u32,
	/// Bottom edge (exclusive)
	pub bottom: u32,
}

impl ClipRect {
	/// Creates a new clip rectangle.
	pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
		Self {
			left,
			top,
			right,
			bottom,
		}
	}

	/// Returns `true` if the rectangle is non-empty and lies within a
	/// `width × height` area.
	pub const fn fits(&self, width: u32, height: u32) -> bool {
		self.left < self.right
			&& self.top < self.bottom
			&& self.right <= width
			&& self.bottom <= height
	}

	/// Width of the rectangle.
	pub const fn width(&self) -> u32 {
		self.right.saturating_sub(self.left)
	}

	/// Height of the rectangle.
	pub const fn height(&self) -> u32 {
		self.bottom.saturating_sub(self.top)
	}
}

impl fmt::Display for ClipRect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}:{}.{}", self.left, self.top, self.right, self.bottom)
	}
}

/// Dense RGBA pixel buffer with a logical size, a backing size and a draw
/// offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
	width: u32,
	height: u32,
	canvas_width: u32,
	canvas_height: u32,
	offset_x: u32,
	offset_y: u32,
	pixels: Vec<Color>,
}

impl Canvas {
	/// Creates a canvas whose backing size equals its logical size.
	pub fn new(width: u32, height: u32) -> Self {
		Self::with_layout(width, height, 0, 0, 0, 0)
	}

	/// Creates a canvas with an explicit backing size and draw offset.
	///
	/// A backing dimension of `0` falls back to the logical dimension.
	pub fn with_layout(
		width: u32,
		height: u32,
		canvas_width: u32,
		canvas_height: u32,
		offset_x: u32,
		offset_y: u32,
	) -> Self {
		let canvas_width = if canvas_width == 0 {
			width
		} else {
			canvas_width
		};
		let canvas_height = if canvas_height == 0 {
			height
		} else {
			canvas_height
		};

		Self {
			width,
			height,
			canvas_width,
			canvas_height,
			offset_x,
			offset_y,
			pixels: vec![Color::transparent(); canvas_width as usize * canvas_height as usize],
		}
	}

	/// Like [`with_layout`](Self::with_layout), but returns `None` when the
	/// backing buffer would exceed [`MAX_CANVAS_PIXELS`].
	///
	/// Use this for sizes read from untrusted records.
	pub fn try_with_layout(
		width: u32,
		height: u32,
		canvas_width: u32,
		canvas_height: u32,
		offset_x: u32,
		offset_y: u32,
	) -> Option<Self> {
		let backing_width = if canvas_width == 0 {
			width
		} else {
			canvas_width
		};
		let backing_height = if canvas_height == 0 {
			height
		} else {
			canvas_height
		};
		if u64::from(backing_width) * u64::from(backing_height) > MAX_CANVAS_PIXELS {
			return None;
		}
		Some(Self::with_layout(width, height, canvas_width, canvas_height, offset_x, offset_y))
	}

	/// Logical width.
	#[inline]
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Logical height.
	#[inline]
	pub fn height(&self) -> u32 {
		self.height
	}

	/// Backing buffer width.
	#[inline]
	pub fn canvas_width(&self) -> u32 {
		self.canvas_width
	}

	/// Backing buffer height.
	#[inline]
	pub fn canvas_height(&self) -> u32 {
		self.canvas_height
	}

	/// Horizontal draw offset.
	#[inline]
	pub fn offset_x(&self) -> u32 {
		self.offset_x
	}

	/// Vertical draw offset.
	#[inline]
	pub fn offset_y(&self) -> u32 {
		self.offset_y
	}

	/// Returns `true` if the logical size is zero in either dimension.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Backing pixels in row-major order.
	#[inline]
	pub fn pixels(&self) -> &[Color] {
		&self.pixels
	}

	/// Writes a pixel at logical coordinates.
	///
	/// Writes outside `[0, width) × [0, height)` and writes whose
	/// offset-adjusted position falls outside the backing buffer are
	/// silently dropped.
	pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
		if x >= self.width || y >= self.height {
			return;
		}

		let pos = (u64::from(y) + u64::from(self.offset_y)) * u64::from(self.canvas_width)
			+ u64::from(x)
			+ u64::from(self.offset_x);
		if let Some(pixel) = usize::try_from(pos).ok().and_then(|pos| self.pixels.get_mut(pos)) {
			*pixel = color;
		}
	}

	/// Reads a pixel at backing-buffer coordinates.
	pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
		if x >= self.canvas_width || y >= self.canvas_height {
			return None;
		}
		self.pixels.get(y as usize * self.canvas_width as usize + x as usize).copied()
	}

	/// Crops `rect` into a new canvas of the rectangle's size.
	///
	/// Returns `None` if the rectangle is empty or exceeds the logical size.
	pub fn clip(&self, rect: ClipRect) -> Option<Self> {
		self.clip_with_layout(rect, 0, 0, 0, 0)
	}

	/// Crops `rect` into a new canvas with an explicit backing size and draw
	/// offset.
	pub fn clip_with_layout(
		&self,
		rect: ClipRect,
		canvas_width: u32,
		canvas_height: u32,
		offset_x: u32,
		offset_y: u32,
	) -> Option<Self> {
		if !rect.fits(self.width, self.height) {
			return None;
		}

		let mut clipped = Self::with_layout(
			rect.width(),
			rect.height(),
			canvas_width,
			canvas_height,
			offset_x,
			offset_y,
		);
		for y in rect.top..rect.bottom {
			for x in rect.left..rect.right {
				let color = self.pixel(x, y).unwrap_or_default();
				clipped.set_pixel(x - rect.left, y - rect.top, color);
			}
		}
		Some(clipped)
	}

	/// Flattens the backing buffer to `canvas_width × canvas_height × 4`
	/// RGBA bytes.
	pub fn to_rgba(&self) -> Vec<u8> {
		self.pixels.iter().flat_map(|c| c.to_array()).collect()
	}

	/// Returns an iterator over the rows of the backing buffer.
	pub fn rows(&self) -> std::slice::ChunksExact<'_, Color> {
		self.pixels.chunks_exact(self.canvas_width.max(1) as usize)
	}
}

impl fmt::Display for Canvas {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}×{} on {}×{} at ({}, {})",
			self.width,
			self.height,
			self.canvas_width,
			self.canvas_height,
			self.offset_x,
			self.offset_y
		)
	}
}
