//! Benchmark helper utilities for npk-rs
//!
//! This module provides utilities for generating synthetic test data and common
//! benchmark helpers for the npk-rs project.
//!
//! # Synthetic Archives
//!
//! Real game archives are large and not redistributable, so the benchmark
//! suite and the integration tests build archives in memory:
//! - [`ImageBuilder`] lays out a single image blob (header, palettes,
//!   sub-texture records, frame records, payloads)
//! - [`ArchiveBuilder`] wraps image blobs in an NPK directory and signs it
//!   with SHA-256
//! - [`dxt_blocks`] and [`dds_container`] produce block-compressed textures

use std::io::Write;

use flate2::write::ZlibEncoder;
use npk_types::file::canvas::{ClipRect, Color};
use npk_types::file::dxt::BlockFormat;
use npk_types::file::img::encode_name;
use npk_types::file::img::texture::{TEXTURE_FLAGS, TEXTURE_HEADER_DECLARED_SIZE, TEXTURE_HEADER_SIZE, TEXTURE_MAGIC};
use npk_types::file::npk::constants as npk;
use sha2::{Digest, Sha256};

/// Color type of a 32-bit frame
pub const ARGB8888: u32 = 0x10;
/// Color type of a 16-bit ARGB4444 frame
pub const ARGB4444: u32 = 0x0F;
/// Color type of a 16-bit ARGB1555 frame
pub const ARGB1555: u32 = 0x0E;
/// Color type of a palette-indexed frame
pub const INDEXED: u32 = 0x01;
/// Stored payload
pub const STORED: u32 = 0x05;
/// Zlib payload
pub const ZLIB: u32 = 0x06;

/// Compresses `data` with zlib at the default level.
pub fn zlib(data: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
	// Writing into a Vec cannot fail
	let _ = encoder.write_all(data);
	encoder.finish().unwrap_or_default()
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
	Sha256::digest(data).into()
}

/// A DXT1 block filled with a single reference color index.
pub fn dxt1_block(color0: u16, color1: u16, index: u8) -> [u8; 8] {
	let indices = (0..16).fold(0u32, |acc, i| acc | (u32::from(index) << (i * 2)));
	let mut block = [0u8; 8];
	block[0..2].copy_from_slice(&color0.to_le_bytes());
	block[2..4].copy_from_slice(&color1.to_le_bytes());
	block[4..8].copy_from_slice(&indices.to_le_bytes());
	block
}

/// Generates block data for a `width` x `height` texture.
///
/// Blocks cycle through color pairs and index patterns so that both DXT1
/// modes and every alpha ramp slot get exercised.
pub fn dxt_blocks(width: u32, height: u32, format: BlockFormat) -> Vec<u8> {
	let blocks = (width / 4) as usize * (height / 4) as usize;
	let mut data = Vec::with_capacity(blocks * format.unit_size());

	for i in 0..blocks {
		let seed = i as u32;
		let (c0, c1) = if i % 3 == 0 {
			(0x001F, 0xF800)
		} else {
			(0xF800 | (seed as u16 & 0x07E0), 0x001F)
		};
		let color = dxt1_block(c0, c1, (i % 4) as u8);

		match format {
			BlockFormat::Dxt1 => {}
			BlockFormat::Dxt3 => {
				let alpha = (seed.wrapping_mul(0x9E37_79B9) as u64) | (u64::from(seed) << 32);
				data.extend_from_slice(&alpha.to_le_bytes());
			}
			BlockFormat::Dxt5 => {
				data.push((seed * 7 % 256) as u8);
				data.push((seed * 13 % 256) as u8);
				let indices = (0..16).fold(0u64, |acc, p| acc | (((u64::from(seed) + p) % 8) << (p * 3)));
				data.extend_from_slice(&indices.to_le_bytes()[..6]);
			}
		}
		data.extend_from_slice(&color);
	}
	data
}

/// Wraps block data in a DDS container.
pub fn dds_container(width: u32, height: u32, format: BlockFormat, blocks: &[u8]) -> Vec<u8> {
	let mut data = vec![0u8; TEXTURE_HEADER_SIZE];
	data[0..4].copy_from_slice(&TEXTURE_MAGIC.to_le_bytes());
	data[4..8].copy_from_slice(&TEXTURE_HEADER_DECLARED_SIZE.to_le_bytes());
	data[8..12].copy_from_slice(&TEXTURE_FLAGS.to_le_bytes());
	data[12..16].copy_from_slice(&height.to_le_bytes());
	data[16..20].copy_from_slice(&width.to_le_bytes());
	data[20..24].copy_from_slice(&(blocks.len() as u32).to_le_bytes());
	data[84..88].copy_from_slice(&format.four_cc().to_le_bytes());
	data.extend_from_slice(blocks);
	data
}

/// Generates an ARGB8888 gradient payload.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
	let mut data = Vec::with_capacity(width as usize * height as usize * 4);
	for y in 0..height {
		for x in 0..width {
			data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 0xFF]);
		}
	}
	data
}

fn words(values: &[u32]) -> Vec<u8> {
	values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Builds image blobs in the on-disk layout.
#[derive(Debug, Default, Clone)]
pub struct ImageBuilder {
	version: u32,
	palettes: Vec<Vec<Color>>,
	textures: Vec<(Vec<u8>, Vec<u8>)>,
	frames: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ImageBuilder {
	/// Starts an image of the given version.
	pub fn new(version: u32) -> Self {
		Self {
			version,
			..Self::default()
		}
	}

	/// Adds a palette. Versions 4 and 5 keep only the first one.
	pub fn palette(mut self, colors: &[Color]) -> Self {
		self.palettes.push(colors.to_vec());
		self
	}

	/// Adds a link frame.
	pub fn link(mut self, target: u32) -> Self {
		self.frames.push((words(&[0x11, target]), Vec::new()));
		self
	}

	/// Adds a stored bitmap frame whose declared size equals the payload.
	pub fn bitmap(self, format: u32, width: u32, height: u32, payload: Vec<u8>) -> Self {
		let declared = payload.len() as u32;
		self.bitmap_with(format, STORED, width, height, declared, payload)
	}

	/// Adds a zlib-compressed bitmap frame.
	pub fn compressed_bitmap(self, format: u32, width: u32, height: u32, raw: &[u8]) -> Self {
		let payload = zlib(raw);
		let declared = payload.len() as u32;
		self.bitmap_with(format, ZLIB, width, height, declared, payload)
	}

	/// Adds a bitmap frame with an explicit compression and declared size.
	pub fn bitmap_with(
		mut self,
		format: u32,
		compression: u32,
		width: u32,
		height: u32,
		declared: u32,
		payload: Vec<u8>,
	) -> Self {
		let record = words(&[format, compression, width, height, declared, 0, 0, width, height]);
		self.frames.push((record, payload));
		self
	}

	/// Adds a zlib-compressed sub-texture holding `container`.
	pub fn texture(mut self, container: &[u8]) -> Self {
		let compressed = zlib(container);
		let record =
			words(&[0, 0x12, self.textures.len() as u32, compressed.len() as u32, container.len() as u32, 0, 0]);
		self.textures.push((record, compressed));
		self
	}

	/// Adds a frame that shows `clip` of sub-texture `sub_texture`.
	pub fn texture_ref(mut self, sub_texture: u32, clip: ClipRect) -> Self {
		let record = words(&[
			0x12,
			ZLIB,
			clip.width(),
			clip.height(),
			0,
			0,
			0,
			clip.width(),
			clip.height(),
			0,
			sub_texture,
			clip.left,
			clip.top,
			clip.right,
			clip.bottom,
			0,
		]);
		self.frames.push((record, Vec::new()));
		self
	}

	/// Serializes the image.
	pub fn build(&self) -> Vec<u8> {
		let mut data = b"Neople Img File\0".to_vec();
		let table_size: usize = self.frames.iter().map(|(record, _)| record.len()).sum();
		data.extend(words(&[table_size as u32, 0, self.version, self.frames.len() as u32]));

		if self.version == 5 {
			data.extend(words(&[self.textures.len() as u32, 0]));
		}
		match self.version {
			4 | 5 => {
				let colors = self.palettes.first().map_or(&[][..], Vec::as_slice);
				push_palette(&mut data, colors);
			}
			6 => {
				data.extend(words(&[self.palettes.len() as u32]));
				for palette in &self.palettes {
					push_palette(&mut data, palette);
				}
			}
			_ => {}
		}

		for (record, _) in self.textures.iter().chain(&self.frames) {
			data.extend_from_slice(record);
		}
		for (_, payload) in self.textures.iter().chain(&self.frames) {
			data.extend_from_slice(payload);
		}
		data
	}
}

fn push_palette(data: &mut Vec<u8>, colors: &[Color]) {
	data.extend(words(&[colors.len() as u32]));
	for c in colors {
		data.extend_from_slice(&[c.a, c.b, c.g, c.r]);
	}
}

/// Builds NPK archives from image blobs.
#[derive(Debug, Default, Clone)]
pub struct ArchiveBuilder {
	images: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
	/// Starts an empty archive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an image blob under `name`.
	pub fn image(mut self, name: &str, blob: Vec<u8>) -> Self {
		self.images.push((name.to_string(), blob));
		self
	}

	/// Serializes the archive with a SHA-256 digest.
	pub fn build(&self) -> Vec<u8> {
		self.build_with(sha256)
	}

	/// Serializes the archive, computing the digest with `hash`.
	pub fn build_with(&self, hash: impl Fn(&[u8]) -> [u8; 32]) -> Vec<u8> {
		let directory_end = npk::HEADER_SIZE + self.images.len() * npk::ENTRY_SIZE;
		let mut offset = directory_end + 32;

		let mut data = npk::MAGIC.to_vec();
		data.extend(words(&[self.images.len() as u32]));
		for (name, blob) in &self.images {
			data.extend(words(&[offset as u32, blob.len() as u32]));
			data.extend_from_slice(&encode_name(name));
			offset += blob.len();
		}

		let verify_len = directory_end / npk::DIGEST_ALIGNMENT * npk::DIGEST_ALIGNMENT;
		let digest = hash(&data[..verify_len]);
		data.extend_from_slice(&digest);
		for (_, blob) in &self.images {
			data.extend_from_slice(blob);
		}
		data
	}
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Tiny texture: 64x64 (4,096 pixels)
	pub const TINY: (u32, u32) = (64, 64);
	/// Small texture: 256x256 (65,536 pixels)
	pub const SMALL: (u32, u32) = (256, 256);
	/// Medium texture: 512x512 (262,144 pixels)
	pub const MEDIUM: (u32, u32) = (512, 512);
	/// Large texture: 1024x1024 (1,048,576 pixels) - typical atlas
	pub const LARGE: (u32, u32) = (1024, 1024);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_dxt_blocks_length() {
		assert_eq!(dxt_blocks(8, 8, BlockFormat::Dxt1).len(), 4 * 8);
		assert_eq!(dxt_blocks(8, 8, BlockFormat::Dxt3).len(), 4 * 16);
		assert_eq!(dxt_blocks(8, 8, BlockFormat::Dxt5).len(), 4 * 16);
	}

	#[test]
	fn test_archive_layout() {
		let blob = ImageBuilder::new(2).bitmap(ARGB8888, 1, 1, vec![0, 0, 0, 255]).build();
		let data = ArchiveBuilder::new().image("a.img", blob.clone()).build();

		assert_eq!(&data[..16], npk::MAGIC);
		assert_eq!(data.len(), npk::HEADER_SIZE + npk::ENTRY_SIZE + 32 + blob.len());
		assert_eq!(&data[data.len() - blob.len()..], &blob[..]);
	}

	#[test]
	fn test_sizes_constants() {
		assert_eq!(sizes::TINY, (64, 64));
		assert_eq!(sizes::LARGE, (1024, 1024));
	}
}
