//! `.NPK` archive support.
//!
//! An NPK archive bundles many images behind an obfuscated directory and an
//! integrity digest.
//!
//! # File Structure
//!
//! - **Header (0x00-0x13):** 16-byte magic `"NeoplePack_Bill\0"` and the image
//!   count (u32, little-endian)
//! - **Directory:** one 264-byte entry per image
//! - **Digest:** 32 bytes right after the directory
//! - **Body:** image blobs, addressed by absolute file offsets
//!
//! # Directory Entry Format
//!
//! Each directory entry (264 bytes) contains:
//! - Offset (4 bytes, little-endian, absolute)
//! - Size (4 bytes, little-endian)
//! - Name (256 bytes, XOR-obfuscated, see [`decode_name`](crate::file::img::decode_name))
//!
//! # Integrity
//!
//! The digest covers the header and directory, truncated to a multiple of
//! 17 bytes. It is checked with the caller's hash function before any image
//! is parsed; a mismatch aborts the load.
//!
//! # Usage Examples
//!
//! ```no_run
//! use npk_types::file::codec::{Sha256Hash, ZlibInflate};
//! use npk_types::file::npk::{LoadConfig, Loader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Loader::new(Sha256Hash, ZlibInflate).with_config(LoadConfig::strict());
//! let archive = loader.open("sprite_interface.NPK")?;
//!
//! println!("{} images", archive.image_count());
//! for image in archive.iter() {
//!     println!("{image}");
//! }
//!
//! let canvas = archive.decode_frame(0, 0, 0)?;
//! println!("{}x{}", canvas.width(), canvas.height());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::file::canvas::Canvas;
use crate::file::codec::{DIGEST_SIZE, Hash256, Inflate};
use crate::file::img::{self, Image, read_u32};
use crate::file::{DecodeError, NpkError, Section};

mod config;


pub use config::LoadConfig;

/// NPK archive constants.
pub mod constants {
	/// Archive magic, including the trailing NUL
	pub const MAGIC: &[u8; 16] = b"NeoplePack_Bill\0";

	/// Size of the archive header (magic + image count)
	pub const HEADER_SIZE: usize = 20;

	/// Size of a directory entry (offset + size + name)
	pub const ENTRY_SIZE: usize = 264;

	/// The verification region is truncated to a multiple of this
	pub const DIGEST_ALIGNMENT: usize = 17;
}

/// Archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	/// Magic bytes
	pub magic: [u8; 16],
	/// Number of directory entries
	pub image_count: u32,
}

impl Header {
	/// Parses and validates the archive header.
	pub fn parse(data: &[u8]) -> Result<Self, NpkError> {
		if data.len() < constants::HEADER_SIZE {
			return Err(NpkError::insufficient_data(
				Section::ArchiveHeader,
				constants::HEADER_SIZE,
				data.len(),
			));
		}

		let mut magic = [0u8; 16];
		magic.copy_from_slice(&data[..16]);
		if &magic != constants::MAGIC {
			return Err(NpkError::invalid_magic(Section::ArchiveHeader, constants::MAGIC, &magic));
		}

		Ok(Self {
			magic,
			image_count: read_u32(data, 16),
		})
	}

	/// End of the directory, where the digest is stored.
	pub fn directory_end(&self) -> usize {
		constants::HEADER_SIZE + self.image_count as usize * constants::ENTRY_SIZE
	}

	/// Length of the region covered by the digest.
	pub fn verification_len(&self) -> usize {
		self.directory_end() / constants::DIGEST_ALIGNMENT * constants::DIGEST_ALIGNMENT
	}
}

/// Directory entry.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
	/// Absolute byte offset of the image blob
	pub offset: u32,
	/// Byte length of the image blob
	pub size: u32,
	raw_name: [u8; img::constants::NAME_SIZE],
}

impl Entry {
	fn parse(data: &[u8]) -> Result<Self, NpkError> {
		if data.len() < constants::ENTRY_SIZE {
			return Err(NpkError::insufficient_data(Section::Directory, constants::ENTRY_SIZE, data.len()));
		}

		let mut raw_name = [0u8; img::constants::NAME_SIZE];
		raw_name.copy_from_slice(&data[8..constants::ENTRY_SIZE]);
		Ok(Self {
			offset: read_u32(data, 0),
			size: read_u32(data, 4),
			raw_name,
		})
	}

	/// De-obfuscated image path.
	pub fn name(&self) -> String {
		img::decode_name(&self.raw_name)
	}

	/// Obfuscated name field as stored.
	pub fn raw_name(&self) -> &[u8; img::constants::NAME_SIZE] {
		&self.raw_name
	}
}

impl fmt::Debug for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Entry")
			.field("offset", &self.offset)
			.field("size", &self.size)
			.field("name", &self.name())
			.finish()
	}
}

/// Loads archives with injected hash and decompression strategies.
///
/// There is no default strategy: callers always pass both.
pub struct Loader {
	hasher: Box<dyn Hash256 + Send + Sync>,
	inflater: Arc<dyn Inflate + Send + Sync>,
	config: LoadConfig,
}

impl Loader {
	/// Creates a loader with the default [`LoadConfig`].
	pub fn new<H, I>(hasher: H, inflater: I) -> Self
	where
		H: Hash256 + Send + Sync + 'static,
		I: Inflate + Send + Sync + 'static,
	{
		Self {
			hasher: Box::new(hasher),
			inflater: Arc::new(inflater),
			config: LoadConfig::default(),
		}
	}

	/// Replaces the load configuration.
	pub fn with_config(mut self, config: LoadConfig) -> Self {
		self.config = config;
		self
	}

	/// Current load configuration.
	pub fn config(&self) -> &LoadConfig {
		&self.config
	}

	/// Reads and loads the archive at `path`.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or any part of the
	/// archive fails to load.
	pub fn open(&self, path: impl AsRef<Path>) -> Result<File, NpkError> {
		let path = path.as_ref();
		let data = std::fs::read(path)?;
		let mut file = self.load_bytes(&data)?;
		file.name = path.file_name().map(|n| n.to_string_lossy().into_owned());
		Ok(file)
	}

	/// Loads an archive from a reader.
	pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<File, NpkError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		self.load_bytes(&data)
	}

	/// Loads an archive from memory.
	///
	/// # Errors
	///
	/// - [`NpkError::InvalidMagic`] or [`NpkError::InsufficientData`] for a
	///   malformed header or directory
	/// - [`NpkError::IntegrityMismatch`] if the digest does not match; no
	///   image is parsed in that case
	/// - [`NpkError::EntryOutOfBounds`] if an entry points outside the data
	/// - [`NpkError::Image`] if any image fails to parse
	pub fn load_bytes(&self, data: &[u8]) -> Result<File, NpkError> {
		let header = Header::parse(data)?;
		let directory_end = header.directory_end();
		if data.len() < directory_end {
			return Err(NpkError::insufficient_data(Section::Directory, directory_end, data.len()));
		}
		if data.len() < directory_end + DIGEST_SIZE {
			return Err(NpkError::insufficient_data(Section::Digest, directory_end + DIGEST_SIZE, data.len()));
		}

		let mut digest = [0u8; DIGEST_SIZE];
		digest.copy_from_slice(&data[directory_end..directory_end + DIGEST_SIZE]);
		let computed = self.hasher.hash(&data[..header.verification_len()]);
		if computed != digest {
			return Err(NpkError::IntegrityMismatch {
				expected: digest,
				actual: computed,
			});
		}

		let count = header.image_count as usize;
		let mut entries = Vec::with_capacity(count);
		let mut images = Vec::with_capacity(count);
		for index in 0..count {
			let entry = Entry::parse(&data[constants::HEADER_SIZE + index * constants::ENTRY_SIZE..])?;

			let start = entry.offset as usize;
			let end = start.checked_add(entry.size as usize).filter(|&end| end <= data.len()).ok_or(
				NpkError::EntryOutOfBounds {
					index,
					offset: entry.offset,
					size: entry.size,
					available: data.len(),
				},
			)?;

			let image = Image::parse(entry.raw_name(), &data[start..end], &self.config).map_err(|e| {
				NpkError::Image {
					index,
					name: entry.name(),
					source: Box::new(e),
				}
			})?;
			entries.push(entry);
			images.push(image);
		}

		log::debug!("Loaded NPK archive with {count} images");
		Ok(File {
			name: None,
			header,
			digest,
			entries,
			images,
			inflater: Arc::clone(&self.inflater),
		})
	}
}

impl fmt::Debug for Loader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Loader").field("config", &self.config).finish_non_exhaustive()
	}
}

/// A loaded NPK archive.
///
/// Images are independent once loaded and can be decoded from several
/// threads at once.
#[derive(Clone)]
pub struct File {
	name: Option<String>,
	header: Header,
	digest: [u8; DIGEST_SIZE],
	entries: Vec<Entry>,
	images: Vec<Image>,
	inflater: Arc<dyn Inflate + Send + Sync>,
}

impl File {
	/// File name of the archive, when loaded from a path.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Archive header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Stored integrity digest.
	pub fn digest(&self) -> &[u8; DIGEST_SIZE] {
		&self.digest
	}

	/// Directory entries in on-disk order.
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Number of images.
	pub fn image_count(&self) -> usize {
		self.images.len()
	}

	/// All images in directory order.
	pub fn images(&self) -> &[Image] {
		&self.images
	}

	/// Returns the image at `index`.
	pub fn image(&self, index: usize) -> Option<&Image> {
		self.images.get(index)
	}

	/// Returns the first image whose full path equals `name`.
	pub fn image_by_name(&self, name: &str) -> Option<&Image> {
		self.images.iter().find(|image| image.name() == name)
	}

	/// Returns an iterator over the images.
	pub fn iter(&self) -> std::slice::Iter<'_, Image> {
		self.images.iter()
	}

	/// Decodes frame `frame` of image `image` with the loader's decompressor.
	pub fn decode_frame(&self, image: usize, frame: usize, palette: usize) -> Result<Canvas, DecodeError> {
		let target = self.images.get(image).ok_or(DecodeError::UnknownImage {
			index: image,
			count: self.images.len(),
		})?;
		target.decode_frame(frame, palette, self.inflater.as_ref())
	}

	/// Decodes sub-texture `texture` of image `image` with the loader's
	/// decompressor.
	pub fn decode_sub_texture(&self, image: usize, texture: usize) -> Result<Canvas, DecodeError> {
		let target = self.images.get(image).ok_or(DecodeError::UnknownImage {
			index: image,
			count: self.images.len(),
		})?;
		target.decode_sub_texture(texture, self.inflater.as_ref())
	}

	/// The decompressor the archive was loaded with.
	pub fn inflater(&self) -> &(dyn Inflate + Send + Sync) {
		self.inflater.as_ref()
	}
}

impl<'a> IntoIterator for &'a File {
	type Item = &'a Image;
	type IntoIter = std::slice::Iter<'a, Image>;

	fn into_iter(self) -> Self::IntoIter {
		self.images.iter()
	}
}

impl fmt::Debug for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("File")
			.field("name", &self.name)
			.field("header", &self.header)
			.field("entries", &self.entries)
			.field("images", &self.images)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "NPK {} ({} images)", self.name.as_deref().unwrap_or("<memory>"), self.images.len())
	}
}
