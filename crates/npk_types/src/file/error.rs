//! Error types for NPK archive parsing and pixel decoding.

use std::fmt;

use thiserror::Error;

use super::codec::DIGEST_SIZE;

/// On-disk structure an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
	/// Archive header (magic + image count)
	ArchiveHeader,
	/// Image directory entry (offset, size, obfuscated name)
	Directory,
	/// Trailing integrity digest
	Digest,
	/// Fixed image header
	ImageHeader,
	/// Version 5 extra block (sub-texture count, image size)
	V5Info,
	/// Palette block
	Palette,
	/// Sub-texture index record
	SubTextureRecord,
	/// Frame index record
	FrameRecord,
	/// Sub-texture compressed payload
	SubTexturePayload,
	/// Frame pixel payload
	FramePayload,
	/// Block-compressed texture container header
	TextureHeader,
}

impl fmt::Display for Section {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Section::ArchiveHeader => "archive header",
			Section::Directory => "image directory",
			Section::Digest => "integrity digest",
			Section::ImageHeader => "image header",
			Section::V5Info => "v5 info block",
			Section::Palette => "palette block",
			Section::SubTextureRecord => "sub-texture record",
			Section::FrameRecord => "frame record",
			Section::SubTexturePayload => "sub-texture payload",
			Section::FramePayload => "frame payload",
			Section::TextureHeader => "texture header",
		};
		f.write_str(name)
	}
}

/// Errors that can occur while loading an NPK archive.
///
/// Every variant aborts the enclosing unit: a failure inside one image is
/// wrapped in [`NpkError::Image`] and aborts the whole archive load.
#[derive(Debug, Error)]
pub enum NpkError {
	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// A fixed-size record does not fit in the remaining bytes
	#[error("Insufficient data for {section}: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Structure being parsed
		section: Section,
		/// Number of bytes required
		expected: usize,
		/// Number of bytes available
		actual: usize,
	},

	/// Magic bytes do not match
	#[error("Invalid {section} magic: expected {expected:02X?}, got {actual:02X?}")]
	InvalidMagic {
		/// Structure whose magic was checked
		section: Section,
		/// Expected magic bytes
		expected: Vec<u8>,
		/// Magic bytes found in the data
		actual: Vec<u8>,
	},

	/// Stored digest does not match the digest of the verification region
	#[error("Integrity check failed: stored digest {expected:02x?}, computed {actual:02x?}")]
	IntegrityMismatch {
		/// Digest stored in the archive
		expected: [u8; DIGEST_SIZE],
		/// Digest computed by the injected hash function
		actual: [u8; DIGEST_SIZE],
	},

	/// Directory entry points outside of the archive
	#[error(
		"Image entry {index} out of bounds: offset {offset} + size {size} exceeds {available} bytes"
	)]
	EntryOutOfBounds {
		/// Directory index
		index: usize,
		/// Declared byte offset
		offset: u32,
		/// Declared byte size
		size: u32,
		/// Archive length in bytes
		available: usize,
	},

	/// A payload is shorter than declared (strict mode only)
	#[error("Truncated {section} #{index}: declared {expected} bytes, {actual} bytes available")]
	TruncatedPayload {
		/// Payload kind
		section: Section,
		/// Frame or sub-texture index
		index: usize,
		/// Declared payload length
		expected: usize,
		/// Bytes actually available
		actual: usize,
	},

	/// Palette block shorter than its declared colour count (strict mode only)
	#[error("Malformed palette block: expected {expected} bytes, got {actual} bytes")]
	MalformedPalette {
		/// Bytes required by the declared colour count
		expected: usize,
		/// Bytes available
		actual: usize,
	},

	/// An image failed to parse, aborting the archive
	#[error("Failed to load image #{index} ({name}): {source}")]
	Image {
		/// Directory index of the image
		index: usize,
		/// De-obfuscated image name
		name: String,
		/// Underlying failure
		#[source]
		source: Box<NpkError>,
	},
}

impl NpkError {
	/// Creates an insufficient data error.
	pub fn insufficient_data(section: Section, expected: usize, actual: usize) -> Self {
		NpkError::InsufficientData {
			section,
			expected,
			actual,
		}
	}

	/// Creates an invalid magic error.
	pub fn invalid_magic(section: Section, expected: &[u8], actual: &[u8]) -> Self {
		NpkError::InvalidMagic {
			section,
			expected: expected.to_vec(),
			actual: actual.to_vec(),
		}
	}
}

/// Error codes reported by an injected decompressor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InflateError {
	/// Output needs more room than the declared uncompressed size
	#[error("Destination buffer too small ({capacity} bytes)")]
	BufferTooSmall {
		/// Declared uncompressed size
		capacity: usize,
	},

	/// Input stream is corrupt or ends prematurely
	#[error("Corrupt compressed stream: {0}")]
	CorruptStream(String),

	/// Any other decompressor failure
	#[error("Decompression failed: {0}")]
	Other(String),
}

/// Errors returned by a single decode call.
///
/// A decode failure never affects the loaded archive; it only means the
/// requested canvas could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// Link frames carry no pixels
	#[error("Link frame has no pixel data")]
	LinkFrame,

	/// Image index out of range
	#[error("Image {index} not found (archive has {count} images)")]
	UnknownImage {
		/// Requested image index
		index: usize,
		/// Number of images in the archive
		count: usize,
	},

	/// Frame index out of range or link chain deeper than two hops
	#[error("Frame {index} does not resolve to a drawable frame")]
	UnresolvedFrame {
		/// Requested frame index
		index: usize,
	},

	/// Frame has zero width or height
	#[error("Frame is empty ({width}x{height})")]
	EmptyFrame {
		/// Declared width
		width: u32,
		/// Declared height
		height: u32,
	},

	/// Declared frame field needs a larger buffer than allowed
	#[error("Frame field too large ({width}x{height})")]
	FieldTooLarge {
		/// Backing width
		width: u32,
		/// Backing height
		height: u32,
	},

	/// Frame or sub-texture payload is absent
	#[error("No payload data available")]
	MissingPayload,

	/// Decompression failed
	#[error(transparent)]
	Inflate(#[from] InflateError),

	/// Direct colour frame uses an unsupported colour type
	#[error("Unsupported colour type: 0x{0:02X}")]
	UnsupportedColorFormat(u32),

	/// Sub-texture reference points past the image's texture table
	#[error("Sub-texture index {index} out of range (table size: {count})")]
	SubTextureOutOfRange {
		/// Referenced sub-texture index
		index: u32,
		/// Number of sub-textures in the image
		count: usize,
	},

	/// Clip rectangle is empty or exceeds the source canvas
	#[error(
		"Invalid clip rectangle ({left}, {top})-({right}, {bottom}) for {width}x{height} canvas"
	)]
	InvalidClip {
		/// Left edge
		left: u32,
		/// Top edge
		top: u32,
		/// Right edge (exclusive)
		right: u32,
		/// Bottom edge (exclusive)
		bottom: u32,
		/// Source canvas width
		width: u32,
		/// Source canvas height
		height: u32,
	},

	/// Texture container header failed validation
	#[error("Invalid texture header: {0}")]
	InvalidTextureHeader(&'static str),

	/// Block format four-character code is not DXT1/3/5
	#[error("Unsupported block format: {0:#010X}")]
	UnsupportedBlockFormat(u32),

	/// Texture dimensions are not multiples of 4
	#[error("Texture dimensions {width}x{height} are not multiples of 4")]
	UnalignedDimensions {
		/// Declared width
		width: u32,
		/// Declared height
		height: u32,
	},

	/// Block data shorter than the block grid requires
	#[error("Insufficient block data: expected {expected} bytes, got {actual} bytes")]
	InsufficientBlockData {
		/// Bytes required by the block grid
		expected: usize,
		/// Bytes available
		actual: usize,
	},
}
