//! Injected hashing and decompression capabilities.
//!
//! The loader never picks a hash or decompressor on its own: callers pass a
//! [`Hash256`] and an [`Inflate`] implementation to
//! [`Loader::new`](crate::file::npk::Loader::new). [`Sha256Hash`] and
//! [`ZlibInflate`] cover the algorithms real archives use.
//!
//! # Examples
//!
//! ```
//! use npk_types::file::codec::{Hash256, Inflate, Sha256Hash, ZlibInflate};
//!
//! let digest = Sha256Hash.hash(b"abc");
//! assert_eq!(digest[0], 0xBA);
//!
//! // A closure works as a hash function too
//! let zero = |_: &[u8]| [0u8; 32];
//! assert_eq!(zero.hash(b"anything"), [0u8; 32]);
//!
//! assert!(ZlibInflate.inflate(b"not zlib", 16).is_err());
//! ```

use flate2::{Decompress, FlushDecompress, Status};
use sha2::{Digest, Sha256};

use super::InflateError;

/// Size of the archive integrity digest in bytes.
pub const DIGEST_SIZE: usize = 32;

const MAX_DEFLATE_RATIO: usize = 1032;

/// A hash function producing a 32-byte digest.
pub trait Hash256 {
	/// Hashes `data`.
	fn hash(&self, data: &[u8]) -> [u8; DIGEST_SIZE];
}

impl<F> Hash256 for F
where
	F: Fn(&[u8]) -> [u8; DIGEST_SIZE],
{
	fn hash(&self, data: &[u8]) -> [u8; DIGEST_SIZE] {
		self(data)
	}
}

/// A DEFLATE-style decompressor.
///
/// Implementations must be reentrant: images are independent and may be
/// decoded from several threads at once.
pub trait Inflate {
	/// Decompresses `compressed` into at most `expected_len` bytes.
	///
	/// Output larger than `expected_len` is reported as
	/// [`InflateError::BufferTooSmall`]. Shorter output is returned as is.
	fn inflate(&self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>, InflateError>;
}

/// SHA-256, the digest used by real NPK archives.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sha256Hash;

impl Hash256 for Sha256Hash {
	fn hash(&self, data: &[u8]) -> [u8; DIGEST_SIZE] {
		Sha256::digest(data).into()
	}
}

/// zlib stream decompression backed by `flate2`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZlibInflate;

impl Inflate for ZlibInflate {
	fn inflate(&self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>, InflateError> {
		// Deflate cannot expand beyond ~1032:1, so a bogus declared size
		// never turns into a huge allocation
		let bound = compressed.len().saturating_mul(MAX_DEFLATE_RATIO).saturating_add(64);
		let mut output = vec![0u8; expected_len.min(bound)];
		let mut decoder = Decompress::new(true);

		let status = decoder
			.decompress(compressed, &mut output, FlushDecompress::Finish)
			.map_err(|e| InflateError::CorruptStream(e.to_string()))?;

		let written = decoder.total_out() as usize;
		match status {
			Status::StreamEnd => {
				output.truncate(written);
				Ok(output)
			}
			// Output is full; only a stream that still ends cleanly was cut short by the buffer
			Status::Ok | Status::BufError if written >= output.len() && runs_to_end(&mut decoder, compressed) => {
				Err(InflateError::BufferTooSmall {
					capacity: expected_len,
				})
			}
			Status::Ok | Status::BufError => {
				Err(InflateError::CorruptStream("unexpected end of stream".to_string()))
			}
		}
	}
}

/// Drains the rest of the stream into scratch space and reports whether it reaches its end.
fn runs_to_end(decoder: &mut Decompress, compressed: &[u8]) -> bool {
	let mut scratch = [0u8; 4096];
	loop {
		let consumed = decoder.total_in() as usize;
		let produced = decoder.total_out();
		match decoder.decompress(&compressed[consumed..], &mut scratch, FlushDecompress::Finish) {
			Ok(Status::StreamEnd) => return true,
			Ok(_) if decoder.total_in() as usize > consumed || decoder.total_out() > produced => {}
			_ => return false,
		}
	}
}
