//! Load configuration for NPK archives.
//!
//! Real archives are often slightly malformed: the last frame of an image may
//! be shorter than its record declares, and palette blocks occasionally claim
//! more colors than they hold. The configuration decides whether such data is
//! accepted with a warning or rejected.

/// Configuration for loading archives.
///
/// # Presets
///
/// - `default()`: tolerate truncated payloads and malformed palette blocks
/// - `lenient()`: same as `default()`
/// - `strict()`: reject both
///
/// # Examples
///
/// ```
/// use npk_types::file::npk::LoadConfig;
///
/// // Accept the quirks of real-world archives
/// let config = LoadConfig::default();
/// assert!(config.tolerate_truncated_payloads);
///
/// // Reject anything shorter than declared
/// let config = LoadConfig::strict();
/// assert!(!config.tolerate_malformed_palettes);
///
/// // Custom configuration
/// let config = LoadConfig::new(true, false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
	/// Keep frame and sub-texture payloads that are shorter than declared
	pub tolerate_truncated_payloads: bool,
	/// Skip palette blocks shorter than their declared color count
	pub tolerate_malformed_palettes: bool,
}

impl Default for LoadConfig {
	fn default() -> Self {
		Self {
			tolerate_truncated_payloads: true,
			tolerate_malformed_palettes: true,
		}
	}
}

impl LoadConfig {
	/// Create a new load configuration.
	///
	/// # Arguments
	/// * `tolerate_truncated_payloads` - Keep short payloads instead of failing
	/// * `tolerate_malformed_palettes` - Skip short palette blocks instead of failing
	pub fn new(tolerate_truncated_payloads: bool, tolerate_malformed_palettes: bool) -> Self {
		Self {
			tolerate_truncated_payloads,
			tolerate_malformed_palettes,
		}
	}

	/// Create a lenient configuration that accepts known archive quirks.
	pub fn lenient() -> Self {
		Self::default()
	}

	/// Create a strict configuration that fails on any short data.
	pub fn strict() -> Self {
		Self {
			tolerate_truncated_payloads: false,
			tolerate_malformed_palettes: false,
		}
	}
}
