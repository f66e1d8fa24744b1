//! NPK archive utility.
//!
//! Provides three subcommands:
//! - `info`: print the archive header, digest and one line per image.
//! - `frames`: dump the frame table of one image as JSON.
//! - `extract`: decode frames of one image (or every image) to PNG files.
//!
//! # Usage
//!
//! ```bash
//! # Show archive information
//! cargo run --example npk_utils -- info sprite_interface.NPK
//!
//! # Dump frame metadata of image 3
//! cargo run --example npk_utils -- frames sprite_interface.NPK 3
//!
//! # Extract frame 0 of image 3 with the second palette
//! cargo run --example npk_utils -- extract sprite_interface.NPK -i 3 -f 0 -p 1
//!
//! # Extract every frame of every image, refusing truncated data
//! cargo run --example npk_utils -- --strict extract sprite_interface.NPK -o out/
//! ```

use std::{
	fs,
	path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{Rgba, RgbaImage};
use log::{info, warn};
use npk_rs::prelude::*;
use serde::Serialize;

fn main() -> Result<()> {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let config = if cli.strict {
		LoadConfig::strict()
	} else {
		LoadConfig::lenient()
	};
	let loader = Loader::new(Sha256Hash, ZlibInflate).with_config(config);

	match cli.command {
		Command::Info(args) => run_info(&loader, args),
		Command::Frames(args) => run_frames(&loader, args),
		Command::Extract(args) => run_extract(&loader, args),
	}
}

#[derive(Parser)]
#[command(name = "npk_utils")]
#[command(author = "npk-rs project")]
#[command(version)]
#[command(about = "Inspect and extract NeoplePack (.NPK) archives", long_about = None)]
struct Cli {
	/// Fail on truncated payloads and malformed palettes instead of skipping them
	#[arg(long, global = true, default_value_t = false)]
	strict: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Display information about an archive
	Info(InfoArgs),
	/// Dump the frame table of one image as JSON
	Frames(FramesArgs),
	/// Decode frames to PNG files
	Extract(ExtractArgs),
}

#[derive(Args)]
struct InfoArgs {
	/// Path to the .NPK archive
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Also list sub-textures and palettes per image
	#[arg(short, long, default_value_t = false)]
	detailed: bool,
}

#[derive(Args)]
struct FramesArgs {
	/// Path to the .NPK archive
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Image index (0-based)
	#[arg(value_name = "IMAGE")]
	image: usize,

	/// Write JSON here instead of stdout
	#[arg(short, long, value_name = "OUTPUT")]
	output: Option<PathBuf>,
}

#[derive(Args)]
struct ExtractArgs {
	/// Path to the .NPK archive
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Only extract this image (0-based); all images otherwise
	#[arg(short, long, value_name = "IMAGE")]
	image: Option<usize>,

	/// Only extract this frame of each selected image
	#[arg(short, long, value_name = "FRAME")]
	frame: Option<usize>,

	/// Palette used for indexed frames
	#[arg(short, long, value_name = "PALETTE", default_value_t = 0)]
	palette: usize,

	/// Output directory (defaults to `<archive>_frames/`)
	#[arg(short, long, value_name = "OUTPUT_DIR")]
	output: Option<PathBuf>,

	/// Save the full frame field instead of the bitmap's own extent
	#[arg(long, default_value_t = false)]
	field: bool,
}

/// Frame metadata for JSON serialization
#[derive(Debug, Serialize)]
struct FrameMetadata {
	index: usize,
	kind: &'static str,
	color_format: String,
	width: u32,
	height: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	link_chain: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	position: Option<(u32, u32)>,
	#[serde(skip_serializing_if = "Option::is_none")]
	field: Option<(u32, u32)>,
	#[serde(skip_serializing_if = "Option::is_none")]
	sub_texture: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	clip: Option<String>,
}

/// Image metadata for JSON serialization
#[derive(Debug, Serialize)]
struct ImageMetadata {
	name: String,
	version: u32,
	palette_count: usize,
	sub_texture_count: usize,
	frame_count: usize,
	frames: Vec<FrameMetadata>,
}

fn open(loader: &Loader, path: &Path) -> Result<NpkFile> {
	if !path.exists() {
		bail!("Archive {} does not exist", path.display());
	}
	loader.open(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn run_info(loader: &Loader, args: InfoArgs) -> Result<()> {
	let archive = open(loader, &args.file)?;

	println!("{archive}");
	println!("  Digest: {}", hex::encode(archive.digest()));
	println!("  Images: {}", archive.image_count());

	for (index, (entry, image)) in archive.entries().iter().zip(archive.iter()).enumerate() {
		println!(
			"  [{index:4}] v{} {:4} frames {:8} bytes  {}",
			image.version(),
			image.frame_count(),
			entry.size,
			image.name()
		);
		if args.detailed {
			println!("         palettes: {}", image.palette_count());
			for texture in image.sub_textures() {
				println!("         {texture}");
			}
		}
	}

	Ok(())
}

fn frame_metadata(image: &Image, index: usize, frame: &Frame) -> FrameMetadata {
	let info = frame.info();
	FrameMetadata {
		index,
		kind: match frame {
			Frame::Link {
				..
			} => "link",
			Frame::Matrix(_) => "matrix",
			Frame::SubTextureRef(_) => "sub_texture",
		},
		color_format: image.frame_color_format(index).map_or_else(|| "UNRESOLVED".to_string(), |f| f.to_string()),
		width: image.frame_width(index).unwrap_or(0),
		height: image.frame_height(index).unwrap_or(0),
		link_chain: image.link_chain(index),
		position: info.map(|info| (info.pos_x, info.pos_y)),
		field: info.map(|info| (info.frame_width, info.frame_height)),
		sub_texture: frame.sub_texture_index(),
		clip: frame.clip_rect().map(|clip| clip.to_string()),
	}
}

fn run_frames(loader: &Loader, args: FramesArgs) -> Result<()> {
	let archive = open(loader, &args.file)?;
	let Some(image) = archive.image(args.image) else {
		bail!("Image {} out of range ({} images)", args.image, archive.image_count());
	};

	let metadata = ImageMetadata {
		name: image.name().to_string(),
		version: image.version(),
		palette_count: image.palette_count(),
		sub_texture_count: image.sub_texture_count(),
		frame_count: image.frame_count(),
		frames: image.frames().iter().enumerate().map(|(i, frame)| frame_metadata(image, i, frame)).collect(),
	};

	let json = serde_json::to_string_pretty(&metadata)?;
	match args.output {
		Some(path) => {
			fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
			info!("Wrote {}", path.display());
		}
		None => println!("{json}"),
	}
	Ok(())
}

fn save_png(canvas: &Canvas, field: bool, path: &Path) -> Result<()> {
	let img = if field {
		RgbaImage::from_raw(canvas.canvas_width(), canvas.canvas_height(), canvas.to_rgba())
			.context("Canvas size does not match its pixels")?
	} else {
		// Bitmap extent only, without the surrounding field
		RgbaImage::from_fn(canvas.width(), canvas.height(), |x, y| {
			let color = x
				.checked_add(canvas.offset_x())
				.zip(y.checked_add(canvas.offset_y()))
				.and_then(|(x, y)| canvas.pixel(x, y))
				.unwrap_or_default();
			Rgba(color.to_array())
		})
	};

	img.save(path).with_context(|| format!("Failed to save {}", path.display()))?;
	Ok(())
}

fn run_extract(loader: &Loader, args: ExtractArgs) -> Result<()> {
	let archive = open(loader, &args.file)?;
	let output_dir = args.output.clone().unwrap_or_else(|| {
		let stem = args.file.file_stem().map_or_else(|| "npk".into(), |s| s.to_string_lossy().into_owned());
		args.file.with_file_name(format!("{stem}_frames"))
	});

	let indices: Vec<usize> = match args.image {
		Some(index) if index >= archive.image_count() => {
			bail!("Image {index} out of range ({} images)", archive.image_count());
		}
		Some(index) => vec![index],
		None => (0..archive.image_count()).collect(),
	};

	let (mut saved, mut failed) = (0usize, 0usize);
	for index in indices {
		let image = &archive.images()[index];
		let image_dir = output_dir.join(relative_image_path(image.name(), index));
		fs::create_dir_all(&image_dir).with_context(|| format!("Failed to create {}", image_dir.display()))?;

		let frames = match args.frame {
			Some(frame) => frame..frame + 1,
			None => 0..image.frame_count(),
		};
		for frame in frames {
			match archive.decode_frame(index, frame, args.palette) {
				Ok(canvas) => {
					save_png(&canvas, args.field, &image_dir.join(format!("{frame:04}.png")))?;
					saved += 1;
				}
				Err(err) => {
					warn!("{} frame {frame}: {err}", image.name());
					failed += 1;
				}
			}
		}
	}

	info!("Extracted {saved} frames to {} ({failed} skipped)", output_dir.display());
	Ok(())
}

/// Keeps only the plain components of an archive name so output stays under the target directory.
fn relative_image_path(name: &str, index: usize) -> PathBuf {
	let path: PathBuf = Path::new(name)
		.components()
		.filter_map(|component| match component {
			Component::Normal(part) => Some(part),
			_ => None,
		})
		.collect();
	if path.as_os_str().is_empty() {
		PathBuf::from(format!("image{index:04}"))
	} else {
		path
	}
}
