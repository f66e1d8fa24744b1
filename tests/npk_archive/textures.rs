use npk_benches::{ArchiveBuilder, ImageBuilder, dds_container, dxt1_block, dxt_blocks};
use npk_rs::npk_types::file::{BlockFormat, ClipRect, Color, ColorFormat, DecodeError};

use crate::load;

const RED_565: u16 = 0xF800;
const BLUE_565: u16 = 0x001F;

/// 8x8 DXT1 texture: the left column of blocks red, the right one blue.
fn two_tone_container() -> Vec<u8> {
	let mut blocks = Vec::new();
	for _row in 0..2 {
		blocks.extend_from_slice(&dxt1_block(RED_565, BLUE_565, 0));
		blocks.extend_from_slice(&dxt1_block(RED_565, BLUE_565, 1));
	}
	dds_container(8, 8, BlockFormat::Dxt1, &blocks)
}

#[test_log::test]
fn test_v5_sub_texture_clip() {
	let blob = ImageBuilder::new(5)
		.texture(&two_tone_container())
		.texture_ref(0, ClipRect::new(2, 1, 6, 5))
		.build();
	let file = load(&ArchiveBuilder::new().image("map/atlas.img", blob).build()).unwrap();
	let image = file.image(0).unwrap();

	assert_eq!(image.sub_texture_count(), 1);
	assert_eq!(image.v5_info().map(|info| info.sub_texture_count), Some(1));
	assert!(image.frame_is_sub_texture(0));
	assert_eq!(image.frame_sub_texture_index(0), Some(0));
	assert_eq!(image.frame_clip_rect(0), Some(ClipRect::new(2, 1, 6, 5)));
	assert_eq!(image.frame_color_format(0), Some(ColorFormat::Dxt1));

	let canvas = file.decode_frame(0, 0, 0).unwrap();
	assert_eq!((canvas.width(), canvas.height()), (4, 4));
	for y in 0..4 {
		assert_eq!(canvas.pixel(0, y), Some(Color::rgb(248, 0, 0)));
		assert_eq!(canvas.pixel(1, y), Some(Color::rgb(248, 0, 0)));
		assert_eq!(canvas.pixel(2, y), Some(Color::rgb(0, 0, 248)));
		assert_eq!(canvas.pixel(3, y), Some(Color::rgb(0, 0, 248)));
	}

	let full = file.decode_sub_texture(0, 0).unwrap();
	assert_eq!((full.width(), full.height()), (8, 8));
}

#[test]
fn test_block_formats_decode_through_archive() {
	let (width, height) = (16, 8);
	let blob = [BlockFormat::Dxt1, BlockFormat::Dxt3, BlockFormat::Dxt5]
		.into_iter()
		.fold(ImageBuilder::new(5), |builder, format| {
			builder.texture(&dds_container(width, height, format, &dxt_blocks(width, height, format)))
		})
		.build();
	let file = load(&ArchiveBuilder::new().image("atlas.img", blob).build()).unwrap();

	for index in 0..3 {
		let canvas = file.decode_sub_texture(0, index).unwrap();
		assert_eq!((canvas.width(), canvas.height()), (width, height));
		assert_eq!(canvas.to_rgba().len(), (width * height * 4) as usize);
	}
}

#[test]
fn test_bad_sub_texture_references() {
	let blob = ImageBuilder::new(5)
		.texture(&two_tone_container())
		.texture_ref(3, ClipRect::new(0, 0, 4, 4))
		.texture_ref(0, ClipRect::new(4, 4, 12, 8))
		.build();
	let file = load(&ArchiveBuilder::new().image("atlas.img", blob).build()).unwrap();

	assert!(matches!(
		file.decode_frame(0, 0, 0),
		Err(DecodeError::SubTextureOutOfRange {
			index: 3,
			count: 1
		})
	));
	assert!(matches!(file.decode_frame(0, 1, 0), Err(DecodeError::InvalidClip { .. })));
}

#[test]
fn test_unaligned_texture_fails() {
	let blocks = dxt_blocks(8, 8, BlockFormat::Dxt1);
	let blob = ImageBuilder::new(5).texture(&dds_container(6, 8, BlockFormat::Dxt1, &blocks)).build();
	let file = load(&ArchiveBuilder::new().image("atlas.img", blob).build()).unwrap();

	assert!(file.decode_sub_texture(0, 0).is_err());
}
