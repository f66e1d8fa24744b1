use log::info;
use npk_benches::{ARGB8888, ArchiveBuilder, ImageBuilder, gradient};
use npk_rs::{NpkError, npk_types::file::Section};

use crate::{load, load_strict};

fn archive(count: usize) -> Vec<u8> {
	(0..count)
		.fold(ArchiveBuilder::new(), |builder, i| {
			let blob = ImageBuilder::new(2).bitmap(ARGB8888, 2, 2, gradient(2, 2)).build();
			builder.image(&format!("sprite/interface/item{i}.img"), blob)
		})
		.build()
}

#[test_log::test]
fn test_n_images_by_index() {
	for count in [0, 1, 5] {
		let file = load(&archive(count)).unwrap();
		info!("{file}");

		assert_eq!(file.image_count(), count);
		for i in 0..count {
			let image = file.image(i).unwrap();
			assert_eq!(image.name(), format!("sprite/interface/item{i}.img"));
			assert_eq!(image.frame_count(), 1);
		}
		assert!(file.image(count).is_none());
	}
}

#[test]
fn test_integrity_failure_aborts_before_images() {
	// Digest from a different hash function
	let data = ArchiveBuilder::new()
		.image("broken.img", vec![0xFF; 8])
		.build_with(|_| [0x5A; 32]);

	assert!(matches!(load(&data), Err(NpkError::IntegrityMismatch { .. })));
	assert!(matches!(load_strict(&data), Err(NpkError::IntegrityMismatch { .. })));
}

#[test]
fn test_any_directory_byte_change_fails_integrity() {
	let data = archive(3);
	let verified = (20 + 3 * 264) / 17 * 17;

	for position in [0, 17, 20, 100, 300, verified - 1] {
		let mut tampered = data.clone();
		tampered[position] ^= 0x80;
		assert!(load(&tampered).is_err(), "byte {position} was not verified");
	}
}

#[test]
fn test_bad_image_aborts_archive() {
	let data = ArchiveBuilder::new()
		.image("ok.img", ImageBuilder::new(2).build())
		.image("bad.img", b"Neople Img File\0".to_vec())
		.build();

	match load(&data) {
		Err(NpkError::Image {
			index,
			name,
			source,
		}) => {
			assert_eq!(index, 1);
			assert_eq!(name, "bad.img");
			assert!(matches!(
				*source,
				NpkError::InsufficientData {
					section: Section::ImageHeader,
					..
				}
			));
		}
		other => panic!("unexpected result: {other:?}"),
	}
}

#[test]
fn test_unsupported_version_loads_empty() {
	let data = ArchiveBuilder::new()
		.image("future.img", ImageBuilder::new(9).bitmap(ARGB8888, 1, 1, vec![0; 4]).build())
		.build();

	let file = load(&data).unwrap();
	let image = file.image(0).unwrap();
	assert_eq!(image.version(), 9);
	assert_eq!(image.frame_count(), 0);
	assert!(image.frame(0).is_none());
}

#[test]
fn test_parallel_decode() {
	let data = (0..8)
		.fold(ArchiveBuilder::new(), |builder, i| {
			let blob = ImageBuilder::new(2)
				.compressed_bitmap(ARGB8888, 16, 16, &gradient(16, 16))
				.link(0)
				.build();
			builder.image(&format!("img{i}.img"), blob)
		})
		.build();
	let file = load(&data).unwrap();

	let decoded: Vec<_> = std::thread::scope(|scope| {
		let handles: Vec<_> = (0..file.image_count())
			.map(|i| {
				let file = &file;
				scope.spawn(move || file.decode_frame(i, 1, 0))
			})
			.collect();
		handles.into_iter().map(|handle| handle.join().unwrap()).collect()
	});

	for canvas in decoded {
		let canvas = canvas.unwrap();
		assert_eq!((canvas.width(), canvas.height()), (16, 16));
		assert_eq!(canvas.pixel(3, 5).unwrap().to_array(), [8, 5, 3, 255]);
	}
}
