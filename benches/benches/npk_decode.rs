//! Benchmark suite for NPK archive loading and frame decoding
//!
//! This benchmark measures DXT block decompression, pixel unpacking and
//! archive loading on synthetic data, and helps identify hot paths in the
//! decoders.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use npk_benches::{ARGB1555, ARGB8888, ArchiveBuilder, ImageBuilder, dds_container, dxt_blocks, gradient, sizes};
use npk_types::file::canvas::ClipRect;
use npk_types::file::codec::{Sha256Hash, ZlibInflate};
use npk_types::file::dxt::{BlockFormat, decode_blocks};
use npk_types::file::npk::Loader;
use std::hint::black_box;

/// Benchmark raw block decoding for every block format
fn bench_dxt_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("dxt_decode");

	for format in [BlockFormat::Dxt1, BlockFormat::Dxt3, BlockFormat::Dxt5] {
		for (width, height) in [sizes::TINY, sizes::SMALL, sizes::MEDIUM] {
			let data = dxt_blocks(width, height, format);
			group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));
			group.bench_with_input(
				BenchmarkId::new(format.to_string(), format!("{width}x{height}")),
				&data,
				|b, data| {
					b.iter(|| {
						let result = decode_blocks(black_box(data), width, height, format);
						black_box(result)
					});
				},
			);
		}
	}

	group.finish();
}

/// Benchmark matrix frame unpacking, stored and compressed
fn bench_matrix_frames(c: &mut Criterion) {
	let mut group = c.benchmark_group("matrix_frame");
	let (width, height) = sizes::SMALL;
	let raw = gradient(width, height);
	let raw16: Vec<u8> = raw.chunks_exact(2).map(|pair| pair[0]).collect();

	let blob = ImageBuilder::new(2)
		.bitmap(ARGB8888, width, height, raw.clone())
		.compressed_bitmap(ARGB8888, width, height, &raw)
		.bitmap(ARGB1555, width, height, raw16)
		.build();
	let archive = Loader::new(Sha256Hash, ZlibInflate)
		.load_bytes(&ArchiveBuilder::new().image("sprite/bench/matrix.img", blob).build())
		.expect("synthetic archive should load");

	group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));
	for (frame, label) in [(0, "argb8888_stored"), (1, "argb8888_zlib"), (2, "argb1555_stored")] {
		group.bench_function(label, |b| {
			b.iter(|| {
				let result = archive.decode_frame(0, black_box(frame), 0);
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark sub-texture decoding plus clipping
fn bench_sub_texture_clip(c: &mut Criterion) {
	let mut group = c.benchmark_group("sub_texture");

	let (width, height) = sizes::LARGE;
	let container = dds_container(width, height, BlockFormat::Dxt5, &dxt_blocks(width, height, BlockFormat::Dxt5));
	let blob = ImageBuilder::new(5)
		.texture(&container)
		.texture_ref(0, ClipRect::new(128, 128, 640, 512))
		.build();
	let archive = Loader::new(Sha256Hash, ZlibInflate)
		.load_bytes(&ArchiveBuilder::new().image("sprite/bench/atlas.img", blob).build())
		.expect("synthetic archive should load");

	group.throughput(Throughput::Bytes(container.len() as u64));
	group.sample_size(30); // Full atlas inflate per iteration

	group.bench_function("clipped_frame", |b| {
		b.iter(|| {
			let result = archive.decode_frame(0, black_box(0), 0);
			black_box(result)
		});
	});

	group.finish();
}

/// Benchmark archive loading: digest verification and directory parsing
fn bench_archive_load(c: &mut Criterion) {
	let mut group = c.benchmark_group("archive_load");
	let loader = Loader::new(Sha256Hash, ZlibInflate);

	for count in [16usize, 256, 1024] {
		let builder = (0..count).fold(ArchiveBuilder::new(), |builder, i| {
			let blob = ImageBuilder::new(2)
				.bitmap(ARGB8888, 4, 4, gradient(4, 4))
				.link(0)
				.build();
			builder.image(&format!("sprite/bench/image{i:04}.img"), blob)
		});
		let data = builder.build();

		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("images", count), &data, |b, data| {
			b.iter(|| {
				let result = loader.load_bytes(black_box(data));
				black_box(result)
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_dxt_decode, bench_matrix_frames, bench_sub_texture_clip, bench_archive_load,);

criterion_main!(benches);
