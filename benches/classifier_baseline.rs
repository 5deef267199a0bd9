use criterion::{black_box, criterion_group, criterion_main, Criterion};
use file_sorter::{sort_file, CategoryTable};
use std::path::PathBuf;
use tempfile::TempDir;

fn bench_classify(c: &mut Criterion) {
	let table = CategoryTable::default();
	let paths: Vec<PathBuf> = ["photo.JPG", "report.pdf", "song.flac", "setup.exe", "notes.xyz"]
		.iter()
		.map(|name| PathBuf::from("/in").join(name))
		.collect();

	c.bench_function("classify_path", |b| {
		b.iter(|| {
			for path in &paths {
				black_box(table.classify_path(black_box(path)));
			}
		})
	});
}

fn bench_sort_file(c: &mut Criterion) {
	let table = CategoryTable::default();

	c.bench_function("sort_single_file", |b| {
		b.iter(|| {
			let temp_dir = TempDir::new().unwrap();
			let source = temp_dir.path().join("photo.png");
			std::fs::write(&source, "pixels").unwrap();

			sort_file(black_box(&source), &temp_dir.path().join("out"), &table).unwrap();
		})
	});
}

criterion_group!(benches, bench_classify, bench_sort_file);
criterion_main!(benches);
