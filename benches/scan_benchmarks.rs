use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seekfs::digest::Md5;
use seekfs::scanner::{Hasher, SearchConfig, Walker};
use seekfs::searcher::FileSearcher;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a test directory with a specific structure
fn setup_test_dir(depth: usize, files_per_dir: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    create_dir_recursive(temp_dir.path().to_path_buf(), depth, files_per_dir);
    temp_dir
}

fn create_dir_recursive(path: PathBuf, depth: usize, files_per_dir: usize) {
    if depth == 0 {
        return;
    }

    if !path.exists() {
        fs::create_dir_all(&path).expect("Failed to create dir");
    }

    for i in 0..files_per_dir {
        let file_path = path.join(format!("file_{}.txt", i));
        let content = format!("line one\nsome content {i} to search through\nTODO: last line\n");
        fs::write(file_path, content).expect("Failed to write file");
    }

    if depth > 1 {
        for i in 0..2 {
            // 2 subdirectories per level
            let sub_dir = path.join(format!("dir_{}", i));
            create_dir_recursive(sub_dir, depth - 1, files_per_dir);
        }
    }
}

// 1. Directory Walking Benchmarks
fn bench_walker(c: &mut Criterion) {
    let temp_dir = setup_test_dir(4, 10); // depth 4, 10 files per dir -> 150 files
    let config = SearchConfig::new(temp_dir.path());

    c.bench_function("walker_150_files", |b| {
        b.iter(|| {
            let files = Walker::new(&config).walk().unwrap();
            black_box(files);
        })
    });
}

// 2. Digest Benchmarks (in memory)
fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("md5");

    for size_kb in [1, 64, 1024] {
        let data = vec![b'a'; size_kb * 1024];
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{size_kb}KB")), &data, |b, data| {
            b.iter(|| black_box(Md5::digest(data)));
        });
    }
    group.finish();
}

// 3. File Hashing Benchmarks
fn bench_hasher(c: &mut Criterion) {
    let mut group = c.benchmark_group("hasher");
    let hasher = Hasher::new();

    for size_kb in [1, 1024, 10240] {
        // 1KB, 1MB, 10MB
        let data = vec![b'a'; size_kb * 1024];
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bench_file.dat");
        fs::write(&file_path, &data).expect("Failed to write bench file");

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(format!("md5_{}KB", size_kb), &file_path, |b, path| {
            b.iter(|| {
                let hash = hasher.full_hash(path).unwrap();
                black_box(hash);
            });
        });
    }
    group.finish();
}

// 4. Search Benchmarks across thread counts
fn bench_search(c: &mut Criterion) {
    let temp_dir = setup_test_dir(5, 10); // ~310 files
    let mut group = c.benchmark_group("content_search");

    for threads in [1, 4, 8] {
        let searcher = FileSearcher::new(temp_dir.path(), threads).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &searcher, |b, searcher| {
            b.iter(|| black_box(searcher.search_by_content("TODO").unwrap()));
        });
    }
    group.finish();
}

// 5. Duplicate Pipeline Benchmark
fn bench_duplicates(c: &mut Criterion) {
    // Same names and content repeat in every directory
    let temp_dir = setup_test_dir(3, 10); // ~70 files
    let searcher = FileSearcher::new(temp_dir.path(), 4).unwrap();

    c.bench_function("find_duplicates_70_files", |b| {
        b.iter(|| black_box(searcher.find_duplicates().unwrap()));
    });
}

criterion_group!(
    benches,
    bench_walker,
    bench_digest,
    bench_hasher,
    bench_search,
    bench_duplicates
);
criterion_main!(benches);
