//! Integration tests for duplicate detection.

use seekfs::digest::Md5;
use seekfs::duplicates::DuplicateFinder;
use seekfs::scanner::{SearchConfig, Walker};
use seekfs::searcher::FileSearcher;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_same_name_same_content_in_two_directories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "dir1/dup.txt", b"duplicate content");
    write(dir.path(), "dir2/dup.txt", b"duplicate content");

    let groups = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates()
        .unwrap();

    assert_eq!(groups.len(), 1);
    let (digest, paths) = groups.iter().next().unwrap();
    assert_eq!(*digest, Md5::digest(b"duplicate content").to_hex());
    assert_eq!(paths.len(), 2);
}

#[test]
fn test_same_content_different_names_not_grouped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"duplicate content");
    write(dir.path(), "b.txt", b"duplicate content");

    let groups = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates()
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn test_different_sizes_never_share_group() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "x/data.bin", b"1234");
    write(dir.path(), "y/data.bin", b"12345");
    write(dir.path(), "z/data.bin", b"1234");

    let groups = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates()
        .unwrap();

    assert_eq!(groups.len(), 1);
    let paths = groups.values().next().unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| fs::metadata(p).unwrap().len() == 4));
}

#[test]
fn test_group_order_follows_scan_order() {
    let dir = TempDir::new().unwrap();
    for sub in ["a", "b", "c"] {
        write(dir.path(), &format!("{sub}/same.log"), b"log line");
    }

    let config = SearchConfig::new(dir.path());
    let scanned: Vec<String> = Walker::new(&config)
        .walk()
        .unwrap()
        .iter()
        .map(|f| f.path_string())
        .collect();

    let groups = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates()
        .unwrap();

    assert_eq!(groups.values().next().unwrap(), &scanned);
}

#[test]
fn test_empty_files_with_same_name_are_duplicates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/__init__.py", b"");
    write(dir.path(), "b/__init__.py", b"");

    let groups = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates()
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups.contains_key("d41d8cd98f00b204e9800998ecf8427e"));
}

#[test]
fn test_filters_apply_to_duplicates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/big.dat", &[7u8; 2048]);
    write(dir.path(), "b/big.dat", &[7u8; 2048]);
    write(dir.path(), "a/note.txt", b"hi");
    write(dir.path(), "b/note.txt", b"hi");

    let mut searcher = FileSearcher::new(dir.path(), 4).unwrap();
    searcher.set_max_file_size(1024).unwrap();
    let groups = searcher.find_duplicates().unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups.values().next().unwrap()[0].ends_with("note.txt"));

    let mut searcher = FileSearcher::new(dir.path(), 4).unwrap();
    searcher.set_allowed_extensions(["dat"]);
    let groups = searcher.find_duplicates().unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups.values().next().unwrap()[0].ends_with("big.dat"));
}

#[test]
fn test_stats_report_counts() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/x.txt", b"same");
    write(dir.path(), "b/x.txt", b"same");
    write(dir.path(), "c/x.txt", b"diff");
    write(dir.path(), "unique.txt", b"alone");

    let (groups, stats) = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates_with_stats()
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(stats.grouping.total_files, 4);
    assert_eq!(stats.grouping.eliminated_unique, 1);
    assert_eq!(stats.hashed_files, 3);
    assert_eq!(stats.failed_files, 0);
    assert_eq!(stats.duplicate_groups, 1);
    assert_eq!(stats.duplicate_files, 2);
}

#[test]
fn test_finder_on_prescanned_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "1/a.bin", &[1, 2, 3]);
    write(dir.path(), "2/a.bin", &[1, 2, 3]);

    let config = SearchConfig::new(dir.path());
    let files = Walker::new(&config).walk().unwrap();
    let (groups, _) = DuplicateFinder::with_defaults().find_duplicates_from_files(files);

    assert_eq!(groups.len(), 1);
}

#[test]
fn test_shared_digest_across_name_buckets_is_stable() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/x.txt", b"shared payload");
    write(dir.path(), "b/x.txt", b"shared payload");
    write(dir.path(), "c/y.txt", b"shared payload");
    write(dir.path(), "d/y.txt", b"shared payload");

    let searcher = FileSearcher::new(dir.path(), 4).unwrap();
    let digest = Md5::digest(b"shared payload").to_hex();
    let expected = vec![
        dir.path().join("a/x.txt").to_string_lossy().into_owned(),
        dir.path().join("b/x.txt").to_string_lossy().into_owned(),
    ];

    for _ in 0..50 {
        let (groups, stats) = searcher.find_duplicates_with_stats().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&digest], expected);
        assert_eq!(stats.shadowed_groups, 1);
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_candidate_dropped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/f.txt", b"content");
    write(dir.path(), "b/f.txt", b"content");
    write(dir.path(), "c/f.txt", b"content");
    let locked = dir.path().join("c/f.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&locked).is_ok() {
        // Running with elevated privileges
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let (groups, stats) = FileSearcher::new(dir.path(), 4)
        .unwrap()
        .find_duplicates_with_stats()
        .unwrap();

    assert_eq!(groups.values().next().unwrap().len(), 2);
    assert_eq!(stats.failed_files, 1);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
