//! Name and content predicates.
//!
//! Both matchers compile their pattern once, up front; a malformed pattern is
//! reported as a [`regex::Error`] before any file is touched. Once compiled,
//! matching never fails: a file whose content cannot be read simply does not
//! match.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::bytes::{Regex as BytesRegex, RegexBuilder as BytesRegexBuilder};
use regex::{Regex, RegexBuilder};

use super::FilePredicate;

/// Matches a regular expression anywhere in a file's base name.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    regex: Regex,
}

impl NameMatcher {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the compile error for a malformed pattern.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self { regex })
    }

    /// Test a bare file name.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl FilePredicate for NameMatcher {
    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.is_match(&name.to_string_lossy()))
    }
}

/// Matches files containing at least one line that matches a regular
/// expression.
///
/// Lines are read as raw bytes, so files that are not valid UTF-8 are still
/// searched. The line terminator (`\n` or `\r\n`) is removed before matching.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    regex: BytesRegex,
}

impl ContentMatcher {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the compile error for a malformed pattern.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = BytesRegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self { regex })
    }

    /// Scan `reader` line by line, stopping at the first matching line.
    ///
    /// # Errors
    ///
    /// Propagates the first read error.
    pub fn search_reader<R: BufRead>(&self, mut reader: R) -> std::io::Result<bool> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(false);
            }
            if self.regex.is_match(trim_line_end(&line)) {
                return Ok(true);
            }
        }
    }
}

impl FilePredicate for ContentMatcher {
    fn matches(&self, path: &Path) -> bool {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!("Cannot open {} for content search: {}", path.display(), e);
                return false;
            }
        };

        match self.search_reader(BufReader::new(file)) {
            Ok(found) => found,
            Err(e) => {
                log::debug!("Read failed in {}, treating as no match: {}", path.display(), e);
                false
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{self, Cursor, Read};
    use tempfile::TempDir;

    #[test]
    fn test_name_matcher_searches_base_name_only() {
        let matcher = NameMatcher::new(r"file.*\.txt", true).unwrap();

        assert!(matcher.matches(Path::new("/data/file1.txt")));
        assert!(matcher.matches(Path::new("/data/my_file_v2.txt.bak")));
        assert!(!matcher.matches(Path::new("/file_dir/other.md")));
        assert!(!matcher.matches(Path::new("/file.txt/inner.md")));
    }

    #[test]
    fn test_name_matcher_case_sensitivity() {
        let sensitive = NameMatcher::new("readme", true).unwrap();
        assert!(!sensitive.matches(Path::new("README.md")));

        let insensitive = NameMatcher::new("readme", false).unwrap();
        assert!(insensitive.matches(Path::new("README.md")));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(NameMatcher::new("file(", true).is_err());
        assert!(ContentMatcher::new("[unclosed", true).is_err());
    }

    #[test]
    fn test_content_matcher_finds_line() {
        let dir = TempDir::new().unwrap();
        let hit = dir.path().join("hit.txt");
        let miss = dir.path().join("miss.txt");
        fs::write(&hit, "first line\nthis is a test\nlast line\n").unwrap();
        fs::write(&miss, "nothing to see\n").unwrap();

        let matcher = ContentMatcher::new("test", true).unwrap();
        assert!(matcher.matches(&hit));
        assert!(!matcher.matches(&miss));
    }

    #[test]
    fn test_content_matcher_case_insensitive() {
        let matcher = ContentMatcher::new("todo", false).unwrap();
        assert!(matcher
            .search_reader(Cursor::new(b"// TODO: fix".to_vec()))
            .unwrap());
    }

    #[test]
    fn test_content_matcher_anchors_per_line() {
        let matcher = ContentMatcher::new("^end$", true).unwrap();
        assert!(matcher
            .search_reader(Cursor::new(b"start\r\nend\r\n".to_vec()))
            .unwrap());
        assert!(!matcher
            .search_reader(Cursor::new(b"start end\n".to_vec()))
            .unwrap());
    }

    #[test]
    fn test_content_matcher_handles_binary() {
        let matcher = ContentMatcher::new("needle", true).unwrap();
        let mut data = vec![0xff, 0xfe, 0x00, b'\n'];
        data.extend_from_slice(b"hay needle hay");
        assert!(matcher.search_reader(Cursor::new(data)).unwrap());
    }

    #[test]
    fn test_content_matcher_stops_at_first_match() {
        /// Yields one matching line, then fails if read again.
        struct OneLineThenFail {
            served: bool,
        }
        impl Read for OneLineThenFail {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.served {
                    return Err(io::Error::other("read past first match"));
                }
                self.served = true;
                let line = b"match here\n";
                buf[..line.len()].copy_from_slice(line);
                Ok(line.len())
            }
        }

        let matcher = ContentMatcher::new("match", true).unwrap();
        let reader = BufReader::new(OneLineThenFail { served: false });
        assert!(matcher.search_reader(reader).unwrap());
    }

    #[test]
    fn test_content_matcher_missing_file_is_no_match() {
        let matcher = ContentMatcher::new(".*", true).unwrap();
        assert!(!matcher.matches(Path::new("/nonexistent/file/12345")));
    }

    #[test]
    fn test_content_matcher_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, "").unwrap();

        // No lines at all, so even an always-matching pattern fails.
        let matcher = ContentMatcher::new("", true).unwrap();
        assert!(!matcher.matches(&path));
    }
}
