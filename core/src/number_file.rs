//! The on-disk number file: generation, loading and the availability check.
//!
//! The format is plain decimal text, one value per line, every line
//! newline-terminated. There is no header, footer or checksum.
//!
//! Generation writes to a sibling `<name>.tmp` file and renames it over the
//! target once every value is flushed, so a failed or interrupted run never
//! leaves a truncated file for the loader to accept.

use crate::constants::{NUM_COUNT, TEMP_SUFFIX};
use crate::error::{SearchError, SearchResult};
use crate::number_set::NumberSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Typed answer to "can the loader read the number file right now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Available,
    Missing,
    /// The path exists but cannot be inspected, or is not a regular file.
    Unknown,
}

impl FileStatus {
    pub fn is_available(self) -> bool {
        self == FileStatus::Available
    }
}

pub fn file_status(path: &Path) -> FileStatus {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => FileStatus::Available,
        Ok(_) => FileStatus::Unknown,
        Err(e) if e.kind() == io::ErrorKind::NotFound => FileStatus::Missing,
        Err(e) => {
            log::debug!("Cannot stat {}: {e}", path.display());
            FileStatus::Unknown
        }
    }
}

/// What a generation run should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSpec {
    pub count: usize,
    pub range: RangeInclusive<i64>,
    pub seed: Option<u64>,
}

impl GenerationSpec {
    fn validate(&self) -> SearchResult<()> {
        if self.range.start() > self.range.end() {
            return Err(SearchError::Config(format!(
                "minimum {} is greater than maximum {}",
                self.range.start(),
                self.range.end()
            )));
        }
        Ok(())
    }
}

/// Write `spec.count` uniformly drawn values to `path`, replacing any
/// existing file. Seeds from `spec.seed` when set, otherwise from OS entropy.
///
/// Returns the number of values written.
pub fn generate(path: &Path, spec: &GenerationSpec) -> SearchResult<usize> {
    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with_rng(path, spec, &mut rng)
}

pub fn generate_with_rng<R: Rng>(
    path: &Path,
    spec: &GenerationSpec,
    rng: &mut R,
) -> SearchResult<usize> {
    spec.validate()?;
    let range = spec.range.clone();
    let values = (0..spec.count).map(|_| rng.gen_range(range.clone()));
    write_numbers(path, values)
}

/// Write an explicit sequence of values to `path`, replacing any existing
/// file only once the whole sequence has been written.
pub fn write_numbers<I>(path: &Path, values: I) -> SearchResult<usize>
where
    I: IntoIterator<Item = i64>,
{
    let temp = temp_path(path);

    match write_to(&temp, values) {
        Ok(written) => {
            fs::rename(&temp, path).map_err(|e| {
                discard_temp(&temp);
                SearchError::file_access(path, e)
            })?;
            Ok(written)
        }
        Err(e) => {
            discard_temp(&temp);
            Err(SearchError::file_access(path, e))
        }
    }
}

fn write_to<I>(temp: &Path, values: I) -> io::Result<usize>
where
    I: IntoIterator<Item = i64>,
{
    let mut writer = BufWriter::new(File::create(temp)?);
    let mut written = 0usize;
    for value in values {
        writeln!(writer, "{value}")?;
        written += 1;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(written)
}

fn discard_temp(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Could not remove {}: {e}", temp.display());
        }
    }
}

/// `numeros.txt` -> `numeros.txt.tmp`, in the same directory so the final
/// rename stays on one filesystem.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Read `path` into a [`NumberSet`].
///
/// The first line that is not a base-10 integer aborts the whole load. Bytes
/// that are not UTF-8 count as a malformed line, not as an access failure.
pub fn load(path: &Path) -> SearchResult<NumberSet> {
    let file = File::open(path).map_err(|e| SearchError::file_access(path, e))?;
    let capacity = file
        .metadata()
        .map(|meta| estimated_lines(meta.len()))
        .unwrap_or(0);
    read_numbers(BufReader::new(file), capacity).map_err(|e| match e {
        ReadError::Io(source) => SearchError::file_access(path, source),
        ReadError::Parse { line, text } => SearchError::Parse { line, text },
    })
}

/// Longest line the loader will buffer. Any valid value fits many times over.
const MAX_LINE_BYTES: u64 = 256;

enum ReadError {
    Io(io::Error),
    Parse { line: usize, text: String },
}

fn read_numbers<R: BufRead>(mut reader: R, capacity: usize) -> Result<NumberSet, ReadError> {
    let mut set = NumberSet::with_capacity(capacity);
    let mut buf = Vec::new();
    let mut line = 0usize;
    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES)
            .read_until(b'\n', &mut buf)
            .map_err(ReadError::Io)?;
        if read == 0 {
            break;
        }
        line += 1;

        let malformed = |bytes: &[u8]| ReadError::Parse {
            line,
            text: String::from_utf8_lossy(bytes).trim().to_string(),
        };
        if buf.last() != Some(&b'\n') && read as u64 == MAX_LINE_BYTES {
            return Err(malformed(&buf));
        }
        let text = std::str::from_utf8(&buf).map_err(|_| malformed(&buf))?;
        let trimmed = text.trim();
        let value = trimmed.parse::<i64>().map_err(|_| malformed(&buf))?;
        set.insert(value);
    }
    Ok(set)
}

/// Generated lines average about nine bytes. Capped at a default-sized file.
fn estimated_lines(bytes: u64) -> usize {
    usize::try_from(bytes / 9).unwrap_or(usize::MAX).min(NUM_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn spec(count: usize, range: RangeInclusive<i64>) -> GenerationSpec {
        GenerationSpec {
            count,
            range,
            seed: Some(7),
        }
    }

    #[test]
    fn write_numbers_produces_newline_terminated_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");

        let written = write_numbers(&path, [3, 1, 4, 1, 5]).unwrap();

        assert_eq!(written, 5);
        assert_eq!(fs::read_to_string(&path).unwrap(), "3\n1\n4\n1\n5\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn generate_writes_exactly_count_values_in_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");

        let written = generate(&path, &spec(2_000, -10..=10)).unwrap();

        assert_eq!(written, 2_000);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        let values: Vec<i64> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values.len(), 2_000);
        assert!(values.iter().all(|v| (-10..=10).contains(v)));
    }

    #[test]
    fn generate_reaches_both_bounds_of_a_narrow_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");

        generate(&path, &spec(500, 1..=5)).unwrap();

        let set = load(&path).unwrap();
        assert_eq!(set.to_sorted_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn same_seed_produces_same_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        generate(&a, &spec(100, -1_000..=1_000)).unwrap();
        generate(&b, &spec(100, -1_000..=1_000)).unwrap();

        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn generate_replaces_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        fs::write(&path, "not a number\n".repeat(50)).unwrap();

        generate(&path, &spec(3, 0..=0)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "0\n0\n0\n");
    }

    #[test]
    fn single_value_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");

        generate(&path, &spec(4, 9..=9)).unwrap();

        assert_eq!(load(&path).unwrap().to_sorted_vec(), vec![9]);
    }

    #[test]
    fn inverted_range_is_rejected_before_touching_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");

        let err = generate(&path, &spec(3, 5..=1)).unwrap_err();

        assert!(matches!(err, SearchError::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn failed_generation_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        fs::write(&path, "1\n2\n").unwrap();
        // A directory where the scratch file should go makes the create fail.
        fs::create_dir(temp_path(&path)).unwrap();

        let err = generate(&path, &spec(10, 0..=100)).unwrap_err();

        assert!(matches!(err, SearchError::FileAccess { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n2\n");
    }

    #[test]
    fn generate_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("numeros.txt");

        let err = generate(&path, &spec(10, 0..=100)).unwrap_err();

        assert!(matches!(err, SearchError::FileAccess { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn load_deduplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        write_numbers(&path, [3, 1, 4, 1, 5]).unwrap();

        let set = load(&path).unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.to_sorted_vec(), vec![1, 3, 4, 5]);
        assert_eq!(set.source_lines(), 5);
    }

    #[test]
    fn load_twice_yields_equal_sets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        generate(&path, &spec(1_000, -100..=100)).unwrap();

        assert_eq!(load(&path).unwrap(), load(&path).unwrap());
    }

    #[test]
    fn load_missing_file_is_file_access_error() {
        let dir = tempdir().unwrap();
        let err = load(&dir.path().join("numeros.txt")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn load_stops_at_first_malformed_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        fs::write(&path, "1\n2\nx3\n4\n").unwrap();

        match load(&path).unwrap_err() {
            SearchError::Parse { line, text } => {
                assert_eq!(line, 3);
                assert_eq!(text, "x3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        fs::write(&path, b"1\n2\n\xff\xfe\n4\n").unwrap();

        match load(&path).unwrap_err() {
            SearchError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn oversized_file_fails_on_its_first_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        File::create(&path).unwrap().set_len(1 << 36).unwrap();

        match load(&path).unwrap_err() {
            SearchError::Parse { line, text } => {
                assert_eq!(line, 1);
                assert!(text.len() <= MAX_LINE_BYTES as usize);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn capacity_estimate_is_bounded() {
        assert_eq!(estimated_lines(90), 10);
        assert_eq!(estimated_lines(1 << 40), NUM_COUNT);
        assert_eq!(estimated_lines(u64::MAX), NUM_COUNT);
    }

    #[test]
    fn long_line_is_malformed() {
        let long = "1".repeat(MAX_LINE_BYTES as usize * 2);
        let err = read_numbers(Cursor::new(format!("5\n{long}\n")), 0).err().unwrap();
        assert!(matches!(err, ReadError::Parse { line: 2, .. }));
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let set = read_numbers(Cursor::new("1\n2"), 0).ok().unwrap();
        assert_eq!(set.to_sorted_vec(), vec![1, 2]);
    }

    #[test]
    fn blank_line_is_malformed() {
        let err = read_numbers(Cursor::new("1\n\n2\n"), 0).err().unwrap();
        assert!(matches!(err, ReadError::Parse { line: 2, .. }));
    }

    #[test]
    fn surrounding_whitespace_and_crlf_are_accepted() {
        let set = read_numbers(Cursor::new(" 7 \r\n+8\r\n-9\n"), 0).ok().unwrap();
        assert_eq!(set.to_sorted_vec(), vec![-9, 7, 8]);
    }

    #[test]
    fn empty_file_loads_as_empty_set() {
        let set = read_numbers(Cursor::new(""), 0).ok().unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn file_status_reports_availability() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numeros.txt");
        assert_eq!(file_status(&path), FileStatus::Missing);

        write_numbers(&path, [1]).unwrap();
        assert_eq!(file_status(&path), FileStatus::Available);

        assert_eq!(file_status(dir.path()), FileStatus::Unknown);
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let path = Path::new("/data/numeros.txt");
        assert_eq!(temp_path(path), PathBuf::from("/data/numeros.txt.tmp"));
    }
}
