//! Loading grid fields and field dictionaries from disk
//!
//! # File format
//!
//! Grid files are plain ASCII: whitespace-separated numbers in the cell order
//! documented in [`crate::grid::grid_field`]. Line breaks carry no meaning, so
//! one-value-per-line pressure exports and three-column velocity exports both
//! load the same way. Lines starting with `#` are ignored.
//!
//! # Dictionary folders
//!
//! A dictionary folder holds one grid file per propeller speed. The speed is
//! the last decimal number in the file stem:
//!
//! ```text
//! pressure_400.txt   -> 400
//! vel_472.5.dat      -> 472.5
//! run3_speed_650.txt -> 650
//! ```
//!
//! Hidden files, sub-directories and files without a number in their stem are
//! skipped.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{DownwashError, Result};
use crate::grid::field_dictionary::FieldDictionary;
use crate::grid::grid_field::{CellValue, GridField};

/// Parse whitespace-separated numbers from grid file contents.
///
/// # Errors
/// Returns [`DownwashError::Parse`] for the first token that is not a number.
pub fn parse_flat(contents: &str, path: &Path) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (line_idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| DownwashError::Parse {
                path: path.to_path_buf(),
                line: line_idx + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Read a flat grid file into a sample sequence.
///
/// # Errors
/// Returns [`DownwashError::Io`] if the file cannot be read and
/// [`DownwashError::Parse`] if it contains a non-numeric token.
pub fn read_flat_file(path: &Path) -> Result<Vec<f64>> {
    let contents = fs::read_to_string(path).map_err(|source| DownwashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_flat(&contents, path)
}

/// Load one grid field from a flat file.
///
/// # Errors
/// Propagates read and parse failures, and returns
/// [`DownwashError::Config`] if the sample count is not a valid cube.
pub fn load_field<T: CellValue>(path: &Path) -> Result<GridField<T>> {
    let values = read_flat_file(path)?;
    let field = GridField::from_flat(&values).map_err(|err| match err {
        DownwashError::Config(message) => {
            DownwashError::Config(format!("{}: {message}", path.display()))
        }
        other => other,
    })?;

    debug!(
        "Loaded {} field {} ({}^3 cells)",
        T::QUANTITY,
        path.display(),
        field.cube_size()
    );
    Ok(field)
}

/// Speed key encoded in a dictionary file name.
///
/// Returns the last decimal number in the file stem, or `None` if there is
/// none.
#[must_use]
pub fn dictionary_key(path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;

    let bytes = stem.as_bytes();
    let mut end = bytes.len();
    while end > 0 && !bytes[end - 1].is_ascii_digit() {
        end -= 1;
    }
    if end == 0 {
        return None;
    }

    let mut start = end;
    let mut seen_dot = false;
    while start > 0 {
        let c = bytes[start - 1];
        if c.is_ascii_digit() {
            start -= 1;
        } else if c == b'.' && !seen_dot && start >= 2 && bytes[start - 2].is_ascii_digit() {
            seen_dot = true;
            start -= 1;
        } else {
            break;
        }
    }

    stem[start..end].parse().ok()
}

fn dictionary_files(dir: &Path) -> Result<Vec<(f64, PathBuf)>> {
    let io_err = |source| DownwashError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }
        match dictionary_key(&path) {
            Some(key) => files.push((key, path)),
            None => warn!("Skipping {}: no speed in file name", path.display()),
        }
    }
    Ok(files)
}

/// Load every grid file in `dir` into a speed-keyed dictionary.
///
/// Files are parsed in parallel.
///
/// # Errors
/// Returns [`DownwashError::Io`] if the folder cannot be listed, any load
/// error of an individual file, and [`DownwashError::Config`] if the folder
/// holds no usable files or the fields disagree on cube size.
pub fn load_dictionary<T: CellValue>(dir: &Path) -> Result<FieldDictionary<T>> {
    let files = dictionary_files(dir)?;
    if files.is_empty() {
        return Err(DownwashError::config(format!(
            "{} dictionary folder {} has no grid files",
            T::QUANTITY,
            dir.display()
        )));
    }

    let entries = files
        .par_iter()
        .map(|(key, path)| load_field::<T>(path).map(|field| (*key, field)))
        .collect::<Result<Vec<_>>>()?;

    let dictionary = FieldDictionary::new(entries)?;
    info!(
        "Loaded {} dictionary {}: {} fields, cube size {}, speeds {:?}",
        T::QUANTITY,
        dir.display(),
        dictionary.len(),
        dictionary.cube_size(),
        dictionary.keys()
    );
    Ok(dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::vec3::Vec3;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn cube_text(n: usize, value: f64) -> String {
        (0..n * n * n)
            .map(|_| format!("{value}\n"))
            .collect::<String>()
    }

    #[test]
    fn test_dictionary_key() {
        assert_eq!(dictionary_key(Path::new("pressure_400.txt")), Some(400.0));
        assert_eq!(dictionary_key(Path::new("vel_472.5.dat")), Some(472.5));
        assert_eq!(dictionary_key(Path::new("dir/run3_speed_650.txt")), Some(650.0));
        assert_eq!(dictionary_key(Path::new("speed650_final.txt")), Some(650.0));
        assert_eq!(dictionary_key(Path::new("readme.txt")), None);
    }

    #[test]
    fn test_parse_flat_ignores_layout_and_comments() {
        let values = parse_flat("# header\n1 2 3\n\n4\t5\n  6  \n", Path::new("x")).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_flat_reports_bad_token() {
        let err = parse_flat("1 2\n3 abc\n", Path::new("bad.txt")).unwrap_err();
        match err {
            DownwashError::Parse { line, token, .. } => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_velocity_field_three_columns() {
        let dir = tempfile::tempdir().unwrap();
        let text = (0..8).map(|_| "0.5 -0.25 -4\n").collect::<String>();
        let path = write_file(dir.path(), "velocity.txt", &text);

        let field = load_field::<Vec3>(&path).unwrap();
        assert_eq!(field.cube_size(), 2);
        assert_eq!(field.sample(1, 0, 1), Vec3::new(0.5, -0.25, -4.0));
    }

    #[test]
    fn test_load_field_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_field::<f64>(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, DownwashError::Io { .. }));
    }

    #[test]
    fn test_load_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "pressure_600.txt", &cube_text(3, 60.0));
        write_file(dir.path(), "pressure_400.txt", &cube_text(3, 40.0));
        write_file(dir.path(), "notes.md", "not a grid");
        write_file(dir.path(), ".pressure_999.txt", "hidden");
        fs::create_dir(dir.path().join("sub_500")).unwrap();

        let dict = load_dictionary::<f64>(dir.path()).unwrap();
        assert_eq!(dict.keys(), &[400.0, 600.0]);
        assert_eq!(dict.cube_size(), 3);
        assert_eq!(dict.field(600.0).unwrap().sample(2, 1, 0), 60.0);
    }

    #[test]
    fn test_load_dictionary_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "p_400.txt", &cube_text(3, 1.0));
        write_file(dir.path(), "p_500.txt", &cube_text(2, 1.0));

        let err = load_dictionary::<f64>(dir.path()).unwrap_err();
        assert!(matches!(err, DownwashError::Config(_)));
    }

    #[test]
    fn test_load_dictionary_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dictionary::<f64>(dir.path()).is_err());
    }
}
