use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GencliError, Result};

const STDOUT_DESTINATION: &str = "stdout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn from_flags(save: bool, output: &Path) -> Self {
        if save {
            Self::File(output.to_path_buf())
        } else {
            Self::Stdout
        }
    }
}

/// Prints `text` to `out`, or saves it and prints a confirmation naming the file.
pub fn emit(text: &str, destination: &Destination, out: &mut impl Write) -> Result<()> {
    match destination {
        Destination::Stdout => writeln!(out, "{text}").map_err(|source| GencliError::OutputWrite {
            path: PathBuf::from(STDOUT_DESTINATION),
            source,
        }),
        Destination::File(path) => {
            let write_error = |source| GencliError::OutputWrite {
                path: path.clone(),
                source,
            };

            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(write_error)?;
            }
            fs::write(path, text).map_err(write_error)?;
            debug!(path = %path.display(), bytes = text.len(), "saved response");

            writeln!(out, "Response saved to: {}", path.display()).map_err(write_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::{Destination, emit};
    use crate::error::GencliError;

    #[test]
    fn stdout_destination_prints_text_with_newline() {
        let mut out = Vec::new();
        emit("hello world", &Destination::Stdout, &mut out).expect("emit should succeed");
        assert_eq!(String::from_utf8(out).expect("utf8"), "hello world\n");
    }

    #[test]
    fn from_flags_only_saves_when_requested() {
        let path = PathBuf::from("output.txt");
        assert_eq!(Destination::from_flags(false, &path), Destination::Stdout);
        assert_eq!(Destination::from_flags(true, &path), Destination::File(path));
    }

    #[test]
    fn file_destination_creates_parents_and_confirms() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested/deeper/answer.txt");
        let mut out = Vec::new();

        emit("saved text", &Destination::File(path.clone()), &mut out).expect("emit");

        assert_eq!(fs::read_to_string(&path).expect("read"), "saved text");
        let printed = String::from_utf8(out).expect("utf8");
        assert_eq!(printed, format!("Response saved to: {}\n", path.display()));
    }

    #[test]
    fn file_destination_overwrites_existing_contents() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("answer.txt");
        fs::write(&path, "a much longer previous answer").expect("seed");

        emit("short", &Destination::File(path.clone()), &mut Vec::new()).expect("emit");

        assert_eq!(fs::read_to_string(&path).expect("read"), "short");
    }

    #[test]
    fn unwritable_destination_is_an_output_error() {
        let dir = TempDir::new().expect("temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file").expect("seed");
        let path = blocker.join("answer.txt");

        let err = emit("text", &Destination::File(path), &mut Vec::new())
            .expect_err("writing under a file should fail");
        assert!(matches!(err, GencliError::OutputWrite { .. }), "got {err:?}");
    }
}
