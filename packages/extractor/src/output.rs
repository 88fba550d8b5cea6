//! JSON-lines output streams.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Writes one JSON object per line.
///
/// Lines go to a hidden temp file next to the target; [`finish`] flushes,
/// syncs and renames it into place, so an interrupted run never leaves a
/// truncated output behind.
///
/// [`finish`]: JsonLinesWriter::finish
pub struct JsonLinesWriter {
    writer: BufWriter<File>,
    temp_path: PathBuf,
    path: PathBuf,
    lines: usize,
}

impl JsonLinesWriter {
    /// Open a writer for `path`, creating parent directories.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
        let file = File::create(&temp_path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            temp_path,
            path: path.to_path_buf(),
            lines: 0,
        })
    }

    /// Serialize `value` as a single line.
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written so far.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush and move the output into place. Returns the final path.
    pub fn finish(self) -> Result<PathBuf> {
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        #[cfg(target_os = "windows")]
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        fs::rename(&self.temp_path, &self.path)?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn test_writes_one_object_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parsed").join("filings.jsonl");

        let mut writer = JsonLinesWriter::create(&path).unwrap();
        writer.write(&serde_json::json!({"object_id": "A", "ein": null})).unwrap();
        writer.write(&serde_json::json!({"object_id": "B", "ein": "123456789"})).unwrap();
        assert_eq!(writer.lines(), 2);
        assert!(!path.exists());

        let written = writer.finish().unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["ein"], "123456789");
        assert!(lines[0]["ein"].is_null());
    }

    #[test]
    fn test_finish_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schedule_m.jsonl");
        fs::write(&path, "stale\n").unwrap();

        let writer = JsonLinesWriter::create(&path).unwrap();
        writer.finish().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert!(!dir.path().join(".schedule_m.jsonl.tmp").exists());
    }
}
