use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Pretty JSON to `path`, creating missing parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let target = path.display().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("cannot create directory for {target}: {err}"))?;
    }
    let file = File::create(path).map_err(|err| format!("cannot create {target}: {err}"))?;
    emit(BufWriter::new(file), value, &target)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    emit(io::stdout().lock(), value, "stdout")
}

fn emit<W: Write, T: Serialize>(mut sink: W, value: &T, target: &str) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut sink, value)
        .map_err(|err| format!("cannot encode JSON for {target}: {err}"))?;
    sink.write_all(b"\n")
        .and_then(|()| sink.flush())
        .map_err(|err| format!("cannot write {target}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_json_creates_parents_and_terminates_with_newline() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("reports").join("lesson.json");
        write_json(&path, &serde_json::json!({"frames": 3, "lookup": [[0, -1]]}))
            .expect("write report");

        let written = fs::read_to_string(&path).expect("read report");
        assert!(written.ends_with("}\n"));
        let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
        assert_eq!(parsed["frames"], 3);
        assert_eq!(parsed["lookup"][0][1], -1);
    }

    #[test]
    fn write_json_reports_unwritable_target() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = write_json(dir.path(), &1u8).unwrap_err();
        assert!(err.starts_with("cannot create"), "{err}");
    }
}
