use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::utils::get_utc_iso_datetime;

/// Centralized function to append error messages to an errors log file
///
/// # Arguments
/// * `log_file` - Path of the log file, created when missing
/// * `error_type` - A description of the error type/category (e.g., "Upload Error")
/// * `error_message` - The actual error message content
pub fn write_error_to_log(log_file: &Path, error_type: &str, error_message: &str) {
    let timestamp = get_utc_iso_datetime();
    let log_entry = format!("\n[{}] {}:\n{}\n", timestamp, error_type, error_message);

    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_file) {
        let _ = writeln!(file, "{}", log_entry);
    }
}

/// Replace `path` with `contents` through a sibling temp file and a rename,
/// so readers never observe a half-written file
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)
}
