use std::path::Path;

const MAX_FILENAME_CHARS: usize = 120;
const MAX_DUPLICATES: u32 = 9999;
const FALLBACK_NAME: &str = "artifact";

/// Local, Windows-safe file name for a backend artifact path.
///
/// Only the last path component is kept; directories on the backend side do
/// not map onto the local output directory.
pub fn local_filename(artifact_path: &str) -> String {
    let base = artifact_path
        .rsplit(['/', '\\'])
        .find(|part| !part.trim().is_empty())
        .unwrap_or_default();

    let replaced: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(&['_', ' ', '.'][..]);
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        return FALLBACK_NAME.to_string();
    }

    let mut name: String = trimmed.chars().take(MAX_FILENAME_CHARS).collect();
    let stem = name.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        name.insert(stem.len(), '_');
    }
    name
}

/// `filename`, or `stem (n).ext` with the first `n` not yet taken in `dir`.
pub fn available_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(dot) if dot > 0 => filename.split_at(dot),
        _ => (filename, ""),
    };
    let mut candidate = filename.to_string();
    for n in 1..=MAX_DUPLICATES {
        candidate = format!("{stem} ({n}){ext}");
        if !dir.join(&candidate).exists() {
            break;
        }
    }
    candidate
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
