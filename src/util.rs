/// Longest file name, in bytes, common file systems accept.
pub(crate) const MAX_FILE_NAME_BYTES: usize = 255;

/// Turns an object name into a file stem of at most `max_bytes` bytes.
///
/// Separators and characters file systems reject are removed, so the stem
/// always stays inside the directory it is joined to. `None` when nothing
/// usable is left.
pub(crate) fn file_stem(name: &str, max_bytes: usize) -> Option<String> {
    let mut stem = sanitize_filename::sanitize(name);
    if stem.len() > max_bytes {
        let mut end = max_bytes;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem.truncate(end);
    }
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        None
    } else {
        Some(stem)
    }
}
