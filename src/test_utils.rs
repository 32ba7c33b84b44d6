use std::collections::BTreeSet;
use std::path::Path;

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Create a fake audio file under `library` and return its absolute path.
pub fn create_track(library: &Path, relative: &str) -> String {
    let path = library.join(relative);
    write_file(&path, format!("audio:{relative}").as_bytes());
    path.display().to_string()
}

pub fn track_set<'a>(tracks: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
    tracks.into_iter().cloned().collect()
}
