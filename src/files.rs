use std::fs;

/// Paths of the `video*` device nodes in `dir`, sorted.
pub fn video_devices(dir: &str) -> Vec<String> {
    let mut video_files: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("video"))
            .filter_map(|entry| entry.path().to_str().map(str::to_string))
            .collect(),
        Err(e) => {
            log::warn!("Could not read {}: {}", dir, e);
            vec![]
        }
    };

    video_files.sort();
    video_files
}
