// SPDX-License-Identifier: MIT

//! Model artifact discovery
//!
//! Scans a local directory for gguf weight files. Candidates are sorted
//! lexicographically before selection so the pick is deterministic across
//! platforms.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Find the model artifact to load, if any.
///
/// A missing directory or an empty scan is not an error; the gateway
/// degrades to fallback processing in that case.
pub fn find_artifact(models_dir: &Path, name_hint: Option<&str>) -> Option<PathBuf> {
    if !models_dir.exists() {
        debug!("Models directory not found: {:?}", models_dir);
        return None;
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(models_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("gguf"))
                .unwrap_or(false)
        })
        .collect();

    if candidates.is_empty() {
        debug!("No gguf artifacts in {:?}", models_dir);
        return None;
    }

    candidates.sort();

    if let Some(hint) = name_hint {
        let hint = hint.to_lowercase();
        if let Some(preferred) = candidates.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.to_lowercase().contains(&hint))
                .unwrap_or(false)
        }) {
            info!("Selected artifact by hint '{}': {:?}", hint, preferred);
            return Some(preferred.clone());
        }
    }

    let selected = candidates.into_iter().next();
    if let Some(ref path) = selected {
        info!("Selected artifact: {:?}", path);
    }
    selected
}

/// Runtime model name derived from an artifact path (lowercased file stem)
pub fn model_name_for(artifact: &Path) -> String {
    artifact
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("local-model")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn missing_directory_yields_none() {
        assert!(find_artifact(Path::new("/nonexistent/models"), None).is_none());
    }

    #[test]
    fn empty_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.txt");
        assert!(find_artifact(dir.path(), None).is_none());
    }

    #[test]
    fn picks_first_candidate_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zephyr-7b.Q4_0.gguf");
        touch(dir.path(), "mistral-7b.Q4_0.gguf");

        let artifact = find_artifact(dir.path(), None).unwrap();
        assert_eq!(
            artifact.file_name().unwrap().to_str().unwrap(),
            "mistral-7b.Q4_0.gguf"
        );
    }

    #[test]
    fn prefers_hint_match_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "mistral-7b.Q4_0.gguf");
        touch(dir.path(), "zephyr-7b.Q4_0.gguf");

        let artifact = find_artifact(dir.path(), Some("ZEPHYR")).unwrap();
        assert_eq!(
            artifact.file_name().unwrap().to_str().unwrap(),
            "zephyr-7b.Q4_0.gguf"
        );
    }

    #[test]
    fn unmatched_hint_falls_back_to_first_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "mistral-7b.Q4_0.gguf");
        touch(dir.path(), "zephyr-7b.Q4_0.gguf");

        let artifact = find_artifact(dir.path(), Some("llama")).unwrap();
        assert_eq!(
            artifact.file_name().unwrap().to_str().unwrap(),
            "mistral-7b.Q4_0.gguf"
        );
    }

    #[test]
    fn model_name_is_lowercased_stem() {
        assert_eq!(
            model_name_for(Path::new("/models/Mistral-7B.Q4_0.gguf")),
            "mistral-7b.q4_0"
        );
    }
}
