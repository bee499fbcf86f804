// SPDX-License-Identifier: MIT

//! End-to-end generation pipeline: expand, summarize, emit

use std::path::PathBuf;
use tracing::info;

use crate::gateway::Gateway;
use crate::report::{ReportGenerator, ReportPaths};
use crate::{DaylogError, Result};

/// Run the full pipeline for one day's notes.
///
/// Validation failures (empty notes or name) are the only errors the AI
/// stage can surface; generation itself always produces text, degraded or
/// not. Emitter errors are filesystem or rendering problems.
pub async fn run(
    gateway: &Gateway,
    reporter: &ReportGenerator,
    notes: &str,
    images: &[PathBuf],
    name: &str,
) -> Result<ReportPaths> {
    if notes.trim().is_empty() {
        return Err(DaylogError::Input("No notes provided".to_string()));
    }
    if name.trim().is_empty() {
        return Err(DaylogError::Input("No report name provided".to_string()));
    }

    info!("Pipeline started: report '{}', {} image(s)", name, images.len());

    let detailed = gateway.expand_detailed(notes, None).await;
    // The summary condenses the expanded text, not the raw notes
    let summary = gateway.summarize(&detailed, None).await;

    let paths = reporter.generate_detailed_report(notes, &detailed, images, &summary, name)?;

    info!("Pipeline finished: {:?}", paths.markdown);
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::tempdir;

    async fn fixtures(dir: &std::path::Path) -> (Gateway, ReportGenerator) {
        let mut config = AppConfig::default();
        config.models_dir = "/nonexistent/models".to_string();
        config.runtime.url = "http://127.0.0.1:9".to_string();
        config.runtime.timeout_secs = 1;

        let gateway = Gateway::initialize(&config).await;
        let reporter =
            ReportGenerator::new(&dir.join("reports"), &dir.join("fonts")).unwrap();
        (gateway, reporter)
    }

    #[tokio::test]
    async fn empty_notes_are_rejected() {
        let dir = tempdir().unwrap();
        let (gateway, reporter) = fixtures(dir.path()).await;

        let result = run(&gateway, &reporter, "   ", &[], "log").await;
        assert!(matches!(result, Err(DaylogError::Input(_))));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let dir = tempdir().unwrap();
        let (gateway, reporter) = fixtures(dir.path()).await;

        let result = run(&gateway, &reporter, "Fixed the bug", &[], "").await;
        assert!(matches!(result, Err(DaylogError::Input(_))));
    }

    #[tokio::test]
    async fn degraded_pipeline_still_emits_markdown() {
        let dir = tempdir().unwrap();
        let (gateway, reporter) = fixtures(dir.path()).await;

        let paths = run(&gateway, &reporter, "Fixed the bug\nCalled the client", &[], "log")
            .await
            .unwrap();

        assert!(paths.markdown.exists());
        let content = std::fs::read_to_string(&paths.markdown).unwrap();
        assert!(content.contains("## Original Notes"));
        assert!(content.contains("**Activity 1:** Fixed the bug."));
        assert!(content.contains("## Summary"));
    }
}
