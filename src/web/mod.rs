// SPDX-License-Identifier: MIT

//! Web UI for daily note capture and report generation

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::gateway::Gateway;
use crate::pipeline;
use crate::report::{ReportGenerator, ReportPaths, IMAGE_EXTENSIONS};

/// Lifecycle of one generation job
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Running,
    Done {
        markdown: String,
        pdf: Option<String>,
    },
    Failed {
        message: String,
    },
}

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Gateway,
    pub reporter: ReportGenerator,
    pub jobs: RwLock<HashMap<Uuid, JobState>>,
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let reports_dir = state.config.reports_dir.clone();

    Router::new()
        // Pages
        .route("/", get(index_page))
        // API endpoints
        .route("/api/generate", post(api_generate))
        .route("/api/jobs/:id", get(api_get_job))
        .route("/api/status", get(api_get_status))
        // Generated artifacts
        .nest_service("/reports", ServeDir::new(reports_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let model_loaded = state.gateway.is_model_loaded();
    let default_name = format!("daily-log-{}", chrono::Local::now().format("%Y-%m-%d"));

    Html(render_index(model_loaded, &default_name))
}

// === API Handlers ===

#[derive(Serialize)]
struct GenerateResponse {
    job_id: Uuid,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message.to_string() })).into_response()
}

async fn api_generate(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let job_id = Uuid::new_v4();

    // Only one pipeline run at a time
    if !admit_job(&state.jobs, job_id).await {
        return error_response(
            StatusCode::CONFLICT,
            "A report is already being generated",
        );
    }

    let mut notes = String::new();
    let mut name = String::new();
    let mut images: Vec<PathBuf> = Vec::new();
    let uploads_dir = PathBuf::from(&state.config.reports_dir)
        .join("uploads")
        .join(job_id.to_string());

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "notes" => notes = field.text().await.unwrap_or_default(),
            "name" => name = field.text().await.unwrap_or_default(),
            "images" => {
                let raw_name = field
                    .file_name()
                    .map(|n| n.to_string())
                    .unwrap_or_default();
                let file_name = match sanitize_file_name(&raw_name) {
                    Some(n) => n,
                    None => {
                        warn!("Skipping upload with unusable filename: {:?}", raw_name);
                        continue;
                    }
                };
                if !has_image_extension(&file_name) {
                    warn!("Skipping upload with unsupported extension: {}", file_name);
                    continue;
                }

                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => {
                        warn!("Failed to read upload '{}': {}", file_name, e);
                        continue;
                    }
                };

                if let Err(e) = std::fs::create_dir_all(&uploads_dir) {
                    error!("Failed to create uploads folder: {}", e);
                    continue;
                }
                let dest = uploads_dir.join(&file_name);
                match std::fs::write(&dest, &data) {
                    Ok(()) => images.push(dest),
                    Err(e) => warn!("Failed to save upload '{}': {}", file_name, e),
                }
            }
            other => warn!("Ignoring unknown form field: {}", other),
        }
    }

    if notes.trim().is_empty() {
        state.jobs.write().await.remove(&job_id);
        return error_response(StatusCode::BAD_REQUEST, "No notes provided");
    }
    if name.trim().is_empty() {
        state.jobs.write().await.remove(&job_id);
        return error_response(StatusCode::BAD_REQUEST, "No report name provided");
    }

    info!("Job {} started: report '{}'", job_id, name);

    let task_state = state.clone();
    tokio::spawn(async move {
        // The pipeline runs in its own task so a panic surfaces as a
        // JoinError instead of leaving the job stuck at Running
        let run_state = task_state.clone();
        let pipeline_task = tokio::spawn(async move {
            pipeline::run(
                &run_state.gateway,
                &run_state.reporter,
                &notes,
                &images,
                &name,
            )
            .await
        });

        let final_state = job_outcome(job_id, pipeline_task.await, &task_state.reporter);

        // Raw uploads are spent once the report has staged its copies
        if uploads_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&uploads_dir) {
                warn!("Failed to remove uploads folder {:?}: {}", uploads_dir, e);
            }
        }

        task_state.jobs.write().await.insert(job_id, final_state);
    });

    (StatusCode::ACCEPTED, Json(GenerateResponse { job_id })).into_response()
}

async fn api_get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match state.jobs.read().await.get(&id) {
        Some(job) => Json(job.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Unknown job"),
    }
}

#[derive(Serialize)]
struct StatusResponse {
    model: crate::gateway::ModelStatus,
    pdf_supported: bool,
    reports_dir: String,
}

async fn api_get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        model: state.gateway.status().clone(),
        pdf_supported: state.reporter.pdf_supported(),
        reports_dir: state.config.reports_dir.clone(),
    })
}

// === Helpers ===

fn has_image_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to its final path component; uploads
/// must not name paths outside the uploads folder
fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

/// Admit a job unless a run is already active.
///
/// Terminal entries from earlier runs are dropped on admission; their
/// artifacts stay on disk under the reports directory.
async fn admit_job(jobs: &RwLock<HashMap<Uuid, JobState>>, job_id: Uuid) -> bool {
    let mut jobs = jobs.write().await;
    if jobs.values().any(|j| matches!(j, JobState::Running)) {
        return false;
    }
    jobs.clear();
    jobs.insert(job_id, JobState::Running);
    true
}

/// Terminal state for a joined pipeline task. A panic must map to Failed,
/// or the single-run gate would stay closed for the rest of the session.
fn job_outcome(
    job_id: Uuid,
    joined: std::result::Result<crate::Result<ReportPaths>, JoinError>,
    reporter: &ReportGenerator,
) -> JobState {
    match joined {
        Ok(Ok(paths)) => JobState::Done {
            markdown: artifact_url(reporter, &paths.markdown),
            pdf: paths.pdf.as_ref().map(|p| artifact_url(reporter, p)),
        },
        Ok(Err(e)) => {
            error!("Job {} failed: {}", job_id, e);
            JobState::Failed { message: e.to_string() }
        }
        Err(e) => {
            error!("Job {} crashed: {}", job_id, e);
            JobState::Failed {
                message: "Report generation crashed unexpectedly".to_string(),
            }
        }
    }
}

/// URL under /reports for an artifact inside the reports directory
fn artifact_url(reporter: &ReportGenerator, path: &std::path::Path) -> String {
    match path.strip_prefix(reporter.reports_dir()) {
        Ok(rel) => format!("/reports/{}", rel.display()),
        Err(_) => format!("/reports/{}", path.display()),
    }
}

// === Template Rendering ===

fn render_index(model_loaded: bool, default_name: &str) -> String {
    let model_badge = if model_loaded {
        r#"<span class="badge badge-ok">AI model loaded</span>"#
    } else {
        r#"<span class="badge badge-warn">Fallback mode (no model)</span>"#
    };

    let accept = IMAGE_EXTENSIONS
        .iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(",");

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Daily Log - Daylog</title>
    <style>
        :root {{
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --bg-card: #0f3460;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --accent-hover: #ff6b6b;
            --success: #00d9a5;
            --warning: #f0a500;
            --border: #2a2a4a;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 900px; margin: 0 auto; padding: 20px; }}
        nav {{
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }}
        nav .logo {{
            font-size: 1.5em;
            font-weight: bold;
            color: var(--accent);
            text-decoration: none;
        }}
        .card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{ margin-bottom: 15px; color: var(--accent); }}
        label {{ display: block; margin-bottom: 6px; color: var(--text-secondary); }}
        textarea, input[type="text"] {{
            width: 100%;
            background: var(--bg-secondary);
            color: var(--text-primary);
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 10px;
            margin-bottom: 15px;
            font-family: inherit;
        }}
        textarea {{ min-height: 180px; resize: vertical; }}
        input[type="file"] {{ margin-bottom: 15px; color: var(--text-secondary); }}
        button {{
            background: var(--accent);
            color: white;
            border: none;
            border-radius: 8px;
            padding: 12px 24px;
            font-size: 1em;
            cursor: pointer;
            transition: background 0.2s;
        }}
        button:hover {{ background: var(--accent-hover); }}
        button:disabled {{ background: var(--border); cursor: wait; }}
        .badge {{
            display: inline-block;
            padding: 4px 10px;
            border-radius: 6px;
            font-size: 0.85em;
        }}
        .badge-ok {{ background: var(--success); color: #06281f; }}
        .badge-warn {{ background: var(--warning); color: #332400; }}
        #status {{ margin-top: 15px; color: var(--text-secondary); }}
        #status a {{ color: var(--success); }}
        .error {{ color: var(--accent-hover); }}
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">Daylog</a>
        {model_badge}
    </nav>
    <main class="container">
        <div class="card">
            <h2>Today's Notes</h2>
            <form id="report-form">
                <label for="notes">What happened today?</label>
                <textarea id="notes" name="notes" placeholder="- Fixed the login bug&#10;- Met with the design team"></textarea>
                <label for="images">Images</label>
                <input type="file" id="images" name="images" multiple accept="{accept}">
                <label for="name">Report name</label>
                <input type="text" id="name" name="name" value="{default_name}">
                <button type="submit" id="generate">Generate Report</button>
            </form>
            <div id="status"></div>
        </div>
    </main>
    <script>
        const form = document.getElementById('report-form');
        const status = document.getElementById('status');
        const button = document.getElementById('generate');

        form.addEventListener('submit', async (event) => {{
            event.preventDefault();
            button.disabled = true;
            status.textContent = 'Generating report...';

            const data = new FormData(form);
            try {{
                const response = await fetch('/api/generate', {{ method: 'POST', body: data }});
                const body = await response.json();
                if (!response.ok) {{
                    status.innerHTML = '<span class="error">' + body.error + '</span>';
                    button.disabled = false;
                    return;
                }}
                poll(body.job_id);
            }} catch (e) {{
                status.innerHTML = '<span class="error">Request failed: ' + e + '</span>';
                button.disabled = false;
            }}
        }});

        async function poll(jobId) {{
            const response = await fetch('/api/jobs/' + jobId);
            const job = await response.json();
            if (job.status === 'running') {{
                setTimeout(() => poll(jobId), 1000);
                return;
            }}
            button.disabled = false;
            if (job.status === 'done') {{
                let links = '<a href="' + job.markdown + '">Markdown</a>';
                if (job.pdf) {{
                    links += ' &middot; <a href="' + job.pdf + '">PDF</a>';
                }}
                status.innerHTML = 'Report ready: ' + links;
            }} else {{
                status.innerHTML = '<span class="error">' + job.message + '</span>';
            }}
        }}
    </script>
</body>
</html>"#)
}

/// Start the web server
pub async fn start_server(config: AppConfig, gateway: Gateway, reporter: ReportGenerator) -> crate::Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);

    let state = Arc::new(AppState {
        config,
        gateway,
        reporter,
        jobs: RwLock::new(HashMap::new()),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| crate::DaylogError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "daylog-test-boundary";

    async fn test_state(dir: &std::path::Path) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.models_dir = "/nonexistent/models".to_string();
        config.runtime.url = "http://127.0.0.1:9".to_string();
        config.runtime.timeout_secs = 1;
        config.reports_dir = dir.join("reports").to_string_lossy().to_string();
        config.fonts_dir = dir.join("fonts").to_string_lossy().to_string();

        let gateway = Gateway::initialize(&config).await;
        let reporter = ReportGenerator::new(
            std::path::Path::new(&config.reports_dir),
            std::path::Path::new(&config.fonts_dir),
        )
        .unwrap();

        Arc::new(AppState {
            config,
            gateway,
            reporter,
            jobs: RwLock::new(HashMap::new()),
        })
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(name: &str, filename: &str, bytes: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{bytes}\r\n"
        )
    }

    fn multipart_request(parts: &[String]) -> Request<Body> {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let router = create_router(state.clone());

        let request = multipart_request(&[
            text_part("notes", "Fixed the bug"),
            text_part("name", "   "),
        ]);
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // The rejected request must not leave a job behind
        assert!(state.jobs.read().await.is_empty());
    }

    #[tokio::test]
    async fn empty_notes_are_rejected() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let router = create_router(state.clone());

        let request = multipart_request(&[
            text_part("notes", "  "),
            text_part("name", "log"),
        ]);
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.jobs.read().await.is_empty());
    }

    #[tokio::test]
    async fn generate_flow_confines_uploads_and_cleans_up() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let router = create_router(state.clone());

        let request = multipart_request(&[
            text_part("notes", "Fixed the bug"),
            text_part("name", "log"),
            file_part("images", "../../evil.png", "not-really-a-png"),
        ]);
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let mut finished = false;
        for _ in 0..200 {
            if state
                .jobs
                .read()
                .await
                .values()
                .any(|j| !matches!(j, JobState::Running))
            {
                finished = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(finished);

        let reports_dir = dir.path().join("reports");
        // The traversal filename was reduced to its base name
        assert!(!reports_dir.join("evil.png").exists());
        assert!(reports_dir.join("images/log/image_01.png").exists());
        // Raw uploads are removed once the job is terminal
        let leftover = std::fs::read_dir(reports_dir.join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftover, 0);

        let jobs = state.jobs.read().await;
        match jobs.values().next().unwrap() {
            JobState::Done { markdown, .. } => assert_eq!(markdown, "/reports/log.md"),
            other => panic!("unexpected job state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn second_job_is_refused_while_one_runs() {
        let jobs = RwLock::new(HashMap::new());
        assert!(admit_job(&jobs, Uuid::new_v4()).await);
        assert!(!admit_job(&jobs, Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn terminal_jobs_are_pruned_on_admission() {
        let jobs = RwLock::new(HashMap::new());
        let first = Uuid::new_v4();
        assert!(admit_job(&jobs, first).await);
        jobs.write().await.insert(
            first,
            JobState::Failed { message: "x".to_string() },
        );

        let second = Uuid::new_v4();
        assert!(admit_job(&jobs, second).await);

        let jobs = jobs.read().await;
        assert_eq!(jobs.len(), 1);
        assert!(jobs.contains_key(&second));
    }

    #[tokio::test]
    async fn panicked_pipeline_marks_job_failed() {
        let dir = tempdir().unwrap();
        let reporter = ReportGenerator::new(
            &dir.path().join("reports"),
            &dir.path().join("fonts"),
        )
        .unwrap();

        let task: tokio::task::JoinHandle<crate::Result<ReportPaths>> =
            tokio::spawn(async { panic!("renderer blew up") });

        let outcome = job_outcome(Uuid::new_v4(), task.await, &reporter);
        assert!(matches!(outcome, JobState::Failed { .. }));
    }

    #[test]
    fn upload_filenames_are_reduced_to_base_name() {
        assert_eq!(
            sanitize_file_name("../../evil.png").as_deref(),
            Some("evil.png")
        );
        assert_eq!(
            sanitize_file_name("..\\..\\evil.png").as_deref(),
            Some("evil.png")
        );
        assert_eq!(sanitize_file_name("photo.png").as_deref(), Some("photo.png"));
        assert!(sanitize_file_name("..").is_none());
        assert!(sanitize_file_name("").is_none());
    }

    #[test]
    fn image_extensions_are_matched_case_insensitively() {
        assert!(has_image_extension("photo.PNG"));
        assert!(has_image_extension("scan.jpeg"));
        assert!(!has_image_extension("notes.txt"));
        assert!(!has_image_extension("no-extension"));
    }

    #[test]
    fn job_state_serializes_with_status_tag() {
        let done = JobState::Done {
            markdown: "/reports/log.md".to_string(),
            pdf: None,
        };
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["status"], "done");
        assert_eq!(json["markdown"], "/reports/log.md");

        let running = serde_json::to_value(JobState::Running).unwrap();
        assert_eq!(running["status"], "running");
    }
}
