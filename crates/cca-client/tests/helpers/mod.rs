#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use cca_client::Files;
use cca_core::{
    Artifact, ArtifactContent, CreateUploadReq, GetArtifactReq, GetStatusReq, Manifest,
    ProcessingStatus, StatusResponse, UploadTarget,
};

pub const UPLOAD_ID: &str = "upload-123";

/// Enable log output for a test run with `RUST_LOG=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// In-process files service replaying a scripted status sequence.
///
/// Once the script is exhausted every further poll reports `IN_PROGRESS`.
pub struct FakeFiles {
    upload_url: String,
    create_error: Option<String>,
    statuses: Mutex<VecDeque<Result<StatusResponse, String>>>,
    artifacts: HashMap<String, Vec<u8>>,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub artifact_calls: AtomicUsize,
    pub status_ids: Mutex<Vec<String>>,
}

impl FakeFiles {
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            upload_url: upload_url.into(),
            create_error: None,
            statuses: Mutex::new(VecDeque::new()),
            artifacts: HashMap::new(),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            artifact_calls: AtomicUsize::new(0),
            status_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_create(message: &str) -> Self {
        let mut files = Self::new("http://127.0.0.1:1/unused");
        files.create_error = Some(message.to_string());
        files
    }

    pub fn with_statuses(self, statuses: Vec<StatusResponse>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(Ok));
        self
    }

    pub fn with_status_error(self, message: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn with_artifact(mut self, name: &str, content: &[u8]) -> Self {
        self.artifacts.insert(name.to_string(), content.to_vec());
        self
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn artifact_fetches(&self) -> usize {
        self.artifact_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Files for FakeFiles {
    async fn create_upload(&self, _req: CreateUploadReq) -> Result<UploadTarget> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.create_error {
            return Err(anyhow::anyhow!("{}", message));
        }

        Ok(UploadTarget {
            upload_id: UPLOAD_ID.to_string(),
            upload_url: self.upload_url.clone(),
        })
    }

    async fn get_status(&self, req: GetStatusReq) -> Result<StatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_ids.lock().unwrap().push(req.upload_id);

        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(Ok(res)) => Ok(res),
            Some(Err(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(status(ProcessingStatus::InProgress)),
        }
    }

    async fn get_artifact(&self, req: GetArtifactReq) -> Result<ArtifactContent> {
        self.artifact_calls.fetch_add(1, Ordering::SeqCst);
        let content = self
            .artifacts
            .get(&req.name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no artifact named {}", req.name))?;
        Ok(ArtifactContent { content })
    }
}

pub fn status(status: ProcessingStatus) -> StatusResponse {
    StatusResponse {
        status,
        manifest: None,
        message: String::new(),
    }
}

pub fn status_with_message(status: ProcessingStatus, message: &str) -> StatusResponse {
    StatusResponse {
        status,
        manifest: None,
        message: message.to_string(),
    }
}

pub fn status_with_manifest(status: ProcessingStatus, manifest: Manifest) -> StatusResponse {
    StatusResponse {
        status,
        manifest: Some(manifest),
        message: String::new(),
    }
}

pub fn manifest(uuid: &str, artifacts: &[(&str, &str)]) -> Manifest {
    Manifest {
        uuid: uuid.to_string(),
        artifacts: artifacts
            .iter()
            .map(|(kind, name)| Artifact {
                r#type: kind.to_string(),
                name: name.to_string(),
                content: Vec::new(),
            })
            .collect(),
    }
}

/// PUT endpoint accepting `body` with a matching Content-Length.
pub async fn mock_put(
    server: &mut mockito::ServerGuard,
    body: &str,
    status: usize,
) -> mockito::Mock {
    server
        .mock("PUT", "/put/upload-123")
        .match_header("content-length", body.len().to_string().as_str())
        .match_body(body)
        .with_status(status)
        .create_async()
        .await
}

pub fn put_url(server: &mockito::ServerGuard) -> String {
    format!("{}/put/upload-123", server.url())
}

/// PUT target that reads the request, optionally writes `response`, then
/// keeps the connection open without sending anything else.
pub async fn stalling_put_target(response: Option<&'static [u8]>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        if let Some(response) = response {
            let _ = socket.write_all(response).await;
            let _ = socket.flush().await;
        }
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        drop(socket);
    });

    format!("http://{}/put/upload-123", addr)
}
