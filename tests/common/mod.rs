//! Shared utilities for integration testing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

use nexus_bridge::net::AdmissionGate;
use nexus_bridge::protocol::{ClientResponse, UpstreamRequest, UpstreamResponse};
use nexus_bridge::{BridgeConfig, BridgeServer, Shutdown};

pub const SIGNATURE: &str = "X11_a1b2c3d4e5f6a7b8c9d0e1f2";

/// Start a scripted backend that answers every request with verified=true and
/// a fixed signature, after `delay`. Returns the log of raw requests received.
pub fn start_scripted_backend(path: &Path, delay: Duration) -> Arc<Mutex<Vec<Value>>> {
    let listener = UnixListener::bind(path).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 65536];
                loop {
                    let n = match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => n,
                    };
                    let raw: Value = serde_json::from_slice(&buf[..n]).unwrap();
                    let req: UpstreamRequest = serde_json::from_value(raw.clone()).unwrap();
                    log.lock().unwrap().push(raw);

                    tokio::time::sleep(delay).await;

                    let resp = UpstreamResponse {
                        request_id: req.request_id,
                        node_id: req.node_id,
                        sms_encrypted: req.sms.map(|s| format!("enc({})", s.len())),
                        verified: true,
                        signature: SIGNATURE.to_string(),
                        layers_used: 11,
                        processing_time: 120,
                        status: "PIP".to_string(),
                        timestamp: req.timestamp,
                    };
                    let body = serde_json::to_vec(&resp).unwrap();
                    if socket.write_all(&body).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    seen
}

/// Config with both sockets inside `dir`.
#[allow(dead_code)]
pub fn bridge_config(dir: &Path) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.listener.socket_path = client_socket(dir).display().to_string();
    config.upstream.socket_path = backend_socket(dir).display().to_string();
    config.listener.shutdown_grace_secs = 1;
    config
}

pub fn client_socket(dir: &Path) -> PathBuf {
    dir.join("bridge.sock")
}

pub fn backend_socket(dir: &Path) -> PathBuf {
    dir.join("core.sock")
}

/// A bridge running in the background.
#[allow(dead_code)]
pub struct RunningBridge {
    pub shutdown: Shutdown,
    pub admission: AdmissionGate,
    pub task: JoinHandle<()>,
}

/// Bind and start a bridge. The client socket exists when this returns.
#[allow(dead_code)]
pub fn start_bridge(config: BridgeConfig) -> RunningBridge {
    let server = BridgeServer::new(config);
    let listener = server.bind().unwrap();
    let admission = server.admission();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let task = tokio::spawn(async move {
        server.run(listener, server_shutdown).await;
    });

    RunningBridge {
        shutdown,
        admission,
        task,
    }
}

/// Send raw bytes as one client message and collect everything written back
/// until the bridge closes the connection.
#[allow(dead_code)]
pub async fn send_raw(socket: &Path, payload: &[u8]) -> Vec<u8> {
    let mut stream = UnixStream::connect(socket).await.unwrap();
    stream.write_all(payload).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

/// Send a JSON request and decode the single response.
#[allow(dead_code)]
pub async fn send_request(socket: &Path, request: &Value) -> ClientResponse {
    let out = send_raw(socket, &serde_json::to_vec(request).unwrap()).await;
    serde_json::from_slice(&out).unwrap()
}
