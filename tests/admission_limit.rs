//! Admission gate behaviour under concurrent client connections.

use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use nexus_bridge::protocol::{ClientResponse, ResponseStatus};

mod common;

async fn wait_for_in_flight(bridge: &common::RunningBridge, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while bridge.admission.in_flight() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("in-flight handler count never reached the expected value");
}

#[tokio::test]
async fn test_fifth_connection_waits_for_a_slot() {
    let dir = tempfile::tempdir().unwrap();
    common::start_scripted_backend(&common::backend_socket(dir.path()), Duration::ZERO);
    let bridge = common::start_bridge(common::bridge_config(dir.path()));
    let socket = common::client_socket(dir.path());
    assert_eq!(bridge.admission.capacity(), 4);

    // Four clients connect and stay silent, each pinning a handler in its read.
    let mut idle = Vec::new();
    for _ in 0..4 {
        idle.push(UnixStream::connect(&socket).await.unwrap());
    }
    wait_for_in_flight(&bridge, 4).await;

    let waiting = {
        let socket = socket.clone();
        tokio::spawn(async move {
            common::send_request(&socket, &json!({"wallet_id": "w", "tx_id": "fifth"})).await
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!waiting.is_finished(), "fifth request must queue behind the gate");
    assert_eq!(bridge.admission.in_flight(), 4);

    // One idle client finally sends its request; its slot frees afterwards.
    let mut first = idle.remove(0);
    first
        .write_all(br#"{"wallet_id":"w","tx_id":"first"}"#)
        .await
        .unwrap();
    let mut out = Vec::new();
    first.read_to_end(&mut out).await.unwrap();
    let first_resp: ClientResponse = serde_json::from_slice(&out).unwrap();
    assert_eq!(first_resp.status, ResponseStatus::Success);

    let fifth = tokio::time::timeout(Duration::from_secs(2), waiting)
        .await
        .expect("queued request proceeds once a slot frees")
        .unwrap();
    assert_eq!(fifth.status, ResponseStatus::Success);
    assert_eq!(fifth.data.unwrap().request_id, "fifth");

    drop(idle);
    wait_for_in_flight(&bridge, 0).await;
    bridge.shutdown.trigger();
}

#[tokio::test]
async fn test_burst_never_exceeds_capacity() {
    let dir = tempfile::tempdir().unwrap();
    common::start_scripted_backend(
        &common::backend_socket(dir.path()),
        Duration::from_millis(20),
    );
    let bridge = common::start_bridge(common::bridge_config(dir.path()));
    let socket = common::client_socket(dir.path());

    let admission = bridge.admission.clone();
    let sampler = tokio::spawn(async move {
        let mut peak = 0;
        for _ in 0..200 {
            peak = peak.max(admission.in_flight());
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        peak
    });

    let mut clients = Vec::new();
    for i in 0..16 {
        let socket = socket.clone();
        clients.push(tokio::spawn(async move {
            common::send_request(&socket, &json!({"wallet_id": "w", "tx_id": format!("b{}", i)}))
                .await
        }));
    }
    for client in clients {
        let resp = client.await.unwrap();
        assert_eq!(resp.status, ResponseStatus::Success);
    }

    let peak = sampler.await.unwrap();
    assert!(peak <= 4, "peak in-flight handlers {} exceeded capacity", peak);
    bridge.shutdown.trigger();
}

#[tokio::test]
async fn test_queued_connection_answered_at_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let seen = common::start_scripted_backend(&common::backend_socket(dir.path()), Duration::ZERO);
    let bridge = common::start_bridge(common::bridge_config(dir.path()));
    let socket = common::client_socket(dir.path());

    let mut idle = Vec::new();
    for _ in 0..4 {
        idle.push(UnixStream::connect(&socket).await.unwrap());
    }
    wait_for_in_flight(&bridge, 4).await;

    let queued = {
        let socket = socket.clone();
        tokio::spawn(async move {
            common::send_raw(&socket, br#"{"wallet_id":"w","tx_id":"queued"}"#).await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!queued.is_finished());

    // Grace is one second; the idle clients outlast it.
    bridge.shutdown.trigger();

    let out = tokio::time::timeout(Duration::from_secs(5), queued)
        .await
        .expect("queued connection is answered once the gate closes")
        .unwrap();
    let resp: ClientResponse = serde_json::from_slice(&out).unwrap();
    assert_eq!(resp.status, ResponseStatus::Error);
    assert!(!resp.verified);
    assert_eq!(resp.message, "PIP PIP");
    assert!(seen.lock().unwrap().is_empty());

    drop(idle);
}
