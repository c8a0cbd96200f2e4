//! Storage node served over TCP.

use std::sync::Arc;

use protocol::{ErrorKind, Receiver, Sender, StorageRequest, StorageResponse};
use storage::{FsStore, StorageService};

async fn spawn_node() -> (tempfile::TempDir, Sender<StorageRequest, StorageResponse>) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::open(dir.path()).await.unwrap();
    let receiver = Receiver::bind("127.0.0.1:0", Arc::new(StorageService::new(store)))
        .await
        .unwrap();
    let addr = receiver.local_addr().unwrap().to_string();
    tokio::spawn(receiver.run());
    let sender = Sender::connect(addr, None).await.unwrap();
    (dir, sender)
}

#[tokio::test]
async fn remote_write_read_delete_list() {
    let (_dir, node) = spawn_node().await;

    let resp = node
        .call(&StorageRequest::WriteFile {
            key: "video/manifest.mpd".into(),
            data: b"manifest".to_vec(),
        })
        .await
        .unwrap();
    assert_eq!(resp, StorageResponse::WriteFile { success: true });

    let resp = node
        .call(&StorageRequest::ReadFile { key: "video/manifest.mpd".into() })
        .await
        .unwrap();
    assert_eq!(resp, StorageResponse::ReadFile { data: b"manifest".to_vec() });

    let resp = node.call(&StorageRequest::ListKeys).await.unwrap();
    assert_eq!(resp, StorageResponse::ListKeys { keys: vec!["video/manifest.mpd".into()] });

    for _ in 0..2 {
        let resp = node
            .call(&StorageRequest::DeleteFile { key: "video/manifest.mpd".into() })
            .await
            .unwrap();
        assert_eq!(resp, StorageResponse::DeleteFile { success: true });
    }

    let resp = node.call(&StorageRequest::ListKeys).await.unwrap();
    assert_eq!(resp, StorageResponse::ListKeys { keys: vec![] });
}

#[tokio::test]
async fn remote_read_missing_is_not_found() {
    let (_dir, node) = spawn_node().await;
    let resp = node
        .call(&StorageRequest::ReadFile { key: "video/missing".into() })
        .await
        .unwrap();
    match resp {
        StorageResponse::Error(e) => assert_eq!(e.kind, ErrorKind::NotFound),
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_invalid_key_is_rejected() {
    let (_dir, node) = spawn_node().await;
    let resp = node
        .call(&StorageRequest::WriteFile { key: "../etc".into(), data: vec![] })
        .await
        .unwrap();
    match resp {
        StorageResponse::Error(e) => assert_eq!(e.kind, ErrorKind::InvalidArgument),
        other => panic!("expected invalid argument, got {other:?}"),
    }
}
