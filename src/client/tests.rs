// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests against a live server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{Client, ClientConfig, ClientError};
use crate::server::{Server, ServerConfig, ServerResult};
use crate::storage::{Key, RocksVersionedStore, DEFAULT_BUCKET};
use crate::wire::ErrorCode;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<ServerResult<()>>,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let store = RocksVersionedStore::open_at(&dir.path().join("e2e.db"), Default::default())
            .unwrap();
        let server = Server::bind(ServerConfig::new("127.0.0.1:0"), Arc::new(store))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(server.run_until(async {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
            _dir: dir,
        }
    }

    async fn client(&self) -> Client {
        let config = ClientConfig::default().with_timeout(Some(Duration::from_secs(5)));
        Client::connect(self.addr, config).await.unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.handle).await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_document_lifecycle_over_the_wire() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let key = client.new_key("docs").await.unwrap();
    assert_eq!(key.bucket, "docs");
    assert_eq!(key.version, 1);

    let stored = client.put(&key, b"P1".to_vec()).await.unwrap();
    assert_eq!(stored, key.with_version(2));
    assert_eq!(client.version(&key).await.unwrap().version, 2);

    let stored = client.put(&stored, b"P2".to_vec()).await.unwrap();
    assert_eq!(stored.version, 3);
    assert_eq!(client.get(&stored).await.unwrap(), b"P2");

    let err = client.put(&key, b"late".to_vec()).await.unwrap_err();
    assert!(err.is_stale(), "unexpected error: {err}");
    assert_eq!(client.version(&key).await.unwrap().version, 3);

    client.delete(&stored).await.unwrap();
    assert_eq!(client.version(&key).await.unwrap().version, 0);
    assert!(client.list_keys("docs").await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_listing_and_search() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    client.put(&Key::new("b", "report-1", 1), "x").await.unwrap();
    client.put(&Key::new("b", "report-2", 1), "y").await.unwrap();
    client.put(&Key::new("a", "other", 1), "z").await.unwrap();

    assert_eq!(client.list_buckets().await.unwrap(), vec!["a", "b"]);
    assert_eq!(
        client.list_keys("b").await.unwrap(),
        vec![Key::new("b", "report-1", 2), Key::new("b", "report-2", 2)]
    );
    assert_eq!(
        client.search("b", "report-2").await.unwrap(),
        vec![Key::new("b", "report-2", 2)]
    );
    assert!(client.search("a", "report").await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_default_bucket_over_the_wire() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let key = client.new_key("").await.unwrap();
    assert_eq!(key.bucket, DEFAULT_BUCKET);

    client.put(&Key::new("", "note", 1), "n").await.unwrap();
    assert_eq!(
        client.search("", "no").await.unwrap(),
        vec![Key::new(DEFAULT_BUCKET, "note", 2)]
    );
    assert_eq!(client.list_keys("").await.unwrap().len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_not_found_cases() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let err = client.list_keys("missing").await.unwrap_err();
    assert!(err.is_not_found());

    let err = client.get(&Key::new("missing", "a", 2)).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::NotFound));

    let stored = client.put(&Key::new("docs", "blank", 1), Vec::new()).await.unwrap();
    let err = client.get(&stored).await.unwrap_err();
    assert!(err.is_not_found());

    // The connection survives server-side errors.
    assert_eq!(client.list_buckets().await.unwrap(), vec!["docs"]);

    server.stop().await;
}

#[tokio::test]
async fn test_storable_values() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let key = Key::new("docs", "greeting", 1);
    let stored = client
        .put_value(&key, &"hello".to_string())
        .await
        .unwrap();
    let value: String = client.get_as(&stored).await.unwrap();
    assert_eq!(value, "hello");

    let stored = client.put(&stored, vec![0xff, 0xfe]).await.unwrap();
    let err = client.get_as::<String>(&stored).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));

    server.stop().await;
}

#[tokio::test]
async fn test_clients_share_one_store() {
    let server = TestServer::start().await;
    let mut writer = server.client().await;
    let mut reader = server.client().await;

    let stored = writer.put(&Key::new("shared", "k", 1), "v").await.unwrap();
    assert_eq!(reader.get(&stored).await.unwrap(), b"v");

    let err = reader.put(&Key::new("shared", "k", 1), "w").await.unwrap_err();
    assert!(err.is_stale());

    server.stop().await;
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = Client::connect(addr, ClientConfig::default()).await;
    assert!(matches!(result, Err(ClientError::Connection(_))));
}
