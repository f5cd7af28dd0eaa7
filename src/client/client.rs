// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Async RPC client for the store server.

use std::future::Future;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

use super::error::{ClientError, ClientResult};
use crate::security::{create_tls_connector, ClientTlsConfig, SecurityError};
use crate::storage::{Key, Storable};
use crate::wire::{
    read_frame, write_frame, ErrorCode, Request, RequestId, RequestPayload, Response,
    ResponsePayload,
};

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connects over TLS when set.
    pub tls: Option<ClientTlsConfig>,
    /// Limit on each read or write. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Initial read buffer size.
    pub buffer_size: usize,
}

impl ClientConfig {
    pub fn with_tls(mut self, tls: ClientTlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tls: None,
            timeout: Some(Duration::from_secs(30)),
            buffer_size: 64 * 1024,
        }
    }
}

trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// RPC client for a store server.
///
/// Requests are sent one at a time; each call waits for its full answer.
///
/// # Example
///
/// ```no_run
/// use sstore::client::{Client, ClientConfig};
///
/// # async fn run() -> Result<(), sstore::client::ClientError> {
/// let mut client = Client::connect("localhost:9001", ClientConfig::default()).await?;
///
/// let key = client.new_key("docs").await?;
/// let stored = client.put(&key, b"hello".to_vec()).await?;
/// assert_eq!(client.get(&stored).await?, b"hello");
/// # Ok(())
/// # }
/// ```
pub struct Client {
    stream: Box<dyn Transport>,
    next_request_id: u64,
    read_buf: BytesMut,
    timeout: Option<Duration>,
}

impl Client {
    /// Connects to a store server.
    pub async fn connect(addr: impl ToSocketAddrs, config: ClientConfig) -> ClientResult<Self> {
        let tcp = with_timeout(config.timeout, async {
            TcpStream::connect(addr).await.map_err(ClientError::from)
        })
        .await?;
        tcp.set_nodelay(true)?;

        let stream: Box<dyn Transport> = match &config.tls {
            Some(tls) => {
                let connector = create_tls_connector(tls)?;
                let name = tls.parsed_server_name()?;
                let stream = with_timeout(config.timeout, async {
                    connector.connect(name, tcp).await.map_err(|e| {
                        ClientError::Security(SecurityError::TlsHandshake(e.to_string()))
                    })
                })
                .await?;
                Box::new(stream)
            }
            None => Box::new(tcp),
        };

        debug!(tls = config.tls.is_some(), "connected");

        Ok(Self {
            stream,
            next_request_id: 1,
            read_buf: BytesMut::with_capacity(config.buffer_size),
            timeout: config.timeout,
        })
    }

    /// Asks the server to mint a key in `bucket`. An empty bucket means the
    /// default bucket.
    pub async fn new_key(&mut self, bucket: &str) -> ClientResult<Key> {
        let payload = RequestPayload::GetNewKey {
            bucket: bucket.to_string(),
        };
        match self.call(payload).await? {
            ResponsePayload::Key(key) => Ok(key),
            other => Err(unexpected("Key", other)),
        }
    }

    pub async fn list_buckets(&mut self) -> ClientResult<Vec<String>> {
        self.call_stream(RequestPayload::ListBuckets, |payload| match payload {
            ResponsePayload::Bucket(name) => Ok(name),
            other => Err(unexpected("Bucket", other)),
        })
        .await
    }

    pub async fn list_keys(&mut self, bucket: &str) -> ClientResult<Vec<Key>> {
        let payload = RequestPayload::ListKeys {
            bucket: bucket.to_string(),
        };
        self.call_stream(payload, expect_key).await
    }

    /// Lists stored keys in `bucket` whose encoded form starts with `prefix`.
    pub async fn search(&mut self, bucket: &str, prefix: &str) -> ClientResult<Vec<Key>> {
        let payload = RequestPayload::Search {
            key: Key::new(bucket, prefix, 0),
        };
        self.call_stream(payload, expect_key).await
    }

    /// Returns `key` with its version set to the current stored version, or
    /// zero if nothing is stored.
    pub async fn version(&mut self, key: &Key) -> ClientResult<Key> {
        let payload = RequestPayload::Version { key: key.clone() };
        match self.call(payload).await? {
            ResponsePayload::Key(key) => Ok(key),
            other => Err(unexpected("Key", other)),
        }
    }

    /// Stores `payload` under `key`, returning the stored key.
    pub async fn put(&mut self, key: &Key, payload: impl Into<Vec<u8>>) -> ClientResult<Key> {
        let payload = RequestPayload::Put {
            key: key.clone(),
            payload: payload.into(),
        };
        match self.call(payload).await? {
            ResponsePayload::Key(key) => Ok(key),
            other => Err(unexpected("Key", other)),
        }
    }

    /// Reads the payload stored under exactly `key`.
    ///
    /// An empty payload is reported as a `NotFound` server error.
    pub async fn get(&mut self, key: &Key) -> ClientResult<Vec<u8>> {
        let request = RequestPayload::Get { key: key.clone() };
        match self.call(request).await? {
            ResponsePayload::Object { payload, .. } if payload.is_empty() => Err(
                ClientError::server(ErrorCode::NotFound, format!("key '{key}' not found")),
            ),
            ResponsePayload::Object { payload, .. } => Ok(payload),
            other => Err(unexpected("Object", other)),
        }
    }

    /// Removes every version of `key`'s identifier.
    pub async fn delete(&mut self, key: &Key) -> ClientResult<()> {
        let payload = RequestPayload::Delete { key: key.clone() };
        match self.call(payload).await? {
            ResponsePayload::Deleted => Ok(()),
            other => Err(unexpected("Deleted", other)),
        }
    }

    pub async fn put_value<T: Storable>(&mut self, key: &Key, value: &T) -> ClientResult<Key> {
        self.put(key, value.encode()).await
    }

    pub async fn get_as<T: Storable>(&mut self, key: &Key) -> ClientResult<T> {
        let bytes = self.get(key).await?;
        T::decode(&bytes).map_err(ClientError::Decode)
    }

    /// Sends a unary request and returns its single answer.
    async fn call(&mut self, payload: RequestPayload) -> ClientResult<ResponsePayload> {
        let id = self.send(payload).await?;
        match self.recv(id).await? {
            ResponsePayload::Error(e) => Err(ClientError::server(e.code, e.message)),
            payload => Ok(payload),
        }
    }

    /// Sends a streaming request and collects items until the end marker.
    async fn call_stream<T, F>(
        &mut self,
        payload: RequestPayload,
        mut item: F,
    ) -> ClientResult<Vec<T>>
    where
        F: FnMut(ResponsePayload) -> ClientResult<T>,
    {
        let id = self.send(payload).await?;
        let mut items = Vec::new();

        loop {
            match self.recv(id).await? {
                ResponsePayload::EndOfStream => return Ok(items),
                ResponsePayload::Error(e) => return Err(ClientError::server(e.code, e.message)),
                payload => items.push(item(payload)?),
            }
        }
    }

    async fn send(&mut self, payload: RequestPayload) -> ClientResult<RequestId> {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;

        let frame = Request::new(id, payload).to_frame()?;
        let stream = &mut self.stream;
        with_timeout(self.timeout, async {
            write_frame(stream, &frame).await.map_err(ClientError::from)
        })
        .await?;

        Ok(id)
    }

    async fn recv(&mut self, expected: RequestId) -> ClientResult<ResponsePayload> {
        let stream = &mut self.stream;
        let read_buf = &mut self.read_buf;
        let frame = with_timeout(self.timeout, async {
            read_frame(stream, read_buf).await.map_err(ClientError::from)
        })
        .await?;

        let Some(frame) = frame else {
            return Err(ClientError::Connection(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed connection",
            )));
        };

        let response = Response::from_frame(&frame)?;
        if response.request_id != expected {
            return Err(ClientError::ResponseMismatch {
                expected: expected.0,
                received: response.request_id.0,
            });
        }
        Ok(response.payload)
    }
}

async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ClientError::Timeout)?,
        None => fut.await,
    }
}

fn expect_key(payload: ResponsePayload) -> ClientResult<Key> {
    match payload {
        ResponsePayload::Key(key) => Ok(key),
        other => Err(unexpected("Key", other)),
    }
}

fn unexpected(expected: &str, actual: ResponsePayload) -> ClientError {
    ClientError::UnexpectedResponse {
        expected: expected.to_string(),
        actual: format!("{actual:?}"),
    }
}
