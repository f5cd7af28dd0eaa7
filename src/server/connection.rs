// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Per-connection request loop.

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use super::error::ServerResult;
use crate::service::StoreService;
use crate::storage::VersionedStore;
use crate::wire::{
    read_frame, write_frame, ErrorCode, Request, RequestId, Response, ResponsePayload,
};

/// Serves requests on one connection until the peer hangs up.
///
/// Requests are handled in order. Each request's responses are written
/// before the next request is read. A frame that fails to decode is
/// answered with an `InvalidRequest` error and the connection stays open;
/// a framing error closes it.
pub(crate) async fn serve_connection<S, T>(
    mut stream: T,
    peer: SocketAddr,
    service: StoreService<S>,
    read_buffer_size: usize,
) -> ServerResult<()>
where
    S: VersionedStore + 'static,
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(read_buffer_size);

    while let Some(frame) = read_frame(&mut stream, &mut buf).await? {
        let request = match Request::from_frame(&frame) {
            Ok(request) => request,
            Err(e) => {
                warn!(%peer, error = %e, "undecodable request");
                let response =
                    Response::error(RequestId::new(0), ErrorCode::InvalidRequest, e.to_string());
                write_frame(&mut stream, &response.to_frame()?).await?;
                continue;
            }
        };

        let id = request.id;
        debug!(%peer, request_id = %id, op = request.payload.name(), "request");

        let handler = service.clone();
        let responses = tokio::task::spawn_blocking(move || handler.handle(request.payload))
            .await
            .unwrap_or_else(|e| {
                warn!(%peer, request_id = %id, error = %e, "handler task failed");
                vec![ResponsePayload::error(ErrorCode::Internal, e.to_string())]
            });

        for payload in responses {
            write_frame(&mut stream, &Response::new(id, payload).to_frame()?).await?;
        }
    }

    debug!(%peer, "connection closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Key, RocksVersionedStore};
    use crate::wire::{Frame, RequestPayload};
    use bytes::Bytes;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn next_response<T>(stream: &mut T, buf: &mut BytesMut) -> Response
    where
        T: AsyncRead + Unpin,
    {
        let frame = read_frame(stream, buf).await.unwrap().unwrap();
        Response::from_frame(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_requests_answered_in_order() {
        let dir = TempDir::new().unwrap();
        let store =
            RocksVersionedStore::open_at(&dir.path().join("conn.db"), Default::default()).unwrap();
        let service = StoreService::new(Arc::new(store));

        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let task = tokio::spawn(serve_connection(server, peer, service, 1024));

        let put = Request::new(
            RequestId::new(1),
            RequestPayload::Put {
                key: Key::new("docs", "a", 1),
                payload: b"x".to_vec(),
            },
        );
        let list = Request::new(RequestId::new(2), RequestPayload::ListBuckets);
        write_frame(&mut client, &put.to_frame().unwrap()).await.unwrap();
        write_frame(&mut client, &list.to_frame().unwrap()).await.unwrap();

        let mut buf = BytesMut::new();
        let first = next_response(&mut client, &mut buf).await;
        assert_eq!(first.request_id, RequestId::new(1));
        assert_eq!(first.payload, ResponsePayload::Key(Key::new("docs", "a", 2)));

        let bucket = next_response(&mut client, &mut buf).await;
        let end = next_response(&mut client, &mut buf).await;
        assert_eq!(bucket.payload, ResponsePayload::Bucket("docs".into()));
        assert_eq!(end.payload, ResponsePayload::EndOfStream);
        assert_eq!(end.request_id, RequestId::new(2));

        drop(client);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_undecodable_request_keeps_connection() {
        let dir = TempDir::new().unwrap();
        let store =
            RocksVersionedStore::open_at(&dir.path().join("conn.db"), Default::default()).unwrap();
        let service = StoreService::new(Arc::new(store));

        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let task = tokio::spawn(serve_connection(server, peer, service, 1024));

        let garbage = Frame::new(Bytes::from_static(&[0xff, 0xff, 0xff]));
        write_frame(&mut client, &garbage).await.unwrap();

        let mut buf = BytesMut::new();
        match next_response(&mut client, &mut buf).await.payload {
            ResponsePayload::Error(e) => assert_eq!(e.code, ErrorCode::InvalidRequest),
            other => panic!("unexpected payload: {other:?}"),
        }

        let list = Request::new(RequestId::new(9), RequestPayload::ListBuckets);
        write_frame(&mut client, &list.to_frame().unwrap()).await.unwrap();
        let end = next_response(&mut client, &mut buf).await;
        assert_eq!(end.payload, ResponsePayload::EndOfStream);

        drop(client);
        task.await.unwrap().unwrap();
    }
}
