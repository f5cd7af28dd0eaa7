// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! TCP listener and accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

use super::config::ServerConfig;
use super::connection::serve_connection;
use super::error::{ServerError, ServerResult};
use crate::security::{create_tls_acceptor, SecurityError};
use crate::service::StoreService;
use crate::storage::VersionedStore;

/// Serves a [`VersionedStore`] over the wire protocol.
///
/// Each accepted connection runs in its own task. Store calls run on the
/// blocking pool.
pub struct Server<S> {
    listener: TcpListener,
    acceptor: Option<TlsAcceptor>,
    service: StoreService<S>,
    slots: Arc<Semaphore>,
    read_buffer_size: usize,
}

impl<S: VersionedStore + 'static> Server<S> {
    /// Binds the listener. TLS material is loaded here so that bad
    /// certificates fail at startup.
    pub async fn bind(config: ServerConfig, store: Arc<S>) -> ServerResult<Self> {
        let acceptor = config.tls.as_ref().map(create_tls_acceptor).transpose()?;

        let listener = TcpListener::bind(&config.address)
            .await
            .map_err(|source| ServerError::Bind {
                address: config.address.clone(),
                source,
            })?;

        info!(
            address = %listener.local_addr()?,
            tls = acceptor.is_some(),
            "server listening"
        );

        Ok(Self {
            listener,
            acceptor,
            service: StoreService::new(store),
            slots: Arc::new(Semaphore::new(config.max_connections)),
            read_buffer_size: config.read_buffer_size,
        })
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever.
    pub async fn run(self) -> ServerResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => error!(error = %e, "error accepting connection"),
                },
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
            warn!(%peer, "max connections reached, rejecting connection");
            return;
        };

        debug!(%peer, "accepted connection");
        let _ = stream.set_nodelay(true);

        let service = self.service.clone();
        let acceptor = self.acceptor.clone();
        let read_buffer_size = self.read_buffer_size;

        tokio::spawn(async move {
            let result = match acceptor {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls) => serve_connection(tls, peer, service, read_buffer_size).await,
                    Err(e) => Err(SecurityError::TlsHandshake(e.to_string()).into()),
                },
                None => serve_connection(stream, peer, service, read_buffer_size).await,
            };

            if let Err(e) = result {
                warn!(%peer, error = %e, "connection ended with error");
            }
            drop(permit);
        });
    }
}
