// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Command line for the versioned store.
//!
//! Usage:
//!   sstore serve --dbpath ./data --dbname docs --port 9001
//!   sstore buckets --address localhost:9001
//!   sstore keys --address localhost:9001 --bucket DEFAULT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sstore::client::{Client, ClientConfig};
use sstore::security::{ClientTlsConfig, TlsConfig};
use sstore::server::{Server, ServerConfig};
use sstore::storage::{DurabilityMode, RocksVersionedStore, StoreConfig, DEFAULT_BUCKET};

#[derive(Parser)]
#[command(name = "sstore")]
#[command(about = "Versioned key-value store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a local store over the network.
    Serve {
        /// Directory holding the store.
        #[arg(long, default_value = "./")]
        dbpath: PathBuf,

        /// Store name; the store lives at <dbpath>/<dbname>.db.
        #[arg(long, default_value = "default")]
        dbname: String,

        /// Host to listen on.
        #[arg(long, default_value = "localhost")]
        host: String,

        #[arg(long, default_value_t = 9001)]
        port: u16,

        /// Fail instead of opening <cwd>/_default.db when the store
        /// cannot be opened.
        #[arg(long)]
        no_fallback: bool,

        /// Fsync every write batch.
        #[arg(long)]
        fsync: bool,

        /// Server certificate (PEM). Enables TLS together with --tls-key.
        #[arg(long, requires = "tls_key")]
        tls_cert: Option<PathBuf>,

        /// Server private key (PEM).
        #[arg(long, requires = "tls_cert")]
        tls_key: Option<PathBuf>,

        /// CA for client certificates. Enables mutual TLS.
        #[arg(long, requires = "tls_cert")]
        tls_client_ca: Option<PathBuf>,
    },

    /// List buckets on a remote server.
    Buckets {
        #[command(flatten)]
        remote: Remote,
    },

    /// List keys in a bucket on a remote server.
    Keys {
        #[command(flatten)]
        remote: Remote,

        #[arg(long, default_value = DEFAULT_BUCKET)]
        bucket: String,
    },
}

#[derive(Args)]
struct Remote {
    /// Server address.
    #[arg(long, default_value = "localhost:9001")]
    address: String,

    /// CA for the server certificate. Enables TLS.
    #[arg(long)]
    tls_ca: Option<PathBuf>,

    /// Name to verify the server certificate against. Defaults to the
    /// host part of --address.
    #[arg(long)]
    tls_server_name: Option<String>,
}

impl Remote {
    async fn connect(&self) -> Result<Client> {
        let mut config = ClientConfig::default();
        if let Some(ca) = &self.tls_ca {
            let name = match &self.tls_server_name {
                Some(name) => name.clone(),
                None => host_of(&self.address).to_string(),
            };
            config = config.with_tls(ClientTlsConfig::new(name).with_ca(ca));
        }

        Client::connect(self.address.as_str(), config)
            .await
            .with_context(|| format!("failed to connect to {}", self.address))
    }
}

fn host_of(address: &str) -> &str {
    address
        .rsplit_once(':')
        .map_or(address, |(host, _)| host)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sstore=info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            dbpath,
            dbname,
            host,
            port,
            no_fallback,
            fsync,
            tls_cert,
            tls_key,
            tls_client_ca,
        } => {
            let durability = if fsync {
                DurabilityMode::FsyncEveryWrite
            } else {
                DurabilityMode::WalOnly
            };
            let store_config = StoreConfig::new(dbpath, dbname)
                .with_fallback(!no_fallback)
                .with_durability(durability);
            let store = Arc::new(
                RocksVersionedStore::open(&store_config)
                    .with_context(|| format!("failed to open {}", store_config.path().display()))?,
            );

            let mut config = ServerConfig::new(format!("{host}:{port}"));
            if let (Some(cert), Some(key)) = (tls_cert, tls_key) {
                let mut tls = TlsConfig::new(cert, key);
                if let Some(ca) = tls_client_ca {
                    tls = tls.with_client_auth(ca);
                }
                config = config.with_tls(tls);
            }

            let server = Server::bind(config, Arc::clone(&store)).await?;
            server
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!(error = %e, "could not listen for ctrl-c");
                        std::future::pending::<()>().await;
                    }
                })
                .await?;

            match Arc::try_unwrap(store) {
                Ok(store) => store.close()?,
                Err(_) => info!("connections still open; store closes when they finish"),
            }
        }

        Commands::Buckets { remote } => {
            let mut client = remote.connect().await?;
            let buckets = client.list_buckets().await?;

            println!("Connected to: {}", remote.address);
            println!("Buckets:");
            for bucket in buckets {
                println!("  {bucket}");
            }
        }

        Commands::Keys { remote, bucket } => {
            let mut client = remote.connect().await?;
            for key in client.list_keys(&bucket).await? {
                println!("{key}");
            }
        }
    }

    Ok(())
}
