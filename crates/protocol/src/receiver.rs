//! Server side of the transport.
//!
//! A `Receiver` owns a TCP listener and a `Service`. Every accepted
//! connection gets its own task; requests on one connection are served in
//! order, connections are served concurrently.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::error::ProtocolResult;

/// Request handler driven by a `Receiver`.
///
/// Failures are part of `Response` (an error variant), so a handler never
/// tears down the connection.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    type Request: DeserializeOwned + Send + 'static;
    type Response: Serialize + Send + Sync + 'static;

    async fn call(&self, request: Self::Request) -> Self::Response;
}

pub struct Receiver<S> {
    listener: TcpListener,
    service: Arc<S>,
}

impl<S: Service> Receiver<S> {
    pub async fn bind(addr: impl ToSocketAddrs, service: Arc<S>) -> ProtocolResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, service })
    }

    pub fn local_addr(&self) -> ProtocolResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process exits.
    pub async fn run(self) -> ProtocolResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves. Connections already accepted keep
    /// running on their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> ProtocolResult<()> {
        let local = self.local_addr()?;
        info!(%local, "listening");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(%local, "shutting down listener");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "accepted connection");
                        let service = Arc::clone(&self.service);
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, service).await {
                                warn!(%peer, error = %e, "connection closed with error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },
            }
        }
    }
}

async fn serve_connection<S: Service>(stream: TcpStream, service: Arc<S>) -> ProtocolResult<()> {
    stream.set_nodelay(true)?;
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);
    while let Some(request) = codec::read_frame::<_, S::Request>(&mut reader).await? {
        let response = service.call(request).await;
        codec::write_frame(&mut writer, &response).await?;
    }
    Ok(())
}
