//! Client side of the transport.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::BufStream;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use crate::codec;
use crate::error::{ProtocolError, ProtocolResult};

/// One persistent connection to a remote `Receiver`.
///
/// Calls are serialized on the connection. If a call fails, the stream is
/// dropped and the next call dials again; the failed call itself is never
/// retried.
pub struct Sender<Req, Resp> {
    addr: String,
    timeout: Option<Duration>,
    stream: Mutex<Option<BufStream<TcpStream>>>,
    _marker: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> Sender<Req, Resp>
where
    Req: Serialize + Sync,
    Resp: DeserializeOwned + Send,
{
    /// Dial `addr`. `timeout` bounds the dial and every later call.
    pub async fn connect(addr: impl Into<String>, timeout: Option<Duration>) -> ProtocolResult<Self> {
        let addr = addr.into();
        let stream = with_timeout(&addr, timeout, open(&addr)).await?;
        Ok(Self {
            addr,
            timeout,
            stream: Mutex::new(Some(stream)),
            _marker: PhantomData,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one request and wait for its response.
    pub async fn call(&self, request: &Req) -> ProtocolResult<Resp> {
        let mut slot = self.stream.lock().await;
        let result = with_timeout(&self.addr, self.timeout, self.exchange(&mut slot, request)).await;
        if result.is_err() {
            *slot = None;
        }
        result
    }

    async fn exchange(
        &self,
        slot: &mut Option<BufStream<TcpStream>>,
        request: &Req,
    ) -> ProtocolResult<Resp> {
        if slot.is_none() {
            debug!(addr = %self.addr, "reconnecting");
            *slot = Some(open(&self.addr).await?);
        }
        let stream = slot
            .as_mut()
            .ok_or_else(|| ProtocolError::ConnectionClosed(self.addr.clone()))?;
        codec::write_frame(stream, request).await?;
        codec::read_frame(stream)
            .await?
            .ok_or_else(|| ProtocolError::ConnectionClosed(self.addr.clone()))
    }
}

async fn open(addr: &str) -> ProtocolResult<BufStream<TcpStream>> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(BufStream::new(stream))
}

async fn with_timeout<T>(
    addr: &str,
    timeout: Option<Duration>,
    fut: impl std::future::Future<Output = ProtocolResult<T>>,
) -> ProtocolResult<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| {
                Err(ProtocolError::Timeout {
                    addr: addr.to_string(),
                    timeout: limit,
                })
            }),
        None => fut.await,
    }
}
