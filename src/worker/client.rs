//! Worker-side connection to the coordinator
//!
//! A [`RemoteCoordinator`] owns exactly one TCP connection and issues one
//! call at a time over it. Sessions never share one: each session opens
//! its own and recreates it after a transport failure.

use crate::protocol::{read_frame, write_frame, CrawlTask, ProtocolError, Request, Response};
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Errors raised while talking to the coordinator
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Coordinator closed the connection")]
    Disconnected,

    #[error("Codec error: {0}")]
    Codec(#[from] ProtocolError),

    #[error("Coordinator rejected the call: {0}")]
    Rejected(String),

    #[error("Unexpected response to {method}: {response:?}")]
    UnexpectedResponse {
        method: &'static str,
        response: Response,
    },
}

impl ClientError {
    /// True when the connection itself is unusable
    ///
    /// A rejection is an answer, so the connection is still fine.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// The three calls a worker session makes
///
/// Implemented over TCP by [`RemoteCoordinator`]; sessions are generic
/// over it so their loop can be driven without a live coordinator.
#[async_trait]
pub trait CoordinatorClient: Send {
    async fn request_task(&mut self, worker_id: &str) -> Result<CrawlTask, ClientError>;

    async fn submit_result(
        &mut self,
        worker_id: &str,
        source_url: &str,
        descriptor: &str,
        links: Vec<String>,
    ) -> Result<(), ClientError>;

    async fn get_config(&mut self) -> Result<u32, ClientError>;

    /// Drops the current connection and opens a fresh one
    async fn reconnect(&mut self) -> Result<(), ClientError>;
}

/// One connection to the coordinator's TCP endpoint
pub struct RemoteCoordinator {
    address: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RemoteCoordinator {
    pub async fn connect(address: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        let (read_half, writer) = stream.into_split();

        Ok(Self {
            address: address.to_string(),
            reader: BufReader::new(read_half),
            writer,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn call(&mut self, request: &Request) -> Result<Response, ClientError> {
        write_frame(&mut self.writer, request).await?;

        match read_frame(&mut self.reader).await? {
            Some(Response::Error { message }) => Err(ClientError::Rejected(message)),
            Some(response) => Ok(response),
            None => Err(ClientError::Disconnected),
        }
    }
}

#[async_trait]
impl CoordinatorClient for RemoteCoordinator {
    async fn request_task(&mut self, worker_id: &str) -> Result<CrawlTask, ClientError> {
        let request = Request::RequestTask {
            worker_id: worker_id.to_string(),
        };

        match self.call(&request).await? {
            Response::Task { task } => Ok(task),
            response => Err(ClientError::UnexpectedResponse {
                method: request.method(),
                response,
            }),
        }
    }

    async fn submit_result(
        &mut self,
        worker_id: &str,
        source_url: &str,
        descriptor: &str,
        links: Vec<String>,
    ) -> Result<(), ClientError> {
        let request = Request::SubmitResult {
            worker_id: worker_id.to_string(),
            source_url: source_url.to_string(),
            descriptor: descriptor.to_string(),
            links,
        };

        match self.call(&request).await? {
            Response::Ack => Ok(()),
            response => Err(ClientError::UnexpectedResponse {
                method: request.method(),
                response,
            }),
        }
    }

    async fn get_config(&mut self) -> Result<u32, ClientError> {
        let request = Request::GetConfig;

        match self.call(&request).await? {
            Response::Config { threads } => Ok(threads),
            response => Err(ClientError::UnexpectedResponse {
                method: request.method(),
                response,
            }),
        }
    }

    async fn reconnect(&mut self) -> Result<(), ClientError> {
        *self = Self::connect(&self.address).await?;
        Ok(())
    }
}
