//! TCP front end for the coordinator
//!
//! Each accepted connection gets its own task that reads one request line
//! at a time, dispatches it against the shared [`Coordinator`] and writes
//! exactly one response line back. Closing the shutdown channel stops the
//! accept loop and drops every open connection.

use crate::coordinator::state::{CallError, Coordinator};
use crate::protocol::{decode, read_line, write_frame, ProtocolError, Request, Response};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Answers one decoded request
pub fn dispatch(coordinator: &Coordinator, request: Request) -> Response {
    match request {
        Request::RequestTask { worker_id } => match coordinator.request_task(&worker_id) {
            Ok(task) => Response::Task { task },
            Err(e) => call_error(e),
        },
        Request::SubmitResult {
            worker_id,
            source_url,
            descriptor,
            links,
        } => match coordinator.submit_result(&worker_id, &source_url, &descriptor, &links) {
            Ok(_) => Response::Ack,
            Err(e) => call_error(e),
        },
        Request::GetConfig => Response::Config {
            threads: coordinator.threads_per_worker(),
        },
    }
}

fn call_error(e: CallError) -> Response {
    Response::Error {
        message: e.to_string(),
    }
}

/// Bound listener plus the coordinator it serves
pub struct CoordinatorServer {
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
}

impl CoordinatorServer {
    pub async fn bind(address: &str, coordinator: Arc<Coordinator>) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self {
            listener,
            coordinator,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` flips to `true` (or its sender drops)
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) {
        let mut connections = JoinSet::new();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        connections.spawn(handle_connection(
                            stream,
                            peer,
                            self.coordinator.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            "Coordinator transport closed, dropping {} open connection(s)",
            connections.len()
        );
        connections.shutdown().await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    coordinator: Arc<Coordinator>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        if *shutdown.borrow() {
            break;
        }

        let line = tokio::select! {
            line = read_line(&mut reader) => line,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        };

        let response = match line {
            Ok(Some(line)) => match decode::<Request>(&line) {
                Ok(request) => {
                    tracing::trace!("{} from {}", request.method(), peer);
                    dispatch(&coordinator, request)
                }
                Err(e) => {
                    tracing::warn!("Malformed request from {}: {}", peer, e);
                    Response::Error {
                        message: e.to_string(),
                    }
                }
            },
            Ok(None) => {
                tracing::debug!("Connection from {} closed", peer);
                break;
            }
            Err(ProtocolError::FrameTooLarge(len)) => {
                tracing::warn!("Oversized request ({} bytes) from {}", len, peer);
                Response::Error {
                    message: ProtocolError::FrameTooLarge(len).to_string(),
                }
            }
            Err(e) => {
                tracing::debug!("Connection from {} failed: {}", peer, e);
                break;
            }
        };

        if let Err(e) = write_frame(&mut write_half, &response).await {
            tracing::debug!("Failed to answer {}: {}", peer, e);
            break;
        }
    }
}
