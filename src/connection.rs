use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ChatError, HandshakeError};
use crate::message::Message;
use crate::server::Server;
use crate::session::Session;

/// Typestate for one client connection:
///
/// `Connection<AwaitingName>` → `Connection<Registered>`
///
/// Only a registered connection has a session and can run the read loop, so
/// chat traffic from a client that never passed the handshake cannot reach
/// the relay.
pub struct Connection<S> {
    server: Arc<Server>,
    peer: SocketAddr,
    reader: BufReader<OwnedReadHalf>,
    state: S,
}

/// Accepted, no name yet. The write half is still owned directly.
pub struct AwaitingName {
    writer: OwnedWriteHalf,
}

/// In the registry; outbound traffic goes through the writer task.
pub struct Registered {
    session: Arc<Session>,
    writer_task: JoinHandle<()>,
}

impl Connection<AwaitingName> {
    pub fn new(server: Arc<Server>, stream: TcpStream) -> Result<Self, ChatError> {
        let peer = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            server,
            peer,
            reader: BufReader::new(reader),
            state: AwaitingName { writer },
        })
    }

    /// Read the name line and try to register it. Consumes the connection:
    /// a rejected client gets its error line and the socket is closed.
    pub async fn handshake(mut self) -> Result<Connection<Registered>, ChatError> {
        let mut buf = Vec::new();
        let Some(name) = read_text_line(&mut self.reader, &mut buf).await? else {
            return Err(HandshakeError::Disconnected.into());
        };

        let mut writer = self.state.writer;
        match self.server.join(&name) {
            Ok((session, rx)) => {
                debug!(peer = %self.peer, session = %session.id, "handshake complete");
                // Written ahead of the queue so they never count against its capacity.
                for line in Message::greeting(&session.name) {
                    if let Err(e) = writer.write_all(format!("{line}\n").as_bytes()).await {
                        self.server.teardown(&session);
                        return Err(e.into());
                    }
                }
                let writer_task = tokio::spawn(write_outbound(Arc::clone(&session), rx, writer));
                Ok(Connection {
                    server: self.server,
                    peer: self.peer,
                    reader: self.reader,
                    state: Registered {
                        session,
                        writer_task,
                    },
                })
            }
            Err(rejection) => {
                if let Some(reply) = rejection.reply() {
                    writer.write_all(format!("{reply}\n").as_bytes()).await?;
                }
                let _ = writer.shutdown().await;
                Err(rejection.into())
            }
        }
    }
}

impl Connection<Registered> {
    /// Serve the client until it disconnects, its socket fails, or another
    /// part of the relay flags it as dead. Teardown always runs.
    pub async fn run(mut self) -> Result<(), ChatError> {
        let result = self.read_loop().await;

        self.server.teardown(&self.state.session);
        self.state.writer_task.abort();
        debug!(peer = %self.peer, session = %self.state.session.id, "connection closed");

        result
    }

    async fn read_loop(&mut self) -> Result<(), ChatError> {
        let session = Arc::clone(&self.state.session);
        let mut buf = Vec::new();

        loop {
            let line = tokio::select! {
                read = read_text_line(&mut self.reader, &mut buf) => read?,
                _ = session.killed() => {
                    info!(session = %session.id, name = %session.name, "dropping unresponsive client");
                    return Ok(());
                }
            };
            let Some(line) = line else {
                return Ok(()); // client disconnected
            };

            self.server.handle_line(&session, &line);
        }
    }
}

/// Read one line without its terminator, or `None` at end of stream.
///
/// Bytes that are not UTF-8 are replaced with U+FFFD instead of failing the
/// connection. Line length is not capped.
async fn read_text_line(
    reader: &mut BufReader<OwnedReadHalf>,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(buf);
    Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
}

/// Drain a session's outbound queue onto its socket.
async fn write_outbound(
    session: Arc<Session>,
    mut rx: mpsc::Receiver<String>,
    mut writer: OwnedWriteHalf,
) {
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!(session = %session.id, error = %e, "write failed");
            session.kill();
            break;
        }
    }
}

/// Run one client from accept to teardown.
pub async fn handle_client(server: Arc<Server>, stream: TcpStream) -> Result<(), ChatError> {
    Connection::<AwaitingName>::new(server, stream)?
        .handshake()
        .await?
        .run()
        .await
}

/// Accept connections forever, one task per client.
pub async fn serve(listener: TcpListener, server: Arc<Server>) -> Result<(), ChatError> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!(peer = %peer, "client connected");

        let server = Arc::clone(&server);
        tokio::spawn(async move {
            match handle_client(server, stream).await {
                Ok(()) => info!(peer = %peer, "client disconnected"),
                Err(ChatError::Handshake(reason)) => {
                    info!(peer = %peer, reason = %reason, "handshake rejected")
                }
                Err(e) => warn!(peer = %peer, error = %e, "client error"),
            }
        });
    }
}
