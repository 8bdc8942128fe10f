//! Reflector session: connect, receive loop, bounded disconnect.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::core::constants::{DISCONNECT_WAIT, RECV_BUFFER_SIZE};
use crate::core::error::SessionError;
use crate::observer::FieldPublisher;
use crate::protocol::callsign::{Callsign, WireAddress};
use crate::protocol::packet::{self, Packet};
use crate::transport::ReflectorSocket;

use super::dispatch::FrameDispatcher;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Reflector address as `host:port`.
    pub reflector: String,
    /// Station identifier to register with.
    pub callsign: Callsign,
    /// Module selector byte; `None` lets the reflector apply its default.
    pub module: Option<u8>,
    /// Bounded wait for the reflector's disconnect acknowledgment.
    pub disconnect_wait: Duration,
}

impl SessionConfig {
    /// Configuration with no module selector and the standard 5-second
    /// disconnect bound.
    pub fn new(reflector: impl Into<String>, callsign: Callsign) -> Self {
        SessionConfig {
            reflector: reflector.into(),
            callsign,
            module: None,
            disconnect_wait: DISCONNECT_WAIT,
        }
    }
}

/// Link state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Listen request sent, no answer yet.
    Connecting,
    /// Reflector accepted the listen request.
    Connected,
    /// Disconnect sent, waiting for the acknowledgment.
    Disconnecting,
    /// Link closed on our side.
    Closed,
    /// Reflector rejected the listen request.
    Rejected,
}

impl LinkState {
    /// Whether the session is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LinkState::Closed | LinkState::Rejected)
    }
}

/// How [`Session::shutdown`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The reflector acknowledged the disconnect inside the bounded wait.
    Acknowledged,
    /// The bound elapsed without an acknowledgment. Not an error; the
    /// link is closed regardless.
    TimedOut,
    /// The session was already torn down, e.g. after a rejection.
    AlreadyClosed,
}

/// A listen-only reflector session.
///
/// [`connect`](Session::connect) sends the listen request and spawns the
/// receive loop. From then on the loop answers keepalive probes and feeds
/// voice frames to the dispatcher until [`shutdown`](Session::shutdown)
/// runs the bounded disconnect sequence, or the reflector rejects the
/// request and the loop tears itself down.
pub struct Session {
    socket: Arc<ReflectorSocket>,
    callsign: Callsign,
    address: WireAddress,
    module: Option<u8>,
    disconnect_wait: Duration,
    state: Arc<RwLock<LinkState>>,
    cancel: CancellationToken,
    recv_task: Option<JoinHandle<()>>,
    disc_rx: Option<oneshot::Receiver<()>>,
    publisher: FieldPublisher,
}

impl Session {
    /// Resolve the reflector, send the listen request, and start the
    /// receive loop.
    ///
    /// Returns the session and the rejection signal: a one-shot that
    /// fires if the reflector answers with a rejection. By the time it
    /// fires the receive loop has already sent a disconnect and torn
    /// itself down; the caller only maps it to a failure exit.
    pub async fn connect(
        config: SessionConfig,
        dispatcher: FrameDispatcher,
        publisher: FieldPublisher,
    ) -> Result<(Self, oneshot::Receiver<()>), SessionError> {
        let address = config.callsign.encode()?;
        let socket = Arc::new(ReflectorSocket::connect(&config.reflector).await?);

        info!(
            reflector = %socket.peer(),
            callsign = %config.callsign,
            module = ?config.module.map(|m| m as char),
            "sending listen request"
        );
        socket
            .send(&packet::listen_request(&address, config.module))
            .await?;
        publisher.status(format!("Connecting to {}", socket.peer()));

        let state = Arc::new(RwLock::new(LinkState::Connecting));
        let cancel = CancellationToken::new();
        let (disc_tx, disc_rx) = oneshot::channel();
        let (rejected_tx, rejected_rx) = oneshot::channel();

        let receive = ReceiveLoop {
            socket: Arc::clone(&socket),
            address,
            state: Arc::clone(&state),
            cancel: cancel.clone(),
            publisher: publisher.clone(),
            dispatcher,
            disc_tx: Some(disc_tx),
            rejected_tx: Some(rejected_tx),
        };
        let recv_task = tokio::spawn(receive.run());

        let session = Session {
            socket,
            callsign: config.callsign,
            address,
            module: config.module,
            disconnect_wait: config.disconnect_wait,
            state,
            cancel,
            recv_task: Some(recv_task),
            disc_rx: Some(disc_rx),
            publisher,
        };
        Ok((session, rejected_rx))
    }

    /// Current link state.
    pub async fn state(&self) -> LinkState {
        *self.state.read().await
    }

    /// Whether the reflector has accepted the listen request.
    pub async fn is_connected(&self) -> bool {
        self.state().await == LinkState::Connected
    }

    /// The station identifier this session registered with.
    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    /// The module selector sent with the listen request, if any.
    pub fn module(&self) -> Option<u8> {
        self.module
    }

    /// The reflector address.
    pub fn peer(&self) -> SocketAddr {
        self.socket.peer()
    }

    /// Run the bounded disconnect sequence.
    ///
    /// Sends the disconnect packet and waits for the reflector's
    /// acknowledgment, bounded by the configured wait. The receive loop
    /// keeps draining during the wait so the acknowledgment can end it
    /// early; once the wait resolves the loop is cancelled and the
    /// session moves to [`LinkState::Closed`]. A send failure is logged
    /// and the wait still runs. Calling this on a finished session
    /// returns [`ShutdownOutcome::AlreadyClosed`].
    pub async fn shutdown(&mut self) -> ShutdownOutcome {
        if self.state().await.is_terminal() {
            self.stop_receive_loop().await;
            return ShutdownOutcome::AlreadyClosed;
        }
        let Some(disc_rx) = self.disc_rx.take() else {
            self.stop_receive_loop().await;
            return ShutdownOutcome::AlreadyClosed;
        };

        *self.state.write().await = LinkState::Disconnecting;
        self.publisher.status("Disconnecting");
        if let Err(e) = self.socket.send(&packet::disconnect(&self.address)).await {
            warn!(error = %e, "disconnect send failed");
            self.publisher.error(format!("failed to send disconnect: {e}"));
        }

        let outcome = match timeout(self.disconnect_wait, disc_rx).await {
            Ok(Ok(())) => {
                info!("reflector acknowledged disconnect");
                ShutdownOutcome::Acknowledged
            }
            Ok(Err(_)) => {
                debug!("receive loop ended without a disconnect acknowledgment");
                ShutdownOutcome::TimedOut
            }
            Err(_) => {
                info!(
                    wait = ?self.disconnect_wait,
                    "no disconnect acknowledgment, closing anyway"
                );
                ShutdownOutcome::TimedOut
            }
        };

        self.stop_receive_loop().await;
        *self.state.write().await = LinkState::Closed;
        self.publisher.status("Link closed");
        outcome
    }

    async fn stop_receive_loop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.recv_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "receive loop task failed");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Receive-loop half of a session. Owns the dispatcher, and through it
/// the vocoder and audio sink; they are released when the loop ends.
struct ReceiveLoop {
    socket: Arc<ReflectorSocket>,
    address: WireAddress,
    state: Arc<RwLock<LinkState>>,
    cancel: CancellationToken,
    publisher: FieldPublisher,
    dispatcher: FrameDispatcher,
    disc_tx: Option<oneshot::Sender<()>>,
    rejected_tx: Option<oneshot::Sender<()>>,
}

impl ReceiveLoop {
    async fn run(mut self) {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => received,
            };
            match received {
                Ok((len, src)) => {
                    if src != self.socket.peer() {
                        warn!(src = %src, "packet from unknown source dropped");
                        self.publisher
                            .error(format!("received packet from unknown source: {src}"));
                        continue;
                    }
                    if !self.handle_datagram(&buf[..len]).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "socket read failed");
                    self.publisher.error(format!("failed to read from socket: {e}"));
                }
            }
        }
        debug!("receive loop stopped");
    }

    /// Returns `false` when the loop must stop (rejection).
    async fn handle_datagram(&mut self, data: &[u8]) -> bool {
        match packet::classify(data) {
            Ok(Some(Packet::Ping)) => self.handle_ping().await,
            Ok(Some(Packet::Accept)) => self.handle_accept().await,
            Ok(Some(Packet::Reject)) => {
                self.handle_reject().await;
                return false;
            }
            Ok(Some(Packet::Disconnect)) => self.handle_disconnect(),
            Ok(Some(Packet::Stream(frame))) => self.dispatcher.dispatch(&frame),
            Ok(None) => trace!(len = data.len(), "unclassified datagram ignored"),
            Err(e) => {
                warn!(error = %e, "stream frame dropped");
                self.publisher.error(e.to_string());
            }
        }
        true
    }

    async fn handle_ping(&self) {
        trace!("keepalive probe answered");
        if let Err(e) = self.socket.send(&packet::pong(&self.address)).await {
            warn!(error = %e, "keepalive reply failed");
            self.publisher
                .error(format!("failed to send keepalive reply: {e}"));
        }
    }

    async fn handle_accept(&self) {
        info!("listen request accepted");
        *self.state.write().await = LinkState::Connected;
        self.publisher.status("Connection accepted by reflector");
    }

    async fn handle_reject(&mut self) {
        warn!("listen request rejected");
        self.publisher.status("Connection rejected by reflector");
        if let Err(e) = self.socket.send(&packet::disconnect(&self.address)).await {
            debug!(error = %e, "disconnect send after rejection failed");
        }
        *self.state.write().await = LinkState::Rejected;
        if let Some(tx) = self.rejected_tx.take() {
            let _ = tx.send(());
        }
    }

    fn handle_disconnect(&mut self) {
        info!("reflector sent disconnect");
        self.publisher.status("Peer disconnected");
        if let Some(tx) = self.disc_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_disconnect_wait_is_five_seconds() {
        let config = SessionConfig::new("example.org:17000", Callsign::new("N0CALL"));
        assert_eq!(config.disconnect_wait, Duration::from_secs(5));
        assert_eq!(config.module, None);
    }

    #[test]
    fn test_link_state_terminal_set() {
        assert!(!LinkState::Connecting.is_terminal());
        assert!(!LinkState::Connected.is_terminal());
        assert!(!LinkState::Disconnecting.is_terminal());
        assert!(LinkState::Closed.is_terminal());
        assert!(LinkState::Rejected.is_terminal());
    }
}
