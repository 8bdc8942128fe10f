//! Async UDP socket bound to one reflector.
//!
//! The socket binds an ephemeral local port and connects to the resolved
//! reflector address, so plain `send` reaches the reflector and the kernel
//! already narrows inbound traffic to it. Receives still report the source
//! address; the session compares it against [`peer`](ReflectorSocket::peer)
//! before trusting a datagram.

use std::io;
use std::net::SocketAddr;

use tokio::net::{UdpSocket, lookup_host};
use tracing::{debug, trace};

use crate::core::error::SessionError;

/// A UDP socket connected to one reflector.
///
/// All methods take `&self`; sends from the session and the receive loop
/// can overlap on a shared handle.
#[derive(Debug)]
pub struct ReflectorSocket {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl ReflectorSocket {
    /// Resolve a `host:port` reflector address, bind an ephemeral local
    /// port of the matching family, and connect.
    ///
    /// The first resolved address wins.
    pub async fn connect(reflector: &str) -> Result<Self, SessionError> {
        let peer = lookup_host(reflector)
            .await
            .map_err(|e| {
                debug!(addr = reflector, error = %e, "reflector address lookup failed");
                SessionError::Resolve {
                    addr: reflector.to_string(),
                }
            })?
            .next()
            .ok_or_else(|| SessionError::Resolve {
                addr: reflector.to_string(),
            })?;

        let bind_addr = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(peer).await?;

        debug!(local = %socket.local_addr()?, peer = %peer, "reflector socket bound");
        Ok(ReflectorSocket { socket, peer })
    }

    /// The reflector address this socket is connected to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The local address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Send one datagram to the reflector.
    pub async fn send(&self, data: &[u8]) -> io::Result<usize> {
        let len = self.socket.send(data).await?;
        trace!(len, peer = %self.peer, "datagram sent");
        Ok(len)
    }

    /// Receive one datagram, reporting its source address.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let (len, src) = self.socket.recv_from(buf).await?;
        trace!(len, src = %src, "datagram received");
        Ok((len, src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_reports_addresses() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let socket = ReflectorSocket::connect(&peer_addr.to_string())
            .await
            .unwrap();
        assert_eq!(socket.peer(), peer_addr);
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_send_and_recv_from() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let socket = ReflectorSocket::connect(&peer_addr.to_string())
            .await
            .unwrap();

        socket.send(b"PING").await.unwrap();
        let mut buf = [0u8; 16];
        let (len, from) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"PING");
        assert_eq!(from, socket.local_addr().unwrap());

        peer.send_to(b"PONG", from).await.unwrap();
        let (len, src) = socket.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"PONG");
        assert_eq!(src, peer_addr);
    }

    #[tokio::test]
    async fn test_missing_port_fails_resolution() {
        let err = ReflectorSocket::connect("127.0.0.1").await.unwrap_err();
        assert!(matches!(err, SessionError::Resolve { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_sends_share_one_handle() {
        use std::sync::Arc;

        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let socket = Arc::new(
            ReflectorSocket::connect(&peer_addr.to_string())
                .await
                .unwrap(),
        );

        let a = Arc::clone(&socket);
        let b = Arc::clone(&socket);
        let (ra, rb) = tokio::join!(a.send(b"one"), b.send(b"two"));
        ra.unwrap();
        rb.unwrap();

        let mut buf = [0u8; 16];
        let mut seen = Vec::new();
        for _ in 0..2 {
            let (len, _) = peer.recv_from(&mut buf).await.unwrap();
            seen.push(buf[..len].to_vec());
        }
        seen.sort();
        assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec()]);
    }
}
