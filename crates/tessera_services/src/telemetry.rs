//! Telemetry sink: ships world stats to an external collector over UDP.
//!
//! Each publish becomes one datagram holding
//! `{"event": "created" | "frame", "stats": { ... }}`. The socket is
//! non-blocking and send failures are dropped, so a missing collector never
//! stalls the frame loop.

use serde::Serialize;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use tessera_core::ecs::{StatsEvent, StatsObserver, StatsSnapshot};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry address {address:?} did not resolve")]
    Unresolved { address: String },
    #[error("telemetry socket setup failed: {0}")]
    Socket(#[from] std::io::Error),
}

#[derive(Serialize)]
struct Datagram<'a> {
    event: StatsEvent,
    stats: &'a StatsSnapshot,
}

/// [`StatsObserver`] that sends every snapshot to a UDP collector.
#[derive(Debug)]
pub struct UdpStatsSink {
    socket: UdpSocket,
    target: SocketAddr,
    sent: u64,
}

impl UdpStatsSink {
    /// Bind an ephemeral local port and connect it to `address`.
    pub fn connect(address: impl ToSocketAddrs + std::fmt::Debug) -> Result<Self, TelemetryError> {
        let target = address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TelemetryError::Unresolved {
                address: format!("{address:?}"),
            })?;
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;
        socket.set_nonblocking(true)?;
        tracing::info!(%target, "telemetry sink connected");
        Ok(Self {
            socket,
            target,
            sent: 0,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Datagrams handed to the socket so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl StatsObserver for UdpStatsSink {
    fn publish(&mut self, event: StatsEvent, snapshot: &StatsSnapshot) {
        let payload = match serde_json::to_vec(&Datagram {
            event,
            stats: snapshot,
        }) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(%err, "failed to encode stats");
                return;
            }
        };
        match self.socket.send(&payload) {
            Ok(_) => self.sent += 1,
            Err(err) => tracing::debug!(%err, target = %self.target, "stats datagram dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;
    use tessera_core::ecs::World;

    fn collector() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        socket
    }

    fn receive(socket: &UdpSocket) -> Value {
        let mut buf = [0u8; 65536];
        let n = socket.recv(&mut buf).unwrap();
        serde_json::from_slice(&buf[..n]).unwrap()
    }

    #[test]
    fn attach_sends_created_event() {
        let collector = collector();
        let sink = UdpStatsSink::connect(collector.local_addr().unwrap()).unwrap();

        let mut world = World::with_id("telemetry-test");
        world.attach_observer(Box::new(sink));

        let message = receive(&collector);
        assert_eq!(message["event"], "created");
        assert_eq!(message["stats"]["world_id"], "telemetry-test");
        assert_eq!(message["stats"]["entity_count"], 0);
    }

    #[test]
    fn cleanup_sends_frame_event() {
        let collector = collector();
        let sink = UdpStatsSink::connect(collector.local_addr().unwrap()).unwrap();

        let mut world = World::new();
        world.attach_observer(Box::new(sink));
        let _ = receive(&collector);

        let entity = world.create_entity();
        world.add_tag(entity, "telemetry_marker");
        world.cleanup();

        let message = receive(&collector);
        assert_eq!(message["event"], "frame");
        assert_eq!(message["stats"]["entity_count"], 1);
        assert_eq!(message["stats"]["component_count"]["telemetry_marker"], 1);
    }

    #[test]
    fn missing_collector_is_not_an_error() {
        // Nothing listens on the target port; sends must not fail the caller
        let port = UdpSocket::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let mut sink = UdpStatsSink::connect(port).unwrap();
        let snapshot = World::new().stats().snapshot(None);
        sink.publish(StatsEvent::Frame, &snapshot);
        sink.publish(StatsEvent::Frame, &snapshot);
        assert_eq!(sink.target(), port);
    }

    #[test]
    fn unresolvable_address_is_reported() {
        let err = UdpStatsSink::connect("not a socket address").unwrap_err();
        assert!(matches!(err, TelemetryError::Socket(_) | TelemetryError::Unresolved { .. }));
    }
}
