use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::DebugStream;

/// Port the payload server listens on.
pub const DEFAULT_PORT: u16 = 744;

/// Connect to the payload server (blocking).
///
/// `host` is an IP address or hostname; the connection goes to
/// [`DEFAULT_PORT`] unless `port` says otherwise.
pub fn connect(host: &str, port: u16) -> Result<DebugStream> {
    let addr = (host, port);
    let stream = TcpStream::connect(addr).map_err(|e| TransportError::Connect {
        addr: format!("{host}:{port}"),
        source: e,
    })?;
    configure(stream, host, port)
}

/// Connect with an upper bound on how long connection establishment may take.
pub fn connect_timeout(host: &str, port: u16, timeout: Duration) -> Result<DebugStream> {
    // TcpStream::connect_timeout takes a single SocketAddr, so resolve first.
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::Connect {
            addr: format!("{host}:{port}"),
            source: e,
        })?;
    let addr = addrs.next().ok_or_else(|| TransportError::NoAddress {
        addr: format!("{host}:{port}"),
    })?;

    let stream =
        TcpStream::connect_timeout(&addr, timeout).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
    configure(stream, host, port)
}

fn configure(stream: TcpStream, host: &str, port: u16) -> Result<DebugStream> {
    // Command packets are 12 bytes; don't let Nagle hold them back.
    stream.set_nodelay(true)?;
    info!(host, port, "connected to debug payload server");
    debug!(peer = ?stream.peer_addr().ok(), "transport ready");
    Ok(DebugStream::from_tcp(stream))
}
