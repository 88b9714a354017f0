use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use crate::error::Result;

/// A connected debug stream — implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// Currently always a TCP connection to the payload server; the enum
/// leaves room for other stream transports (e.g. USB serial bridges).
pub struct DebugStream {
    inner: DebugStreamInner,
}

enum DebugStreamInner {
    Tcp(TcpStream),
}

impl Read for DebugStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DebugStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for DebugStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DebugStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DebugStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl DebugStream {
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: DebugStreamInner::Tcp(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            DebugStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            DebugStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            DebugStreamInner::Tcp(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self::from_tcp(cloned))
            }
        }
    }

    /// Address of the connected console.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        match &self.inner {
            DebugStreamInner::Tcp(stream) => stream.peer_addr().map_err(Into::into),
        }
    }

    /// Shut down both directions of the connection.
    ///
    /// Idempotent: closing an already-closed stream is not an error.
    pub fn close(&self) -> Result<()> {
        match &self.inner {
            DebugStreamInner::Tcp(stream) => match stream.shutdown(Shutdown::Both) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
                Err(err) => Err(err.into()),
            },
        }
    }
}

impl std::fmt::Debug for DebugStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            DebugStreamInner::Tcp(stream) => f
                .debug_struct("DebugStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}
