//! Listener binding.
//!
//! The listen address may be a host name (`localhost:8181`), so it is
//! resolved through the system resolver and the first address wins.

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Resolve `listen` to the socket address the server will bind.
pub async fn resolve_listen_addr(listen: &str) -> io::Result<SocketAddr> {
    tokio::net::lookup_host(listen).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to any address", listen),
        )
    })
}

/// Bind a plain TCP listener on `listen`.
pub async fn bind(listen: &str) -> io::Result<TcpListener> {
    let addr = resolve_listen_addr(listen).await?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}
