//! Direct liveness oracles: TCP reachability and pid probes.
//!
//! Liveness is a property of the executor's reachability, not of supervisor
//! ownership; any component holding a valid endpoint can probe it directly.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::trace;

/// Connect-probe a TCP port within `timeout`.
pub async fn is_port_open(host: &str, port: u16, timeout: Duration) -> bool {
    let attempt = TcpStream::connect((host, port));
    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            trace!(target: "ward_exec::probe", host, port, error = %e, "port probe refused");
            false
        }
        Err(_) => false,
    }
}

/// Poll until the port accepts connections, with a fixed back-off.
///
/// Bounded by `attempts`; cancellable by wrapping the future in a timeout.
pub async fn wait_port_open(host: &str, port: u16, attempts: u32, backoff: Duration) -> bool {
    for _ in 0..attempts {
        if is_port_open(host, port, Duration::from_secs(1)).await {
            return true;
        }
        tokio::time::sleep(backoff).await;
    }
    false
}

/// Poll until the port stops accepting connections.
pub async fn wait_port_closed(host: &str, port: u16, attempts: u32, backoff: Duration) -> bool {
    for _ in 0..attempts {
        if !is_port_open(host, port, Duration::from_secs(1)).await {
            return true;
        }
        tokio::time::sleep(backoff).await;
    }
    false
}

/// Signal-0 probe of an OS pid.
#[cfg(unix)]
pub fn is_pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(not(unix))]
pub fn is_pid_alive(_pid: u32) -> bool {
    false
}
