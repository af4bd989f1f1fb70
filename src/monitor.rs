// Reachability monitor.
// A dedicated thread probes the configured host and publishes a boolean
// to the UI layer. Observational only: the result never gates or cancels
// navigation.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tauri::{AppHandle, Emitter};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct NetworkMonitor {
    online: Arc<AtomicBool>,
}

impl NetworkMonitor {
    /// Start probing the host named by `address` every `interval`. Emits a
    /// `network-status` event whenever reachability flips. If no probe
    /// target can be derived the monitor stays optimistically online.
    pub fn spawn(app: AppHandle, address: &str, interval: Duration) -> Self {
        let online = Arc::new(AtomicBool::new(true));

        let Some((host, port)) = probe_target(address) else {
            eprintln!("[Monitor] No probe target in '{}', monitor disabled", address);
            return NetworkMonitor { online };
        };

        let flag = online.clone();
        let spawned = std::thread::Builder::new()
            .name("net-monitor".to_string())
            .spawn(move || loop {
                let reachable = probe(&host, port);
                if flag.swap(reachable, Ordering::SeqCst) != reachable {
                    println!(
                        "[Monitor] {}:{} is now {}",
                        host,
                        port,
                        if reachable { "reachable" } else { "unreachable" }
                    );
                    let _ = app.emit("network-status", reachable);
                }
                std::thread::sleep(interval);
            });
        if let Err(e) = spawned {
            eprintln!("[Monitor] Failed to start monitor thread: {}", e);
        }

        NetworkMonitor { online }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

fn probe(host: &str, port: u16) -> bool {
    let Ok(mut addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    addrs
        .next()
        .map(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
        .unwrap_or(false)
}

/// Host and port to probe for an address, using the scheme's default port
/// when none is explicit. `None` for hostless addresses (about:, data:).
pub fn probe_target(address: &str) -> Option<(String, u16)> {
    let url = Url::parse(address).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}
