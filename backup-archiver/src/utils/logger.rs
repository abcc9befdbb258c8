//! Logging configuration using tracing.
//!
//! Events always go to stdout. When a remote log host is configured they are
//! also forwarded as RFC 3164 syslog datagrams over UDP.

use crate::settings::RemoteLog;
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SYSLOG_FACILITY_USER: u8 = 1;
const SYSLOG_TAG: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the specified level and optional remote sink
pub fn init(level: &str, remote: Option<&RemoteLog>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let syslog_layer = match remote {
        Some(remote) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(SyslogMakeWriter::connect(remote)?)
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_level(false),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(syslog_layer)
        .init();

    Ok(())
}

/// Syslog severity for a tracing level. Errors are terminal failures for
/// this tool, so they are reported as `crit`.
fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 2,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

/// Render one RFC 3164 message: `<PRI>Mmm dd hh:mm:ss HOST TAG[PID]: MSG`.
fn format_datagram(
    severity: u8,
    timestamp: DateTime<Local>,
    hostname: &str,
    pid: u32,
    message: &str,
) -> String {
    let pri = SYSLOG_FACILITY_USER * 8 + severity;
    format!(
        "<{pri}>{} {hostname} {SYSLOG_TAG}[{pid}]: {}",
        timestamp.format("%b %e %H:%M:%S"),
        message.trim_end()
    )
}

/// Hands out one writer per event, tagged with the event's severity.
struct SyslogMakeWriter {
    socket: Arc<UdpSocket>,
    hostname: Arc<str>,
}

impl SyslogMakeWriter {
    fn connect(remote: &RemoteLog) -> anyhow::Result<Self> {
        let target = (remote.host.as_str(), remote.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow::anyhow!("log host {} did not resolve", remote.host))?;

        let bind: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind)?;
        socket.connect(target)?;

        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());

        Ok(Self {
            socket: Arc::new(socket),
            hostname: hostname.into(),
        })
    }
}

impl<'a> MakeWriter<'a> for SyslogMakeWriter {
    type Writer = SyslogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(severity(&Level::INFO))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(severity(meta.level()))
    }
}

impl SyslogMakeWriter {
    fn writer(&self, severity: u8) -> SyslogWriter {
        SyslogWriter {
            socket: Arc::clone(&self.socket),
            hostname: Arc::clone(&self.hostname),
            severity,
            buf: Vec::new(),
        }
    }
}

/// Buffers one formatted event and sends it as a single datagram on drop.
struct SyslogWriter {
    socket: Arc<UdpSocket>,
    hostname: Arc<str>,
    severity: u8,
    buf: Vec<u8>,
}

impl Write for SyslogWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let message = String::from_utf8_lossy(&self.buf);
        let datagram = format_datagram(
            self.severity,
            Local::now(),
            &self.hostname,
            std::process::id(),
            &message,
        );
        // A lost datagram must not take the run down with it.
        let _ = self.socket.send(datagram.as_bytes());
    }
}
