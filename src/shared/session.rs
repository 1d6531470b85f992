use crate::shared::nmea::ResponseMonitor;
use crate::shared::sentence::TERMINATOR;
use anyhow::{Context, Result, bail};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

pub const DEFAULT_SETTLE_MS: u64 = 500;
pub const DEFAULT_READ_CHUNK_BYTES: usize = 128;
pub const DEFAULT_MAX_LINES: usize = 10;
pub const DEFAULT_POLL_MS: u64 = 250;

// Timing and sizing of one write-then-drain exchange.
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    pub settle: Duration,
    pub read_chunk_bytes: usize,
    pub max_lines: usize,
    pub poll: Duration,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
            max_lines: DEFAULT_MAX_LINES,
            poll: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExchangeReport {
    pub bytes: usize,
    pub lines: usize,
    pub sentences: usize,
    pub acks: usize,
    pub bad_checksums: usize,
}

// Source of port handles. The system implementation opens real devices; tests script them.
pub trait PortOpener {
    type Port: Read + Write;

    fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<Self::Port>;
}

// Opens devices through `serialport`. The read timeout is only a poll tick for interrupt checks.
pub struct SystemPorts {
    pub poll: Duration,
}

impl PortOpener for SystemPorts {
    type Port = Box<dyn SerialPort>;

    fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<Self::Port> {
        serialport::new(port_name, baud_rate)
            .timeout(self.poll)
            .open()
            .with_context(|| format!("opening serial port failed: {port_name} @ {baud_rate}"))
    }
}

// Exclusively owned port for a single exchange; dropping it releases the device.
pub struct PortSession<P: Read + Write> {
    port: P,
    name: String,
}

impl<P: Read + Write> PortSession<P> {
    pub fn open<O>(opener: &mut O, port_name: &str, baud_rate: u32) -> Result<Self>
    where
        O: PortOpener<Port = P>,
    {
        let port = opener.open(port_name, baud_rate)?;
        tracing::debug!(port = %port_name, baud_rate, "serial port opened");
        Ok(Self {
            port,
            name: port_name.to_string(),
        })
    }

    // Write one framed sentence, wait for the receiver to settle, then echo
    // response bytes to `out` until `max_lines` newlines have been seen.
    pub fn exchange<W: Write>(
        &mut self,
        sentence: &str,
        out: &mut W,
        settings: &ExchangeSettings,
        running: &AtomicBool,
    ) -> Result<ExchangeReport> {
        let framed = format!("{sentence}{TERMINATOR}");
        self.port
            .write_all(framed.as_bytes())
            .context("writing sentence to serial port failed")?;
        self.port
            .flush()
            .context("flushing sentence to serial port failed")?;
        tracing::debug!(port = %self.name, sentence, "sentence written");

        thread::sleep(settings.settle);

        let mut buffer = vec![0_u8; settings.read_chunk_bytes.max(1)];
        let mut monitor = ResponseMonitor::new();
        let mut report = ExchangeReport::default();

        while report.lines < settings.max_lines {
            if !running.load(Ordering::SeqCst) {
                bail!("interrupted while waiting for a response on {}", self.name);
            }

            match self.port.read(&mut buffer) {
                // Some drivers report an empty read instead of a timeout.
                Ok(0) => thread::sleep(settings.poll),
                Ok(size) => {
                    let chunk = &buffer[..size];
                    out.write_all(chunk).context("echoing response failed")?;
                    out.flush().context("echoing response failed")?;
                    report.bytes += size;
                    report.lines += chunk.iter().filter(|&&byte| byte == b'\n').count();
                    monitor.ingest(chunk);
                }
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                    ) => {}
                Err(err) => {
                    return Err(err).context("reading response from serial port failed");
                }
            }
        }

        report.sentences = monitor.sentences;
        report.acks = monitor.acks.len();
        report.bad_checksums = monitor.bad_checksums;
        Ok(report)
    }
}

impl<P: Read + Write> Drop for PortSession<P> {
    fn drop(&mut self) {
        tracing::debug!(port = %self.name, "serial port released");
    }
}

// Open, exchange, release. The session is dropped on every return path.
pub fn send<O, W>(
    opener: &mut O,
    port_name: &str,
    baud_rate: u32,
    sentence: &str,
    out: &mut W,
    settings: &ExchangeSettings,
    running: &AtomicBool,
) -> Result<ExchangeReport>
where
    O: PortOpener,
    W: Write,
{
    let mut session = PortSession::open(opener, port_name, baud_rate)?;
    session.exchange(sentence, out, settings, running)
}
