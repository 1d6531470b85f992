use crate::commands::request::Request;
use crate::shared::sentence;
use crate::shared::session::{self, ExchangeSettings, PortOpener};
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

// What happens to the rest of a batch when one entry fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    // Abort on the first failure.
    FailFast,
    // Log the failure, continue with the next entry, report at the end.
    KeepGoing,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub settings: ExchangeSettings,
    pub policy: FailurePolicy,
}

// Print each framed sentence on its own line without touching any port.
pub fn print_sentences<W: Write>(requests: &[Request], out: &mut W) -> Result<usize> {
    for request in requests {
        writeln!(out, "{}", sentence::build(&request.fields))
            .context("writing sentence to output failed")?;
    }
    Ok(requests.len())
}

// Build and send every request in order, each through its own port session.
// Returns the number of exchanges that completed.
pub fn dispatch<O, W>(
    opener: &mut O,
    requests: &[Request],
    config: &DispatchConfig,
    running: &AtomicBool,
    out: &mut W,
) -> Result<usize>
where
    O: PortOpener,
    W: Write,
{
    let mut completed = 0_usize;
    let mut failed = 0_usize;

    for request in requests {
        let framed = sentence::build(&request.fields);

        if !running.load(Ordering::SeqCst) {
            bail!("interrupted before sending {}", request.label);
        }

        writeln!(out, "Sending {}: {framed}", request.label)
            .context("writing sentence to output failed")?;

        let result = session::send(
            opener,
            &config.port_name,
            config.baud_rate,
            &framed,
            out,
            &config.settings,
            running,
        )
        .with_context(|| format!("{} failed", request.label));

        match result {
            Ok(report) => {
                completed += 1;
                tracing::info!(
                    request = %request.label,
                    bytes = report.bytes,
                    lines = report.lines,
                    sentences = report.sentences,
                    acks = report.acks,
                    bad_checksums = report.bad_checksums,
                    "exchange complete"
                );
                if report.acks == 0 {
                    tracing::warn!(request = %request.label, "no $PERDACK seen in response");
                }
            }
            Err(err)
                if config.policy == FailurePolicy::KeepGoing && running.load(Ordering::SeqCst) =>
            {
                failed += 1;
                tracing::error!(request = %request.label, "{err:#}");
            }
            Err(err) => return Err(err),
        }
    }

    if failed > 0 {
        bail!("{failed} of {} request(s) failed", requests.len());
    }
    Ok(completed)
}
