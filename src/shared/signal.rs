use anyhow::{Context, Result};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const FORCED_EXIT_STATUS: i32 = 130;

// The first Ctrl-C clears the returned flag; the drain loop polls it between read
// timeouts and unwinds, releasing the port. A second Ctrl-C exits immediately.
pub fn install_interrupt_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        if flag.swap(false, Ordering::SeqCst) {
            tracing::warn!("interrupt received; finishing current read (Ctrl-C again to force exit)");
        } else {
            process::exit(FORCED_EXIT_STATUS);
        }
    })
    .context("installing Ctrl-C handler failed")?;
    Ok(running)
}
