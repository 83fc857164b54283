mod event;
pub mod msg;

use std::{io, path::Path};

pub use event::{NamedEvent, Reset};

/// Creates both signals of the worker's request protocol.
///
/// The trigger is manual-reset: it stays set until whoever serves the request
/// resets it. The completion is auto-reset: it's consumed by whoever waits on
/// it. Both start out non-signaled.
///
/// # Arguments
/// * `dir` - The directory the signals live in, created if missing.
/// * `trigger` - The name of the trigger signal.
/// * `completion` - The name of the completion signal.
///
/// # Returns
/// The trigger and completion signals, in that order.
pub fn create_signals<P: AsRef<Path>>(
    dir: P,
    trigger: &str,
    completion: &str,
) -> io::Result<(NamedEvent, NamedEvent)> {
    let dir = dir.as_ref();
    Ok((
        NamedEvent::create(dir, trigger, Reset::Manual)?,
        NamedEvent::create(dir, completion, Reset::Auto)?,
    ))
}

/// Opens both signals of the worker's request protocol without touching their state.
///
/// Meant for the requesting side, see `create_signals`.
pub fn open_signals<P: AsRef<Path>>(
    dir: P,
    trigger: &str,
    completion: &str,
) -> (NamedEvent, NamedEvent) {
    let dir = dir.as_ref();
    (
        NamedEvent::open(dir, trigger, Reset::Manual),
        NamedEvent::open(dir, completion, Reset::Auto),
    )
}
