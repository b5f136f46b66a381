//! Pull-based receive loop
//!
//! There is no background reader: the loop polls [`Session::receive`] until
//! the cancellation token fires, typically from an interrupt handler.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{BridgeError, Session};

/// Poll `session` every `poll_interval` until `cancel` is cancelled, handing
/// each non-empty reception to `on_rx`.
///
/// Returns the number of non-empty receptions. Teardown is left to the
/// caller, which still owns the session.
pub fn run<F>(
    session: &mut Session,
    cancel: &CancellationToken,
    poll_interval: Duration,
    mut on_rx: F,
) -> Result<usize, BridgeError>
where
    F: FnMut(&str),
{
    let mut received = 0;
    while !cancel.is_cancelled() {
        let text = session.receive()?;
        if !text.is_empty() {
            received += 1;
            on_rx(&text);
        }
        if cancel.is_cancelled() {
            break;
        }
        std::thread::sleep(poll_interval);
    }
    tracing::debug!("monitor stopped after {} receptions", received);
    Ok(received)
}
