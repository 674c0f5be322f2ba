//! Outbound signal notification port.

use crate::domain::error::SwingscanError;
use crate::domain::signal::Signal;

pub trait NotifyPort {
    /// Deliver `signal`; returns the delivery status code.
    fn send(&self, signal: &Signal) -> Result<u16, SwingscanError>;
}

/// Notifier that only logs the signal; used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotifyPort for LogNotifier {
    fn send(&self, signal: &Signal) -> Result<u16, SwingscanError> {
        log::info!(
            "[{}] dry run: entry {:.2}, stop {:.2}, target {:.2}, {:.2} shares",
            signal.ticker,
            signal.entry_price,
            signal.stop_loss,
            signal.take_profit,
            signal.position_size
        );
        Ok(0)
    }
}
