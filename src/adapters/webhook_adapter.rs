//! JSON webhook notifier.

use crate::domain::signal::Signal;
use serde::Serialize;

/// Body posted for each signal. Every number is rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub ticker: String,
    pub price: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub rsi: f64,
    pub macd: f64,
    pub atr: f64,
    pub time: String,
    pub rationale: String,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    pub position_value: f64,
    pub estimated_net_profit: f64,
    pub estimated_loss: f64,
    pub rr_ratio: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<&Signal> for WebhookPayload {
    fn from(signal: &Signal) -> Self {
        let s = &signal.snapshot;
        WebhookPayload {
            ticker: signal.ticker.clone(),
            price: round2(s.close),
            ema20: round2(s.ema20),
            ema50: round2(s.ema50),
            ema200: round2(s.ema200),
            rsi: round2(s.rsi),
            macd: round2(s.macd),
            atr: round2(s.atr),
            time: signal.timestamp.format("%Y-%m-%d").to_string(),
            rationale: signal.rationale.join("; "),
            entry: round2(signal.entry_price),
            stop_loss: round2(signal.stop_loss),
            take_profit: round2(signal.take_profit),
            position_size: round2(signal.position_size),
            position_value: round2(signal.position_value),
            estimated_net_profit: round2(signal.estimated_net_profit),
            estimated_loss: round2(signal.estimated_loss),
            rr_ratio: round2(signal.risk_reward_ratio),
        }
    }
}

#[cfg(feature = "webhook")]
pub use client::WebhookAdapter;

#[cfg(feature = "webhook")]
mod client {
    use super::WebhookPayload;
    use crate::domain::error::SwingscanError;
    use crate::domain::signal::Signal;
    use crate::ports::notify_port::NotifyPort;
    use std::time::Duration;

    pub struct WebhookAdapter {
        url: String,
        client: reqwest::blocking::Client,
    }

    impl WebhookAdapter {
        pub fn new(url: &str, timeout: Duration) -> Result<Self, SwingscanError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| SwingscanError::Notify {
                    reason: format!("failed to build HTTP client: {}", e),
                })?;
            Ok(Self {
                url: url.to_string(),
                client,
            })
        }
    }

    impl NotifyPort for WebhookAdapter {
        fn send(&self, signal: &Signal) -> Result<u16, SwingscanError> {
            let payload = WebhookPayload::from(signal);
            let response = self
                .client
                .post(&self.url)
                .json(&payload)
                .send()
                .map_err(|e| SwingscanError::Notify {
                    reason: format!("POST {} failed: {}", self.url, e),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(SwingscanError::Notify {
                    reason: format!("POST {} returned {}", self.url, status),
                });
            }
            Ok(status.as_u16())
        }
    }
}
