// Sequencer connection with exponential back-off

use crate::sequencer::client::{SequencerClient, SequencerResult};
use log::{info, warn};
use std::time::Duration;

pub struct ReconnectionStrategy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    current_attempt: u32,
}

impl ReconnectionStrategy {
    pub fn new() -> Self {
        Self::with_limits(10, 1000, 30_000)
    }

    pub fn with_limits(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            current_attempt: 0,
        }
    }

    /// Delay before the next attempt, None once attempts are exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_attempts {
            return None;
        }

        // base * 2^attempt, capped
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(self.current_attempt))
            .min(self.max_delay_ms);

        self.current_attempt += 1;

        Some(Duration::from_millis(delay_ms))
    }

    /// Reset the attempt counter after a successful connection
    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }

    pub fn should_retry(&self) -> bool {
        self.current_attempt < self.max_attempts
    }

    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }
}

impl Default for ReconnectionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Connect to the sequencer, retrying until the strategy gives up
///
/// Returns the last connection error when every attempt failed.
pub async fn connect_with_retry<S: SequencerClient>(
    client: &S,
    strategy: &mut ReconnectionStrategy,
) -> SequencerResult<()> {
    loop {
        match client.connect().await {
            Ok(()) => {
                info!("Connected to sequencer");
                strategy.reset();
                return Ok(());
            }
            Err(e) => match strategy.next_delay() {
                Some(delay) => {
                    warn!(
                        "Sequencer connection failed ({}), retry {} in {:?}",
                        e,
                        strategy.current_attempt(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(e),
            },
        }
    }
}
