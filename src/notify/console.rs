// src/notify/console.rs
use std::io::Write;
use std::sync::Mutex;

use super::Notifier;
use crate::error::DeliveryError;

/// Dry-run sink used when no webhook is configured. Never fails.
pub struct ConsoleNotifier {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self::to_writer(Box::new(std::io::stdout()))
    }

    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        let mut out = match self.out.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{message}\n").and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "console write failed");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
