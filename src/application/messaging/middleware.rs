//! Middleware for the message processing pipeline

use crate::domain::entities::Message;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Why a middleware stopped a message
#[derive(Debug, Clone)]
pub enum Rejection {
    /// Reply with a rate-limit notice
    RateLimited { retry_after: Duration },
    /// Drop the message silently
    Drop,
}

/// Pre-dispatch check applied to every inbound message
pub trait Middleware: Send + Sync {
    fn check(&self, message: &Message) -> Result<(), Rejection>;
}

/// Per-sender sliding-window rate limit
pub struct RateLimitMiddleware {
    requests: Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimitMiddleware {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Middleware for RateLimitMiddleware {
    fn check(&self, message: &Message) -> Result<(), Rejection> {
        // Commands only; plain chatter is not counted
        if !message.content.is_command() {
            return Ok(());
        }

        let key = message
            .sender_id()
            .unwrap_or(message.chat_id.as_str())
            .to_string();

        let mut requests = match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let times = requests.entry(key).or_default();
        times.retain(|&t| now.duration_since(t) < self.window);

        if times.len() >= self.max_requests as usize {
            let retry_after = times
                .first()
                .map(|t| self.window.saturating_sub(now.duration_since(*t)))
                .unwrap_or(self.window);
            return Err(Rejection::RateLimited { retry_after });
        }

        times.push(now);
        Ok(())
    }
}

/// Logs inbound commands at debug level
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn check(&self, message: &Message) -> Result<(), Rejection> {
        if message.content.is_command() {
            tracing::debug!("[{}] {:?}", message.chat_id, message.content);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_rejects_past_the_window_maximum() {
        let limiter = RateLimitMiddleware::new(2, 60);
        let msg = Message::from_command("chat", "kotd", vec![]);

        assert!(limiter.check(&msg).is_ok());
        assert!(limiter.check(&msg).is_ok());
        assert!(matches!(
            limiter.check(&msg),
            Err(Rejection::RateLimited { .. })
        ));
    }

    #[test]
    fn rate_limit_ignores_plain_text() {
        let limiter = RateLimitMiddleware::new(1, 60);
        let msg = Message::from_text("chat", "hello");

        assert!(limiter.check(&msg).is_ok());
        assert!(limiter.check(&msg).is_ok());
    }
}
