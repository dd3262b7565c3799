use std::time::{Duration, Instant};

/// Per-request metadata shared with middleware and handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_trace_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_trace_id(trace_id: String) -> Self {
        Self {
            trace_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_uuid() {
        let ctx = RequestContext::new();
        // UUID v4 format: 8-4-4-4-12 hex chars
        assert_eq!(ctx.trace_id.len(), 36);
        assert_eq!(ctx.trace_id.chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(RequestContext::new().trace_id, RequestContext::new().trace_id);
    }

    #[test]
    fn test_with_trace_id() {
        let ctx = RequestContext::with_trace_id("session-7".to_string());
        assert_eq!(ctx.trace_id, "session-7");
    }
}
