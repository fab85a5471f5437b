use serde::{Deserialize, Serialize};

/// Engine-to-presentation notification.
///
/// Produced by the timer worker (and the alert emitter on failure) and consumed
/// in production order by the front end, which drains the whole backlog each
/// poll tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum Event {
    /// Phase status text, e.g. `Cycle 1: Focus`.
    Status(String),
    /// Remaining time, already formatted for display.
    Timer(String),
    /// The worker exited; the display returns to idle.
    Reset,
    /// Non-fatal error to surface to the user.
    Error(String),
}

impl Event {
    pub fn status(text: impl Into<String>) -> Self {
        Event::Status(text.into())
    }

    pub fn timer(text: impl Into<String>) -> Self {
        Event::Timer(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Event::Error(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_tagged_json() {
        let json = serde_json::to_string(&Event::status("Long Break")).unwrap();
        assert_eq!(json, r#"{"type":"status","text":"Long Break"}"#);

        let json = serde_json::to_string(&Event::Reset).unwrap();
        assert_eq!(json, r#"{"type":"reset"}"#);
    }
}
