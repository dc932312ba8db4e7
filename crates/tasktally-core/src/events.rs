use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every session timer transition produces an Event.
/// The session shell prints them and logs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started {
        at: DateTime<Utc>,
    },
    /// Session ended; `hours` is the rounded worked time.
    Stopped {
        hours: f64,
        at: DateTime<Utc>,
    },
    /// Pause began; `hours` is the worked time so far.
    Paused {
        hours: f64,
        at: DateTime<Utc>,
    },
    Resumed {
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Worked hours carried by the event, if any.
    pub fn hours(&self) -> Option<f64> {
        match self {
            SessionEvent::Stopped { hours, .. } | SessionEvent::Paused { hours, .. } => {
                Some(*hours)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = SessionEvent::Stopped {
            hours: 1.25,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stopped");
        assert_eq!(json["hours"], 1.25);
        assert_eq!(event.hours(), Some(1.25));
        assert_eq!(SessionEvent::Resumed { at: Utc::now() }.hours(), None);
    }
}
