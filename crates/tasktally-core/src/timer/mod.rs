mod engine;

pub use engine::{
    minutes_to_hours, Clock, PauseToggle, SessionState, SessionTimer, SystemClock, TimerStatus,
    WorkToggle,
};
