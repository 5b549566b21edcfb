mod controller;
mod sync;
mod timer;

pub use controller::{
    OpenOutcome, SessionController, SessionEvent, SessionSnapshot, SessionStatus, SubmitOutcome,
    SubmitRequest,
};
pub use timer::TIMER_TICK;
