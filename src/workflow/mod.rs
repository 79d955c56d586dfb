pub mod session_controller;
pub mod session_ctx;

pub use session_controller::{notices, ActionOutcome, SessionController};
pub use session_ctx::SessionCtx;
