//! Application tasks registered in the super-loop schedule.

pub mod button;
pub mod heartbeat;
