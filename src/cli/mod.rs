pub mod actions;
pub mod commands;
pub mod dispatch;
mod start;
mod telemetry;

pub use self::start::start;
