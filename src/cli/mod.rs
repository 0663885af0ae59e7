pub mod actions;
pub mod console;
pub mod globals;
pub mod telemetry;

pub mod commands;
pub mod dispatch;

mod start;
pub use self::start::start;
