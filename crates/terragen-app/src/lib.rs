//! terragen application: turns the runtime config into generator and
//! renderer parameters and drives the window and per-frame orchestration.

pub mod frame;
pub mod settings;
pub mod window;
