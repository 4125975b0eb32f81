pub mod control;
pub mod motion_file;
pub mod outputs;
pub mod sources;
pub mod state;

pub use state::DaemonState;
