pub mod bus;

pub use bus::{Bus, BusMaster, InterruptState};
