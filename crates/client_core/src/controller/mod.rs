//! Controller layer: screen state containers and the events they hand back to the shell.

pub mod events;
pub mod scheduling;
