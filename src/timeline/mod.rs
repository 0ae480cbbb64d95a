//! Clip assembly: ordered stills into a timeline that can compose any frame.

pub mod assemble;
pub mod clip;
pub mod composite;
