//! Scene rendering: one scene in, one canvas-sized still out.

pub mod frame;
pub mod renderer;
