//! Script segmentation: raw text into ordered, timed scenes.

pub mod segment;
