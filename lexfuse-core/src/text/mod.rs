//! Text primitives: alphabet segmentation, whitespace collapsing and lemma
//! post-processing.

pub mod segment;
pub mod token;
pub mod whitespace;

pub use segment::split;
pub use token::{keep, process, LengthFloor, TIME_TOKEN};
pub use whitespace::collapse;
