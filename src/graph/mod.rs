//! Graph data structures and message passing
//!
//! Provides the static topology attention layers run on, typed attribute
//! frames, and the per-edge / per-node primitives layers are written in.

mod builder;
mod frame;
mod message;
mod sparse;

pub use builder::GraphBuilder;
pub use frame::{EdgeFrame, NodeFrame};
pub use message::{Message, Reduce};
pub use sparse::{Edge, Graph};
