pub mod basicblock;
pub mod cfg;
pub mod dominator;
pub mod func;
pub mod impls;
pub mod parser;
pub mod rrvm_loop;

pub use func::{InstrNode, LlvmFunc};
pub use rrvm_loop::{Loop, LoopForest, LoopId};
