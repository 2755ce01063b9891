pub mod induction;
pub mod induction_range;
mod range_hoisting;

#[cfg(test)]
mod test_utils;

use rrvm::LlvmFunc;
use utils::errors::Result;

pub use range_hoisting::RangeHoisting;

pub trait RrvmOptimizer {
	fn new() -> Self;
	fn apply(self, func: &mut LlvmFunc) -> Result<bool>;
}
