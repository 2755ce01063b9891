use log::trace;

use llvm::BlockId;

use crate::cfg::CFG;

use super::{LoopForest, LoopId};

/// The unique block outside the loop that branches to the header, provided it
/// has no other successor. Code hoisted out of the loop goes there.
pub fn find_preheader(
	cfg: &CFG,
	forest: &LoopForest,
	loop_: LoopId,
) -> Option<BlockId> {
	let header = forest.get(loop_).header;
	let outside_blocks: Vec<_> = cfg
		.block(header)
		.prev
		.iter()
		.filter(|prev| !forest.contains_block(loop_, **prev))
		.copied()
		.collect();
	let [preheader] = outside_blocks[..] else {
		trace!("{} outside predecessors, no preheader", outside_blocks.len());
		return None;
	};
	if cfg.block(preheader).succ.len() != 1 {
		trace!(
			"Succ num is {}, cannot be a preheader",
			cfg.block(preheader).succ.len()
		);
		return None;
	}
	Some(preheader)
}
