mod naive;

use std::collections::{HashMap, HashSet};

use llvm::BlockId;
pub use naive::*;

use crate::cfg::CFG;

#[derive(Debug, Default)]
pub struct DomTree {
	// 每个块支配的块, 包括自己
	pub dominates: HashMap<BlockId, HashSet<BlockId>>,
	// 直接支配者
	pub dominator: HashMap<BlockId, BlockId>,
	pub dom_direct: HashMap<BlockId, Vec<BlockId>>,
	pub reachable: HashSet<BlockId>,
}

impl DomTree {
	pub fn new(cfg: &CFG) -> Self {
		let mut tree = Self::default();
		compute_dominator(
			cfg,
			&mut tree.reachable,
			&mut tree.dominates,
			&mut tree.dom_direct,
			&mut tree.dominator,
		);
		tree
	}
	pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
		self.dominates.get(&a).is_some_and(|v| v.contains(&b))
	}
	pub fn get_children(&self, bb: BlockId) -> &[BlockId] {
		self.dom_direct.get(&bb).map_or(&[], |v| v.as_slice())
	}
	pub fn is_reachable(&self, bb: BlockId) -> bool {
		self.reachable.contains(&bb)
	}
}
