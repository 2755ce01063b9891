use std::{collections::HashMap, fmt::Display};

use llvm::BlockId;

pub mod loop_analysis;
pub mod utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopId(pub u32);

impl LoopId {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

// Instances of this class are used to represent loops that are detected in the flow graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loop {
	pub id: LoopId,
	pub outer: Option<LoopId>,
	pub header: BlockId,
	pub level: i32,
	pub no_inner: bool,
	pub subloops: Vec<LoopId>,
	// 包括内层循环的块
	pub blocks: Vec<BlockId>,
	// 回边的起点
	pub back_edges: Vec<BlockId>,
	pub preheader: Option<BlockId>,
}

impl Loop {
	fn new(id: LoopId, header: BlockId) -> Self {
		Self {
			id,
			outer: None,
			header,
			level: -1,
			no_inner: true,
			subloops: Vec::new(),
			blocks: Vec::new(),
			back_edges: Vec::new(),
			preheader: None,
		}
	}
}

impl Display for Loop {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let outer = if let Some(outer) = &self.outer {
			format!("L{}", outer.0)
		} else {
			"None".to_string()
		};
		write!(
			f,
			"outer: {}, header: {}, level: {}, no_inner: {}",
			outer, self.header, self.level, self.no_inner
		)
	}
}

/// All natural loops of one function.
#[derive(Clone, Debug, Default)]
pub struct LoopForest {
	pub loops: Vec<Loop>,
	// 每个块所在的最内层循环
	pub loop_map: HashMap<BlockId, LoopId>,
}

impl LoopForest {
	pub fn get(&self, id: LoopId) -> &Loop {
		&self.loops[id.index()]
	}

	pub fn innermost(&self, bb: BlockId) -> Option<LoopId> {
		self.loop_map.get(&bb).copied()
	}

	pub fn contains_block(&self, loop_: LoopId, bb: BlockId) -> bool {
		let mut cur = self.innermost(bb);
		while let Some(l) = cur {
			if l == loop_ {
				return true;
			}
			cur = self.get(l).outer;
		}
		false
	}

	pub fn is_header(&self, bb: BlockId) -> bool {
		self.innermost(bb).is_some_and(|l| self.get(l).header == bb)
	}

	// 外层循环在内层循环之前
	pub fn outer_to_inner(&self) -> Vec<LoopId> {
		let mut order: Vec<_> = self.loops.iter().map(|l| l.id).collect();
		order.sort_by_key(|l| (self.get(*l).level, self.get(*l).header));
		order
	}

	fn outermost(&self, mut loop_: LoopId) -> LoopId {
		while let Some(outer) = self.get(loop_).outer {
			loop_ = outer;
		}
		loop_
	}
}
