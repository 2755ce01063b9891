use std::collections::{HashMap, HashSet};

use llvm::InstrId;

#[derive(Default)]
pub struct TarjanVar {
	// dfs 过程中，访问到的次序
	pub dfsnum: HashMap<InstrId, u32>,
	pub next_dfsnum: u32,
	pub visited: HashSet<InstrId>,
	// Tarjan 算法计算强连通分量时，需要用到的值
	pub low: HashMap<InstrId, u32>,
	pub stack: Vec<InstrId>,
	pub in_stack: HashSet<InstrId>,
}

impl TarjanVar {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn clear(&mut self) {
		*self = Self::default();
	}
}
