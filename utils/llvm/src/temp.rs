use std::fmt::Display;

use utils::constants::GENERATED_TEMP_PREFIX;

// 指令和基本块都放在函数的 arena 里，用下标当作句柄
// 两个句柄相等当且仅当它们指向同一条指令，不比较内容
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl InstrId {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl BlockId {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl Display for InstrId {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "v{}", self.0)
	}
}

impl Display for BlockId {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "B{}", self.0)
	}
}

// 给新生成的指令起名字
#[derive(Default, Debug, Clone)]
pub struct TempManager {
	pub total: u32,
}

impl TempManager {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn new_temp_name(&mut self) -> String {
		self.total += 1;
		format!("{}{}", GENERATED_TEMP_PREFIX, self.total)
	}
}
