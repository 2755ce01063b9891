use llvm::BlockId;
use utils::Label;

pub use crate::basicblock::BasicBlock;

#[derive(Clone, Debug, Default)]
pub struct CFG {
	pub blocks: Vec<BasicBlock>,
}

impl CFG {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn new_block(&mut self, label: Label) -> BlockId {
		let id = BlockId(self.blocks.len() as u32);
		self.blocks.push(BasicBlock::new(id, label));
		id
	}
	pub fn get_entry(&self) -> BlockId {
		BlockId(0)
	}
	pub fn block(&self, id: BlockId) -> &BasicBlock {
		&self.blocks[id.index()]
	}
	pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
		&mut self.blocks[id.index()]
	}
	pub fn size(&self) -> usize {
		self.blocks.len()
	}
	pub fn find_block(&self, label: &str) -> Option<BlockId> {
		self.blocks.iter().find(|bb| bb.label.name == label).map(|bb| bb.id)
	}
	pub fn link_node(&mut self, from: BlockId, to: BlockId) {
		// 条件跳转的两个目标可能相同，只连一条边
		if !self.block(from).succ.contains(&to) {
			self.block_mut(from).succ.push(to);
			self.block_mut(to).prev.push(from);
		}
	}
}
