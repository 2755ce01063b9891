use llvm::{BlockId, InstrId};
use utils::Label;

#[derive(Clone, Debug)]
pub struct BasicBlock {
	pub id: BlockId,
	pub label: Label,
	pub prev: Vec<BlockId>,
	pub succ: Vec<BlockId>,
	pub phi_instrs: Vec<InstrId>,
	pub instrs: Vec<InstrId>,
	pub jump_instr: Option<InstrId>,
}

impl BasicBlock {
	pub fn new(id: BlockId, label: Label) -> BasicBlock {
		BasicBlock {
			id,
			label,
			prev: Vec::new(),
			succ: Vec::new(),
			phi_instrs: Vec::new(),
			instrs: Vec::new(),
			jump_instr: None,
		}
	}
	pub fn label(&self) -> Label {
		self.label.clone()
	}
	pub fn push(&mut self, instr: InstrId) {
		self.instrs.push(instr);
	}
	pub fn push_phi(&mut self, instr: InstrId) {
		self.phi_instrs.push(instr);
	}
	// phi, 普通指令, 跳转指令, 按顺序
	pub fn all_instrs(&self) -> impl Iterator<Item = InstrId> + '_ {
		self
			.phi_instrs
			.iter()
			.chain(self.instrs.iter())
			.chain(self.jump_instr.iter())
			.copied()
	}
}
