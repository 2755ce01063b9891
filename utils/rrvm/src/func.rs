use std::{collections::HashMap, collections::HashSet, fmt::Display};

use llvm::*;
use utils::{constants::ENTRY_LABEL, errors::Result, Label, RangecError};

use crate::cfg::CFG;

#[derive(Clone, Debug)]
pub struct InstrNode {
	pub name: String,
	pub block: BlockId,
	pub instr: LlvmInstr,
}

/// One function in SSA form. Instructions and blocks live in two arenas and
/// refer to each other through `InstrId` / `BlockId` handles; block 0 is the
/// entry.
#[derive(Clone, Debug)]
pub struct LlvmFunc {
	pub name: String,
	pub ret_type: VarType,
	pub params: Vec<InstrId>,
	pub cfg: CFG,
	pub nodes: Vec<InstrNode>,
	pub temp_mgr: TempManager,
	constants: HashMap<i32, InstrId>,
	names: HashSet<String>,
}

impl LlvmFunc {
	pub fn new(name: impl Display, ret_type: VarType) -> Self {
		let mut cfg = CFG::new();
		cfg.new_block(Label::new(ENTRY_LABEL));
		Self {
			name: name.to_string(),
			ret_type,
			params: Vec::new(),
			cfg,
			nodes: Vec::new(),
			temp_mgr: TempManager::new(),
			constants: HashMap::new(),
			names: HashSet::new(),
		}
	}

	pub fn entry(&self) -> BlockId {
		self.cfg.get_entry()
	}

	pub fn new_basicblock(&mut self, label: impl Display) -> BlockId {
		self.cfg.new_block(Label::new(label))
	}

	pub fn rename_block(&mut self, block: BlockId, label: impl Display) {
		self.cfg.block_mut(block).label = Label::new(label);
	}

	pub fn next_instr_id(&self) -> InstrId {
		InstrId(self.nodes.len() as u32)
	}

	pub fn node(&self, id: InstrId) -> &InstrNode {
		&self.nodes[id.index()]
	}

	pub fn instr(&self, id: InstrId) -> &LlvmInstr {
		&self.nodes[id.index()].instr
	}

	pub fn block_of(&self, id: InstrId) -> BlockId {
		self.nodes[id.index()].block
	}

	pub fn name_of(&self, id: InstrId) -> &str {
		&self.nodes[id.index()].name
	}

	pub fn int_value(&self, id: InstrId) -> Option<i32> {
		self.instr(id).get_int_const()
	}

	fn new_node(
		&mut self,
		block: BlockId,
		name: Option<&str>,
		instr: LlvmInstr,
	) -> InstrId {
		let id = self.next_instr_id();
		let name = match name {
			Some(name) => name.to_string(),
			None => loop {
				let name = self.temp_mgr.new_temp_name();
				if !self.names.contains(&name) {
					break name;
				}
			},
		};
		self.names.insert(name.clone());
		self.nodes.push(InstrNode { name, block, instr });
		id
	}

	pub fn add_param(&mut self, name: &str) -> InstrId {
		let index = self.params.len();
		let entry = self.entry();
		let id = self.new_node(entry, Some(name), LlvmInstr::Param(index));
		self.params.push(id);
		id
	}

	/// Returns the unique constant instruction for `value`, creating it in the
	/// entry block on first use.
	pub fn int_constant(&mut self, value: i32) -> InstrId {
		if let Some(id) = self.constants.get(&value) {
			return *id;
		}
		let entry = self.entry();
		let name = format!("c{}", value);
		let id = self.new_node(entry, Some(&name), LlvmInstr::IntConst(value));
		self.constants.insert(value, id);
		id
	}

	pub fn get_int_constant(&self, value: i32) -> Option<InstrId> {
		self.constants.get(&value).copied()
	}

	pub fn push_phi(
		&mut self,
		block: BlockId,
		name: Option<&str>,
		source: Vec<(InstrId, BlockId)>,
	) -> InstrId {
		let id = self.new_node(block, name, LlvmInstr::Phi(PhiInstr { source }));
		self.cfg.block_mut(block).push_phi(id);
		id
	}

	// 构造循环时 phi 的回边来源往往还没定义，先建 phi 再补
	pub fn add_phi_source(&mut self, phi: InstrId, value: InstrId, from: BlockId) {
		if let LlvmInstr::Phi(instr) = &mut self.nodes[phi.index()].instr {
			instr.source.push((value, from));
		} else {
			debug_assert!(false, "{} is not a phi", phi);
		}
	}

	pub fn push_instr(
		&mut self,
		block: BlockId,
		name: Option<&str>,
		instr: LlvmInstr,
	) -> InstrId {
		debug_assert!(!instr.is_phi() && !instr.is_terminator());
		let id = self.new_node(block, name, instr);
		self.cfg.block_mut(block).push(id);
		id
	}

	/// Sets the terminator of `block` and links its successors.
	pub fn set_jump(&mut self, block: BlockId, instr: LlvmInstr) -> InstrId {
		debug_assert!(instr.is_terminator());
		debug_assert!(self.cfg.block(block).jump_instr.is_none());
		let succ = instr.get_succ();
		let id = self.new_node(block, None, instr);
		self.cfg.block_mut(block).jump_instr = Some(id);
		for target in succ {
			self.cfg.link_node(block, target);
		}
		id
	}

	pub fn insert_arith(
		&mut self,
		block: BlockId,
		op: ArithOp,
		lhs: InstrId,
		rhs: InstrId,
	) -> InstrId {
		self.push_instr(block, None, LlvmInstr::Arith(ArithInstr { op, lhs, rhs }))
	}

	pub fn insert_neg(&mut self, block: BlockId, value: InstrId) -> InstrId {
		self.push_instr(block, None, LlvmInstr::Neg(NegInstr { value }))
	}

	pub fn insert_comp(
		&mut self,
		block: BlockId,
		op: CompOp,
		lhs: InstrId,
		rhs: InstrId,
	) -> InstrId {
		self.push_instr(block, None, LlvmInstr::Comp(CompInstr { op, lhs, rhs }))
	}

	/// Checks the structural rules the analyses rely on: every block ends in
	/// a terminator and every phi has one input per predecessor.
	pub fn verify(&self) -> Result<()> {
		let malformed =
			|msg: String| RangecError::MalformedFunction(self.name.clone(), msg);
		for bb in self.cfg.blocks.iter() {
			if bb.jump_instr.is_none() {
				return Err(malformed(format!("block '{}' has no terminator", bb.label)));
			}
			for phi in bb.phi_instrs.iter() {
				let LlvmInstr::Phi(instr) = self.instr(*phi) else {
					return Err(malformed(format!("%{} is not a phi", self.name_of(*phi))));
				};
				let from_preds =
					instr.source.iter().all(|(_, from)| bb.prev.contains(from));
				if !from_preds || instr.source.len() != bb.prev.len() {
					return Err(malformed(format!(
						"phi %{} does not match the predecessors of '{}'",
						self.name_of(*phi),
						bb.label
					)));
				}
			}
		}
		Ok(())
	}
}
