mod classify_indvar;
mod tarjan_var;
mod transfer;
mod trip_count;

use std::collections::HashMap;

use llvm::{InstrId, LlvmInstr};
use rrvm::{LlvmFunc, LoopForest, LoopId};
use tarjan_var::TarjanVar;

use super::{InductionInfo, InfoPtr};

// 对一个循环做分类，结果只和这个循环有关
pub struct OneLoopSolver<'a> {
	pub func: &'a LlvmFunc,
	pub loops: &'a LoopForest,
	pub cur_loop: LoopId,
	// tarjan 算法的变量
	tarjan_var: TarjanVar,
	// 当前强连通分量, 按出栈顺序
	scc: Vec<InstrId>,
	// 分类过程中环上每个节点的临时含义
	cycle: HashMap<InstrId, InfoPtr>,
	pub induction: HashMap<InstrId, InfoPtr>,
}

impl<'a> OneLoopSolver<'a> {
	pub fn new(func: &'a LlvmFunc, loops: &'a LoopForest, cur_loop: LoopId) -> Self {
		Self {
			func,
			loops,
			cur_loop,
			tarjan_var: TarjanVar::new(),
			scc: Vec::new(),
			cycle: HashMap::new(),
			induction: HashMap::new(),
		}
	}

	pub fn run(mut self) -> HashMap<InstrId, InfoPtr> {
		let blocks = self.loops.get(self.cur_loop).blocks.clone();
		for bb in blocks {
			// 内层循环的块不在这里处理
			if self.loops.innermost(bb) != Some(self.cur_loop) {
				continue;
			}
			let instrs: Vec<_> = self.func.cfg.block(bb).all_instrs().collect();
			for instr in instrs {
				if !self.tarjan_var.visited.contains(&instr) {
					self.visit_node(instr);
				}
			}
		}
		self.tarjan_var.clear();
		self.visit_control();
		self.induction
	}

	fn header(&self) -> llvm::BlockId {
		self.loops.get(self.cur_loop).header
	}

	pub fn is_defined_out_of_loop(&self, instr: InstrId) -> bool {
		matches!(self.func.instr(instr), LlvmInstr::IntConst(_) | LlvmInstr::Param(_))
			|| !self.loops.contains_block(self.cur_loop, self.func.block_of(instr))
	}

	// 循环头的 phi，并且恰好有一个来自循环外的输入
	fn is_entry_phi(&self, instr: InstrId) -> bool {
		let LlvmInstr::Phi(phi) = self.func.instr(instr) else {
			return false;
		};
		self.func.block_of(instr) == self.header()
			&& phi
				.source
				.iter()
				.filter(|(_, from)| !self.loops.contains_block(self.cur_loop, *from))
				.count() == 1
	}

	/// Operands of `instr`. A phi of the loop header lists its value from
	/// outside the loop first, followed by the back-edge values.
	fn inputs(&self, instr: InstrId) -> Vec<InstrId> {
		match self.func.instr(instr) {
			LlvmInstr::Phi(phi) if self.func.block_of(instr) == self.header() => {
				let (outside, inside): (Vec<&(InstrId, llvm::BlockId)>, Vec<_>) = phi
					.source
					.iter()
					.partition(|(_, from)| !self.loops.contains_block(self.cur_loop, *from));
				outside.into_iter().chain(inside).map(|source| source.0).collect()
			}
			other => other.get_read(),
		}
	}

	pub fn lookup_info(&mut self, instr: InstrId) -> Option<InfoPtr> {
		if let Some(info) = self.induction.get(&instr) {
			return Some(info.clone());
		}
		if self.is_defined_out_of_loop(instr) {
			let info = invariant_fetch(self.func, instr);
			self.assign_info(instr, info.clone());
			return Some(info);
		}
		None
	}

	fn assign_info(&mut self, instr: InstrId, info: InfoPtr) {
		self.induction.insert(instr, info);
	}

	fn visit_node(&mut self, instr: InstrId) {
		self.tarjan_var.next_dfsnum += 1;
		let d1 = self.tarjan_var.next_dfsnum;
		self.tarjan_var.dfsnum.insert(instr, d1);
		self.tarjan_var.low.insert(instr, d1);
		self.tarjan_var.visited.insert(instr);
		self.tarjan_var.stack.push(instr);
		self.tarjan_var.in_stack.insert(instr);

		let mut low = d1;
		for input in self.inputs(instr) {
			low = low.min(self.visit_descendant(input));
		}

		if low < d1 {
			self.tarjan_var.low.insert(instr, low);
			return;
		}
		// 弹栈得到一个强连通分量
		self.scc.clear();
		self.cycle.clear();
		while let Some(x) = self.tarjan_var.stack.pop() {
			self.tarjan_var.in_stack.remove(&x);
			self.scc.push(x);
			if x == instr {
				break;
			}
		}
		if self.scc.len() == 1 && !self.is_entry_phi(self.scc[0]) {
			self.classify_trivial(self.scc[0]);
		} else {
			self.classify_non_trivial();
		}
		self.scc.clear();
		self.cycle.clear();
	}

	fn visit_descendant(&mut self, instr: InstrId) -> u32 {
		// 定义在循环外或者内层循环里的值，遍历到此为止
		if self.loops.innermost(self.func.block_of(instr)) != Some(self.cur_loop)
			|| self.is_defined_out_of_loop(instr)
		{
			return self.tarjan_var.next_dfsnum;
		}
		if !self.tarjan_var.visited.contains(&instr) {
			self.visit_node(instr);
			self.tarjan_var.low[&instr]
		} else if self.tarjan_var.in_stack.contains(&instr) {
			self.tarjan_var.low[&instr]
		} else {
			self.tarjan_var.next_dfsnum
		}
	}
}

/// The descriptor of a value defined outside the loop.
pub fn invariant_fetch(func: &LlvmFunc, instr: InstrId) -> InfoPtr {
	match func.int_value(instr) {
		Some(value) => InductionInfo::constant(value),
		None => InductionInfo::fetch(instr),
	}
}
