use llvm::{ArithOp, InstrId, LlvmInstr};
use log::trace;

use crate::{
	induction::{create_invariant_op, InductionInfo, InductionOp, InfoPtr},
	induction_range::{is_constant, ConstantRequest},
};

use super::{transfer::*, OneLoopSolver};

impl OneLoopSolver<'_> {
	pub(super) fn classify_trivial(&mut self, instr: InstrId) {
		let info = match self.func.instr(instr).clone() {
			LlvmInstr::Phi(_) => self.transfer_phi(instr, 0),
			LlvmInstr::Arith(arith) => {
				let a = self.lookup_info(arith.lhs);
				let b = self.lookup_info(arith.rhs);
				match arith.op {
					ArithOp::Add => transfer_add_sub(a, b, InductionOp::Add),
					ArithOp::Sub => transfer_add_sub(a, b, InductionOp::Sub),
					ArithOp::Mul => transfer_mul(a, b),
					ArithOp::Div => transfer_div(a, b),
					ArithOp::Shl => {
						let shift = is_constant(b.as_deref(), ConstantRequest::Exact);
						transfer_shl(a, shift)
					}
					ArithOp::Rem => None,
				}
			}
			LlvmInstr::Neg(neg) => {
				let a = self.lookup_info(neg.value);
				transfer_neg(a)
			}
			_ => None,
		};
		if let Some(info) = info {
			trace!("%{}: {}", self.func.name_of(instr), info.display(self.func));
			self.assign_info(instr, info);
		}
	}

	pub(super) fn classify_non_trivial(&mut self) {
		// 把循环头的 phi 转到最前面，保持环上的顺序
		if self.scc.len() > 1 {
			let Some(pos) = self.scc.iter().position(|x| self.is_entry_phi(*x)) else {
				return;
			};
			self.scc.rotate_left(pos);
		}
		let phi = self.scc[0];
		if !self.is_entry_phi(phi) {
			return;
		}
		let inputs = self.inputs(phi);
		// 从循环外进来的值必须是不变量
		let Some(initial) = self.lookup_info(inputs[0]) else {
			return;
		};
		if !initial.is_invariant() {
			return;
		}

		// 单独的 phi 可能是 wrap-around
		if self.scc.len() == 1 {
			if let Some(update) = self.transfer_phi(phi, 1) {
				let info = InductionInfo::wrap_around(initial, update);
				trace!("%{}: {}", self.func.name_of(phi), info.display(self.func));
				self.assign_info(phi, info);
			}
			return;
		}

		// 环上其余节点的临时含义，从 phi 出发推出来
		let scc = self.scc.clone();
		for instr in scc.iter().skip(1) {
			let update = match self.func.instr(*instr).clone() {
				LlvmInstr::Phi(_) => self.solve_phi_all_inputs(phi, *instr),
				LlvmInstr::Arith(arith) if arith.op == ArithOp::Add => {
					self.solve_add_sub(phi, *instr, arith.lhs, arith.rhs, InductionOp::Add, true)
				}
				LlvmInstr::Arith(arith) if arith.op == ArithOp::Sub => {
					self.solve_add_sub(phi, *instr, arith.lhs, arith.rhs, InductionOp::Sub, true)
				}
				_ => None,
			};
			let Some(update) = update else {
				return;
			};
			self.cycle.insert(*instr, update);
		}

		// 所有回边上的值含义相同才算成功
		let Some(induction) = self.solve_phi(phi, 1) else {
			return;
		};
		if induction.is_invariant() {
			// phi 先分类，其余节点按顺序再分类一次
			let info = InductionInfo::linear(induction, initial);
			trace!("%{}: {}", self.func.name_of(phi), info.display(self.func));
			self.assign_info(phi, info);
			for instr in scc.iter().skip(1) {
				self.classify_trivial(*instr);
			}
		} else if induction.is_periodic() {
			// 倒着给环上的节点赋值，每次把第一个元素转到最后
			let mut induction = induction;
			for instr in scc.iter().skip(1).rev() {
				self.assign_info(*instr, induction.clone());
				let next = match induction.as_ref() {
					InductionInfo::Periodic(a, b) => rotate_periodic(b, a.clone()),
					_ => break,
				};
				induction = next;
			}
			trace!("%{}: {}", self.func.name_of(phi), induction.display(self.func));
			self.assign_info(phi, induction);
		}
	}

	fn transfer_phi(&mut self, phi: InstrId, input_index: usize) -> Option<InfoPtr> {
		// 从 input_index 开始的所有输入必须完全一样
		let inputs = self.inputs(phi);
		let a = self.lookup_info(*inputs.get(input_index)?)?;
		for input in inputs.iter().skip(input_index + 1) {
			if self.lookup_info(*input).as_ref() != Some(&a) {
				return None;
			}
		}
		Some(a)
	}

	fn solve_phi(&self, phi: InstrId, input_index: usize) -> Option<InfoPtr> {
		let inputs = self.inputs(phi);
		let a = self.cycle.get(inputs.get(input_index)?)?;
		for input in inputs.iter().skip(input_index + 1) {
			if self.cycle.get(input) != Some(a) {
				return None;
			}
		}
		Some(a.clone())
	}

	fn solve_phi_all_inputs(&mut self, entry_phi: InstrId, phi: InstrId) -> Option<InfoPtr> {
		if let Some(info) = self.solve_phi(phi, 0) {
			return Some(info);
		}
		// 否则试试从 phi 开始的 periodic，只考虑只有两个输入的紧凑环
		let inputs = self.inputs(phi);
		if self.func.block_of(phi) != self.header() || inputs.len() != 2 {
			return None;
		}
		let a = self.lookup_info(inputs[0])?;
		if !a.is_invariant() {
			return None;
		}
		if inputs[1] == entry_phi {
			let initial = self.lookup_info(self.inputs(entry_phi)[0])?;
			return Some(InductionInfo::periodic(a, initial));
		}
		let b = self.solve_phi(phi, 1)?;
		if b.is_periodic() {
			return Some(InductionInfo::periodic(a, b));
		}
		None
	}

	fn solve_add_sub(
		&mut self,
		entry_phi: InstrId,
		instr: InstrId,
		x: InstrId,
		y: InstrId,
		op: InductionOp,
		is_first_call: bool,
	) -> Option<InfoPtr> {
		// 加减一个不变量，步长累加
		if let Some(b) = self.lookup_info(y).filter(|b| b.is_invariant()) {
			if x == entry_phi {
				return Some(match op {
					InductionOp::Add => b,
					_ => create_invariant_op(InductionOp::Neg, None, b),
				});
			}
			if let Some(a) = self.cycle.get(&x).filter(|a| a.is_invariant()) {
				return Some(create_invariant_op(op, Some(a.clone()), b));
			}
		}
		match op {
			// 加法换个顺序再试一次
			InductionOp::Add if is_first_call => {
				self.solve_add_sub(entry_phi, instr, y, x, op, false)
			}
			// k = c - k 形式的 periodic
			InductionOp::Sub => {
				let phi_inputs = self.inputs(entry_phi);
				if y != entry_phi || phi_inputs.len() != 2 || phi_inputs[1] != instr {
					return None;
				}
				let a = self.lookup_info(x)?;
				if !a.is_invariant() {
					return None;
				}
				let initial = self.lookup_info(phi_inputs[0])?;
				let first = create_invariant_op(InductionOp::Sub, Some(a), initial.clone());
				Some(InductionInfo::periodic(first, initial))
			}
			_ => None,
		}
	}
}

/// Appends `last` to the end of the periodic sequence `induction`, which
/// turns `(a, b, ..., z)` into `(b, ..., z, a)` when called on the tail.
fn rotate_periodic(induction: &InfoPtr, last: InfoPtr) -> InfoPtr {
	match induction.as_ref() {
		InductionInfo::Periodic(a, b) => {
			InductionInfo::periodic(a.clone(), rotate_periodic(b, last))
		}
		_ => InductionInfo::periodic(induction.clone(), last),
	}
}
