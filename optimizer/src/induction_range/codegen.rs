use llvm::{ArithOp, BlockId, CompOp, InstrId};
use rrvm::LlvmFunc;

use crate::induction::{InductionInfo, InductionOp};

use super::eval::{is_constant, ConstantRequest};

// 生成成功时的结果；只检查能否生成时没有指令
pub type Generated = Option<InstrId>;

/// Materializes bounds as instructions at the end of `block`. Without a
/// function it only checks that generation would succeed.
pub struct CodeGen<'f> {
	graph: Option<&'f mut LlvmFunc>,
	block: BlockId,
}

impl<'f> CodeGen<'f> {
	pub fn check() -> Self {
		Self {
			graph: None,
			block: BlockId(0),
		}
	}

	pub fn new(graph: &'f mut LlvmFunc, block: BlockId) -> Self {
		Self {
			graph: Some(graph),
			block,
		}
	}

	fn constant(&mut self, value: i32) -> Generated {
		self.graph.as_deref_mut().map(|func| func.int_constant(value))
	}

	fn arith(&mut self, op: ArithOp, lhs: Generated, rhs: Generated) -> Generated {
		let block = self.block;
		match (self.graph.as_deref_mut(), lhs, rhs) {
			(Some(func), Some(lhs), Some(rhs)) => Some(func.insert_arith(block, op, lhs, rhs)),
			_ => None,
		}
	}

	fn comp(&mut self, op: CompOp, lhs: Generated, rhs: Generated) -> Generated {
		let block = self.block;
		match (self.graph.as_deref_mut(), lhs, rhs) {
			(Some(func), Some(lhs), Some(rhs)) => Some(func.insert_comp(block, op, lhs, rhs)),
			_ => None,
		}
	}

	fn neg(&mut self, value: Generated) -> Generated {
		let block = self.block;
		match (self.graph.as_deref_mut(), value) {
			(Some(func), Some(value)) => Some(func.insert_neg(block, value)),
			_ => None,
		}
	}

	/// Code for the lower (`is_min`) or upper bound of `info`; `None` if the
	/// bound cannot be expressed with add, sub, neg and comparisons.
	pub fn generate(
		&mut self,
		info: Option<&InductionInfo>,
		trip: Option<&InductionInfo>,
		in_body: bool,
		is_min: bool,
	) -> Option<Generated> {
		let info = info?;
		match info {
			InductionInfo::Invariant(op, a, b) => {
				let a = a.as_deref();
				match op {
					InductionOp::Add => {
						let opa = self.generate(a, trip, in_body, is_min)?;
						let opb = self.generate(Some(b), trip, in_body, is_min)?;
						Some(self.arith(ArithOp::Add, opa, opb))
					}
					InductionOp::Lt | InductionOp::Le | InductionOp::Gt | InductionOp::Ge => {
						let opa = self.generate(a, trip, in_body, is_min)?;
						let opb = self.generate(Some(b), trip, in_body, is_min)?;
						let cmp = match op {
							InductionOp::Lt => CompOp::Slt,
							InductionOp::Le => CompOp::Sle,
							InductionOp::Gt => CompOp::Sgt,
							_ => CompOp::Sge,
						};
						Some(self.comp(cmp, opa, opb))
					}
					// 减数和取负的操作数取相反方向
					InductionOp::Sub => {
						let opa = self.generate(a, trip, in_body, is_min)?;
						let opb = self.generate(Some(b), trip, in_body, !is_min)?;
						Some(self.arith(ArithOp::Sub, opa, opb))
					}
					InductionOp::Neg => {
						let opb = self.generate(Some(b), trip, in_body, !is_min)?;
						Some(self.neg(opb))
					}
					InductionOp::Mul | InductionOp::Div => None,
				}
			}
			InductionInfo::Fetch(instr) => Some(self.graph.as_ref().map(|_| *instr)),
			InductionInfo::Constant(value) => Some(self.constant(*value)),
			InductionInfo::TripCount(kind, count, _) => {
				if !kind.is_body() && !in_body && !is_min {
					return self.generate(Some(count), trip, in_body, is_min);
				}
				if is_min {
					Some(self.constant(0))
				} else if in_body {
					let opb = self.generate(Some(count), trip, in_body, is_min)?;
					let one = self.constant(1);
					Some(self.arith(ArithOp::Sub, opb, one))
				} else {
					None
				}
			}
			// 只处理步长为 ±1 的情况，其他步长的乘法可能溢出
			InductionInfo::Linear(a, b) => {
				let stride = is_constant(Some(a), ConstantRequest::Exact)?;
				if stride != 1 && stride != -1 {
					return None;
				}
				let is_min_a = if stride == 1 { is_min } else { !is_min };
				let opa = self.generate(trip, trip, in_body, is_min_a)?;
				let opb = self.generate(Some(b), trip, in_body, is_min)?;
				Some(if stride == 1 {
					self.arith(ArithOp::Add, opa, opb)
				} else {
					self.arith(ArithOp::Sub, opb, opa)
				})
			}
			InductionInfo::Periodic(..) | InductionInfo::WrapAround(..) => None,
		}
	}
}
