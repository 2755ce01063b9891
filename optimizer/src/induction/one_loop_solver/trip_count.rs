use llvm::{CompOp, LlvmInstr};
use log::trace;

use crate::{
	induction::{
		create_invariant_op, InductionInfo, InductionOp, InfoPtr, TripCountKind,
	},
	induction_range::{is_constant, ConstantRequest},
};

use super::OneLoopSolver;

fn at_most(info: &InductionInfo) -> Option<i64> {
	is_constant(Some(info), ConstantRequest::AtMost)
}

fn at_least(info: &InductionInfo) -> Option<i64> {
	is_constant(Some(info), ConstantRequest::AtLeast)
}

impl OneLoopSolver<'_> {
	/// Derives the trip count from the conditional branch that ends the
	/// header, if one side of it leaves the loop.
	pub(super) fn visit_control(&mut self) {
		let header = self.header();
		let Some(control) = self.func.cfg.block(header).jump_instr else {
			return;
		};
		let LlvmInstr::JumpCond(jump) = self.func.instr(control).clone() else {
			return;
		};
		let LlvmInstr::Comp(cond) = self.func.instr(jump.cond).clone() else {
			return;
		};
		let (Some(a), Some(b)) = (self.lookup_info(cond.lhs), self.lookup_info(cond.rhs))
		else {
			trace!("loop control is not a sequence");
			return;
		};
		let true_inside = self.loops.contains_block(self.cur_loop, jump.target_true);
		let false_inside = self.loops.contains_block(self.cur_loop, jump.target_false);
		// 统一成“条件成立时继续循环”的形式
		let trip = match (true_inside, false_inside) {
			(false, true) => self.visit_condition(&a, &b, cond.op.inverse()),
			(true, false) => self.visit_condition(&a, &b, cond.op),
			_ => None,
		};
		if let Some(trip) = trip {
			trace!("trip count of {}: {}", header, trip.display(self.func));
			#[cfg(feature = "debug")]
			eprintln!(
				"trip count: L{} cond: {} trip: {}",
				self.cur_loop.0,
				self.func.instr_to_string(jump.cond),
				trip.display(self.func)
			);
			self.assign_info(control, trip);
		}
	}

	fn visit_condition(
		&self,
		a: &InfoPtr,
		b: &InfoPtr,
		cmp: CompOp,
	) -> Option<InfoPtr> {
		if a.is_invariant() && b.is_linear() {
			// U > i 等价于 i < U
			return match cmp {
				CompOp::Eq => None,
				_ => self.visit_condition(b, a, cmp.swap()),
			};
		}
		let InductionInfo::Linear(stride_expr, lower_expr) = a.as_ref() else {
			return None;
		};
		if !b.is_invariant() {
			return None;
		}
		let upper_expr = b;
		let stride = is_constant(Some(stride_expr), ConstantRequest::Exact)?;
		let mut cmp = cmp;
		// 步长为 1 且 i <= U 一定成立时，i != U 就是 i < U
		if cmp == CompOp::Ne
			&& ((stride == 1 && is_taken(lower_expr, upper_expr, CompOp::Sle))
				|| (stride == -1 && is_taken(lower_expr, upper_expr, CompOp::Sge)))
		{
			cmp = if stride > 0 { CompOp::Slt } else { CompOp::Sgt };
		}
		let normalized = match cmp {
			CompOp::Slt | CompOp::Sle => stride > 0,
			CompOp::Sgt | CompOp::Sge => stride < 0,
			_ => false,
		};
		if !normalized {
			return None;
		}
		Some(visit_trip_count(lower_expr, upper_expr, stride_expr, stride, cmp))
	}
}

/// `for (i = L; i <= U; i += S)` runs `(U + S - L) / S` times. The count is
/// only meaningful when the loop is entered (taken) and does not wrap around
/// (finite), which the kind of the result records.
fn visit_trip_count(
	lower_expr: &InfoPtr,
	upper_expr: &InfoPtr,
	stride_expr: &InfoPtr,
	stride: i64,
	cmp: CompOp,
) -> InfoPtr {
	let is_taken = is_taken(lower_expr, upper_expr, cmp);
	let is_finite = is_finite(upper_expr, stride, cmp);
	let cancels = matches!(cmp, CompOp::Slt | CompOp::Sgt) && stride.abs() == 1;
	let mut trip_count = upper_expr.clone();
	if !cancels {
		// i < U 即 i <= U - 1, i > U 即 i >= U + 1
		match cmp {
			CompOp::Slt => {
				trip_count = create_invariant_op(
					InductionOp::Sub,
					Some(trip_count),
					InductionInfo::constant(1),
				);
			}
			CompOp::Sgt => {
				trip_count = create_invariant_op(
					InductionOp::Add,
					Some(trip_count),
					InductionInfo::constant(1),
				);
			}
			_ => {}
		}
		trip_count =
			create_invariant_op(InductionOp::Add, Some(trip_count), stride_expr.clone());
	}
	trip_count =
		create_invariant_op(InductionOp::Sub, Some(trip_count), lower_expr.clone());
	trip_count =
		create_invariant_op(InductionOp::Div, Some(trip_count), stride_expr.clone());

	let kind = match (is_taken, is_finite) {
		(true, true) => TripCountKind::InLoop,
		(false, true) => TripCountKind::InBody,
		(true, false) => TripCountKind::InLoopUnsafe,
		(false, false) => TripCountKind::InBodyUnsafe,
	};
	let op = match cmp {
		CompOp::Slt => InductionOp::Lt,
		CompOp::Sle => InductionOp::Le,
		CompOp::Sgt => InductionOp::Gt,
		_ => InductionOp::Ge,
	};
	let taken_test =
		create_invariant_op(op, Some(lower_expr.clone()), upper_expr.clone());
	InductionInfo::trip_count(kind, trip_count, Some(taken_test))
}

// 编译期能确定第一次判断一定成立
fn is_taken(lower_expr: &InductionInfo, upper_expr: &InductionInfo, cmp: CompOp) -> bool {
	let check = |lower: Option<i64>, upper: Option<i64>| match (lower, upper) {
		(Some(lower), Some(upper)) => cmp.eval(lower, upper),
		_ => false,
	};
	match cmp {
		CompOp::Slt | CompOp::Sle => check(at_most(lower_expr), at_least(upper_expr)),
		CompOp::Sgt | CompOp::Sge => check(at_least(lower_expr), at_most(upper_expr)),
		_ => false,
	}
}

// 编译期能确定归纳变量不会越过 i32 的边界
fn is_finite(upper_expr: &InductionInfo, stride: i64, cmp: CompOp) -> bool {
	let (min, max) = (i32::MIN as i64, i32::MAX as i64);
	match cmp {
		CompOp::Slt => {
			stride == 1 || at_most(upper_expr).is_some_and(|v| v <= max - stride + 1)
		}
		CompOp::Sle => at_most(upper_expr).is_some_and(|v| v <= max - stride),
		CompOp::Sgt => {
			stride == -1 || at_least(upper_expr).is_some_and(|v| v >= min - stride - 1)
		}
		CompOp::Sge => at_least(upper_expr).is_some_and(|v| v >= min - stride),
		_ => false,
	}
}
