use crate::induction::{create_invariant_op, InductionInfo, InductionOp, InfoPtr};

// 把运算传递到归纳变量的各个分量上, 无法表示时返回 None

pub fn transfer_add_sub(
	a: Option<InfoPtr>,
	b: Option<InfoPtr>,
	op: InductionOp,
) -> Option<InfoPtr> {
	let (a, b) = (a?, b?);
	if a.is_invariant() && b.is_invariant() {
		return Some(create_invariant_op(op, Some(a), b));
	}
	if let (InductionInfo::Linear(a1, a0), InductionInfo::Linear(b1, b0)) =
		(a.as_ref(), b.as_ref())
	{
		let new_a = transfer_add_sub(Some(a1.clone()), Some(b1.clone()), op)?;
		let new_b = transfer_add_sub(Some(a0.clone()), Some(b0.clone()), op)?;
		return Some(InductionInfo::linear(new_a, new_b));
	}
	if a.is_invariant() {
		let (b_a, b_b) = b.induction_operands()?;
		let new_b = transfer_add_sub(Some(a.clone()), Some(b_b.clone()), op)?;
		let new_a = if !b.is_linear() {
			// wrap-around 和 periodic 的第一个分量也是值
			transfer_add_sub(Some(a), Some(b_a.clone()), op)?
		} else if op == InductionOp::Sub {
			transfer_neg(Some(b_a.clone()))?
		} else {
			b_a.clone()
		};
		return b.with_operands(new_a, new_b);
	}
	if b.is_invariant() {
		let (a_a, a_b) = a.induction_operands()?;
		let new_b = transfer_add_sub(Some(a_b.clone()), Some(b.clone()), op)?;
		let new_a = if !a.is_linear() {
			transfer_add_sub(Some(a_a.clone()), Some(b), op)?
		} else {
			a_a.clone()
		};
		return a.with_operands(new_a, new_b);
	}
	None
}

pub fn transfer_mul(a: Option<InfoPtr>, b: Option<InfoPtr>) -> Option<InfoPtr> {
	let (a, b) = (a?, b?);
	if a.is_invariant() && b.is_invariant() {
		return Some(create_invariant_op(InductionOp::Mul, Some(a), b));
	}
	if a.is_invariant() {
		let (b_a, b_b) = b.induction_operands()?;
		let new_a = transfer_mul(Some(a.clone()), Some(b_a.clone()))?;
		let new_b = transfer_mul(Some(a), Some(b_b.clone()))?;
		return b.with_operands(new_a, new_b);
	}
	if b.is_invariant() {
		let (a_a, a_b) = a.induction_operands()?;
		let new_a = transfer_mul(Some(a_a.clone()), Some(b.clone()))?;
		let new_b = transfer_mul(Some(a_b.clone()), Some(b))?;
		return a.with_operands(new_a, new_b);
	}
	None
}

// 移位的位数必须是 [0, 31) 内的常数，这样 1 << k 不会是负数
pub fn transfer_shl(a: Option<InfoPtr>, shift: Option<i64>) -> Option<InfoPtr> {
	match shift? {
		k @ 0..=30 => transfer_mul(a, Some(InductionInfo::constant(1i32 << k))),
		_ => None,
	}
}

// 只有两边都是不变量时才能传递除法
pub fn transfer_div(a: Option<InfoPtr>, b: Option<InfoPtr>) -> Option<InfoPtr> {
	let (a, b) = (a?, b?);
	if a.is_invariant() && b.is_invariant() {
		return Some(create_invariant_op(InductionOp::Div, Some(a), b));
	}
	None
}

pub fn transfer_neg(a: Option<InfoPtr>) -> Option<InfoPtr> {
	let a = a?;
	if a.is_invariant() {
		return Some(create_invariant_op(InductionOp::Neg, None, a));
	}
	let (a_a, a_b) = a.induction_operands()?;
	let new_a = transfer_neg(Some(a_a.clone()))?;
	let new_b = transfer_neg(Some(a_b.clone()))?;
	a.with_operands(new_a, new_b)
}
