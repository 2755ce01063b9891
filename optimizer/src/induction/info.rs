use std::rc::Rc;

use llvm::InstrId;

use crate::induction_range::{is_constant, ConstantRequest};

pub type InfoPtr = Rc<InductionInfo>;

/// Operators of a compound loop invariant. The comparisons only occur in the
/// taken test that accompanies a trip count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InductionOp {
	Add,
	Sub,
	Neg,
	Mul,
	Div,
	Lt,
	Le,
	Gt,
	Ge,
}

/// Where a trip count may be used without extra runtime checks.
///
/// `InLoop` counts are valid in the whole loop, `InBody` counts only inside
/// the body proper (the loop must be known to be entered, hence a taken
/// test). The `Unsafe` variants additionally need a finite test because the
/// exit condition might never become false.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TripCountKind {
	InLoop,
	InLoopUnsafe,
	InBody,
	InBodyUnsafe,
}

impl TripCountKind {
	pub fn is_body(self) -> bool {
		matches!(self, Self::InBody | Self::InBodyUnsafe)
	}
	pub fn is_unsafe(self) -> bool {
		matches!(self, Self::InLoopUnsafe | Self::InBodyUnsafe)
	}
}

/// The meaning of an SSA value with respect to one loop, in terms of the
/// normalized iteration count `i` (0 on the first iteration).
///
/// Descriptors are immutable and shared, so one node may hang under several
/// parents. Leaves are always `Fetch` or `Constant`.
#[derive(Debug, PartialEq, Eq)]
pub enum InductionInfo {
	/// `a op b`, where `a` is absent for `Neg`.
	Invariant(InductionOp, Option<InfoPtr>, InfoPtr),
	/// A value defined outside the loop.
	Fetch(InstrId),
	Constant(i32),
	/// `a * i + b`
	Linear(InfoPtr, InfoPtr),
	/// `a, b, a, b, ...`; `b` may itself be periodic.
	Periodic(InfoPtr, InfoPtr),
	/// `a` on the first iteration, `b` afterwards.
	WrapAround(InfoPtr, InfoPtr),
	/// Number of iterations, plus the `lower cmp upper` test that decides
	/// whether the loop is entered at all.
	TripCount(TripCountKind, InfoPtr, Option<InfoPtr>),
}

impl InductionInfo {
	pub fn constant(value: i32) -> InfoPtr {
		Rc::new(Self::Constant(value))
	}

	pub fn fetch(instr: InstrId) -> InfoPtr {
		Rc::new(Self::Fetch(instr))
	}

	pub fn invariant(
		op: InductionOp,
		a: Option<InfoPtr>,
		b: InfoPtr,
	) -> InfoPtr {
		Rc::new(Self::Invariant(op, a, b))
	}

	pub fn linear(a: InfoPtr, b: InfoPtr) -> InfoPtr {
		Rc::new(Self::Linear(a, b))
	}

	pub fn periodic(a: InfoPtr, b: InfoPtr) -> InfoPtr {
		Rc::new(Self::Periodic(a, b))
	}

	pub fn wrap_around(a: InfoPtr, b: InfoPtr) -> InfoPtr {
		Rc::new(Self::WrapAround(a, b))
	}

	pub fn trip_count(
		kind: TripCountKind,
		count: InfoPtr,
		taken_test: Option<InfoPtr>,
	) -> InfoPtr {
		Rc::new(Self::TripCount(kind, count, taken_test))
	}

	pub fn is_invariant(&self) -> bool {
		matches!(self, Self::Invariant(..) | Self::Fetch(_) | Self::Constant(_))
	}

	pub fn is_linear(&self) -> bool {
		matches!(self, Self::Linear(..))
	}

	pub fn is_periodic(&self) -> bool {
		matches!(self, Self::Periodic(..))
	}

	pub fn as_constant(&self) -> Option<i32> {
		match self {
			Self::Constant(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_fetch(&self) -> Option<InstrId> {
		match self {
			Self::Fetch(instr) => Some(*instr),
			_ => None,
		}
	}

	/// Operands of a `Linear`, `Periodic` or `WrapAround` induction.
	pub fn induction_operands(&self) -> Option<(&InfoPtr, &InfoPtr)> {
		match self {
			Self::Linear(a, b) | Self::Periodic(a, b) | Self::WrapAround(a, b) => {
				Some((a, b))
			}
			_ => None,
		}
	}

	/// Same induction class as `self` with new operands.
	pub fn with_operands(&self, a: InfoPtr, b: InfoPtr) -> Option<InfoPtr> {
		match self {
			Self::Linear(..) => Some(Self::linear(a, b)),
			Self::Periodic(..) => Some(Self::periodic(a, b)),
			Self::WrapAround(..) => Some(Self::wrap_around(a, b)),
			_ => None,
		}
	}

	pub fn trip_kind(&self) -> Option<TripCountKind> {
		match self {
			Self::TripCount(kind, ..) => Some(*kind),
			_ => None,
		}
	}
}

fn is_exact(info: &InductionInfo) -> Option<i64> {
	is_constant(Some(info), ConstantRequest::Exact)
}

/// Builds the invariant `a op b`, folding away trivial operations so the
/// descriptors stay small:
/// `0 + b`, `0 * b`, `1 * b`, `-1 * b`, `a + 0`, `a - 0`, `a * 0`, `-0`,
/// `a * 1`, `a / 1`, `a * -1`, `a / -1`, `a + -b`, `a - -b`, `-(-b)`,
/// `-(a - b)`.
pub fn create_invariant_op(
	op: InductionOp,
	a: Option<InfoPtr>,
	b: InfoPtr,
) -> InfoPtr {
	use InductionOp::*;
	// -(a - b) = b - a
	if let (Neg, InductionInfo::Invariant(Sub, Some(x), y)) = (op, b.as_ref()) {
		return create_invariant_op(Sub, Some(y.clone()), x.clone());
	}
	if let Some(value) = a.as_deref().and_then(is_exact) {
		match (value, op) {
			(0, Add) => return b,
			(0, Mul) => return a.unwrap_or(b),
			(1, Mul) => return b,
			(-1, Mul) => return create_invariant_op(Neg, None, b),
			_ => {}
		}
	}
	if let Some(value) = is_exact(&b) {
		match (value, op) {
			(0, Add | Sub) => {
				if let Some(a) = a {
					return a;
				}
			}
			(0, Mul | Neg) => return b,
			(1, Mul | Div) => {
				if let Some(a) = a {
					return a;
				}
			}
			(-1, Mul | Div) => return create_invariant_op(Neg, None, a.unwrap_or(b)),
			_ => {}
		}
	} else if let InductionInfo::Invariant(Neg, _, inner) = b.as_ref() {
		match op {
			Add => return create_invariant_op(Sub, a, inner.clone()),
			Sub => return create_invariant_op(Add, a, inner.clone()),
			Neg => return inner.clone(),
			_ => {}
		}
	}
	InductionInfo::invariant(op, a, b)
}
