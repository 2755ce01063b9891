use rangec_derive::FuyukiDisplay;

#[derive(FuyukiDisplay, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
	Add,
	Sub,
	Mul,
	// signed division
	#[style("sdiv")]
	Div,
	// signed modulo
	#[style("srem")]
	Rem,
	// shift left
	Shl,
}

#[derive(FuyukiDisplay, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompOp {
	Eq,
	Ne,
	// signed greater than
	Sgt,
	// signed greater or equal
	Sge,
	// signed less than
	Slt,
	// signed less or equal
	Sle,
}

impl CompOp {
	// !(a op b) == a op' b
	pub fn inverse(self) -> Self {
		match self {
			Self::Eq => Self::Ne,
			Self::Ne => Self::Eq,
			Self::Sgt => Self::Sle,
			Self::Sge => Self::Slt,
			Self::Slt => Self::Sge,
			Self::Sle => Self::Sgt,
		}
	}
	// a op b == b op' a
	pub fn swap(self) -> Self {
		match self {
			Self::Eq => Self::Eq,
			Self::Ne => Self::Ne,
			Self::Sgt => Self::Slt,
			Self::Sge => Self::Sle,
			Self::Slt => Self::Sgt,
			Self::Sle => Self::Sge,
		}
	}
	pub fn eval<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
		match self {
			Self::Eq => lhs == rhs,
			Self::Ne => lhs != rhs,
			Self::Sgt => lhs > rhs,
			Self::Sge => lhs >= rhs,
			Self::Slt => lhs < rhs,
			Self::Sle => lhs <= rhs,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn op_display() {
		assert_eq!(ArithOp::Add.to_string(), "add");
		assert_eq!(ArithOp::Div.to_string(), "sdiv");
		assert_eq!(ArithOp::Rem.to_string(), "srem");
		assert_eq!(CompOp::Slt.to_string(), "slt");
		assert_eq!(CompOp::Sge.to_string(), "sge");
	}

	#[test]
	fn comp_inverse_and_swap() {
		for op in [CompOp::Slt, CompOp::Sle, CompOp::Sgt, CompOp::Sge] {
			for (a, b) in [(1, 2), (2, 2), (3, 2)] {
				assert_eq!(op.inverse().eval(a, b), !op.eval(a, b));
				assert_eq!(op.swap().eval(b, a), op.eval(a, b));
			}
		}
	}
}
