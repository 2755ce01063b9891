use crate::{llvminstr::*, temp::*};

impl LlvmInstr {
	pub fn get_read(&self) -> Vec<InstrId> {
		match self {
			Self::IntConst(_) | Self::Param(_) | Self::Jump(_) => Vec::new(),
			Self::Arith(v) => vec![v.lhs, v.rhs],
			Self::Neg(v) => vec![v.value],
			Self::Comp(v) => vec![v.lhs, v.rhs],
			Self::Phi(v) => v.source.iter().map(|(t, _)| *t).collect(),
			Self::JumpCond(v) => vec![v.cond],
			Self::Ret(v) => v.value.into_iter().collect(),
		}
	}
	pub fn get_succ(&self) -> Vec<BlockId> {
		match self {
			Self::Jump(v) => vec![v.target],
			Self::JumpCond(v) => vec![v.target_true, v.target_false],
			_ => Vec::new(),
		}
	}
	pub fn is_phi(&self) -> bool {
		matches!(self, Self::Phi(_))
	}
	pub fn is_terminator(&self) -> bool {
		matches!(self, Self::Jump(_) | Self::JumpCond(_) | Self::Ret(_))
	}
	// 是否产生一个值
	pub fn has_value(&self) -> bool {
		!self.is_terminator()
	}
	pub fn get_int_const(&self) -> Option<i32> {
		match self {
			Self::IntConst(v) => Some(*v),
			_ => None,
		}
	}
}
