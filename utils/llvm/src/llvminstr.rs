use crate::{
	llvmop::{ArithOp, CompOp},
	temp::{BlockId, InstrId},
};

// 指令的结果就是它在 arena 里的句柄，所以这里不再记录 target

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArithInstr {
	pub op: ArithOp,
	pub lhs: InstrId,
	pub rhs: InstrId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegInstr {
	pub value: InstrId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompInstr {
	pub op: CompOp,
	pub lhs: InstrId,
	pub rhs: InstrId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhiInstr {
	pub source: Vec<(InstrId, BlockId)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpInstr {
	pub target: BlockId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpCondInstr {
	pub cond: InstrId,
	pub target_true: BlockId,
	pub target_false: BlockId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetInstr {
	pub value: Option<InstrId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlvmInstr {
	// 常量在函数内去重，属于 entry 块但不出现在任何指令列表里
	IntConst(i32),
	Param(usize),
	Arith(ArithInstr),
	Neg(NegInstr),
	Comp(CompInstr),
	Phi(PhiInstr),
	Jump(JumpInstr),
	JumpCond(JumpCondInstr),
	Ret(RetInstr),
}
