use std::fmt::Display;

use llvm::*;
use utils::constants::DISPLAY_INDENT;

use crate::func::LlvmFunc;

impl LlvmFunc {
	// 常量直接输出数字
	pub fn operand(&self, id: InstrId) -> String {
		match self.instr(id) {
			LlvmInstr::IntConst(v) => v.to_string(),
			_ => format!("%{}", self.name_of(id)),
		}
	}

	fn label_of(&self, block: BlockId) -> String {
		format!("%{}", self.cfg.block(block).label)
	}

	pub fn instr_to_string(&self, id: InstrId) -> String {
		let target = format!("%{}", self.name_of(id));
		match self.instr(id) {
			LlvmInstr::IntConst(v) => format!("{} = {}", target, v),
			LlvmInstr::Param(index) => format!("{} = param {}", target, index),
			LlvmInstr::Arith(v) => format!(
				"{} = {} i32 {}, {}",
				target,
				v.op,
				self.operand(v.lhs),
				self.operand(v.rhs)
			),
			LlvmInstr::Neg(v) => {
				format!("{} = neg i32 {}", target, self.operand(v.value))
			}
			LlvmInstr::Comp(v) => format!(
				"{} = icmp {} i32 {}, {}",
				target,
				v.op,
				self.operand(v.lhs),
				self.operand(v.rhs)
			),
			LlvmInstr::Phi(v) => {
				let source: Vec<_> = v
					.source
					.iter()
					.map(|(value, from)| {
						format!("[{}, {}]", self.operand(*value), self.label_of(*from))
					})
					.collect();
				format!("{} = phi i32 {}", target, source.join(", "))
			}
			LlvmInstr::Jump(v) => format!("br label {}", self.label_of(v.target)),
			LlvmInstr::JumpCond(v) => format!(
				"br i1 {}, label {}, label {}",
				self.operand(v.cond),
				self.label_of(v.target_true),
				self.label_of(v.target_false)
			),
			LlvmInstr::Ret(v) => match v.value {
				Some(value) => format!("ret i32 {}", self.operand(value)),
				None => "ret void".to_string(),
			},
		}
	}
}

impl Display for LlvmFunc {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let params: Vec<_> =
			self.params.iter().map(|p| format!("i32 {}", self.operand(*p))).collect();
		writeln!(
			f,
			"define {} @{}({}) {{",
			self.ret_type,
			self.name,
			params.join(", ")
		)?;
		for bb in self.cfg.blocks.iter() {
			#[cfg(feature = "debug")]
			writeln!(
				f,
				"{}:    ; {} prev: {:?}",
				bb.label,
				bb.id,
				bb.prev.iter().map(|b| b.0).collect::<Vec<_>>()
			)?;
			#[cfg(not(feature = "debug"))]
			writeln!(f, "{}:", bb.label)?;
			for instr in bb.all_instrs() {
				writeln!(f, "{}{}", DISPLAY_INDENT, self.instr_to_string(instr))?;
			}
		}
		write!(f, "}}")
	}
}
