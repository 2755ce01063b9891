use std::fmt::{Display, Formatter, Result};

use llvm::InstrId;
use rrvm::LlvmFunc;

use super::{InductionInfo, InductionOp, TripCountKind};

impl Display for InductionOp {
	fn fmt(&self, f: &mut Formatter) -> Result {
		let op = match self {
			Self::Add => "+",
			Self::Sub | Self::Neg => "-",
			Self::Mul => "*",
			Self::Div => "/",
			Self::Lt => "<",
			Self::Le => "<=",
			Self::Gt => ">",
			Self::Ge => ">=",
		};
		write!(f, "{}", op)
	}
}

impl Display for TripCountKind {
	fn fmt(&self, f: &mut Formatter) -> Result {
		let kind = match self {
			Self::InLoop => "TC-loop",
			Self::InLoopUnsafe => "TC-loop-unsafe",
			Self::InBody => "TC-body",
			Self::InBodyUnsafe => "TC-body-unsafe",
		};
		write!(f, "{}", kind)
	}
}

fn fmt_info(
	info: &InductionInfo,
	f: &mut Formatter,
	name: &dyn Fn(InstrId) -> String,
) -> Result {
	match info {
		InductionInfo::Fetch(instr) => write!(f, "{}", name(*instr)),
		InductionInfo::Constant(value) => write!(f, "{}", value),
		InductionInfo::Invariant(op, a, b) => {
			write!(f, "(")?;
			if let Some(a) = a {
				fmt_info(a, f, name)?;
				write!(f, " ")?;
			}
			write!(f, "{} ", op)?;
			fmt_info(b, f, name)?;
			write!(f, ")")
		}
		InductionInfo::Linear(a, b) => {
			write!(f, "(")?;
			fmt_info(a, f, name)?;
			write!(f, " * i + ")?;
			fmt_info(b, f, name)?;
			write!(f, ")")
		}
		InductionInfo::Periodic(a, b) | InductionInfo::WrapAround(a, b) => {
			let tag = if info.is_periodic() { "periodic" } else { "wrap" };
			write!(f, "{}(", tag)?;
			fmt_info(a, f, name)?;
			write!(f, ", ")?;
			fmt_info(b, f, name)?;
			write!(f, ")")
		}
		InductionInfo::TripCount(kind, count, _) => {
			write!(f, "{}:", kind)?;
			fmt_info(count, f, name)
		}
	}
}

impl Display for InductionInfo {
	fn fmt(&self, f: &mut Formatter) -> Result {
		fmt_info(self, f, &|instr| instr.to_string())
	}
}

/// Prints fetched values by their names in `func`.
pub struct InfoDisplay<'a> {
	info: &'a InductionInfo,
	func: &'a LlvmFunc,
}

impl InductionInfo {
	pub fn display<'a>(&'a self, func: &'a LlvmFunc) -> InfoDisplay<'a> {
		InfoDisplay { info: self, func }
	}
}

impl Display for InfoDisplay<'_> {
	fn fmt(&self, f: &mut Formatter) -> Result {
		fmt_info(self.info, f, &|instr| self.func.operand(instr))
	}
}
