use llvm::*;
use rrvm::LlvmFunc;

/// `for (i = lower; i < upper; i += stride)` (`>` for a negative stride),
/// laid out as entry -> preheader -> header <-> body, header -> exit. The
/// bound is the parameter `%v` when `upper` is `None`.
pub struct TestLoop {
	pub func: LlvmFunc,
	pub preheader: BlockId,
	pub preheader_jump: InstrId,
	pub header: BlockId,
	pub body: BlockId,
	pub phi: InstrId,
	pub condition: InstrId,
	pub increment: InstrId,
	pub param: InstrId,
}

pub fn build_loop(lower: i32, upper: Option<i32>, stride: i32) -> TestLoop {
	let mut func = LlvmFunc::new("test", VarType::Void);
	let param = func.add_param("v");
	let entry = func.entry();
	let preheader = func.new_basicblock("preheader");
	let header = func.new_basicblock("header");
	let body = func.new_basicblock("body");
	let exit = func.new_basicblock("exit");
	func.set_jump(entry, LlvmInstr::Jump(JumpInstr { target: preheader }));
	let preheader_jump = func.set_jump(preheader, LlvmInstr::Jump(JumpInstr { target: header }));

	let lower = func.int_constant(lower);
	let upper = match upper {
		Some(value) => func.int_constant(value),
		None => param,
	};
	let phi = func.push_phi(header, Some("i"), vec![(lower, preheader)]);
	let op = if stride > 0 { CompOp::Slt } else { CompOp::Sgt };
	let condition = func.insert_comp(header, op, phi, upper);
	func.set_jump(
		header,
		LlvmInstr::JumpCond(JumpCondInstr {
			cond: condition,
			target_true: body,
			target_false: exit,
		}),
	);
	let step = func.int_constant(stride);
	let increment = func.insert_arith(body, ArithOp::Add, phi, step);
	func.set_jump(body, LlvmInstr::Jump(JumpInstr { target: header }));
	func.add_phi_source(phi, increment, body);
	func.set_jump(exit, LlvmInstr::Ret(RetInstr { value: None }));
	TestLoop {
		func,
		preheader,
		preheader_jump,
		header,
		body,
		phi,
		condition,
		increment,
		param,
	}
}

/// Prints the expression tree computing `id`, e.g. `add(sub(%v, 1), 0)`.
pub fn expr(func: &LlvmFunc, id: InstrId) -> String {
	match func.instr(id) {
		LlvmInstr::IntConst(value) => value.to_string(),
		LlvmInstr::Arith(v) => {
			format!("{}({}, {})", v.op, expr(func, v.lhs), expr(func, v.rhs))
		}
		LlvmInstr::Comp(v) => {
			format!("{}({}, {})", v.op, expr(func, v.lhs), expr(func, v.rhs))
		}
		LlvmInstr::Neg(v) => format!("neg({})", expr(func, v.value)),
		_ => format!("%{}", func.name_of(id)),
	}
}
