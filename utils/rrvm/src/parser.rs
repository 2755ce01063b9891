use std::collections::HashMap;

use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use llvm::*;
use utils::{
	errors::Result,
	RangecError::{self, MalformedFunction, ParseError, UndefinedLabel, UndefinedTemp},
};

use crate::func::LlvmFunc;

#[derive(Parser)]
#[grammar = "llvmir.pest"]
struct IrParser;

/// Parses every `define` in `str` into an SSA function.
pub fn parse(str: &str) -> Result<Vec<LlvmFunc>> {
	let program = IrParser::parse(Rule::Program, str)
		.map_err(|e| ParseError(e.to_string()))?
		.next()
		.unwrap();
	program
		.into_inner()
		.filter(|p| p.as_rule() == Rule::Function)
		.map(parse_function)
		.collect()
}

fn local_name<'a>(pair: &Pair<'a, Rule>) -> &'a str {
	&pair.as_str()[1..]
}

fn parse_int(pair: &Pair<Rule>) -> Result<i32> {
	pair
		.as_str()
		.parse()
		.map_err(|_| ParseError(format!("integer '{}' out of range", pair.as_str())))
}

fn parse_arith_op(pair: &Pair<Rule>) -> ArithOp {
	match pair.as_str() {
		"add" => ArithOp::Add,
		"sub" => ArithOp::Sub,
		"mul" => ArithOp::Mul,
		"sdiv" => ArithOp::Div,
		"srem" => ArithOp::Rem,
		"shl" => ArithOp::Shl,
		_ => unreachable!(),
	}
}

fn parse_comp_op(pair: &Pair<Rule>) -> CompOp {
	match pair.as_str() {
		"eq" => CompOp::Eq,
		"ne" => CompOp::Ne,
		"slt" => CompOp::Slt,
		"sle" => CompOp::Sle,
		"sgt" => CompOp::Sgt,
		"sge" => CompOp::Sge,
		_ => unreachable!(),
	}
}

fn parse_ret_type(pair: &Pair<Rule>) -> VarType {
	match pair.as_str() {
		"void" => VarType::Void,
		_ => VarType::I32,
	}
}

// 指令里的名字可以先用后定义（phi 的回边），所以分两遍
struct FuncParser {
	func: LlvmFunc,
	temps: HashMap<String, InstrId>,
	labels: HashMap<String, BlockId>,
}

impl FuncParser {
	fn error(&self, msg: String) -> RangecError {
		MalformedFunction(self.func.name.clone(), msg)
	}

	fn define(&mut self, name: &str, id: InstrId) -> Result<()> {
		if self.temps.insert(name.to_string(), id).is_some() {
			return Err(self.error(format!("%{} defined twice", name)));
		}
		Ok(())
	}

	fn operand(&self, pair: &Pair<Rule>) -> Result<InstrId> {
		match pair.as_rule() {
			Rule::Int => {
				let value = parse_int(pair)?;
				self.func.get_int_constant(value).ok_or_else(|| {
					self.error(format!("constant {} was not collected", value))
				})
			}
			Rule::Local => {
				let name = local_name(pair);
				self.temps.get(name).copied().ok_or_else(|| UndefinedTemp(name.to_string()))
			}
			_ => unreachable!(),
		}
	}

	fn label(&self, pair: &Pair<Rule>) -> Result<BlockId> {
		let name = local_name(pair);
		self.labels.get(name).copied().ok_or_else(|| UndefinedLabel(name.to_string()))
	}

	fn parse_instr(&self, pair: Pair<Rule>) -> Result<LlvmInstr> {
		let rule = pair.as_rule();
		let mut pairs = pair.into_inner();
		let instr = match rule {
			Rule::Phi => {
				pairs.nth(1);
				let mut source = Vec::new();
				for p in pairs {
					let mut inner = p.into_inner();
					let value = self.operand(&inner.next().unwrap())?;
					let from = self.label(&inner.next().unwrap())?;
					source.push((value, from));
				}
				LlvmInstr::Phi(PhiInstr { source })
			}
			Rule::Arith => {
				pairs.next();
				let op = parse_arith_op(&pairs.next().unwrap());
				pairs.next();
				let lhs = self.operand(&pairs.next().unwrap())?;
				let rhs = self.operand(&pairs.next().unwrap())?;
				LlvmInstr::Arith(ArithInstr { op, lhs, rhs })
			}
			Rule::Neg => {
				let value = self.operand(&pairs.nth(2).unwrap())?;
				LlvmInstr::Neg(NegInstr { value })
			}
			Rule::Comp => {
				pairs.next();
				let op = parse_comp_op(&pairs.next().unwrap());
				pairs.next();
				let lhs = self.operand(&pairs.next().unwrap())?;
				let rhs = self.operand(&pairs.next().unwrap())?;
				LlvmInstr::Comp(CompInstr { op, lhs, rhs })
			}
			Rule::Jump => LlvmInstr::Jump(JumpInstr {
				target: self.label(&pairs.next().unwrap())?,
			}),
			Rule::JumpCond => {
				pairs.next();
				LlvmInstr::JumpCond(JumpCondInstr {
					cond: self.operand(&pairs.next().unwrap())?,
					target_true: self.label(&pairs.next().unwrap())?,
					target_false: self.label(&pairs.next().unwrap())?,
				})
			}
			Rule::Ret => LlvmInstr::Ret(RetInstr {
				value: match pairs.nth(1) {
					Some(p) => Some(self.operand(&p)?),
					None => None,
				},
			}),
			_ => unreachable!(),
		};
		Ok(instr)
	}
}

fn defined_name<'a>(pair: &Pair<'a, Rule>) -> Option<&'a str> {
	match pair.as_rule() {
		Rule::Phi | Rule::Arith | Rule::Neg | Rule::Comp => {
			pair.clone().into_inner().next().map(|p| local_name(&p))
		}
		_ => None,
	}
}

fn parse_function(pair: Pair<Rule>) -> Result<LlvmFunc> {
	let mut pairs = pair.into_inner();
	let ret_type = parse_ret_type(&pairs.next().unwrap());
	let name = local_name(&pairs.next().unwrap());
	let mut parser = FuncParser {
		func: LlvmFunc::new(name, ret_type),
		temps: HashMap::new(),
		labels: HashMap::new(),
	};

	let mut blocks = Vec::new();
	for p in pairs {
		match p.as_rule() {
			Rule::Param => {
				let local = p.into_inner().nth(1).unwrap();
				let id = parser.func.add_param(local_name(&local));
				parser.define(local_name(&local), id)?;
			}
			Rule::Block => {
				let mut inner = p.into_inner();
				let label = inner.next().unwrap().into_inner().next().unwrap();
				blocks.push((label.as_str(), inner.collect::<Vec<_>>()));
			}
			_ => unreachable!(),
		}
	}

	// 第一个块就是 entry
	for (index, (label, _)) in blocks.iter().enumerate() {
		let id = if index == 0 {
			let entry = parser.func.entry();
			parser.func.rename_block(entry, label);
			entry
		} else {
			parser.func.new_basicblock(label)
		};
		if parser.labels.insert(label.to_string(), id).is_some() {
			return Err(parser.error(format!("label '{}' defined twice", label)));
		}
	}

	// 常量先建好，之后每条指令的编号就是确定的
	for (_, instrs) in blocks.iter() {
		for instr in instrs.iter() {
			for p in instr.clone().into_inner().flatten() {
				if p.as_rule() == Rule::Int {
					parser.func.int_constant(parse_int(&p)?);
				}
			}
		}
	}
	let base = parser.func.next_instr_id().0;
	let all_instrs = blocks.iter().flat_map(|(_, instrs)| instrs.iter());
	for (index, instr) in all_instrs.enumerate() {
		if let Some(name) = defined_name(instr) {
			parser.define(name, InstrId(base + index as u32))?;
		}
	}

	for (label, instrs) in blocks {
		let bb = parser.labels[label];
		for pair in instrs {
			let name = defined_name(&pair);
			let instr = parser.parse_instr(pair)?;
			let id = match instr {
				LlvmInstr::Phi(phi) => parser.func.push_phi(bb, name, phi.source),
				_ if instr.is_terminator() => parser.func.set_jump(bb, instr),
				_ => parser.func.push_instr(bb, name, instr),
			};
			debug_assert!(name.map_or(true, |n| parser.temps[n] == id));
		}
	}
	parser.func.verify()?;
	Ok(parser.func)
}
