use std::collections::HashMap;

use llvm::InstrId;
use log::debug;
use rrvm::{LlvmFunc, LoopForest, LoopId};

mod display;
mod info;
mod one_loop_solver;

pub use display::InfoDisplay;
pub use info::*;
pub use one_loop_solver::invariant_fetch;

use one_loop_solver::OneLoopSolver;

/// Induction variable classification of one function. Every value used in a
/// loop gets at most one descriptor per enclosing loop, and the terminator of
/// each loop header may carry the trip count of that loop.
pub struct InductionVarAnalysis {
	pub loops: LoopForest,
	induction: HashMap<LoopId, HashMap<InstrId, InfoPtr>>,
}

impl InductionVarAnalysis {
	pub fn new(func: &LlvmFunc) -> Self {
		Self {
			loops: func.cfg.loop_analysis(),
			induction: HashMap::new(),
		}
	}

	pub fn run(&mut self, func: &LlvmFunc) {
		self.induction.clear();
		// 外层循环先处理
		for loop_ in self.loops.outer_to_inner() {
			debug!("classify loop L{}: {}", loop_.0, self.loops.get(loop_));
			let solver = OneLoopSolver::new(func, &self.loops, loop_);
			let result = solver.run();
			self.induction.insert(loop_, result);
		}
	}

	/// The descriptor of `instr` with respect to `loop_`. Values defined
	/// outside the loop are invariant even if the classifier never saw them.
	pub fn lookup_info(
		&self,
		func: &LlvmFunc,
		loop_: LoopId,
		instr: InstrId,
	) -> Option<InfoPtr> {
		if let Some(info) = self.induction.get(&loop_).and_then(|m| m.get(&instr)) {
			return Some(info.clone());
		}
		let defined_outside = func.int_value(instr).is_some()
			|| func.params.contains(&instr)
			|| !self.loops.contains_block(loop_, func.block_of(instr));
		defined_outside.then(|| invariant_fetch(func, instr))
	}

	/// The trip count stored against the terminator of the loop header.
	pub fn trip_count(&self, func: &LlvmFunc, loop_: LoopId) -> Option<InfoPtr> {
		let header = self.loops.get(loop_).header;
		let control = func.cfg.block(header).jump_instr?;
		self.induction.get(&loop_)?.get(&control).cloned()
	}

	/// Classified values of `loop_` that are defined inside it, in
	/// instruction order. The trip count is not included.
	pub fn loop_infos(&self, func: &LlvmFunc, loop_: LoopId) -> Vec<(InstrId, InfoPtr)> {
		let Some(infos) = self.induction.get(&loop_) else {
			return Vec::new();
		};
		let mut result: Vec<_> = infos
			.iter()
			.filter(|(instr, info)| {
				info.trip_kind().is_none()
					&& self.loops.contains_block(loop_, func.block_of(**instr))
					&& func.int_value(**instr).is_none()
					&& !func.params.contains(instr)
			})
			.map(|(instr, info)| (*instr, info.clone()))
			.collect();
		result.sort_by_key(|(instr, _)| *instr);
		result
	}
}
