use llvm::{BlockId, InstrId};
use log::{debug, trace};
use rrvm::{LlvmFunc, LoopId};
use utils::Result;

use crate::{
	induction::InductionVarAnalysis,
	induction_range::{InductionVarRange, RangeCode},
	RrvmOptimizer,
};

use super::RangeHoisting;

struct Solver<'a> {
	analysis: &'a InductionVarAnalysis,
	range: InductionVarRange<'a>,
}

impl<'a> Solver<'a> {
	fn new(analysis: &'a InductionVarAnalysis) -> Self {
		Self {
			analysis,
			range: InductionVarRange::new(analysis),
		}
	}

	// 回边起点的跳转指令一定在循环体里
	fn body_context(&self, func: &LlvmFunc, loop_: LoopId) -> Option<InstrId> {
		let info = self.analysis.loops.get(loop_);
		info
			.back_edges
			.iter()
			.filter(|bb| **bb != info.header)
			.find_map(|bb| func.cfg.block(*bb).jump_instr)
	}

	fn hoist(&self, func: &mut LlvmFunc, loop_: LoopId) -> bool {
		let Some(preheader) = self.analysis.loops.get(loop_).preheader else {
			trace!("L{} has no preheader", loop_.0);
			return false;
		};
		let Some(context) = self.body_context(func, loop_) else {
			return false;
		};
		let mut flag = false;
		let mut needs_taken_test = false;
		for (instr, _) in self.analysis.loop_infos(func, loop_) {
			let Some(tests) = self.range.can_generate_code(func, context, instr) else {
				continue;
			};
			// 需要有限性检查的范围不能直接使用
			if tests.needs_finite_test {
				continue;
			}
			if let Some(code) = self.range.generate_range_code(func, context, instr, preheader) {
				log_range(func, instr, preheader, &code);
				needs_taken_test |= tests.needs_taken_test;
				flag = true;
			}
		}
		if needs_taken_test {
			if let Some(taken) = self.range.generate_taken_test(func, context, preheader) {
				debug!("L{} taken test %{}", loop_.0, func.name_of(taken));
			}
		}
		flag
	}
}

fn log_range(func: &LlvmFunc, instr: InstrId, block: BlockId, code: &RangeCode) {
	let lower = code.lower.map_or("-".to_string(), |id| format!("%{}", func.name_of(id)));
	debug!(
		"%{} hoisted to {}: [{}, %{}]",
		func.name_of(instr),
		func.cfg.block(block).label,
		lower,
		func.name_of(code.upper)
	);
}

impl RrvmOptimizer for RangeHoisting {
	fn new() -> Self {
		Self::default()
	}

	fn apply(self, func: &mut LlvmFunc) -> Result<bool> {
		let mut analysis = InductionVarAnalysis::new(func);
		analysis.run(func);
		let solver = Solver::new(&analysis);
		let mut flag = false;
		for loop_ in analysis.loops.outer_to_inner() {
			flag |= solver.hoist(func, loop_);
		}
		Ok(flag)
	}
}
