use llvm::{BlockId, InstrId};
use rrvm::{LlvmFunc, LoopId};

use crate::induction::{InductionInfo, InductionVarAnalysis, InfoPtr};

mod codegen;
mod eval;
mod value;

use codegen::{CodeGen, Generated};
pub use eval::*;
pub use value::*;

/// Ranges of induction values, answered on demand from a finished
/// [`InductionVarAnalysis`].
pub struct InductionVarRange<'a> {
	induction_analysis: &'a InductionVarAnalysis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InductionRange {
	pub min: Value,
	pub max: Value,
	// 范围只在循环确实会结束时成立
	pub needs_finite_test: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeGenTests {
	pub needs_finite_test: bool,
	pub needs_taken_test: bool,
}

/// Instructions computing the bounds. `lower` is absent for loop
/// invariants, whose upper bound is the value itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeCode {
	pub lower: Option<InstrId>,
	pub upper: InstrId,
}

// 查询时用到的循环信息
struct Query {
	info: InfoPtr,
	trip: Option<InfoPtr>,
	in_body: bool,
}

impl<'a> InductionVarRange<'a> {
	pub fn new(induction_analysis: &'a InductionVarAnalysis) -> Self {
		Self { induction_analysis }
	}

	// context 所在的最内层循环，以及 context 是否在循环体里
	fn context_loop(&self, func: &LlvmFunc, context: InstrId) -> Option<(LoopId, bool)> {
		let loops = &self.induction_analysis.loops;
		let block = func.block_of(context);
		let loop_ = loops.innermost(block)?;
		Some((loop_, loops.get(loop_).header != block))
	}

	fn query(&self, func: &LlvmFunc, context: InstrId, instr: InstrId) -> Option<Query> {
		let (loop_, in_body) = self.context_loop(func, context)?;
		let info = self.induction_analysis.lookup_info(func, loop_, instr)?;
		let trip = self.induction_analysis.trip_count(func, loop_);
		Some(Query {
			info,
			trip,
			in_body,
		})
	}

	/// Range of `instr` seen from `context`, which must lie in a loop.
	pub fn get_induction_range(
		&self,
		func: &LlvmFunc,
		context: InstrId,
		instr: InstrId,
	) -> Option<InductionRange> {
		let Query {
			info,
			trip,
			in_body,
		} = self.query(func, context, instr)?;
		let trip = trip.as_deref();
		Some(InductionRange {
			min: get_val(Some(&info), trip, in_body, true),
			max: get_val(Some(&info), trip, in_body, false),
			needs_finite_test: needs_trip_count(Some(&info)) && is_unsafe_trip_count(trip),
		})
	}

	fn generate_code(
		&self,
		query: &Query,
		codegen: &mut CodeGen,
	) -> Option<(Generated, Generated)> {
		let trip = query.trip.as_deref();
		// 不变量不需要下界
		let lower = if query.info.is_invariant() {
			None
		} else {
			codegen.generate(Some(&query.info), trip, query.in_body, true)?
		};
		let upper = codegen.generate(Some(&query.info), trip, query.in_body, false)?;
		Some((lower, upper))
	}

	/// Whether [`Self::generate_range_code`] would succeed, and which runtime
	/// tests must guard the generated bounds.
	pub fn can_generate_code(
		&self,
		func: &LlvmFunc,
		context: InstrId,
		instr: InstrId,
	) -> Option<CodeGenTests> {
		let query = self.query(func, context, instr)?;
		let trip = query.trip.as_deref()?;
		let tests = CodeGenTests {
			needs_finite_test: needs_trip_count(Some(&query.info))
				&& is_unsafe_trip_count(Some(trip)),
			needs_taken_test: is_body_trip_count(Some(trip)),
		};
		let mut codegen = CodeGen::check();
		if tests.needs_taken_test {
			codegen.generate(taken_test(trip), None, query.in_body, false)?;
		}
		self.generate_code(&query, &mut codegen)?;
		Some(tests)
	}

	/// Appends the code for the bounds of `instr` to `block`, typically the
	/// preheader of the loop around `context`.
	pub fn generate_range_code(
		&self,
		func: &mut LlvmFunc,
		context: InstrId,
		instr: InstrId,
		block: BlockId,
	) -> Option<RangeCode> {
		self.can_generate_code(func, context, instr)?;
		let query = self.query(func, context, instr)?;
		let mut codegen = CodeGen::new(func, block);
		let (lower, upper) = self.generate_code(&query, &mut codegen)?;
		Some(RangeCode {
			lower,
			upper: upper?,
		})
	}

	/// Appends `lower < upper` (or `lower > upper` for a descending loop),
	/// which holds iff the loop around `context` runs at least once.
	pub fn generate_taken_test(
		&self,
		func: &mut LlvmFunc,
		context: InstrId,
		block: BlockId,
	) -> Option<InstrId> {
		let (loop_, in_body) = self.context_loop(func, context)?;
		let trip = self.induction_analysis.trip_count(func, loop_)?;
		let taken = taken_test(&trip)?;
		CodeGen::check().generate(Some(taken), None, in_body, false)?;
		CodeGen::new(func, block).generate(Some(taken), None, in_body, false)?
	}
}

fn taken_test(trip: &InductionInfo) -> Option<&InductionInfo> {
	match trip {
		InductionInfo::TripCount(_, _, taken) => taken.as_deref(),
		_ => None,
	}
}

#[cfg(test)]
mod tests;
