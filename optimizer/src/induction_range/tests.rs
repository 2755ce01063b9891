use llvm::InstrId;
use rrvm::parser::parse;

use super::*;
use crate::{
	test_utils::{build_loop, expr, TestLoop},
	RangeHoisting, RrvmOptimizer,
};

fn analyse(t: &TestLoop) -> InductionVarAnalysis {
	let mut analysis = InductionVarAnalysis::new(&t.func);
	analysis.run(&t.func);
	analysis
}

fn bounds(
	t: &TestLoop,
	analysis: &InductionVarAnalysis,
	context: InstrId,
	instr: InstrId,
) -> (Value, Value) {
	let range = InductionVarRange::new(analysis);
	let Some(result) = range.get_induction_range(&t.func, context, instr) else {
		panic!("no range for {}", instr);
	};
	assert!(!result.needs_finite_test);
	(result.min, result.max)
}

fn c(value: i32) -> Value {
	Value::new(value)
}

#[test]
fn constant_trip_count_up() {
	let t = build_loop(0, Some(1000), 1);
	let analysis = analyse(&t);
	let loop_ = analysis.loops.innermost(t.body).unwrap();
	assert_eq!(analysis.loops.get(loop_).header, t.header);
	assert_eq!(analysis.loops.get(loop_).preheader, Some(t.preheader));
	// 在循环头里 i 可以取到 1000
	assert_eq!(bounds(&t, &analysis, t.condition, t.phi), (c(0), c(1000)));
	assert_eq!(bounds(&t, &analysis, t.increment, t.phi), (c(0), c(999)));
	assert_eq!(bounds(&t, &analysis, t.increment, t.increment), (c(1), c(1000)));

	let range = InductionVarRange::new(&analysis);
	assert_eq!(
		range.can_generate_code(&t.func, t.increment, t.phi),
		Some(CodeGenTests {
			needs_finite_test: false,
			needs_taken_test: false,
		})
	);
}

#[test]
fn constant_trip_count_down() {
	let t = build_loop(1000, Some(0), -1);
	let analysis = analyse(&t);
	assert_eq!(bounds(&t, &analysis, t.condition, t.phi), (c(0), c(1000)));
	assert_eq!(bounds(&t, &analysis, t.increment, t.phi), (c(1), c(1000)));
	assert_eq!(bounds(&t, &analysis, t.increment, t.increment), (c(0), c(999)));
}

#[test]
fn symbolic_trip_count_up() {
	let mut t = build_loop(0, None, 1);
	let analysis = analyse(&t);
	let v = |a, b| Value::with_instr(t.param, a, b);

	let (min, max) = bounds(&t, &analysis, t.condition, t.phi);
	assert_eq!(min, c(0));
	assert!(!max.is_known);
	assert_eq!(bounds(&t, &analysis, t.increment, t.phi), (c(0), v(1, -1)));
	assert_eq!(bounds(&t, &analysis, t.increment, t.increment), (c(1), v(1, 0)));

	let range = InductionVarRange::new(&analysis);
	assert_eq!(range.can_generate_code(&t.func, t.condition, t.phi), None);
	assert_eq!(
		range.can_generate_code(&t.func, t.increment, t.phi),
		Some(CodeGenTests {
			needs_finite_test: false,
			needs_taken_test: true,
		})
	);

	let Some(code) = range.generate_range_code(&mut t.func, t.increment, t.phi, t.preheader)
	else {
		panic!("no code generated");
	};
	let Some(lower) = code.lower else {
		panic!("no lower bound");
	};
	assert_eq!(expr(&t.func, lower), "add(0, 0)");
	assert_eq!(expr(&t.func, code.upper), "add(sub(%v, 1), 0)");
	let Some(taken) = range.generate_taken_test(&mut t.func, t.increment, t.preheader) else {
		panic!("no taken test");
	};
	assert_eq!(expr(&t.func, taken), "slt(0, %v)");
	for id in [lower, code.upper, taken] {
		assert_eq!(t.func.block_of(id), t.preheader);
	}
}

#[test]
fn symbolic_trip_count_down() {
	let mut t = build_loop(1000, None, -1);
	let analysis = analyse(&t);
	let v = |a, b| Value::with_instr(t.param, a, b);
	let loop_ = analysis.loops.innermost(t.body).unwrap();
	let Some(trip) = analysis.trip_count(&t.func, loop_) else {
		panic!("no trip count");
	};
	// 初值 1000 和循环次数里的 1000 相消
	assert_eq!(trip.display(&t.func).to_string(), "TC-body:(1000 - %v)");

	let (min, max) = bounds(&t, &analysis, t.condition, t.phi);
	assert!(!min.is_known);
	assert_eq!(max, c(1000));
	assert_eq!(bounds(&t, &analysis, t.increment, t.phi), (v(1, 1), c(1000)));

	let range = InductionVarRange::new(&analysis);
	assert_eq!(range.can_generate_code(&t.func, t.condition, t.phi), None);
	let Some(code) = range.generate_range_code(&mut t.func, t.increment, t.phi, t.preheader)
	else {
		panic!("no code generated");
	};
	let Some(lower) = code.lower else {
		panic!("no lower bound");
	};
	assert_eq!(
		expr(&t.func, lower),
		"sub(1000, sub(sub(1000, %v), 1))"
	);
	assert_eq!(expr(&t.func, code.upper), "sub(1000, 0)");
	let Some(taken) = range.generate_taken_test(&mut t.func, t.increment, t.preheader) else {
		panic!("no taken test");
	};
	assert_eq!(expr(&t.func, taken), "sgt(1000, %v)");
}

#[test]
fn invariant_has_only_upper_bound() {
	let mut t = build_loop(0, None, 1);
	let analysis = analyse(&t);
	let range = InductionVarRange::new(&analysis);
	assert_eq!(
		range.get_induction_range(&t.func, t.condition, t.param),
		Some(InductionRange {
			min: Value::with_instr(t.param, 1, 0),
			max: Value::with_instr(t.param, 1, 0),
			needs_finite_test: false,
		})
	);
	let Some(code) = range.generate_range_code(&mut t.func, t.increment, t.param, t.preheader)
	else {
		panic!("no code generated");
	};
	assert_eq!(code.lower, None);
	assert_eq!(code.upper, t.param);
}

#[test]
fn context_outside_any_loop() {
	let t = build_loop(0, Some(10), 1);
	let analysis = analyse(&t);
	let range = InductionVarRange::new(&analysis);
	let outside = t.preheader_jump;
	assert_eq!(range.get_induction_range(&t.func, outside, t.phi), None);
	assert_eq!(range.can_generate_code(&t.func, outside, t.phi), None);
}

fn named(func: &LlvmFunc, name: &str) -> InstrId {
	let index = func.nodes.iter().position(|node| node.name == name).unwrap();
	InstrId(index as u32)
}

fn jump_of(func: &LlvmFunc, label: &str) -> InstrId {
	let block = func.cfg.find_block(label).unwrap();
	func.cfg.block(block).jump_instr.unwrap()
}

const INCLUSIVE_BOUND: &str = r"
define void @f(i32 %n) {
entry:
  br label %header
header:
  %i = phi i32 [0, %entry], [%i2, %body]
  %c = icmp sle i32 %i, %n
  br i1 %c, label %body, label %exit
body:
  %i2 = add i32 %i, 1
  br label %header
exit:
  ret void
}
";

#[test]
fn inclusive_bound_needs_finite_test() {
	let mut func = parse(INCLUSIVE_BOUND).unwrap().remove(0);
	let mut analysis = InductionVarAnalysis::new(&func);
	analysis.run(&func);
	let (i, n, body) = (named(&func, "i"), named(&func, "n"), jump_of(&func, "body"));
	let loop_ = analysis.loops.innermost(func.block_of(i)).unwrap();
	let Some(trip) = analysis.trip_count(&func, loop_) else {
		panic!("no trip count");
	};
	// n 可能是 i32::MAX，循环不一定结束
	assert_eq!(trip.display(&func).to_string(), "TC-body-unsafe:(%n + 1)");

	let range = InductionVarRange::new(&analysis);
	assert_eq!(
		range.get_induction_range(&func, body, i),
		Some(InductionRange {
			min: c(0),
			max: Value::with_instr(n, 1, 0),
			needs_finite_test: true,
		})
	);
	assert_eq!(
		range.can_generate_code(&func, body, i),
		Some(CodeGenTests {
			needs_finite_test: true,
			needs_taken_test: true,
		})
	);
	let entry = func.entry();
	let Some(taken) = range.generate_taken_test(&mut func, body, entry) else {
		panic!("no taken test");
	};
	assert_eq!(expr(&func, taken), "sle(0, %n)");
}

#[test]
fn hoisting_skips_ranges_needing_finite_test() {
	let mut func = parse(INCLUSIVE_BOUND).unwrap().remove(0);
	let entry = func.entry();
	let before = func.cfg.block(entry).instrs.len();
	assert!(!RangeHoisting::new().apply(&mut func).unwrap());
	assert_eq!(func.cfg.block(entry).instrs.len(), before);
}

#[test]
fn wrap_around_and_periodic_ranges() {
	let src = r"
define void @f() {
entry:
  br label %header
header:
  %i = phi i32 [0, %entry], [%i2, %body]
  %w = phi i32 [7, %entry], [%i, %body]
  %k = phi i32 [0, %entry], [%k2, %body]
  %c = icmp slt i32 %i, 100
  br i1 %c, label %body, label %exit
body:
  %i2 = add i32 %i, 1
  %k2 = sub i32 1, %k
  br label %header
exit:
  ret void
}
";
	let func = parse(src).unwrap().remove(0);
	let mut analysis = InductionVarAnalysis::new(&func);
	analysis.run(&func);
	let range = InductionVarRange::new(&analysis);
	let (header, body) = (jump_of(&func, "header"), jump_of(&func, "body"));
	let bounds = |context: InstrId, name: &str| {
		let Some(result) = range.get_induction_range(&func, context, named(&func, name)) else {
			panic!("no range for %{}", name);
		};
		assert!(!result.needs_finite_test);
		(result.min, result.max)
	};
	// 第一次是 7，之后跟着 i
	assert_eq!(bounds(header, "w"), (c(0), c(100)));
	assert_eq!(bounds(body, "w"), (c(0), c(99)));
	assert_eq!(bounds(header, "k"), (c(0), c(1)));
	assert_eq!(bounds(body, "k2"), (c(0), c(1)));
}
