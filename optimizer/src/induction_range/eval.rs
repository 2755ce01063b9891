use llvm::InstrId;

use crate::induction::{InductionInfo, InductionOp};

use super::value::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstantRequest {
	Exact,
	AtMost,
	AtLeast,
}

/// Whether the descriptor folds to a compile time constant, or at least has
/// a constant upper / lower bound.
pub fn is_constant(info: Option<&InductionInfo>, request: ConstantRequest) -> Option<i64> {
	let info = info?;
	if let InductionInfo::Constant(value) = info {
		return Some(*value as i64);
	}
	// 只看合法的区间，避免溢出造成的假象
	let min = get_val(Some(info), None, true, true).as_constant()?;
	let max = get_val(Some(info), None, true, false).as_constant()?;
	if min > max {
		return None;
	}
	match request {
		ConstantRequest::Exact => (min == max).then_some(max as i64),
		ConstantRequest::AtMost => Some(max as i64),
		ConstantRequest::AtLeast => Some(min as i64),
	}
}

/// The single constant an invariant folds to. Induction classes never count,
/// whatever their members look like.
pub fn get_constant(info: &InductionInfo) -> Option<i32> {
	if !info.is_invariant() {
		return None;
	}
	is_constant(Some(info), ConstantRequest::Exact).map(|value| value as i32)
}

// 只有线性归纳变量需要用到循环次数
pub fn needs_trip_count(info: Option<&InductionInfo>) -> bool {
	match info {
		Some(InductionInfo::Linear(..)) => true,
		Some(InductionInfo::WrapAround(_, b)) => needs_trip_count(Some(b)),
		_ => false,
	}
}

pub fn is_body_trip_count(trip: Option<&InductionInfo>) -> bool {
	trip.and_then(InductionInfo::trip_kind).is_some_and(|kind| kind.is_body())
}

pub fn is_unsafe_trip_count(trip: Option<&InductionInfo>) -> bool {
	trip.and_then(InductionInfo::trip_kind).is_some_and(|kind| kind.is_unsafe())
}

/// Lower (`is_min`) or upper bound of `info` at the header, or inside the
/// loop body when `in_body` is set.
pub fn get_val(
	info: Option<&InductionInfo>,
	trip: Option<&InductionInfo>,
	in_body: bool,
	is_min: bool,
) -> Value {
	let Some(info) = info else {
		return Value::unknown();
	};
	match info {
		InductionInfo::Invariant(op, a, b) => {
			let a = a.as_deref();
			match op {
				InductionOp::Add => add_value(
					get_val(a, trip, in_body, is_min),
					get_val(Some(b), trip, in_body, is_min),
				),
				// 减数取相反的方向
				InductionOp::Sub => sub_value(
					get_val(a, trip, in_body, is_min),
					get_val(Some(b), trip, in_body, !is_min),
				),
				InductionOp::Neg => {
					sub_value(Value::new(0), get_val(Some(b), trip, in_body, !is_min))
				}
				InductionOp::Mul => get_mul(a, Some(b), trip, in_body, is_min),
				InductionOp::Div => get_div(a, Some(b), trip, in_body, is_min),
				_ => Value::unknown(),
			}
		}
		InductionInfo::Fetch(instr) => get_fetch(*instr, trip, in_body, is_min),
		InductionInfo::Constant(value) => Value::new(*value),
		InductionInfo::TripCount(kind, count, _) => {
			// 在循环头上多算一次
			if !kind.is_body() && !in_body && !is_min {
				return get_val(Some(count), trip, in_body, is_min);
			}
			if is_min {
				Value::new(0)
			} else if in_body {
				sub_value(get_val(Some(count), trip, in_body, is_min), Value::new(1))
			} else {
				Value::unknown()
			}
		}
		InductionInfo::Linear(..) => get_linear(info, trip, in_body, is_min),
		InductionInfo::Periodic(a, b) | InductionInfo::WrapAround(a, b) => merge_val(
			get_val(Some(a), trip, in_body, is_min),
			get_val(Some(b), trip, in_body, is_min),
			is_min,
		),
	}
}

fn get_linear(
	info: &InductionInfo,
	trip: Option<&InductionInfo>,
	in_body: bool,
	is_min: bool,
) -> Value {
	let InductionInfo::Linear(a, b) = info else {
		return Value::unknown();
	};
	// 循环次数是 U - L 且初值就是 L 时，L 可以消掉，结果只和 U 有关
	if let Some(InductionInfo::TripCount(kind, count, taken)) = trip {
		if let InductionInfo::Invariant(InductionOp::Sub, Some(upper), lower) = count.as_ref() {
			match is_constant(Some(a), ConstantRequest::Exact) {
				Some(1) if !is_min && lower == b => {
					let cancelled =
						InductionInfo::TripCount(*kind, upper.clone(), taken.clone());
					return get_val(Some(&cancelled), trip, in_body, is_min);
				}
				Some(-1) if is_min && upper == b => {
					let neg = InductionInfo::invariant(InductionOp::Neg, None, lower.clone());
					let cancelled = InductionInfo::TripCount(*kind, neg, taken.clone());
					return sub_value(
						Value::new(0),
						get_val(Some(&cancelled), trip, in_body, !is_min),
					);
				}
				_ => {}
			}
		}
	}
	// a * i + b, 0 <= i < TC
	add_value(
		get_mul(Some(a), trip, trip, in_body, is_min),
		get_val(Some(b), trip, in_body, is_min),
	)
}

fn get_fetch(
	instr: InstrId,
	trip: Option<&InductionInfo>,
	in_body: bool,
	is_min: bool,
) -> Value {
	// 循环体里的循环次数至少是 1
	if is_min && in_body {
		if let Some(InductionInfo::TripCount(_, count, _)) = trip {
			if count.as_fetch() == Some(instr) {
				return Value::new(1);
			}
		}
	}
	Value::with_instr(instr, 1, 0)
}

fn same_constant(min: Value, max: Value) -> Option<Value> {
	match (min.as_constant(), max.as_constant()) {
		(Some(a), Some(b)) if a == b => Some(min),
		_ => None,
	}
}

fn non_negative(v: Value) -> bool {
	v.as_constant().is_some_and(|c| c >= 0)
}

fn non_positive(v: Value) -> bool {
	v.as_constant().is_some_and(|c| c <= 0)
}

fn corners(
	v1: (Value, Value),
	v2: (Value, Value),
	op: fn(Value, Value) -> Value,
	is_min: bool,
) -> Value {
	let mut result: Option<i32> = None;
	for x in [v1.0, v1.1] {
		for y in [v2.0, v2.1] {
			let Some(value) = op(x, y).as_constant() else {
				return Value::unknown();
			};
			result = Some(match result {
				None => value,
				Some(old) if is_min => old.min(value),
				Some(old) => old.max(value),
			});
		}
	}
	result.map_or(Value::unknown(), Value::new)
}

fn mul_range_and_constant(v_min: Value, v_max: Value, c: Value, is_min: bool) -> Value {
	if is_min == (c.b_constant >= 0) {
		mul_value(v_min, c)
	} else {
		mul_value(v_max, c)
	}
}

pub fn get_mul(
	info1: Option<&InductionInfo>,
	info2: Option<&InductionInfo>,
	trip: Option<&InductionInfo>,
	in_body: bool,
	is_min: bool,
) -> Value {
	let v1_min = get_val(info1, trip, in_body, true);
	let v1_max = get_val(info1, trip, in_body, false);
	let v2_min = get_val(info2, trip, in_body, true);
	let v2_max = get_val(info2, trip, in_body, false);
	// 常数乘区间
	if let Some(c) = same_constant(v1_min, v1_max) {
		return mul_range_and_constant(v2_min, v2_max, c, is_min);
	}
	if let Some(c) = same_constant(v2_min, v2_max) {
		return mul_range_and_constant(v1_min, v1_max, c, is_min);
	}
	// 正区间乘正或负区间
	if non_negative(v1_min) {
		if non_negative(v2_min) {
			return if is_min { mul_value(v1_min, v2_min) } else { mul_value(v1_max, v2_max) };
		} else if non_positive(v2_max) {
			return if is_min { mul_value(v1_max, v2_min) } else { mul_value(v1_min, v2_max) };
		}
	}
	// 负区间乘正或负区间
	if non_positive(v1_max) {
		if non_negative(v2_min) {
			return if is_min { mul_value(v1_min, v2_max) } else { mul_value(v1_max, v2_min) };
		} else if non_positive(v2_max) {
			return if is_min { mul_value(v1_max, v2_max) } else { mul_value(v1_min, v2_min) };
		}
	}
	// 跨过 0 的常数区间，四个角都算一遍
	corners((v1_min, v1_max), (v2_min, v2_max), mul_value, is_min)
}

pub fn get_div(
	info1: Option<&InductionInfo>,
	info2: Option<&InductionInfo>,
	trip: Option<&InductionInfo>,
	in_body: bool,
	is_min: bool,
) -> Value {
	let v1_min = get_val(info1, trip, in_body, true);
	let v1_max = get_val(info1, trip, in_body, false);
	let v2_min = get_val(info2, trip, in_body, true);
	let v2_max = get_val(info2, trip, in_body, false);
	// 除数区间包含 0
	if let (Some(lo), Some(hi)) = (v2_min.as_constant(), v2_max.as_constant()) {
		if lo <= 0 && 0 <= hi {
			return Value::unknown();
		}
	}
	if non_negative(v1_min) {
		if non_negative(v2_min) {
			return if is_min { div_value(v1_min, v2_max) } else { div_value(v1_max, v2_min) };
		} else if non_positive(v2_max) {
			return if is_min { div_value(v1_max, v2_max) } else { div_value(v1_min, v2_min) };
		}
	}
	if non_positive(v1_max) {
		if non_negative(v2_min) {
			return if is_min { div_value(v1_min, v2_min) } else { div_value(v1_max, v2_max) };
		} else if non_positive(v2_max) {
			return if is_min { div_value(v1_max, v2_min) } else { div_value(v1_min, v2_max) };
		}
	}
	corners((v1_min, v1_max), (v2_min, v2_max), div_value, is_min)
}

#[cfg(test)]
mod tests {
	use crate::induction::{InfoPtr, TripCountKind};

	use super::*;
	use InductionOp::*;

	const X: InstrId = InstrId(1);

	fn c(value: i32) -> InfoPtr {
		InductionInfo::constant(value)
	}

	fn x() -> InfoPtr {
		InductionInfo::fetch(X)
	}

	fn range(lo: i32, hi: i32) -> InfoPtr {
		InductionInfo::periodic(c(lo), c(hi))
	}

	fn inv(op: InductionOp, a: Option<InfoPtr>, b: InfoPtr) -> InfoPtr {
		InductionInfo::invariant(op, a, b)
	}

	fn trip(count: i32, in_loop: bool, safe: bool) -> InfoPtr {
		let kind = match (in_loop, safe) {
			(true, true) => TripCountKind::InLoop,
			(true, false) => TripCountKind::InLoopUnsafe,
			(false, true) => TripCountKind::InBody,
			(false, false) => TripCountKind::InBodyUnsafe,
		};
		InductionInfo::trip_count(kind, c(count), None)
	}

	fn min(info: &InfoPtr, trip: Option<&InfoPtr>) -> Value {
		get_val(Some(info), trip.map(|t| t.as_ref()), true, true)
	}

	fn max(info: &InfoPtr, trip: Option<&InfoPtr>) -> Value {
		get_val(Some(info), trip.map(|t| t.as_ref()), true, false)
	}

	fn v(b: i32) -> Value {
		Value::new(b)
	}

	#[test]
	fn null_is_unknown() {
		assert_eq!(get_val(None, None, true, true), Value::unknown());
		assert_eq!(get_val(None, None, true, false), Value::unknown());
	}

	#[test]
	fn min_max_add() {
		assert_eq!(min(&inv(Add, Some(c(2)), range(10, 20)), None), v(12));
		assert_eq!(max(&inv(Add, Some(c(2)), range(10, 20)), None), v(22));
		assert_eq!(min(&inv(Add, Some(x()), range(-20, -10)), None), Value::with_instr(X, 1, -20));
		assert_eq!(max(&inv(Add, Some(x()), range(-20, -10)), None), Value::with_instr(X, 1, -10));
		assert_eq!(min(&inv(Add, Some(range(10, 20)), x()), None), Value::with_instr(X, 1, 10));
		assert_eq!(max(&inv(Add, Some(range(10, 20)), x()), None), Value::with_instr(X, 1, 20));
		assert_eq!(min(&inv(Add, Some(range(-5, -1)), range(10, 20)), None), v(5));
		assert_eq!(max(&inv(Add, Some(range(-5, -1)), range(10, 20)), None), v(19));
	}

	#[test]
	fn min_max_sub() {
		assert_eq!(min(&inv(Sub, Some(c(2)), range(10, 20)), None), v(-18));
		assert_eq!(max(&inv(Sub, Some(c(2)), range(10, 20)), None), v(-8));
		assert_eq!(min(&inv(Sub, Some(x()), range(-20, -10)), None), Value::with_instr(X, 1, 10));
		assert_eq!(max(&inv(Sub, Some(x()), range(-20, -10)), None), Value::with_instr(X, 1, 20));
		assert_eq!(min(&inv(Sub, Some(range(10, 20)), x()), None), Value::with_instr(X, -1, 10));
		assert_eq!(max(&inv(Sub, Some(range(10, 20)), x()), None), Value::with_instr(X, -1, 20));
		assert_eq!(min(&inv(Sub, Some(range(-5, -1)), range(10, 20)), None), v(-25));
		assert_eq!(max(&inv(Sub, Some(range(-5, -1)), range(10, 20)), None), v(-11));
	}

	#[test]
	fn min_max_neg() {
		assert_eq!(min(&inv(Neg, None, range(10, 20)), None), v(-20));
		assert_eq!(max(&inv(Neg, None, range(10, 20)), None), v(-10));
		assert_eq!(min(&inv(Neg, None, range(-20, -10)), None), v(10));
		assert_eq!(max(&inv(Neg, None, range(-20, -10)), None), v(20));
		assert_eq!(min(&inv(Neg, None, x()), None), Value::with_instr(X, -1, 0));
		assert_eq!(max(&inv(Neg, None, x()), None), Value::with_instr(X, -1, 0));
	}

	#[test]
	fn min_max_mul() {
		assert_eq!(min(&inv(Mul, Some(c(2)), range(10, 20)), None), v(20));
		assert_eq!(max(&inv(Mul, Some(c(2)), range(10, 20)), None), v(40));
		assert_eq!(min(&inv(Mul, Some(c(-2)), range(-7, 8)), None), v(-16));
		assert_eq!(max(&inv(Mul, Some(c(-2)), range(-7, 8)), None), v(14));
		assert_eq!(min(&inv(Mul, Some(range(2, 10)), range(-5, -4)), None), v(-50));
		assert_eq!(max(&inv(Mul, Some(range(2, 10)), range(-5, -4)), None), v(-8));
		assert_eq!(min(&inv(Mul, Some(range(-7, 8)), range(-2, 3)), None), v(-21));
		assert_eq!(max(&inv(Mul, Some(range(-7, 8)), range(-2, 3)), None), v(24));
		// 常数乘符号是精确的
		assert_eq!(min(&inv(Mul, Some(c(3)), x()), None), Value::with_instr(X, 3, 0));
		assert_eq!(max(&inv(Mul, Some(x()), x()), None), Value::unknown());
	}

	#[test]
	fn min_max_div() {
		assert_eq!(min(&inv(Div, Some(range(12, 20)), c(4)), None), v(3));
		assert_eq!(max(&inv(Div, Some(range(12, 20)), c(4)), None), v(5));
		assert_eq!(min(&inv(Div, Some(range(40, 1000)), c(-10)), None), v(-100));
		assert_eq!(max(&inv(Div, Some(range(40, 1000)), c(-10)), None), v(-4));
		assert_eq!(min(&inv(Div, Some(range(-40, 100)), c(10)), None), v(-4));
		assert_eq!(max(&inv(Div, Some(range(-40, 100)), c(10)), None), v(10));
		// 除数可能是 0
		assert_eq!(min(&inv(Div, Some(c(100)), range(-1, 1)), None), Value::unknown());
		// 除法不分配到加法上
		assert_eq!(max(&inv(Div, Some(x()), c(2)), None), Value::unknown());
	}

	#[test]
	fn min_max_leaves() {
		assert_eq!(min(&c(12345), None), v(12345));
		assert_eq!(max(&c(12345), None), v(12345));
		assert_eq!(min(&x(), None), Value::with_instr(X, 1, 0));
		assert_eq!(max(&x(), None), Value::with_instr(X, 1, 0));
	}

	#[test]
	fn min_max_linear() {
		let tc = trip(100, true, true);
		let up = InductionInfo::linear(c(10), c(20));
		assert_eq!(min(&up, Some(&tc)), v(20));
		assert_eq!(max(&up, Some(&tc)), v(1010));
		let down = InductionInfo::linear(c(-10), c(20));
		assert_eq!(min(&down, Some(&tc)), v(-970));
		assert_eq!(max(&down, Some(&tc)), v(20));
		// 没有循环次数就不知道
		assert_eq!(max(&up, None), Value::unknown());
	}

	#[test]
	fn min_max_wrap_around() {
		let wrap = |a, lo, hi| InductionInfo::wrap_around(c(a), range(lo, hi));
		assert_eq!(min(&wrap(-5, -1, 10), None), v(-5));
		assert_eq!(max(&wrap(-5, -1, 10), None), v(10));
		assert_eq!(min(&wrap(2, -1, 10), None), v(-1));
		assert_eq!(max(&wrap(2, -1, 10), None), v(10));
		assert_eq!(min(&wrap(20, -1, 10), None), v(-1));
		assert_eq!(max(&wrap(20, -1, 10), None), v(20));
	}

	#[test]
	fn min_max_periodic() {
		assert_eq!(min(&range(-2, 99), None), v(-2));
		assert_eq!(max(&range(-2, 99), None), v(99));
		let nested = InductionInfo::periodic(c(5), range(-2, 99));
		assert_eq!(min(&nested, None), v(-2));
		assert_eq!(max(&nested, None), v(99));
	}

	#[test]
	fn trip_count_bounds() {
		let in_loop = trip(100, true, true);
		let in_body = trip(100, false, true);
		// 循环头上只有 InLoop 的上界已知
		assert_eq!(get_val(Some(&in_loop), None, false, false), v(100));
		assert_eq!(get_val(Some(&in_body), None, false, false), Value::unknown());
		assert_eq!(get_val(Some(&in_loop), None, true, false), v(99));
		assert_eq!(get_val(Some(&in_body), None, true, false), v(99));
		assert_eq!(get_val(Some(&in_body), None, false, true), v(0));
	}

	#[test]
	fn fetch_of_trip_count_is_positive_in_body() {
		let tc = InductionInfo::trip_count(TripCountKind::InBody, x(), None);
		assert_eq!(get_val(Some(&x()), Some(&tc), true, true), v(1));
		assert_eq!(get_val(Some(&x()), Some(&tc), false, true), Value::with_instr(X, 1, 0));
		assert_eq!(get_val(Some(&x()), Some(&tc), true, false), Value::with_instr(X, 1, 0));
	}

	#[test]
	fn linear_offset_cancels() {
		// for (i = x; i < 100; i++): TC = 100 - x
		let count = inv(Sub, Some(c(100)), x());
		let tc = InductionInfo::trip_count(TripCountKind::InBody, count, None);
		let up = InductionInfo::linear(c(1), x());
		assert_eq!(get_val(Some(&up), Some(&tc), true, false), v(99));
		assert_eq!(get_val(Some(&up), Some(&tc), true, true), Value::with_instr(X, 1, 0));
		// for (i = 100; i > x; i--): TC = 100 - x
		let down = InductionInfo::linear(c(-1), c(100));
		let count = inv(Sub, Some(c(100)), x());
		let tc = InductionInfo::trip_count(TripCountKind::InBody, count, None);
		assert_eq!(get_val(Some(&down), Some(&tc), true, true), Value::with_instr(X, 1, 1));
		assert_eq!(get_val(Some(&down), Some(&tc), true, false), v(100));
	}

	#[test]
	fn constants() {
		assert_eq!(get_constant(&c(12345)), Some(12345));
		assert_eq!(get_constant(&inv(Add, Some(c(2)), c(3))), Some(5));
		assert_eq!(get_constant(&x()), None);
		assert_eq!(get_constant(&range(3, 3)), None);
		assert_eq!(get_constant(&InductionInfo::linear(c(0), c(3))), None);
		assert_eq!(is_constant(Some(&range(1, 3)), ConstantRequest::AtMost), Some(3));
		assert_eq!(is_constant(Some(&range(1, 3)), ConstantRequest::AtLeast), Some(1));
		assert_eq!(is_constant(Some(&range(1, 3)), ConstantRequest::Exact), None);
		assert_eq!(is_constant(None, ConstantRequest::Exact), None);
	}

	#[test]
	fn trip_count_tags() {
		assert!(needs_trip_count(Some(&InductionInfo::linear(c(1), c(0)))));
		let wrap = InductionInfo::wrap_around(c(0), InductionInfo::linear(c(1), c(0)));
		assert!(needs_trip_count(Some(&wrap)));
		assert!(!needs_trip_count(Some(&range(0, 1))));
		assert!(!needs_trip_count(Some(&InductionInfo::wrap_around(c(0), c(1)))));
		assert!(!needs_trip_count(None));
		assert!(is_body_trip_count(Some(&trip(1, false, true))));
		assert!(!is_body_trip_count(Some(&trip(1, true, false))));
		assert!(is_unsafe_trip_count(Some(&trip(1, true, false))));
		assert!(!is_unsafe_trip_count(Some(&trip(1, false, true))));
		assert!(!is_body_trip_count(None));
		assert!(!is_unsafe_trip_count(None));
		assert!(!is_body_trip_count(Some(&c(1))));
	}
}
