use std::fmt::Display;

use llvm::InstrId;

/// `a * instruction + b`, or the constant `b` when there is no instruction.
/// All arithmetic is checked on the i32 range; anything that would wrap is
/// unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Value {
	pub instruction: Option<InstrId>,
	pub a_constant: i32,
	pub b_constant: i32,
	pub is_known: bool,
}

impl Value {
	pub fn new(b: i32) -> Self {
		Self {
			instruction: None,
			a_constant: 0,
			b_constant: b,
			is_known: true,
		}
	}

	pub fn with_instr(instruction: InstrId, a: i32, b: i32) -> Self {
		Self {
			instruction: (a != 0).then_some(instruction),
			a_constant: a,
			b_constant: b,
			is_known: true,
		}
	}

	fn anchored(instruction: Option<InstrId>, a: i32, b: i32) -> Self {
		match instruction {
			Some(instruction) => Self::with_instr(instruction, a, b),
			None => Self::new(b),
		}
	}

	pub fn unknown() -> Self {
		Self::default()
	}

	pub fn is_constant(&self) -> bool {
		self.is_known && self.a_constant == 0
	}

	pub fn as_constant(&self) -> Option<i32> {
		self.is_constant().then_some(self.b_constant)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match (self.is_known, self.instruction) {
			(false, _) => write!(f, "?"),
			(true, None) => write!(f, "{}", self.b_constant),
			(true, Some(instr)) => {
				write!(f, "{} * {} + {}", self.a_constant, instr, self.b_constant)
			}
		}
	}
}

pub fn add_value(v1: Value, v2: Value) -> Value {
	if !v1.is_known || !v2.is_known {
		return Value::unknown();
	}
	let Some(b) = v1.b_constant.checked_add(v2.b_constant) else {
		return Value::unknown();
	};
	if v1.a_constant == 0 {
		Value::anchored(v2.instruction, v2.a_constant, b)
	} else if v2.a_constant == 0 {
		Value::anchored(v1.instruction, v1.a_constant, b)
	} else if v1.instruction == v2.instruction {
		match v1.a_constant.checked_add(v2.a_constant) {
			Some(a) => Value::anchored(v1.instruction, a, b),
			None => Value::unknown(),
		}
	} else {
		Value::unknown()
	}
}

pub fn sub_value(v1: Value, v2: Value) -> Value {
	if !v1.is_known || !v2.is_known {
		return Value::unknown();
	}
	let Some(b) = v1.b_constant.checked_sub(v2.b_constant) else {
		return Value::unknown();
	};
	if v1.a_constant == 0 {
		match v2.a_constant.checked_neg() {
			Some(a) => Value::anchored(v2.instruction, a, b),
			None => Value::unknown(),
		}
	} else if v2.a_constant == 0 {
		Value::anchored(v1.instruction, v1.a_constant, b)
	} else if v1.instruction == v2.instruction {
		match v1.a_constant.checked_sub(v2.a_constant) {
			Some(a) => Value::anchored(v1.instruction, a, b),
			None => Value::unknown(),
		}
	} else {
		Value::unknown()
	}
}

// 只允许一边是符号
pub fn mul_value(v1: Value, v2: Value) -> Value {
	if !v1.is_known || !v2.is_known {
		return Value::unknown();
	}
	let scale = |v: Value, c: i32| match (v.a_constant.checked_mul(c), v.b_constant.checked_mul(c)) {
		(Some(a), Some(b)) => Value::anchored(v.instruction, a, b),
		_ => Value::unknown(),
	};
	if v1.a_constant == 0 {
		scale(v2, v1.b_constant)
	} else if v2.a_constant == 0 {
		scale(v1, v2.b_constant)
	} else {
		Value::unknown()
	}
}

// 除法不能分配到加法上，所以只算常量
pub fn div_value(v1: Value, v2: Value) -> Value {
	match (v1.as_constant(), v2.as_constant()) {
		(Some(a), Some(b)) => a.checked_div(b).map_or(Value::unknown(), Value::new),
		_ => Value::unknown(),
	}
}

/// Minimum or maximum of two values. Symbolic values are only comparable on
/// the same instruction with the same coefficient.
pub fn merge_val(v1: Value, v2: Value, is_min: bool) -> Value {
	if !v1.is_known || !v2.is_known {
		return Value::unknown();
	}
	if v1.instruction != v2.instruction || v1.a_constant != v2.a_constant {
		return Value::unknown();
	}
	let b = if is_min {
		v1.b_constant.min(v2.b_constant)
	} else {
		v1.b_constant.max(v2.b_constant)
	};
	Value::anchored(v1.instruction, v1.a_constant, b)
}
