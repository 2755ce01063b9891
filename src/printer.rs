use optimizer::{
	induction::InductionVarAnalysis,
	induction_range::{InductionVarRange, Value},
};
use rrvm::{LlvmFunc, LoopId};

use crate::config::REPORT_INDENT;

pub fn trans_indent(input: &str, n: usize) -> String {
	input
		.lines()
		.map(|line| {
			let indent_len = line.chars().take_while(|&c| c == ' ').count();
			let res = &line[indent_len..];
			let new_indent = " ".repeat((indent_len / 4) * n);
			format!("{}{}\n", new_indent, res)
		})
		.collect()
}

fn loop_title(func: &LlvmFunc, analysis: &InductionVarAnalysis, loop_: LoopId) -> String {
	let info = analysis.loops.get(loop_);
	format!(
		"    L{} (header %{}, level {})\n",
		loop_.0,
		func.cfg.block(info.header).label,
		info.level
	)
}

pub fn induction_report(func: &LlvmFunc, analysis: &InductionVarAnalysis) -> String {
	let mut out = format!("@{}:\n", func.name);
	for loop_ in analysis.loops.outer_to_inner() {
		out += &loop_title(func, analysis, loop_);
		match analysis.trip_count(func, loop_) {
			Some(trip) => out += &format!("        trip count: {}\n", trip.display(func)),
			None => out += "        trip count: unknown\n",
		}
		for (instr, info) in analysis.loop_infos(func, loop_) {
			out += &format!("        %{} = {}\n", func.name_of(instr), info.display(func));
		}
	}
	trans_indent(&out, REPORT_INDENT)
}

fn value_to_string(func: &LlvmFunc, value: &Value) -> String {
	match (value.is_known, value.instruction) {
		(false, _) => "?".to_string(),
		(true, None) => value.b_constant.to_string(),
		(true, Some(instr)) => format!(
			"{} * %{} + {}",
			value.a_constant,
			func.name_of(instr),
			value.b_constant
		),
	}
}

pub fn range_report(func: &LlvmFunc, analysis: &InductionVarAnalysis) -> String {
	let range = InductionVarRange::new(analysis);
	let mut out = format!("@{}:\n", func.name);
	for loop_ in analysis.loops.outer_to_inner() {
		out += &loop_title(func, analysis, loop_);
		let info = analysis.loops.get(loop_);
		let header = func.cfg.block(info.header).jump_instr;
		let body = info
			.back_edges
			.iter()
			.filter(|bb| **bb != info.header)
			.find_map(|bb| func.cfg.block(*bb).jump_instr);
		for (instr, _) in analysis.loop_infos(func, loop_) {
			out += &format!("        %{}\n", func.name_of(instr));
			for (place, context) in [("header", header), ("body", body)] {
				let Some(result) =
					context.and_then(|context| range.get_induction_range(func, context, instr))
				else {
					continue;
				};
				out += &format!(
					"            {}: [{}, {}]{}\n",
					place,
					value_to_string(func, &result.min),
					value_to_string(func, &result.max),
					if result.needs_finite_test { " (needs finite test)" } else { "" }
				);
			}
		}
	}
	trans_indent(&out, REPORT_INDENT)
}
