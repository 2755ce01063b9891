mod cli;
mod config;
mod logging;
mod printer;

use std::{
	fs::{self, File},
	io,
	io::Write,
};

use anyhow::Result;
use clap::Parser;
use cli::Args;
use log::{info, trace};
use optimizer::{induction::InductionVarAnalysis, RangeHoisting, RrvmOptimizer};
use rrvm::{parser::parse, LlvmFunc};
use utils::{fatal_error, map_sys_err, warning};

fn step_parse(file_name: &str) -> Result<Vec<LlvmFunc>> {
	let code = fs::read_to_string(file_name).map_err(map_sys_err)?;
	let funcs = parse(&code)?;
	for func in funcs.iter() {
		func.verify()?;
	}
	Ok(funcs)
}

fn step_hoist(func: &mut LlvmFunc) -> Result<()> {
	if !RangeHoisting::new().apply(func)? {
		warning(format!("no range code generated for '@{}'", func.name));
	}
	Ok(())
}

fn main() -> Result<()> {
	let args = Args::parse();
	logging::init(args.verbose);
	trace!("start");

	let mut writer: Box<dyn Write> = if let Some(o) = args.output {
		Box::new(File::create(o).map_err(map_sys_err)?)
	} else {
		Box::new(io::stdout())
	};

	let file_name = args.input.unwrap_or_else(|| {
		fatal_error("no input files");
		unreachable!()
	});

	let mut funcs = step_parse(&file_name)?;
	info!("parsed {} functions from {}", funcs.len(), file_name);
	if args.ir {
		for func in funcs.iter() {
			writeln!(writer, "{}", func)?;
		}
		return Ok(());
	}

	if args.hoist {
		for func in funcs.iter_mut() {
			step_hoist(func)?;
			writeln!(writer, "{}", func)?;
		}
		return Ok(());
	}

	for func in funcs.iter() {
		let mut analysis = InductionVarAnalysis::new(func);
		analysis.run(func);
		if args.induction || !args.range {
			write!(writer, "{}", printer::induction_report(func, &analysis))?;
		}
		if args.range {
			write!(writer, "{}", printer::range_report(func, &analysis))?;
		}
	}
	Ok(())
}
