pub use clap::Parser;

#[derive(Parser, Debug)]
pub struct Args {
	/// Echo the parsed functions
	#[arg(long)]
	pub ir: bool,

	/// Print the classified values and trip count of every loop
	#[arg(long)]
	pub induction: bool,

	/// Print the range of every classified value at the header and in the body
	#[arg(long)]
	pub range: bool,

	/// Generate bounds and taken tests into the loop preheaders
	#[arg(long)]
	pub hoist: bool,

	#[arg(short)]
	pub output: Option<String>,

	/// More log output, repeat for trace
	#[arg(short, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[arg(value_parser)]
	pub input: Option<String>,
}
