use env_logger::{Builder, Env};
use log::LevelFilter;

use crate::config::DEFAULT_LOG_FILTER;

pub fn init(verbose: u8) {
	let mut builder =
		Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER));
	match verbose {
		0 => {}
		1 => {
			builder.filter_level(LevelFilter::Debug);
		}
		_ => {
			builder.filter_level(LevelFilter::Trace);
		}
	}
	builder.format_timestamp(None).format_target(false).init();
}
