// 报告里每层缩进的空格数
pub const REPORT_INDENT: usize = 2;

// 没有 -v 也没有 RUST_LOG 时的日志级别
pub const DEFAULT_LOG_FILTER: &str = "warn";
