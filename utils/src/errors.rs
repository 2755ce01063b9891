use thiserror::Error;

#[derive(Error, Debug)]
pub enum RangecError {
	#[error("syntax error: {0}")]
	ParseError(String),
	#[error("use of undefined value '%{0}'")]
	UndefinedTemp(String),
	#[error("use of undefined label '%{0}'")]
	UndefinedLabel(String),
	#[error("malformed function '@{0}': {1}")]
	MalformedFunction(String, String),
	#[error("system error: {0}")]
	SystemError(String),
}

pub type Result<T, E = RangecError> = std::result::Result<T, E>;

pub fn map_sys_err(e: std::io::Error) -> RangecError {
	RangecError::SystemError(e.to_string())
}
