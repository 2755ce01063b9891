// 生成代码时新建临时变量的名字前缀
pub const GENERATED_TEMP_PREFIX: &str = "t";
pub const ENTRY_LABEL: &str = "entry";

pub const DISPLAY_INDENT: &str = "  ";
