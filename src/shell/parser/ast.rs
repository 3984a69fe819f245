use std::fmt;

use log::debug;

use crate::shell::stream::Stream;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Word(String),
    Redirect(RedirectOp),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectOp {
    Input,   // <
    HereDoc, // <<
    Output,  // >
    Append,  // >>
}

impl RedirectOp {
    pub fn from_symbol(c: char, doubled: bool) -> Self {
        match (c, doubled) {
            ('<', false) => RedirectOp::Input,
            ('<', true) => RedirectOp::HereDoc,
            (_, false) => RedirectOp::Output,
            (_, true) => RedirectOp::Append,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectOp::Input => "<",
            RedirectOp::HereDoc => "<<",
            RedirectOp::Output => ">",
            RedirectOp::Append => ">>",
        }
    }

    pub fn is_output(&self) -> bool {
        matches!(self, RedirectOp::Output | RedirectOp::Append)
    }
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一个管道阶段解析后的命令
///
/// `name` 保留原始的引号和转义字符，`args` 已经去掉引号。
#[derive(Debug)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
    pub input: Stream,
    pub output: Stream,
    pub error: Stream,
}

impl Command {
    pub fn new(name: String, args: Vec<String>, input: Stream, output: Stream, error: Stream) -> Self {
        Self {
            name,
            args,
            input,
            output,
            error,
        }
    }

    /// 阶段结束时释放所有非继承的流
    pub fn close(self) {
        for stream in [&self.input, &self.output, &self.error] {
            if !stream.is_inherited() {
                debug!("关闭 {} 的 {}", self.name, stream);
            }
        }
    }
}
