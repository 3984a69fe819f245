use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use super::ast::{Command, RedirectOp, Token};
use super::lexer;
use crate::shell::stream::Stream;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}: expected a filename after redirection operator")]
    MissingFilename(RedirectOp),
    #[error("{selector}{op}: unrecognized stream selector")]
    UnknownSelector { selector: String, op: RedirectOp },
    #[error("{0}: input redirection is not supported")]
    InputRedirect(RedirectOp),
    #[error("{path}: {source}")]
    Open { path: String, source: io::Error },
}

/// 解析单个管道阶段
///
/// 重定向文件以调用方给定的工作目录为基准打开。
pub struct Parser<'a> {
    cwd: &'a Path,
}

impl<'a> Parser<'a> {
    pub fn new(cwd: &'a Path) -> Self {
        Self { cwd }
    }

    pub fn parse_stage(&self, stage: &str, input: Stream, output: Stream) -> Option<Command> {
        self.parse(lexer::split_words(stage), input, output)
    }

    /// 显式重定向覆盖 `input`/`output` 默认值；空阶段返回 `None`
    pub fn parse(&self, tokens: Vec<Token>, input: Stream, output: Stream) -> Option<Command> {
        let name = match tokens.first() {
            Some(Token::Word(word)) => word.clone(),
            Some(Token::Redirect(op)) => op.to_string(),
            None => return None,
        };

        let mut output = output;
        let mut error = Stream::Stderr;
        let mut errors = Vec::new();
        let mut consumed = vec![false; tokens.len()];

        let mut i = 1;
        while i < tokens.len() {
            let Some(Token::Redirect(op)) = tokens.get(i) else {
                i += 1;
                continue;
            };
            let op = *op;
            consumed[i] = true;

            // 流编号总在操作符之前，由词法分析补齐
            let selector = match tokens.get(i - 1) {
                Some(Token::Word(selector)) if i > 1 && !consumed[i - 1] => {
                    consumed[i - 1] = true;
                    selector.as_str()
                }
                _ => "",
            };

            let Some(Token::Word(target)) = tokens.get(i + 1) else {
                errors.push(ParseError::MissingFilename(op));
                i += 1;
                continue;
            };
            consumed[i + 1] = true;

            if !op.is_output() {
                errors.push(ParseError::InputRedirect(op));
            } else if selector == "1" || selector == "2" {
                match self.open_target(op, target) {
                    Ok(file) => {
                        debug!("重定向 {}{} {}", selector, op, target);
                        // 同一个流的后一次重定向覆盖前一次
                        if selector == "1" {
                            output = Stream::File(file);
                        } else {
                            error = Stream::File(file);
                        }
                    }
                    Err(source) => errors.push(ParseError::Open {
                        path: target.clone(),
                        source,
                    }),
                }
            } else {
                errors.push(ParseError::UnknownSelector {
                    selector: selector.to_string(),
                    op,
                });
            }
            i += 2;
        }

        let args = tokens
            .into_iter()
            .zip(consumed)
            .skip(1)
            .filter(|(_, consumed)| !consumed)
            .map(|(token, _)| match token {
                Token::Word(word) => word,
                Token::Redirect(op) => op.to_string(),
            })
            .collect();

        let mut command = Command::new(name, args, input, output, error);
        for err in errors {
            warn!("解析 {} 出错: {}", command.name, err);
            if let Err(e) = writeln!(command.error, "{}", err) {
                warn!("无法写入错误流: {}", e);
            }
        }
        Some(command)
    }

    fn open_target(&self, op: RedirectOp, target: &str) -> io::Result<File> {
        let expanded = shellexpand::tilde(target);
        let path: PathBuf = self.cwd.join(expanded.as_ref());
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(op == RedirectOp::Output)
            .append(op == RedirectOp::Append)
            .mode(0o644)
            .open(path)
    }
}
