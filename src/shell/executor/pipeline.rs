use std::fs::File;
use std::iter;

use log::debug;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use thiserror::Error;

use crate::shell::parser::ast::Command;
use crate::shell::parser::Parser;
use crate::shell::session::Session;
use crate::shell::stream::Stream;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to create pipe: {0}")]
    Pipe(#[from] nix::Error),
}

/// 一行输入的所有阶段，空阶段为 `None`
pub type Pipeline = Vec<Option<Command>>;

pub struct PipelineBuilder<'a> {
    session: &'a Session,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// N 个阶段分配 N-1 个管道，阶段 i 默认从管道 i-1 读、向管道 i 写，
    /// 首尾分别使用继承的 stdin/stdout，显式重定向再覆盖这些默认值。
    pub fn build(&self, stages: &[String]) -> Result<Pipeline, PipelineError> {
        let mut readers = Vec::with_capacity(stages.len());
        let mut writers = Vec::with_capacity(stages.len());
        for _ in 1..stages.len() {
            // 管道端不能泄漏给其他阶段的子进程，否则读端永远等不到 EOF
            let (reader, writer) = pipe2(OFlag::O_CLOEXEC)?;
            readers.push(Stream::PipeReader(File::from(reader)));
            writers.push(Stream::PipeWriter(File::from(writer)));
        }
        debug!("为 {} 个阶段创建了 {} 个管道", stages.len(), writers.len());

        let inputs = iter::once(Stream::Stdin).chain(readers);
        let outputs = writers.into_iter().chain(iter::once(Stream::Stdout));

        let cwd = self.session.cwd();
        let parser = Parser::new(&cwd);
        Ok(stages
            .iter()
            .zip(inputs.zip(outputs))
            .map(|(stage, (input, output))| parser.parse_stage(stage, input, output))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::parser::lexer::split_stages;
    use crate::utils::path::PathFinder;
    use std::io::{Read, Write};

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_single_stage_uses_stdio() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf(), Box::new(PathFinder::new("")));
        let pipeline = PipelineBuilder::new(&session)
            .build(&split_stages("echo hi"))
            .unwrap();
        assert_eq!(pipeline.len(), 1);
        let command = pipeline[0].as_ref().unwrap();
        assert!(matches!(command.input, Stream::Stdin));
        assert!(matches!(command.output, Stream::Stdout));
        assert!(matches!(command.error, Stream::Stderr));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_file_redirect_beats_pipe_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf(), Box::new(PathFinder::new("")));
        let pipeline = PipelineBuilder::new(&session)
            .build(&split_stages("cmd1 | cmd2 > out.txt"))
            .unwrap();
        assert_eq!(pipeline.len(), 2);

        let first = pipeline[0].as_ref().unwrap();
        assert_eq!(first.name, "cmd1");
        assert!(matches!(first.input, Stream::Stdin));
        assert!(matches!(first.output, Stream::PipeWriter(_)));

        let second = pipeline[1].as_ref().unwrap();
        assert_eq!(second.name, "cmd2");
        assert!(matches!(second.input, Stream::PipeReader(_)));
        assert!(matches!(second.output, Stream::File(_)));
        assert!(dir.path().join("out.txt").exists());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_middle_stage_is_wired_both_ways() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf(), Box::new(PathFinder::new("")));
        let mut pipeline = PipelineBuilder::new(&session)
            .build(&split_stages("a | b | c"))
            .unwrap();
        assert_eq!(pipeline.len(), 3);

        let last = pipeline.pop().flatten().unwrap();
        let mut middle = pipeline.pop().flatten().unwrap();
        let mut first = pipeline.pop().flatten().unwrap();
        assert!(matches!(middle.output, Stream::PipeWriter(_)));
        assert!(matches!(last.output, Stream::Stdout));

        // 写端关闭后读端看到 EOF
        first.output.write_all(b"ping").unwrap();
        first.close();
        middle.output.write_all(b"pong").unwrap();
        drop(middle.output);
        assert_eq!(drain(middle.input), "ping");
        assert_eq!(drain(last.input), "pong");
    }

    #[allow(clippy::unwrap_used)]
    fn drain(stream: Stream) -> String {
        let mut reader = match stream {
            Stream::PipeReader(reader) => reader,
            other => panic!("expected a pipe reader, got {}", other),
        };
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        buf
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_blank_stage_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf(), Box::new(PathFinder::new("")));
        let pipeline = PipelineBuilder::new(&session)
            .build(&split_stages("echo a |   | wc"))
            .unwrap();
        assert_eq!(pipeline.len(), 3);
        assert!(pipeline[1].is_none());
    }
}
