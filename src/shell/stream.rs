use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::process::Stdio;

/// 一个阶段的标准流句柄
///
/// `Stdin`/`Stdout`/`Stderr` 继承自 shell 本身，永远不会被关闭；
/// 其余变体独占一个文件描述符，drop 即关闭。
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
    File(File),
    PipeReader(File),
    PipeWriter(File),
}

impl Stream {
    pub fn is_inherited(&self) -> bool {
        matches!(self, Stream::Stdin | Stream::Stdout | Stream::Stderr)
    }

    /// 交给子进程使用，拥有的描述符随之转移
    pub fn into_stdio(self) -> Stdio {
        match self {
            Stream::Stdin | Stream::Stdout | Stream::Stderr => Stdio::inherit(),
            Stream::File(file) | Stream::PipeReader(file) | Stream::PipeWriter(file) => {
                Stdio::from(file)
            }
        }
    }

    fn unsupported(&self, what: &str) -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{} is not {}", self, what),
        )
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Stdout => io::stdout().write(buf),
            Stream::Stderr => io::stderr().write(buf),
            Stream::File(file) | Stream::PipeWriter(file) => file.write(buf),
            _ => Err(self.unsupported("writable")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
            Stream::File(file) | Stream::PipeWriter(file) => file.flush(),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
            Stream::File(_) => "file",
            Stream::PipeReader(_) => "pipe reader",
            Stream::PipeWriter(_) => "pipe writer",
        };
        f.write_str(name)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stream({})", self)
    }
}
