use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// 输入过的命令行
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    // `append_new` 已经写出的条目数
    appended: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !line.trim().is_empty() {
            self.entries.push(line);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// 读入文件中的非空行，返回读入的条数
    pub fn load(&mut self, path: &Path) -> io::Result<usize> {
        let content = fs::read_to_string(path)?;
        let before = self.entries.len();
        self.entries
            .extend(content.lines().filter(|line| !line.is_empty()).map(String::from));
        Ok(self.entries.len() - before)
    }

    pub fn write(&mut self, path: &Path) -> io::Result<()> {
        let mut file = open(path, false)?;
        for entry in &self.entries {
            writeln!(file, "{}", entry)?;
        }
        self.appended = self.entries.len();
        Ok(())
    }

    pub fn append_new(&mut self, path: &Path) -> io::Result<()> {
        let mut file = open(path, true)?;
        for entry in self.entries.iter().skip(self.appended) {
            writeln!(file, "{}", entry)?;
        }
        self.appended = self.entries.len();
        Ok(())
    }
}

fn open(path: &Path, append: bool) -> io::Result<fs::File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(!append)
        .append(append)
        .mode(0o644)
        .open(path)
}
