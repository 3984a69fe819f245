use std::collections::BTreeSet;
use std::fs::{self, read_dir};
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::error;

/// 可执行文件查找能力，shell 只通过它访问搜索路径
pub trait ExecutableResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    fn list(&self) -> Vec<String>;
}

/// 按 `PATH` 风格的冒号分隔目录列表查找
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    dirs: Vec<PathBuf>,
}

impl PathFinder {
    pub fn new(search_path: &str) -> Self {
        Self {
            dirs: search_path
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl ExecutableResolver for PathFinder {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains('/') {
            return None;
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    fn list(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for dir in &self.dirs {
            let entries = match read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    if e.kind() != ErrorKind::NotFound {
                        error!("pipesh: fs read_dir error: {}: {}", dir.display(), e);
                    }
                    continue;
                }
            };
            for entry in entries.flatten() {
                if !is_executable(&entry.path()) {
                    continue;
                }
                if let Ok(name) = entry.file_name().into_string() {
                    names.insert(name);
                }
            }
        }
        names.into_iter().collect()
    }
}

fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        // 没有任何执行位的不算
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
