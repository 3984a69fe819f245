use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::shell::history::History;
use crate::utils::path::ExecutableResolver;

/// 每个管道阶段共享的 shell 状态
///
/// 工作目录不依赖进程级的 `chdir`，`cd` 通过互斥锁修改它，
/// 外部命令和重定向都以它为基准。
pub struct Session {
    cwd: Mutex<PathBuf>,
    resolver: Box<dyn ExecutableResolver>,
    history: Mutex<History>,
}

impl Session {
    pub fn new(cwd: PathBuf, resolver: Box<dyn ExecutableResolver>) -> Self {
        Self {
            cwd: Mutex::new(cwd),
            resolver,
            history: Mutex::new(History::new()),
        }
    }

    pub fn cwd(&self) -> PathBuf {
        self.cwd.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_cwd(&self, path: PathBuf) {
        debug!("切换工作目录: {}", path.display());
        *self.cwd.lock().unwrap_or_else(PoisonError::into_inner) = path;
    }

    pub fn resolver(&self) -> &dyn ExecutableResolver {
        self.resolver.as_ref()
    }

    pub fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 展开 `~`，相对路径拼到当前目录后，再去掉 `.` 和 `..`
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd().join(path))
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::path::PathFinder;

    fn session(cwd: &str) -> Session {
        Session::new(PathBuf::from(cwd), Box::new(PathFinder::new("")))
    }

    #[test]
    fn test_resolve_relative_and_parent() {
        let session = session("/usr/local/lib");
        assert_eq!(session.resolve_path("../bin"), PathBuf::from("/usr/local/bin"));
        assert_eq!(session.resolve_path("./a/./b"), PathBuf::from("/usr/local/lib/a/b"));
        assert_eq!(session.resolve_path("../../../../.."), PathBuf::from("/"));
        assert_eq!(session.resolve_path("/etc/../tmp"), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_resolve_home() {
        let session = session("/");
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(session.resolve_path("~"), normalize(Path::new(&home)));
        }
    }

    #[test]
    fn test_set_cwd() {
        let session = session("/");
        session.set_cwd(PathBuf::from("/tmp"));
        assert_eq!(session.cwd(), PathBuf::from("/tmp"));
    }
}
