use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::path::PathBuf;

pub struct Config {
    /// 日志过滤使用的 crate 名
    pub name: String,
    pub theme: String,
    pub editor_mode: String,
    pub history_file: Option<PathBuf>,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub search_path: String,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/pipesh")
        } else {
            env::temp_dir().join("pipesh")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from("pipesh"),
            theme: String::from("plain"),
            editor_mode: String::from("emacs"),
            history_file: None,
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            search_path: String::new(),
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();
        config.apply(|key| env::var(key).ok());
        config
    }

    /// 用 `lookup` 查到的值覆盖默认配置，空值视为未设置
    fn apply<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(theme) = lookup("PIPESH_THEME") {
            self.theme = theme;
        }
        if let Some(editor) = lookup("PIPESH_EDITOR") {
            self.editor_mode = editor;
        }
        if let Some(level) = lookup("PIPESH_LOG_LEVEL") {
            self.logger_level = level;
        }
        if let Some(dir) = lookup("PIPESH_LOG_DIR") {
            self.logger_dir = PathBuf::from(dir);
        }
        if let Some(history) = lookup("HISTFILE") {
            self.history_file = Some(PathBuf::from(history));
        }
        if let Some(path) = lookup("PATH") {
            self.search_path = path;
        }
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        config.apply(|key| vars.get(key).cloned());
        config
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.name, "pipesh");
        assert_eq!(config.theme, "plain");
        assert_eq!(config.logger_level, "warn");
        assert!(config.history_file.is_none());
        assert!(config.search_path.is_empty());
        assert_eq!(config.get_edit_mode(), EditMode::Emacs);
        assert!(config.logger_dir.ends_with("logs"));
    }

    #[test]
    fn test_environment_overrides() {
        let config = config_from(&[
            ("PIPESH_THEME", "color"),
            ("PIPESH_EDITOR", "VI"),
            ("PIPESH_LOG_LEVEL", "debug"),
            ("PIPESH_LOG_DIR", "/tmp/pipesh-logs"),
            ("HISTFILE", "/tmp/pipesh_history"),
            ("PATH", "/usr/bin:/bin"),
        ]);
        assert_eq!(config.theme, "color");
        assert_eq!(config.get_edit_mode(), EditMode::Vi);
        assert_eq!(config.logger_level, "debug");
        assert_eq!(config.logger_dir, PathBuf::from("/tmp/pipesh-logs"));
        assert_eq!(
            config.history_file,
            Some(PathBuf::from("/tmp/pipesh_history"))
        );
        assert_eq!(config.search_path, "/usr/bin:/bin");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = config_from(&[("HISTFILE", ""), ("PIPESH_EDITOR", "")]);
        assert!(config.history_file.is_none());
        assert_eq!(config.get_edit_mode(), EditMode::Emacs);
    }
}
