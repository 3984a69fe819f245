use log::{debug, error, warn};
use std::env;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use crate::shell::completion::{CommandCompleter, Trie};
use crate::shell::executor::{Builtin, Executor, PipelineBuilder};
use crate::shell::parser::lexer;
use crate::shell::readline::{ReadlineError, ReadlineManager, ShellHelper};
use crate::shell::session::Session;
use crate::utils::config::Config;
use crate::utils::path::{ExecutableResolver, PathFinder};
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    readline: ReadlineManager,
    session: Session,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: Theme) -> Result<Self, Box<dyn Error>> {
        let finder = PathFinder::new(&config.search_path);
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

        // 补全索引只在启动时构建一次
        let executables = finder.list();
        debug!(
            "{} 个搜索目录中找到 {} 个可执行文件",
            finder.dirs().len(),
            executables.len()
        );
        let trie: Trie = Builtin::ALL
            .iter()
            .map(|builtin| builtin.name().to_string())
            .chain(executables)
            .collect();

        let helper = ShellHelper::new(CommandCompleter::new(trie), theme.prompt.clone());
        let readline = ReadlineManager::new(config, helper)?;
        let session = Session::new(cwd, Box::new(finder));

        Ok(Self {
            config,
            theme,
            readline,
            session,
        })
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 pipesh...");
        self.load_history();
        debug!("pipesh 准备就绪...");

        self.run_loop()?;
        self.save_history();

        debug!("退出 pipesh...");
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = self.theme.prompt.clone();

            match self.readline.readline(&prompt) {
                Ok(line) => {
                    if self.handle_input(&line) {
                        debug!("收到 exit，退出 pipesh...");
                        break;
                    }
                }
                Err(ReadlineError::Eof) => {
                    warn!("接收到 EOF 信号，退出 pipesh...");
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("接收到中断信号...");
                }
                Err(err) => {
                    error!("发生错误: {}", err);
                    eprintln!("{}", (self.theme.error_style)(format!("pipesh: {}", err)));
                    break;
                }
            }
        }
        Ok(())
    }

    /// 执行一行输入，返回 shell 是否应当退出
    fn handle_input(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }

        self.readline.add_history(line);
        self.session.history().push(line);
        debug!("执行命令: {}", line);

        let stages = lexer::split_stages(line);
        match PipelineBuilder::new(&self.session).build(&stages) {
            Ok(pipeline) => Executor::new(&self.session).run(pipeline),
            Err(e) => {
                error!("构建管道失败: {}", e);
                eprintln!("{}", (self.theme.error_style)(format!("pipesh: {}", e)));
                false
            }
        }
    }

    fn load_history(&mut self) {
        let Some(path) = self.config.history_file.as_ref() else {
            return;
        };
        if !path.is_file() {
            debug!("历史文件不存在: {}", path.display());
            return;
        }

        let mut history = self.session.history();
        match history.load(path) {
            Ok(count) => {
                debug!("历史记录加载成功: {} 条", count);
                self.readline.preload_history(history.entries());
            }
            Err(err) => warn!("无法加载历史记录: {} {}", path.display(), err),
        }
    }

    fn save_history(&mut self) {
        let Some(path) = self.config.history_file.as_ref() else {
            return;
        };
        match self.session.history().write(path) {
            Ok(()) => debug!("历史记录保存成功"),
            Err(err) => error!("保存历史记录失败: {} {}", path.display(), err),
        }
    }
}
