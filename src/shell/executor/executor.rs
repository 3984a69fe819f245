use std::io::Write;
use std::os::unix::process::CommandExt;
use std::process;
use std::thread;

use log::{debug, error, warn};

use super::builtins::{Builtin, Flow};
use super::pipeline::Pipeline;
use crate::shell::parser::ast::Command;
use crate::shell::parser::lexer;
use crate::shell::session::Session;

/// 并发运行一行输入的所有阶段
pub struct Executor<'a> {
    session: &'a Session,
}

impl<'a> Executor<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// 每个阶段一个线程，全部结束后返回；最后一个阶段决定 shell 是否退出
    pub fn run(&self, pipeline: Pipeline) -> bool {
        let flows: Vec<Flow> = thread::scope(|scope| {
            let workers: Vec<_> = pipeline
                .into_iter()
                .map(|stage| scope.spawn(move || stage.map_or(Flow::Continue, |c| self.run_stage(c))))
                .collect();

            workers
                .into_iter()
                .map(|worker| {
                    worker.join().unwrap_or_else(|_| {
                        error!("管道阶段异常退出");
                        Flow::Continue
                    })
                })
                .collect()
        });

        flows.last() == Some(&Flow::Exit)
    }

    fn run_stage(&self, mut command: Command) -> Flow {
        let Some(builtin) = Builtin::from_name(&command.name) else {
            self.run_external(command);
            return Flow::Continue;
        };

        let flow = match builtin.run(&mut command, self.session) {
            Ok(flow) => flow,
            Err(e) => {
                // 下游提前关闭管道时常见，不影响其他阶段
                debug!("内建命令 {} 出错: {}", builtin.name(), e);
                Flow::Continue
            }
        };
        command.close();
        flow
    }

    fn run_external(&self, mut command: Command) {
        let program = lexer::unquote(&command.name);
        let Some(path) = self.session.resolver().resolve(&program) else {
            if let Err(e) = writeln!(command.error, "{}: command not found", command.name) {
                warn!("无法写入错误流: {}", e);
            }
            command.close();
            return;
        };

        debug!("执行外部命令: {} {:?}", path.display(), command.args);
        let Command {
            name,
            args,
            input,
            output,
            error,
        } = command;

        // 构建器在这条语句结束时被 drop，父进程手里的管道端随之关闭
        let spawned = process::Command::new(&path)
            .arg0(&program)
            .args(&args)
            .current_dir(self.session.cwd())
            .stdin(input.into_stdio())
            .stdout(output.into_stdio())
            .stderr(error.into_stdio())
            .spawn();

        match spawned {
            Ok(mut child) => match child.wait() {
                Ok(status) => debug!("{} 退出: {}", name, status),
                Err(e) => warn!("等待 {} 失败: {}", name, e),
            },
            Err(e) => warn!("启动 {} 失败: {}", name, e),
        }
    }
}
