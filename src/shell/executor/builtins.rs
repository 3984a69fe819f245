use std::io::{self, Write};

use log::debug;

use crate::shell::parser::ast::Command;
use crate::shell::session::Session;
use crate::shell::stream::Stream;

/// 阶段结束后 shell 是否继续
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Echo,
    Type,
    Pwd,
    Cd,
    Exit,
    History,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Builtin::Echo,
        Builtin::Type,
        Builtin::Pwd,
        Builtin::Cd,
        Builtin::Exit,
        Builtin::History,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Echo => "echo",
            Builtin::Type => "type",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
            Builtin::Exit => "exit",
            Builtin::History => "history",
        }
    }

    /// 在当前进程内执行，读写 `command` 自己的流
    pub fn run(&self, command: &mut Command, session: &Session) -> io::Result<Flow> {
        debug!("执行内建命令: {} {:?}", self.name(), command.args);
        match self {
            Builtin::Echo => writeln!(command.output, "{}", command.args.join(" "))?,
            Builtin::Type => builtin_type(command, session)?,
            Builtin::Pwd => writeln!(command.output, "{}", session.cwd().display())?,
            Builtin::Cd => builtin_cd(command, session)?,
            Builtin::Exit => return Ok(Flow::Exit),
            Builtin::History => builtin_history(command, session)?,
        }
        command.output.flush()?;
        Ok(Flow::Continue)
    }
}

fn builtin_type(command: &mut Command, session: &Session) -> io::Result<()> {
    if command.args.is_empty() {
        writeln!(command.error, "type: missing argument")?;
        return Ok(());
    }

    for name in &command.args {
        if Builtin::from_name(name).is_some() {
            writeln!(command.output, "{} is a shell builtin", name)?;
        } else if let Some(path) = session.resolver().resolve(name) {
            writeln!(command.output, "{} is {}", name, path.display())?;
        } else {
            writeln!(command.error, "{}: not found", name)?;
        }
    }
    Ok(())
}

fn builtin_cd(command: &mut Command, session: &Session) -> io::Result<()> {
    let [target] = command.args.as_slice() else {
        writeln!(command.error, "cd: missing or too many arguments")?;
        return Ok(());
    };

    let path = session.resolve_path(target);
    if path.is_dir() {
        session.set_cwd(path);
    } else {
        writeln!(command.error, "cd: {}: No such file or directory", target)?;
    }
    Ok(())
}

fn builtin_history(command: &mut Command, session: &Session) -> io::Result<()> {
    let args: Vec<&str> = command.args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] => print_history(&mut command.output, &history_snapshot(session), None),
        [count] => match count.parse::<usize>() {
            Ok(count) => print_history(&mut command.output, &history_snapshot(session), Some(count)),
            Err(_) => writeln!(command.error, "history: {}: numeric argument required", count),
        },
        [flag @ ("-r" | "-w" | "-a"), file] => {
            let path = session.resolve_path(file);
            let result = {
                let mut history = session.history();
                match *flag {
                    "-r" => history.load(&path).map(|_| ()),
                    "-w" => history.write(&path),
                    _ => history.append_new(&path),
                }
            };
            match result {
                Ok(()) => Ok(()),
                Err(e) => writeln!(command.error, "history: {}: {}", file, e),
            }
        }
        _ => writeln!(command.error, "history: usage: history [n] | history -r|-w|-a file"),
    }
}

// 输出可能阻塞在满的管道上，不能持有锁去写
fn history_snapshot(session: &Session) -> Vec<String> {
    session.history().entries().to_vec()
}

fn print_history(output: &mut Stream, entries: &[String], last: Option<usize>) -> io::Result<()> {
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    for (index, entry) in entries.iter().enumerate().skip(skip) {
        writeln!(output, "{:>5}  {}", index + 1, entry)?;
    }
    Ok(())
}
