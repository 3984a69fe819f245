use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use log::{debug, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::config::BellStyle;
pub use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as RLConfig, Context, Editor, ExternalPrinter, Helper};

use crate::shell::completion::{CommandCompleter, Completion};
use crate::utils::config::Config;

const BELL: &str = "\x07";

/// 把 Tab 补全交给 [`CommandCompleter`]，响铃和候选列表由这里输出
pub struct ShellHelper {
    completer: Mutex<CommandCompleter>,
    prompt: String,
    // 由编辑器清掉当前行、输出消息后再重绘提示符
    printer: Mutex<Option<Box<dyn ExternalPrinter>>>,
}

impl ShellHelper {
    pub fn new(completer: CommandCompleter, prompt: String) -> Self {
        Self {
            completer: Mutex::new(completer),
            prompt,
            printer: Mutex::new(None),
        }
    }

    fn set_printer(&self, printer: Box<dyn ExternalPrinter>) {
        *self.printer.lock().unwrap_or_else(PoisonError::into_inner) = Some(printer);
    }

    fn show_candidates(&self, line: &str, candidates: &[String]) -> rustyline::Result<()> {
        let listing = candidate_listing(&self.prompt, line, candidates);
        let mut printer = self.printer.lock().unwrap_or_else(PoisonError::into_inner);
        match printer.as_mut() {
            Some(printer) => printer.print(listing),
            None => {
                let mut stdout = io::stdout();
                write!(stdout, "\r{}\n", listing)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}

/// 原来的输入行、候选列表各占一行，候选之间用两个空格分隔
fn candidate_listing(prompt: &str, line: &str, candidates: &[String]) -> String {
    format!("{}{}\n{}", prompt, line, candidates.join("  "))
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let completion = self
            .completer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .complete(line, pos);

        let mut stdout = io::stdout();
        match completion {
            Completion::Bell => {
                write!(stdout, "{}", BELL)?;
                stdout.flush()?;
                Ok((pos, Vec::new()))
            }
            Completion::Insert(text) => Ok((
                pos,
                vec![Pair {
                    display: text.clone(),
                    replacement: text,
                }],
            )),
            Completion::List(candidates) => {
                self.show_candidates(line, &candidates)?;
                Ok((pos, Vec::new()))
            }
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

pub struct ReadlineManager {
    editor: Editor<ShellHelper, FileHistory>,
}

impl ReadlineManager {
    pub fn new(config: &Config, helper: ShellHelper) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            // 响铃由 ShellHelper 自己决定
            .bell_style(BellStyle::None)
            .edit_mode(config.get_edit_mode())
            .build();

        let mut editor = Editor::with_config(rl_config)?;
        match editor.create_external_printer() {
            Ok(printer) => helper.set_printer(Box::new(printer)),
            Err(err) => warn!("无法创建外部输出通道，候选列表将直接写到终端: {}", err),
        }
        editor.set_helper(Some(helper));
        Ok(Self { editor })
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }

    pub fn add_history(&mut self, line: &str) {
        if let Err(err) = self.editor.add_history_entry(line) {
            warn!("无法添加历史记录: {}", err);
        }
    }

    /// 启动时把已加载的历史放进编辑器，供上下键翻阅
    pub fn preload_history(&mut self, entries: &[String]) {
        for entry in entries {
            self.add_history(entry);
        }
        debug!("预加载 {} 条历史记录", entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_listing_repeats_input_line() {
        let candidates = vec!["car".to_string(), "cat".to_string()];
        assert_eq!(
            candidate_listing("$ ", "ca", &candidates),
            "$ ca\ncar  cat"
        );
    }
}
