use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use super::ast::{RedirectOp, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Escaped { quoted: bool },
}

/// 按未被引用的 `|` 切分管道阶段，引号和转义字符原样保留
pub fn split_stages(line: &str) -> Vec<String> {
    let mut stages = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;

    for c in line.chars() {
        if state == State::Normal && c == '|' {
            if !current.is_empty() {
                stages.push(mem::take(&mut current));
            }
            continue;
        }

        current.push(c);
        state = match (state, c) {
            (State::Escaped { quoted: true }, _) => State::DoubleQuoted,
            (State::Escaped { quoted: false }, _) => State::Normal,
            (State::Normal, '\\') => State::Escaped { quoted: false },
            (State::DoubleQuoted, '\\') => State::Escaped { quoted: true },
            (State::Normal, '\'') => State::SingleQuoted,
            (State::SingleQuoted, '\'') => State::Normal,
            (State::Normal, '"') => State::DoubleQuoted,
            (State::DoubleQuoted, '"') => State::Normal,
            (state, _) => state,
        };
    }

    if !current.is_empty() {
        stages.push(current);
    }
    stages
}

/// 把一个阶段切分成单词
///
/// 第一个单词（命令名）保留原始的引号和转义字符，其余单词去掉引号，
/// 含有未引用的 `>`/`<` 的单词只在这些位置切出重定向符。
pub fn split_words(stage: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for word in Lexer::new(stage).words() {
        if tokens.is_empty() {
            tokens.push(Token::Word(word.raw));
        } else if !word.operators.is_empty() {
            tokens.extend(split_redirects(&word.text, |offset| {
                word.operators.contains(&offset)
            }));
        } else {
            tokens.push(Token::Word(word.text));
        }
    }
    tokens
}

/// `2>>err.log` => `["2", ">>", "err.log"]`，未写明流编号时补上 `"1"`
pub fn split_by_redirect_operators(token: &str) -> Vec<Token> {
    split_redirects(token, |_| true)
}

/// 只在 `is_operator` 认可的字节偏移处切分，其余 `>`/`<` 当作普通字符
fn split_redirects<F>(text: &str, is_operator: F) -> Vec<Token>
where
    F: Fn(usize) -> bool,
{
    let mut result = Vec::new();
    let mut current = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if !matches!(c, '>' | '<') || !is_operator(offset) {
            current.push(c);
            continue;
        }

        let is_selector = current == "1" || current == "2";
        if !current.is_empty() {
            result.push(Token::Word(mem::take(&mut current)));
        }
        if !is_selector {
            result.push(Token::Word("1".to_string()));
        }
        let doubled = chars
            .next_if(|&(next, n)| n == c && is_operator(next))
            .is_some();
        result.push(Token::Redirect(RedirectOp::from_symbol(c, doubled)));
    }

    if !current.is_empty() {
        result.push(Token::Word(current));
    }
    result
}

/// 去掉命令名上的引号和转义，用于查找可执行文件
pub fn unquote(word: &str) -> String {
    Lexer::new(word)
        .words()
        .into_iter()
        .map(|word| word.text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default)]
struct Word {
    raw: String,
    text: String,
    /// 未被引用的 `>`/`<` 在 `text` 中的字节偏移
    operators: Vec<usize>,
}

impl Word {
    fn push(&mut self, c: char) {
        self.raw.push(c);
        self.text.push(c);
    }

    // 引号、转义符只出现在原始文本里
    fn push_syntax(&mut self, c: char) {
        self.raw.push(c);
    }
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    state: State,
    word: Word,
    words: Vec<Word>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
            state: State::Normal,
            word: Word::default(),
            words: Vec::new(),
        }
    }

    fn words(mut self) -> Vec<Word> {
        while let Some(c) = self.input.next() {
            self.state = self.step(c);
        }
        self.finish_word();
        self.words
    }

    fn step(&mut self, c: char) -> State {
        match self.state {
            State::Escaped { quoted } => {
                self.word.push(c);
                if quoted {
                    State::DoubleQuoted
                } else {
                    State::Normal
                }
            }
            State::SingleQuoted => {
                if c == '\'' {
                    self.word.push_syntax(c);
                    State::Normal
                } else {
                    self.word.push(c);
                    State::SingleQuoted
                }
            }
            State::DoubleQuoted => match c {
                '"' => {
                    self.word.push_syntax(c);
                    State::Normal
                }
                '\\' if matches!(self.input.peek(), Some('$' | '"' | '\\' | '\n')) => {
                    self.word.push_syntax(c);
                    State::Escaped { quoted: true }
                }
                _ => {
                    self.word.push(c);
                    State::DoubleQuoted
                }
            },
            State::Normal => match c {
                c if c.is_whitespace() => {
                    self.finish_word();
                    State::Normal
                }
                '\\' if self.input.peek().is_some() => {
                    self.word.push_syntax(c);
                    State::Escaped { quoted: false }
                }
                '\'' => {
                    self.word.push_syntax(c);
                    State::SingleQuoted
                }
                '"' => {
                    self.word.push_syntax(c);
                    State::DoubleQuoted
                }
                '>' | '<' => {
                    self.word.operators.push(self.word.text.len());
                    self.word.push(c);
                    State::Normal
                }
                _ => {
                    self.word.push(c);
                    State::Normal
                }
            },
        }
    }

    fn finish_word(&mut self) {
        if !self.word.raw.is_empty() {
            self.words.push(mem::take(&mut self.word));
        }
    }
}
