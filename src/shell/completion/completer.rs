use log::debug;

use super::trie::Trie;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// 没有匹配，或者第一次遇到多个匹配
    Bell,
    /// 在光标处插入的文本
    Insert(String),
    /// 连续第二次补全同一行时列出所有候选
    List(Vec<String>),
}

/// 命令名补全，记住上一次补全的输入以便第二次 Tab 列出候选
#[derive(Debug)]
pub struct CommandCompleter {
    trie: Trie,
    last_line: String,
    listing_armed: bool,
}

impl CommandCompleter {
    pub fn new(trie: Trie) -> Self {
        Self {
            trie,
            last_line: String::new(),
            listing_armed: false,
        }
    }

    pub fn complete(&mut self, line: &str, pos: usize) -> Completion {
        let typed = line.get(..pos).unwrap_or(line);

        if !self.last_line.is_empty() && line != self.last_line {
            self.listing_armed = false;
        }
        self.last_line = line.to_string();

        let matches = self.trie.matching_words(typed);
        debug!("补全 {:?}: {} 个候选", typed, matches.len());

        let Some(first) = matches.first() else {
            self.listing_armed = false;
            return Completion::Bell;
        };

        if matches.len() == 1 {
            self.listing_armed = false;
            return Completion::Insert(format!("{} ", &first[typed.len()..]));
        }

        let stem = self.trie.longest_common_prefix(first, matches.len());
        if stem.len() > typed.len() {
            self.listing_armed = false;
            return Completion::Insert(stem[typed.len()..].to_string());
        }

        if self.listing_armed {
            self.listing_armed = false;
            Completion::List(matches)
        } else {
            self.listing_armed = true;
            Completion::Bell
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer(words: &[&str]) -> CommandCompleter {
        CommandCompleter::new(words.iter().collect())
    }

    #[test]
    fn test_no_match_rings_bell() {
        let mut completer = completer(&["echo", "exit"]);
        assert_eq!(completer.complete("zz", 2), Completion::Bell);
        assert_eq!(completer.complete("zz", 2), Completion::Bell);
    }

    #[test]
    fn test_unique_match_appends_separator() {
        let mut completer = completer(&["echo", "exit", "type"]);
        assert_eq!(completer.complete("ech", 3), Completion::Insert("o ".into()));
        assert_eq!(completer.complete("echo", 4), Completion::Insert(" ".into()));
    }

    #[test]
    fn test_shared_stem_is_extended() {
        let mut completer = completer(&["xyz_foo", "xyz_foo_bar", "xyz_foo_bar_baz"]);
        assert_eq!(completer.complete("xyz_", 4), Completion::Insert("foo".into()));
        assert_eq!(completer.complete("xyz_foo", 7), Completion::Bell);
    }

    #[test]
    fn test_second_attempt_lists_candidates() {
        let mut completer = completer(&["cat", "car", "dog"]);
        assert_eq!(completer.complete("ca", 2), Completion::Bell);
        assert_eq!(
            completer.complete("ca", 2),
            Completion::List(vec!["car".into(), "cat".into()])
        );
        // 列出之后重新开始计数
        assert_eq!(completer.complete("ca", 2), Completion::Bell);
    }

    #[test]
    fn test_changed_line_resets_listing() {
        let mut completer = completer(&["cat", "car", "cab", "dog"]);
        assert_eq!(completer.complete("ca", 2), Completion::Bell);
        assert_eq!(completer.complete("c", 1), Completion::Insert("a".into()));
        assert_eq!(completer.complete("ca", 2), Completion::Bell);
        assert_eq!(
            completer.complete("ca", 2),
            Completion::List(vec!["cab".into(), "car".into(), "cat".into()])
        );
    }

    #[test]
    fn test_prefix_stops_at_cursor() {
        let mut completer = completer(&["echo", "exit"]);
        assert_eq!(completer.complete("exZZ", 2), Completion::Insert("it ".into()));
    }
}
