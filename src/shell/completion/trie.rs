use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct TrieNode {
    // BTreeMap 保证遍历顺序稳定
    children: BTreeMap<char, TrieNode>,
    terminal: bool,
    /// 经过此节点的单词数
    count: usize,
}

/// 命令名前缀树，启动时构建，之后只读
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
            node.count += 1;
        }
        node.terminal = true;
    }

    /// `prefix` 下的所有完整单词，按字典序
    pub fn matching_words(&self, prefix: &str) -> Vec<String> {
        let mut words = Vec::new();
        if let Some(node) = self.find(prefix) {
            let mut word = prefix.to_string();
            collect(node, &mut word, &mut words);
        }
        words
    }

    /// 沿 `word` 向下走，只要节点计数不小于 `threshold` 就延长公共前缀
    pub fn longest_common_prefix(&self, word: &str, threshold: usize) -> String {
        let mut node = &self.root;
        let mut prefix = String::new();
        for c in word.chars() {
            match node.children.get(&c) {
                Some(child) if child.count >= threshold => {
                    prefix.push(c);
                    node = child;
                }
                _ => break,
            }
        }
        prefix
    }

    fn find(&self, prefix: &str) -> Option<&TrieNode> {
        prefix
            .chars()
            .try_fold(&self.root, |node, c| node.children.get(&c))
    }
}

fn collect(node: &TrieNode, word: &mut String, words: &mut Vec<String>) {
    if node.terminal {
        words.push(word.clone());
    }
    for (c, child) in &node.children {
        word.push(*c);
        collect(child, word, words);
        word.pop();
    }
}

/// 重复的名字只插入一次
impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let unique: BTreeSet<String> = iter.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut trie = Trie::new();
        for word in &unique {
            trie.insert(word);
        }
        trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animals() -> Trie {
        ["cat", "car", "dog"].into_iter().collect()
    }

    #[test]
    fn test_matching_words() {
        let trie = animals();
        assert_eq!(trie.matching_words("ca"), vec!["car", "cat"]);
        assert_eq!(trie.matching_words("d"), vec!["dog"]);
        assert_eq!(trie.matching_words("dog"), vec!["dog"]);
        assert!(trie.matching_words("x").is_empty());
        assert!(trie.matching_words("dogs").is_empty());
        assert_eq!(trie.matching_words(""), vec!["car", "cat", "dog"]);
    }

    #[test]
    fn test_longest_common_prefix() {
        let trie = animals();
        assert_eq!(trie.longest_common_prefix("cat", 2), "ca");
        assert_eq!(trie.longest_common_prefix("cat", 1), "cat");
        assert_eq!(trie.longest_common_prefix("dog", 2), "");
        assert_eq!(trie.longest_common_prefix("cow", 1), "c");
    }

    #[test]
    fn test_word_that_is_a_prefix_of_another() {
        let trie: Trie = ["git", "gitk", "git-shell"].into_iter().collect();
        assert_eq!(trie.matching_words("git"), vec!["git", "git-shell", "gitk"]);
        assert_eq!(trie.longest_common_prefix("gitk", 3), "git");
    }

    #[test]
    fn test_duplicates_are_counted_once() {
        let trie: Trie = ["echo", "echo", "ed"].into_iter().collect();
        assert_eq!(trie.matching_words("e"), vec!["echo", "ed"]);
        assert_eq!(trie.longest_common_prefix("echo", 2), "e");
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let trie = animals();
        for _ in 0..3 {
            assert_eq!(trie.matching_words("ca"), vec!["car", "cat"]);
            assert_eq!(trie.longest_common_prefix("cat", 2), "ca");
        }
    }
}
