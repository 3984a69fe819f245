mod completer;
mod trie;

pub use completer::{CommandCompleter, Completion};
pub use trie::Trie;
