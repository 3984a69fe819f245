mod completion;
mod executor;
mod history;
mod parser;
mod readline;
mod session;
mod shell;
mod stream;

pub use shell::Shell;
