use log::debug;
use shell::Shell;
use utils::theme::load_theme;

use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    init_logger(&config);
    debug!("配置加载成功 {}", config.logger_dir.display());
    let theme = load_theme(&config.theme);

    let mut shell = Shell::new(&config, theme)?;
    shell.run()
}
