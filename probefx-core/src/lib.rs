pub mod crawl;
pub mod data;
pub mod patterns;
pub mod report;
pub mod security;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
  ____            _          _____ __  __
 |  _ \ _ __ ___ | |__   ___|  ___|\ \/ /
 | |_) | '__/ _ \| '_ \ / _ \ |_    \  /
 |  __/| | | (_) | |_) |  __/  _|   /  \
 |_|   |_|  \___/|_.__/ \___|_|    /_/\_\
"#;
    println!("{}", banner.cyan().bold());
    println!(
        "  {} {}\n",
        "heuristic web security probe".dimmed(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
