use colored::Colorize;

pub(crate) fn plain(text: &str) {
    println!("{text}");
}

pub(crate) fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg.green());
}

pub(crate) fn warning(msg: &str) {
    println!("{} {}", "!".yellow().bold(), msg.yellow());
}

pub(crate) fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg.red());
}

pub(crate) fn heading(msg: &str) {
    println!("{}", msg.cyan().bold());
}

pub(crate) fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}
