use colored::Colorize;

/// Uparrow character unicode
pub const UPARROW: char = match std::char::from_u32(0x00002191) {
    Some(v) => v,
    None => panic!("Invalid unicode character uparrow"),
};
/// Downarrow character unicode
pub const DOWNARROW: char = match std::char::from_u32(0x00002193) {
    Some(v) => v,
    None => panic!("Invalid unicode character downarrow"),
};

/// Width of the console banners.
pub const PRINT_WIDTH: usize = 80;
const HEADER_SYMBOL: char = '!';
const SECTION_SYMBOL: char = '=';

fn rule(symbol: char) -> String {
    std::iter::repeat(symbol).take(PRINT_WIDTH).collect()
}

fn centered(text: &str) -> String {
    let pad = PRINT_WIDTH.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Banner printed when a program starts.
pub fn header_message() -> String {
    format!(
        "{}\n{}\n{}\n{}",
        rule(HEADER_SYMBOL).blue(),
        centered("FCIQMC").bold(),
        centered("Full configuration interaction quantum Monte Carlo"),
        rule(HEADER_SYMBOL).blue()
    )
}

/// Banner opening a section titled `title`.
pub fn section_message(title: &str) -> String {
    format!(
        "{}\n{}\n{}",
        rule(SECTION_SYMBOL).cyan(),
        centered(title).bold(),
        rule(SECTION_SYMBOL).cyan()
    )
}

pub fn footer_message() -> String {
    format!(
        "{}\n{}\n{}",
        rule(HEADER_SYMBOL).blue(),
        centered("Normal termination").green(),
        rule(HEADER_SYMBOL).blue()
    )
}
