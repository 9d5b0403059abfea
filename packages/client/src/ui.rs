//! UI utilities for the client.

use std::io::Write;

pub const PROMPT: &str = "> ";

/// Print a line received while the user may be typing, then redisplay the prompt
pub fn print_above_prompt(line: &str) {
    print!("\n{}\n{}", line, PROMPT);
    std::io::stdout().flush().ok();
}
