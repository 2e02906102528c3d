//! Interactive questions on stdin

use std::io::{self, BufRead, Write};

/// Print `question` and read one trimmed line
pub fn ask(question: &str) -> io::Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Ask for a positive number, falling back to `default` on anything else
pub fn ask_number(question: &str, default: usize) -> io::Result<usize> {
    Ok(parse_positive(&ask(question)?, default))
}

fn parse_positive(answer: &str, default: usize) -> usize {
    match answer.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => default,
    }
}
