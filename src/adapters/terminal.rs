use crate::domain::ports::Prompter;
use crate::utils::error::{ProvisionError, Result};
use colored::Colorize;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// Line-oriented prompts over any reader/writer pair; `stdio()` for the
/// real terminal.
pub struct TerminalPrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl TerminalPrompter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(ProvisionError::Prompt {
                message: "input closed before an answer was given".to_string(),
            });
        }
        Ok(line.trim().to_string())
    }
}

fn parse_confirm(answer: &str, default: bool) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn parse_choice(answer: &str, options: &[String]) -> Option<usize> {
    if let Ok(index) = answer.parse::<usize>() {
        return (index < options.len()).then_some(index);
    }
    options.iter().position(|option| option == answer)
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            write!(self.output, "\n {} {} ", question.green(), hint.yellow())?;
            let answer = self.read_answer()?;
            match parse_confirm(&answer, default) {
                Some(value) => return Ok(value),
                None => writeln!(self.output, " {}", "Please answer yes or no.".red())?,
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        loop {
            write!(self.output, "\n {}\n > ", question.green())?;
            let answer = self.read_answer()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, " {}", "A value is required.".red())?;
        }
    }

    fn choose(&mut self, question: &str, options: &[String]) -> Result<usize> {
        if options.is_empty() {
            return Err(ProvisionError::Prompt {
                message: format!("no options to choose from for: {}", question),
            });
        }

        loop {
            writeln!(self.output, "\n {}", question.green())?;
            for (index, option) in options.iter().enumerate() {
                writeln!(self.output, "  [{}] {}", index.to_string().yellow(), option)?;
            }
            write!(self.output, " > ")?;

            let answer = self.read_answer()?;
            match parse_choice(&answer, options) {
                Some(index) => return Ok(index),
                None => writeln!(
                    self.output,
                    " {}",
                    format!("Value \"{}\" is invalid", answer).red()
                )?,
            }
        }
    }

    fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let border = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let border = format!(" +{}+", border);

        let line = |cells: Vec<&str>| {
            let padded = widths
                .iter()
                .zip(cells)
                .map(|(w, c)| format!(" {:<width$} ", c, width = *w))
                .collect::<Vec<_>>()
                .join("|");
            format!(" |{}|", padded)
        };

        writeln!(self.output, "{}", border)?;
        writeln!(self.output, "{}", line(headers.to_vec()))?;
        writeln!(self.output, "{}", border)?;
        for row in rows {
            let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
            cells.resize(widths.len(), "");
            writeln!(self.output, "{}", line(cells))?;
        }
        writeln!(self.output, "{}", border)?;
        Ok(())
    }

    fn text(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, " {}", message)?;
        Ok(())
    }
}
