// In app/src/prompt.rs

use engine::{BatchControl, BatchReport};
use std::io::{BufRead, Write};

/// Asks on the terminal whether to run the next batch.
pub struct InteractivePrompt<R> {
    input: R,
}

impl<R: BufRead> InteractivePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> BatchControl for InteractivePrompt<R> {
    fn continue_after(&mut self, completed: &BatchReport, remaining: usize) -> bool {
        print!(
            "Batch {} done ({} signal(s)). {} batch(es) left. Continue? [y/N] ",
            completed.index + 1,
            completed.signal_count(),
            remaining
        );
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read answer, stopping.");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> BatchReport {
        BatchReport {
            index: 0,
            symbols: Vec::new(),
        }
    }

    #[test]
    fn only_an_explicit_yes_continues() {
        assert!(InteractivePrompt::new("y\n".as_bytes()).continue_after(&batch(), 2));
        assert!(InteractivePrompt::new(" YES \n".as_bytes()).continue_after(&batch(), 2));
        assert!(!InteractivePrompt::new("\n".as_bytes()).continue_after(&batch(), 2));
        assert!(!InteractivePrompt::new("nope\n".as_bytes()).continue_after(&batch(), 2));
        // End of input.
        assert!(!InteractivePrompt::new("".as_bytes()).continue_after(&batch(), 2));
    }
}
