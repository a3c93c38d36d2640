use std::io::{BufRead, Write};

use unipack_installer::{Choice, ConfirmInstall};

/// Interactive confirmer: renders the prompt with both button labels and
/// reads one answer line from stdin. `y`/`yes` (case-insensitive) proceeds;
/// anything else, an empty line or EOF declines.
pub struct StdinConfirm;

impl ConfirmInstall for StdinConfirm {
    fn ask(
        &mut self,
        title: &str,
        message: &str,
        proceed_label: &str,
        decline_label: &str,
    ) -> Choice {
        println!("{title}: {message}");
        print!("  {proceed_label} / {decline_label} [y/N] ");
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => Choice::Decline,
            Ok(_) => parse_answer(&answer),
        }
    }
}

/// Non-interactive confirmer for `--yes`: every prompt proceeds.
pub struct AssumeYes;

impl ConfirmInstall for AssumeYes {
    fn ask(&mut self, _title: &str, message: &str, proceed_label: &str, _decline: &str) -> Choice {
        println!("{message} -> {proceed_label}");
        Choice::Proceed
    }
}

pub fn parse_answer(answer: &str) -> Choice {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Choice::Proceed,
        _ => Choice::Decline,
    }
}
