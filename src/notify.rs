//! User-facing submission notices.
//!
//! A notice is shown once per completed submission and blocks until it is
//! acknowledged. Failure notices never carry the underlying error.

use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The reading was stored.
    Saved,
    /// The reading could not be stored; the user may resubmit.
    SaveFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Saved => "Data berhasil disimpan!",
            Notice::SaveFailed => "Terjadi kesalahan saat menyimpan data.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Something that can surface a notice to the user.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Prints notices to a writer and optionally waits for Enter on a reader.
pub struct ConsoleNotifier<R, W> {
    input: R,
    output: W,
    require_ack: bool,
}

impl ConsoleNotifier<io::StdinLock<'static>, io::Stdout> {
    /// Notifier on the process terminal.
    pub fn stdio(require_ack: bool) -> Self {
        ConsoleNotifier::new(io::stdin().lock(), io::stdout(), require_ack)
    }
}

impl<R: BufRead, W: Write> ConsoleNotifier<R, W> {
    pub fn new(input: R, output: W, require_ack: bool) -> Self {
        ConsoleNotifier { input, output, require_ack }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Notifier for ConsoleNotifier<R, W> {
    fn notify(&mut self, notice: Notice) {
        let marker = match notice {
            Notice::Saved => "✓",
            Notice::SaveFailed => "✗",
        };
        // A broken terminal leaves nothing else to report to.
        let _ = writeln!(self.output, "\n{} {}", marker, notice);
        if self.require_ack {
            let _ = write!(self.output, "  [Enter] OK ");
            let _ = self.output.flush();
            let mut line = String::new();
            let _ = self.input.read_line(&mut line);
        }
        let _ = self.output.flush();
    }
}

/// Collects notices in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_messages_match_the_form() {
        assert_eq!(Notice::Saved.to_string(), "Data berhasil disimpan!");
        assert_eq!(Notice::SaveFailed.to_string(), "Terjadi kesalahan saat menyimpan data.");
    }

    #[test]
    fn test_console_notifier_waits_for_ack() {
        let input = Cursor::new(b"\nleftover\n".to_vec());
        let mut notifier = ConsoleNotifier::new(input, Vec::new(), true);
        notifier.notify(Notice::Saved);

        let printed = String::from_utf8(notifier.into_output()).unwrap();
        assert!(printed.contains("Data berhasil disimpan!"));
        assert!(printed.contains("[Enter] OK"));
    }

    #[test]
    fn test_console_notifier_without_ack_only_prints() {
        let mut notifier = ConsoleNotifier::new(Cursor::new(Vec::new()), Vec::new(), false);
        notifier.notify(Notice::SaveFailed);

        let printed = String::from_utf8(notifier.into_output()).unwrap();
        assert!(printed.contains("Terjadi kesalahan saat menyimpan data."));
        assert!(!printed.contains("[Enter]"));
    }
}
