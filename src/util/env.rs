//! Terminal checks for coloured output.

use std::io::IsTerminal;

/// Stream a renderer writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Stdout => std::io::stdout().is_terminal(),
            Self::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

/// Whether ANSI colour may be written to `stream`.
///
/// `disabled` is the user's request (`--no-color`, `NO_COLOR`,
/// `CCDU_NO_COLOR`). A dumb terminal or a redirected stream also disables it.
#[must_use]
pub fn color_enabled(disabled: bool, stream: Stream) -> bool {
    !disabled && !term_is_dumb() && stream.is_terminal()
}

fn term_is_dumb() -> bool {
    std::env::var("TERM").is_ok_and(|term| term == "dumb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_wins_on_every_stream() {
        assert!(!color_enabled(true, Stream::Stdout));
        assert!(!color_enabled(true, Stream::Stderr));
    }
}
