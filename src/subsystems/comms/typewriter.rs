//! Console presentation helpers: typewriter reveal and Markdown bold.
//!
//! Content strings carry `**bold**` markup. On an ANSI terminal it becomes
//! SGR bold; anywhere else the markers are stripped.

use std::io::{self, Write};
use std::time::Duration;

/// Cursor drawn after the last revealed word.
pub const CURSOR: char = '▌';

const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[0m";
const BACKSPACE: char = '\u{8}';

/// Render `**bold**` spans. An unmatched trailing `**` is left as-is.
pub fn render_markdown(text: &str, ansi: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(len) = after.find("**") else { break };
        out.push_str(&rest[..start]);
        if ansi {
            out.push_str(BOLD_ON);
            out.push_str(&after[..len]);
            out.push_str(BOLD_OFF);
        } else {
            out.push_str(&after[..len]);
        }
        rest = &after[len + 2..];
    }
    out.push_str(rest);
    out
}

/// Words of `text` as reveal chunks, each with its trailing space.
pub fn chunks(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(|w| format!("{w} "))
}

/// Write `text` to `out` one word at a time.
///
/// With `animate`, each word is followed by [`CURSOR`] and a pause of
/// `delay`; the cursor is backspaced over before the next word and erased
/// at the end. Without it the text is written in one go. Either way the
/// output ends with a newline.
pub async fn reveal<W: Write>(
    out: &mut W,
    text: &str,
    delay: Duration,
    animate: bool,
) -> io::Result<()> {
    if !animate {
        writeln!(out, "{text}")?;
        return out.flush();
    }

    let mut first = true;
    for chunk in chunks(text) {
        if !first {
            write!(out, "{BACKSPACE}")?;
        }
        first = false;
        write!(out, "{chunk}{CURSOR}")?;
        out.flush()?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    if !first {
        write!(out, "{BACKSPACE} ")?;
    }
    writeln!(out)?;
    out.flush()
}
