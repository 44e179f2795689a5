//! Turning events into text
//!
//! Both outputs share the message extraction and the multi-line reshaping;
//! only the file strips ANSI escapes.

use std::{borrow::Cow, fmt, fmt::Write as _, sync::LazyLock};

use chrono::{DateTime, Local};
use regex::Regex;
use tracing::{
    Event, Level,
    field::{Field, Visit},
};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("static regex"));

/// Indent for continuation lines of a multi-line message
const CONTINUATION_INDENT: &str = "        ";

/// Collects the `message` field and appends any other fields as
/// ` key=value`.
#[derive(Default)]
pub struct MessageVisitor {
    message: String,
    fields:  String,
}

impl MessageVisitor {
    /// Extracts the full message text of `event`
    pub fn message_of(event: &Event<'_>) -> String {
        let mut visitor = Self::default();
        event.record(&mut visitor);
        visitor.message + &visitor.fields
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Removes ANSI color and cursor sequences
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Makes multi-line messages easy to spot in a scrolling log.
///
/// ```
/// use screenshotto_core::logging::format::reshape_long;
///
/// assert_eq!(reshape_long("one line"), "one line");
/// assert_eq!(
///     reshape_long("Config:\na = 1\nb = 2"),
///     "\n>>>>>>>>Config:\n        a = 1\n        b = 2"
/// );
/// ```
pub fn reshape_long(message: &str) -> Cow<'_, str> {
    let Some((first, rest)) = message.split_once('\n') else {
        return Cow::Borrowed(message);
    };

    let marker = ">".repeat(CONTINUATION_INDENT.len());
    let mut out = format!("\n{marker}{first}\n");
    for (i, line) in rest.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !line.trim().is_empty() {
            out.push_str(CONTINUATION_INDENT);
        }
        out.push_str(line);
    }
    Cow::Owned(out)
}

/// A formatted event, shared by the console and file outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level:   Level,
    pub target:  String,
    pub message: String,
    pub time:    DateTime<Local>,
}

impl Record {
    /// Captures `event` with its message reshaped
    pub fn from_event(event: &Event<'_>) -> Self {
        let message = MessageVisitor::message_of(event);
        Self {
            level:   *event.metadata().level(),
            target:  event.metadata().target().to_string(),
            message: reshape_long(&message).into_owned(),
            time:    Local::now(),
        }
    }

    /// `LEVEL   \nmessage\n\n`
    pub fn console_line(&self) -> String {
        format!("{:<8}\n{}\n\n", self.level.as_str(), self.message)
    }

    /// `2024-01-10 12:00:00,123 -\tLEVEL\t-\ttarget:\tmessage\n\n`
    pub fn file_line(&self) -> String {
        format!(
            "{} -\t{}\t-\t{:<25}:\t{}\n\n",
            self.time.format("%Y-%m-%d %H:%M:%S,%3f"),
            self.level.as_str(),
            self.target,
            strip_ansi(&self.message)
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(message: &str) -> Record {
        Record {
            level:   Level::WARN,
            target:  "screenshotto_core::config".to_string(),
            message: message.to_string(),
            time:    Local.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1;31mred\x1b[0m text"), "red text");
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_reshape_leaves_blank_lines_unindented() {
        assert_eq!(reshape_long("head\n\ntail"), "\n>>>>>>>>head\n\n        tail");
    }

    #[test]
    fn test_console_line() {
        assert_eq!(record("Removed quotes").console_line(), "WARN    \nRemoved quotes\n\n");
    }

    #[test]
    fn test_file_line_strips_ansi() {
        let line = record("\x1b[32mok\x1b[0m").file_line();
        assert_eq!(
            line,
            "2024-01-10 12:00:00,000 -\tWARN\t-\tscreenshotto_core::config:\tok\n\n"
        );
    }

    #[test]
    fn test_file_line_pads_short_targets() {
        let mut short = record("x");
        short.target = "screenshotto".to_string();
        assert!(short.file_line().contains("\tscreenshotto             :\tx"));
    }
}
