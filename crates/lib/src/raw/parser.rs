//! Line protocol parser.
//!
//! Directive mode: each line is split on whitespace and the first word (case-insensitive)
//! selects CHANNEL, LEVEL, FIELD, TEXT or PRETEXT. TEXT/PRETEXT switch to capture mode,
//! where lines are appended verbatim to the target until a lone `.` or end of stream.

use crate::slack::Field;

/// Which text slot receives lines while capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    Text,
    Pretext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Directive,
    /// `started` is false until the target holds content, so the first captured line
    /// is not preceded by a separator.
    Capture { target: CaptureTarget, started: bool },
}

/// Message state accumulated over one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub channel: Option<String>,
    pub color: Option<String>,
    pub text: String,
    pub pretext: String,
    pub fields: Vec<Field>,
    /// Set once LEVEL, FIELD or PRETEXT has been seen.
    pub as_attachment: bool,
}

impl Draft {
    fn slot(&mut self, target: CaptureTarget) -> &mut String {
        match target {
            CaptureTarget::Text => &mut self.text,
            CaptureTarget::Pretext => &mut self.pretext,
        }
    }
}

/// Incremental parser; feed lines with [`LineParser::feed`], then take the draft.
#[derive(Debug)]
pub struct LineParser {
    draft: Draft,
    mode: Mode,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            draft: Draft::default(),
            mode: Mode::Directive,
        }
    }

    /// The current capture target, if a TEXT/PRETEXT block is open.
    pub fn capturing(&self) -> Option<CaptureTarget> {
        match self.mode {
            Mode::Capture { target, .. } => Some(target),
            Mode::Directive => None,
        }
    }

    /// Consume one line (without its line terminator).
    pub fn feed(&mut self, line: &str) {
        match self.mode {
            Mode::Capture { target, started } => {
                if line == "." {
                    self.mode = Mode::Directive;
                    return;
                }
                let slot = self.draft.slot(target);
                if started {
                    slot.push('\n');
                }
                slot.push_str(line);
                self.mode = Mode::Capture {
                    target,
                    started: true,
                };
            }
            Mode::Directive => self.directive(line),
        }
    }

    /// End of stream: closes any open capture and returns the accumulated draft.
    pub fn finish(self) -> Draft {
        self.draft
    }

    fn directive(&mut self, line: &str) {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = words.first() else {
            return;
        };
        let keyword = keyword.to_ascii_uppercase();
        match keyword.as_str() {
            "CHANNEL" => {
                if words.len() < 2 {
                    log::warn!("invalid number of arguments: {}", line);
                    return;
                }
                self.draft.channel = Some(words[1].to_string());
            }
            "LEVEL" => {
                if words.len() < 2 {
                    log::warn!("invalid number of arguments: {}", line);
                    return;
                }
                self.draft.as_attachment = true;
                self.draft.color = Some(words[1].to_string());
            }
            "FIELD" => {
                if words.len() < 4 {
                    log::warn!("invalid number of arguments: {}", line);
                    return;
                }
                self.draft.as_attachment = true;
                self.draft.fields.push(Field {
                    title: words[1].to_string(),
                    short: words[2].eq_ignore_ascii_case("SHORT"),
                    value: remainder_after(line, 3).to_string(),
                });
            }
            "TEXT" => self.open_capture(CaptureTarget::Text, line, words.len() > 1),
            "PRETEXT" => {
                self.draft.as_attachment = true;
                self.open_capture(CaptureTarget::Pretext, line, words.len() > 1);
            }
            _ => log::debug!("ignoring unknown directive: {}", line),
        }
    }

    fn open_capture(&mut self, target: CaptureTarget, line: &str, inline: bool) {
        let slot = self.draft.slot(target);
        if inline {
            *slot = remainder_after(line, 1).to_string();
        }
        let started = !slot.is_empty();
        self.mode = Mode::Capture { target, started };
    }
}

/// Text of `line` after its first `n` whitespace-delimited words and the single
/// whitespace character that follows them. Spacing inside the rest is preserved.
fn remainder_after(line: &str, n: usize) -> &str {
    let mut rest = line;
    for _ in 0..n {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    let mut chars = rest.chars();
    chars.next();
    chars.as_str()
}

/// Run every line through a fresh parser.
pub fn parse_lines<'a, I>(lines: I) -> Draft
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = LineParser::new();
    for line in lines {
        parser.feed(line);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_takes_second_word_only() {
        let d = parse_lines(["channel #ops trailing words"]);
        assert_eq!(d.channel.as_deref(), Some("#ops"));
        assert!(!d.as_attachment);
    }

    #[test]
    fn field_short_keeps_value_spacing() {
        let d = parse_lines(["FIELD x SHORT rest of  value, here!"]);
        assert!(d.as_attachment);
        assert_eq!(
            d.fields,
            vec![Field {
                title: "x".to_string(),
                short: true,
                value: "rest of  value, here!".to_string(),
            }]
        );
    }

    #[test]
    fn field_short_flag_is_case_insensitive() {
        let d = parse_lines(["field a short v", "FIELD b long rest of value", "FIELD c Shorter v"]);
        let shorts: Vec<bool> = d.fields.iter().map(|f| f.short).collect();
        assert_eq!(shorts, vec![true, false, false]);
        assert_eq!(d.fields[1].value, "rest of value");
    }

    #[test]
    fn field_with_irregular_spacing_splits_on_words() {
        let d = parse_lines(["  FIELD   Host\tSHORT   web-01 eu"]);
        assert_eq!(d.fields[0].title, "Host");
        assert!(d.fields[0].short);
        assert_eq!(d.fields[0].value, "  web-01 eu");
    }

    #[test]
    fn fields_keep_input_order() {
        let d = parse_lines([
            "FIELD one SHORT 1",
            "CHANNEL #x",
            "FIELD two long 2",
            "FIELD three SHORT 3",
        ]);
        let titles: Vec<&str> = d.fields.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[test]
    fn short_directives_are_skipped() {
        let d = parse_lines(["CHANNEL", "LEVEL", "FIELD a SHORT", "", "   ", "NOPE x y"]);
        assert_eq!(d, Draft::default());
    }

    #[test]
    fn text_inline_then_capture() {
        let d = parse_lines(["TEXT first line", "second", "."]);
        assert_eq!(d.text, "first line\nsecond");
        assert!(!d.as_attachment);
    }

    #[test]
    fn capture_excludes_terminator_and_joins_with_newlines() {
        let d = parse_lines(["text", "line one", "  indented", "", "line four", ".", "CHANNEL #after"]);
        assert_eq!(d.text, "line one\n  indented\n\nline four");
        assert_eq!(d.channel.as_deref(), Some("#after"));
    }

    #[test]
    fn directives_inside_capture_are_literal() {
        let mut p = LineParser::new();
        p.feed("PRETEXT");
        assert_eq!(p.capturing(), Some(CaptureTarget::Pretext));
        p.feed("CHANNEL #nope");
        p.feed(". not a terminator");
        let d = p.finish();
        assert_eq!(d.pretext, "CHANNEL #nope\n. not a terminator");
        assert_eq!(d.channel, None);
        assert!(d.as_attachment);
    }

    #[test]
    fn capture_ends_at_end_of_stream() {
        let d = parse_lines(["TEXT", "unterminated"]);
        assert_eq!(d.text, "unterminated");
    }

    #[test]
    fn inline_content_overwrites_previous_text() {
        let d = parse_lines(["TEXT old", ".", "TEXT new", "."]);
        assert_eq!(d.text, "new");
    }

    #[test]
    fn reopened_capture_appends_to_existing_text() {
        let d = parse_lines(["TEXT a", ".", "TEXT", "b", "."]);
        assert_eq!(d.text, "a\nb");
    }

    #[test]
    fn remainder_after_skips_exactly_one_separator() {
        assert_eq!(remainder_after("TEXT  two spaces", 1), " two spaces");
        assert_eq!(remainder_after("TEXT", 1), "");
    }
}
