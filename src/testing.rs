use crate::prelude::*;
use ansi_parser::{AnsiParser, AnsiSequence, Output};

#[macro_export]
macro_rules! assert_stdout {
    ($expected:literal, $actual:expr) => {
        $crate::testing::assert_out(
            indoc::indoc!($expected).trim(),
            String::from_utf8_lossy(&$actual).trim(),
        );
    };
}

#[macro_export]
macro_rules! assert_result {
    ($expected:literal, $actual:expr) => {
        let actual = format!("{:?}", $actual.unwrap_err());

        pretty_assertions::assert_str_eq!(indoc::indoc!($expected).trim(), actual);
    };
}

#[macro_export]
macro_rules! assert_vsphere {
    ($expected:literal, $actual:expr) => {
        pretty_assertions::assert_str_eq!(
            indoc::indoc!($expected).trim(),
            $actual.to_string().trim()
        );
    };
}

#[track_caller]
pub fn assert_out(expected: impl AsRef<str>, actual: impl AsRef<str>) {
    let actual = sanitize_ansi_codes(actual);
    let actual = sanitize_empty_lines(actual);
    let expected = sanitize_empty_lines(expected);

    pa::assert_str_eq!(expected, actual);
}

/// Replaces escape codes with tags, e.g. `\x1b[1mfoo\x1b[0m` becomes
/// `<b>foo</b>`; only the styles our commands emit are understood.
fn sanitize_ansi_codes(s: impl AsRef<str>) -> String {
    let mut out = String::new();
    let mut open = Vec::new();

    for item in s.as_ref().ansi_parse() {
        let modes = match item {
            Output::TextBlock(text) => {
                out.push_str(text);
                continue;
            }

            Output::Escape(AnsiSequence::SetGraphicsMode(modes)) => modes,
            Output::Escape(escape) => panic!("Unrecognized escape: {:?}", escape),
        };

        for mode in modes {
            if mode == 0 {
                for tag in open.drain(..).rev() {
                    out.push_str(&format!("</{}>", tag));
                }

                continue;
            }

            let (opening, tag) = match mode {
                1 => ("<b>".to_string(), "b"),
                3 => ("<i>".to_string(), "i"),
                31..=33 => (format!("<fg={}>", mode), "fg"),
                mode => panic!("Unrecognized SetGraphicsMode: {}", mode),
            };

            out.push_str(&opening);
            open.push(tag);
        }
    }

    out
}

fn sanitize_empty_lines(s: impl AsRef<str>) -> String {
    s.as_ref()
        .lines()
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_ansi_codes_given_styles() {
        colored::control::set_override(true);

        let actual = format!(
            "{} {} {}",
            "web".bold(),
            "[ OK ]".green(),
            "web-Before-patching".italic()
        );

        assert_eq!(
            "<b>web</b> <fg=32>[ OK ]</fg> <i>web-Before-patching</i>",
            sanitize_ansi_codes(actual)
        );
    }

    #[test]
    fn sanitize_empty_lines_given_whitespace() {
        assert_eq!("a\n\nb", sanitize_empty_lines("a\n    \nb"));
    }
}
