use std::borrow::Cow;

const HIGHLIGHT: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Wrap `text` in the highlight color when colors are enabled.
pub(crate) fn highlight(text: &str, colors: bool) -> Cow<'_, str> {
    if colors {
        Cow::Owned(format!("{HIGHLIGHT}{text}{RESET}"))
    } else {
        Cow::Borrowed(text)
    }
}
