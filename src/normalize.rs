use std::sync::LazyLock;

use regex::Regex;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").expect("heading pattern is valid"));
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n---\n").expect("rule pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_\n]+)_").expect("italic pattern is valid"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("bold pattern is valid"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\* ").expect("bullet pattern is valid"));

/// Strips markdown decoration from model output so it reads as plain text.
///
/// Passes repeat until the text stops changing, so the result is a fixed
/// point: `normalize(normalize(s)) == normalize(s)`. Every pass either
/// shortens the text or turns a `*` bullet into `-`, which bounds the loop.
pub fn normalize(text: &str) -> String {
    let mut current = normalize_once(text);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(text: &str) -> String {
    let text = HEADING.replace_all(text, "");
    let text = HORIZONTAL_RULE.replace_all(&text, "\n");
    let text = ITALIC.replace_all(&text, "$1");
    let text = BOLD.replace_all(&text, "$1");
    BULLET.replace_all(&text, "- ").into_owned()
}
