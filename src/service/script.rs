//! Post-processing of the generated script text.

/// Script body used when the model returns nothing usable.
pub const PLACEHOLDER_SCRIPT: &str = "# Error generating code";

const FENCE: &str = "```";

/// Remove markdown fence markers from a model answer.
///
/// Every fence is dropped together with a language tag that fills the rest
/// of its line (```` ```python ````); all other text, including the content of
/// every block, is kept. The result is trimmed and never contains a fence,
/// so applying this twice gives the same text.
pub fn strip_code_fences(text: &str) -> String {
    remove_fence_markers(text).trim().to_string()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '#' | '_' | '.')
}

fn remove_fence_markers(text: &str) -> String {
    let mut cleaned = text.to_string();
    while let Some(pos) = cleaned.find(FENCE) {
        let start = pos + FENCE.len();
        let rest_of_line = cleaned[start..].split('\n').next().unwrap_or_default().trim_end();
        // ```print(1)``` keeps its code; only a bare tag is part of the fence
        let tag_len = if rest_of_line.chars().all(is_tag_char) {
            rest_of_line.len()
        } else {
            0
        };
        cleaned.replace_range(pos..start + tag_len, "");
    }
    cleaned
}

/// Clean a raw script answer, substituting the placeholder when nothing is
/// left.
///
/// Returns `None` when the placeholder had to be used.
pub fn clean_script(raw: &str) -> Option<String> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn strips_python_fence() {
        let raw = "\n```python\nprint(\"hello\")\n```\n  ";
        assert_eq!(strip_code_fences(raw), "print(\"hello\")");
    }

    #[test]
    fn keeps_text_around_block() {
        let raw = "Here is your script:\n```py\nimport requests\n```\nEnjoy!";
        assert_eq!(
            strip_code_fences(raw),
            "Here is your script:\n\nimport requests\n\nEnjoy!"
        );
    }

    #[test]
    fn keeps_every_block() {
        let raw = "```bash\npip install requests\n```\n\n```python\nimport requests\nprint(requests.get('x'))\n```";
        let cleaned = strip_code_fences(raw);
        assert!(cleaned.starts_with("pip install requests"));
        assert!(cleaned.contains("import requests\nprint(requests.get('x'))"));
        assert!(!cleaned.contains(FENCE));
        assert!(!cleaned.contains("bash") && !cleaned.contains("python"));
    }

    #[test]
    fn tag_with_trailing_carriage_return() {
        assert_eq!(strip_code_fences("```python\r\nx = 1\r\n```"), "x = 1");
    }

    #[test]
    fn keeps_unfenced_text() {
        assert_eq!(strip_code_fences("  x = 1\ny = 2\n"), "x = 1\ny = 2");
    }

    #[test]
    fn unterminated_fence_keeps_rest() {
        assert_eq!(strip_code_fences("```python\nx = 1\n"), "x = 1");
    }

    #[test]
    fn single_line_block() {
        assert_eq!(strip_code_fences("```print(1)```"), "print(1)");
    }

    #[test]
    fn stray_markers_are_removed() {
        assert_eq!(strip_code_fences("``````"), "");
        assert_eq!(remove_fence_markers("a```python\nb"), "a\nb");
        assert!(!strip_code_fences("x ``` `````` y").contains(FENCE));
    }

    #[test]
    fn preserves_indentation_inside_block() {
        let raw = "```python\ndef main():\n    print(1)\n```";
        assert_eq!(strip_code_fences(raw), "def main():\n    print(1)");
    }

    #[rstest]
    #[case("```python\nprint(\"hello\")\n```")]
    #[case("intro\n```\nfoo()\n```\noutro")]
    #[case("```sh\nls\n```\n```python\nprint(1)\n```")]
    #[case("plain text")]
    #[case("`` ```py` `")]
    #[case("```")]
    #[case(PLACEHOLDER_SCRIPT)]
    fn stripping_is_idempotent(#[case] raw: &str) {
        let once = strip_code_fences(raw);
        let twice = strip_code_fences(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn clean_script_reports_empty() {
        assert_eq!(clean_script("```python\n```"), None);
        assert_eq!(clean_script("   "), None);
        assert_eq!(clean_script("```\nprint(2)\n```").as_deref(), Some("print(2)"));
    }
}
