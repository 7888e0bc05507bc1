/// Removes exactly one layer of markdown code fence around model output.
///
/// The opening fence may carry a language tag (```` ```json ````,
/// ```` ```markdown ````). Inner fences are left untouched, and input without
/// an opening fence is only trimmed.
///
/// # Arguments
/// * `raw` - Raw model output
///
/// # Returns
/// * `&str` - The unwrapped, trimmed text
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.split_once('\n') {
        Some((tag, body)) if is_fence_tag(tag) => body,
        _ => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn is_fence_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// Case-insensitive check that `text` contains every one of `needles`.
pub fn contains_all_ignore_case(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().all(|n| lower.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LESSON: &str = "## Concept Simplified\nLoops repeat.\n\n```python\nfor i in range(3):\n    print(i)\n```";

    #[test]
    fn bare_fence_is_removed() {
        assert_eq!(strip_code_fence("```\n[\"a\"]\n```"), "[\"a\"]");
    }

    #[test]
    fn tagged_fence_is_removed() {
        assert_eq!(strip_code_fence("```json\n{\"next_node\": \"chat\"}\n```"), "{\"next_node\": \"chat\"}");
        let wrapped = format!("```markdown\n{}\n```", LESSON);
        assert_eq!(strip_code_fence(&wrapped), LESSON);
    }

    #[test]
    fn single_line_fence_is_removed() {
        assert_eq!(strip_code_fence("```[\"a\", \"b\"]```"), "[\"a\", \"b\"]");
    }

    #[test]
    fn only_one_layer_is_removed() {
        let wrapped = "```\n```python\nx = 1\n```\n```";
        assert_eq!(strip_code_fence(wrapped), "```python\nx = 1\n```");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  plain text \n"), "plain text");
        assert_eq!(strip_code_fence(LESSON), LESSON);
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(contains_all_ignore_case("Let's START the Interview", &["interview", "start"]));
        assert!(!contains_all_ignore_case("start coding", &["interview", "start"]));
    }
}
