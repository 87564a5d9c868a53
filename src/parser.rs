use regex::Regex;

pub const TITLE_MAX: usize = 120;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, PartialEq)]
pub struct QuickAdd {
    pub title: String,
    pub priority: Option<u8>,
}

/// Extract a `!N` priority token (1-5) from a new todo's title. The first
/// valid token wins; all tokens are stripped and whitespace is collapsed.
pub fn parse_quick_add(input: &str) -> QuickAdd {
    let priority_re = Regex::new(r"!(\d+)\s*").unwrap();

    let mut priority = None;

    for caps in priority_re.captures_iter(input) {
        if let Some(priority_match) = caps.get(1) {
            if let Ok(p) = priority_match.as_str().parse::<u8>() {
                if (1..=5).contains(&p) && priority.is_none() {
                    priority = Some(p);
                }
            }
        }
    }

    let title = priority_re.replace_all(input, "").to_string();

    let title = Regex::new(r"\s+")
        .unwrap()
        .replace_all(&title, " ")
        .trim()
        .to_string();

    QuickAdd { title, priority }
}

/// Title must be non-empty after trimming and at most 120 characters.
/// Checked before any network call, so whitespace-only titles never
/// reach the server.
pub fn validate_title(raw: &str) -> Result<String, String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > TITLE_MAX {
        return Err(format!("Title is limited to {TITLE_MAX} characters"));
    }
    Ok(title.to_string())
}

/// A description that trims to nothing is absent, not an empty string.
pub fn normalize_description(raw: &str) -> Result<Option<String>, String> {
    let description = raw.trim();
    if description.is_empty() {
        return Ok(None);
    }
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(format!(
            "Description is limited to {DESCRIPTION_MAX} characters"
        ));
    }
    Ok(Some(description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_add_priority_in_middle() {
        let result = parse_quick_add("Update !4 software documentation");
        assert_eq!(
            result,
            QuickAdd {
                title: "Update software documentation".to_string(),
                priority: Some(4),
            }
        );
    }

    #[test]
    fn quick_add_extra_spaces_after_priority() {
        let result = parse_quick_add("Fix bugs !2    in the code");
        assert_eq!(result.title, "Fix bugs in the code");
        assert_eq!(result.priority, Some(2));
    }

    #[test]
    fn quick_add_priority_at_end() {
        let result = parse_quick_add("Deploy to production   !5   ");
        assert_eq!(result.title, "Deploy to production");
        assert_eq!(result.priority, Some(5));
    }

    #[test]
    fn quick_add_first_valid_priority_wins() {
        let result = parse_quick_add("  !1  !2 Organize    team building !3 event ");
        assert_eq!(result.title, "Organize team building event");
        assert_eq!(result.priority, Some(1));
    }

    #[test]
    fn quick_add_out_of_range_priority_is_ignored() {
        let result = parse_quick_add("Check logs !8    immediately");
        assert_eq!(result.title, "Check logs immediately");
        assert_eq!(result.priority, None);
    }

    #[test]
    fn quick_add_without_token_leaves_title_alone() {
        let result = parse_quick_add("Buy milk");
        assert_eq!(result.title, "Buy milk");
        assert_eq!(result.priority, None);
    }

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  Buy milk  ").unwrap(), "Buy milk");
    }

    #[test]
    fn whitespace_only_title_is_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("").is_err());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let raw = "x".repeat(TITLE_MAX + 1);
        assert!(validate_title(&raw).is_err());
        let max = "x".repeat(TITLE_MAX);
        assert_eq!(validate_title(&max).unwrap(), max);
    }

    #[test]
    fn empty_description_becomes_absent() {
        assert_eq!(normalize_description("").unwrap(), None);
        assert_eq!(normalize_description("   ").unwrap(), None);
    }

    #[test]
    fn description_is_trimmed_and_kept() {
        assert_eq!(
            normalize_description("  details  ").unwrap(),
            Some("details".to_string())
        );
    }

    #[test]
    fn overlong_description_is_rejected() {
        let raw = "x".repeat(DESCRIPTION_MAX + 1);
        assert!(normalize_description(&raw).is_err());
    }
}
