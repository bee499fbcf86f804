// SPDX-License-Identifier: MIT

//! Deterministic text transformations used when no model is available
//!
//! These are pure string operations. They back every gateway operation so
//! that generation never fails from the caller's point of view.

/// Context flavors for [`enhanced`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextKind {
    #[default]
    Professional,
    Personal,
    Technical,
}

impl ContextKind {
    /// Parse a context kind; unrecognized values fall back to professional
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "personal" => Self::Personal,
            "technical" => Self::Technical,
            _ => Self::Professional,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Personal => "personal",
            Self::Technical => "technical",
        }
    }

    /// Fixed prefix/suffix phrase pair for the fallback enhancer
    fn template(&self) -> (&'static str, &'static str) {
        match self {
            Self::Professional => (
                "**Professional Activity:**",
                "This activity aligns with organizational objectives and demonstrates professional competency.",
            ),
            Self::Personal => (
                "**Personal Development:**",
                "This experience contributes to personal growth and skill development.",
            ),
            Self::Technical => (
                "**Technical Implementation:**",
                "This task required technical expertise and problem-solving capabilities.",
            ),
        }
    }
}

/// Strip a leading bullet marker (one of a fixed glyph set) from a line
fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['•', '-', '*', ' ']).trim()
}

/// Extractive summary: first two meaningful sentence fragments
pub fn summary(text: &str) -> String {
    let flattened = text.replace('\n', " ");
    let sentences: Vec<&str> = flattened
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return "Daily activities were documented.".to_string();
    }

    if sentences.len() == 1 {
        return format!("{}.", sentences[0]);
    }

    // Scan the first five fragments for ones with at least three words
    let mut meaningful: Vec<&str> = Vec::new();
    for sentence in sentences.iter().take(5) {
        if sentence.split_whitespace().count() >= 3 {
            meaningful.push(sentence);
        }
        if meaningful.len() >= 2 {
            break;
        }
    }

    if meaningful.is_empty() {
        format!(
            "Today involved {} documented activities and tasks.",
            sentences.len()
        )
    } else {
        format!("{}.", meaningful.join(". "))
    }
}

/// Templated line-by-line expansion of brief notes
pub fn detailed(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return "No activities to expand upon.".to_string();
    }

    let mut expanded: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let clean = strip_bullet(line);
        if clean.is_empty() {
            continue;
        }

        // Short lines get the long-form expansion, longer lines a moderate one
        let entry = if clean.split_whitespace().count() < 5 {
            format!(
                "**Activity {}:** {}. This task involved careful planning and execution, \
                 contributing to the overall project objectives. The completion of this \
                 activity helps maintain project momentum and ensures quality deliverables.",
                i + 1,
                clean
            )
        } else {
            format!(
                "**Activity {}:** {}. This represents a significant milestone in the daily \
                 workflow, requiring coordination and attention to detail.",
                i + 1,
                clean
            )
        };

        expanded.push(entry);
    }

    let conclusion = format!(
        "**Daily Overview:** Today's activities encompassed {} key areas of focus, each \
         contributing to broader project goals and professional development. The documented \
         tasks reflect a productive day with meaningful progress across multiple initiatives.",
        expanded.len()
    );

    format!("{}\n\n{}", expanded.join("\n\n"), conclusion)
}

/// Wrap each line with a context-specific phrase pair
pub fn enhanced(text: &str, kind: ContextKind) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return "No activities to enhance.".to_string();
    }

    let (prefix, suffix) = kind.template();

    let enhanced: Vec<String> = lines
        .iter()
        .map(|line| strip_bullet(line))
        .filter(|clean| !clean.is_empty())
        .map(|clean| format!("{} {}. {}", prefix, clean, suffix))
        .collect();

    enhanced.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_single_sentence_gets_trailing_period() {
        assert_eq!(summary("Fixed the bug"), "Fixed the bug.");
    }

    #[test]
    fn summary_takes_first_two_meaningful_fragments() {
        assert_eq!(
            summary("Met the team. Reviewed code. Went home."),
            "Met the team. Reviewed code."
        );
    }

    #[test]
    fn summary_counts_fragments_when_none_qualify() {
        // Two fragments, each under three words
        assert_eq!(
            summary("Did it. Done."),
            "Today involved 2 documented activities and tasks."
        );
    }

    #[test]
    fn summary_normalizes_newlines_before_splitting() {
        let text = "Met the team today\nand planned the release. Reviewed all the code.";
        assert_eq!(
            summary(text),
            "Met the team today and planned the release. Reviewed all the code."
        );
    }

    #[test]
    fn summary_empty_text_uses_placeholder() {
        assert_eq!(summary(""), "Daily activities were documented.");
        assert_eq!(summary("..."), "Daily activities were documented.");
    }

    #[test]
    fn detailed_short_line_uses_long_form_template() {
        let result = detailed("Call client");
        assert!(result.starts_with("**Activity 1:** Call client."));
        assert!(result.contains("careful planning and execution"));
        assert!(result.contains("encompassed 1 key areas of focus"));
    }

    #[test]
    fn detailed_long_line_uses_moderate_template() {
        let result = detailed("Reviewed the quarterly budget with the finance team");
        assert!(result.contains("significant milestone in the daily workflow"));
        assert!(!result.contains("careful planning and execution"));
    }

    #[test]
    fn detailed_strips_bullet_markers_and_numbers_lines() {
        let result = detailed("• Call client\n- Review code thoroughly before the deadline\n");
        assert!(result.contains("**Activity 1:** Call client."));
        assert!(result.contains("**Activity 2:** Review code thoroughly before the deadline."));
        assert!(result.contains("encompassed 2 key areas"));
    }

    #[test]
    fn detailed_empty_input_uses_placeholder_without_overview() {
        let result = detailed("   \n  ");
        assert_eq!(result, "No activities to expand upon.");
    }

    #[test]
    fn enhanced_wraps_lines_with_context_pair() {
        let result = enhanced("* Shipped release", ContextKind::Technical);
        assert_eq!(
            result,
            "**Technical Implementation:** Shipped release. This task required technical \
             expertise and problem-solving capabilities."
        );
    }

    #[test]
    fn enhanced_unknown_context_falls_back_to_professional() {
        assert_eq!(ContextKind::parse("whimsical"), ContextKind::Professional);
        assert_eq!(ContextKind::parse("TECHNICAL"), ContextKind::Technical);
    }

    #[test]
    fn enhanced_empty_input_uses_placeholder() {
        assert_eq!(enhanced("", ContextKind::Personal), "No activities to enhance.");
    }
}
