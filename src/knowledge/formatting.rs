use colored::Colorize;

use crate::knowledge::manager::CorpusStats;
use crate::knowledge::types::Passage;
use crate::retrieval::{AssembledContext, FragmentSource};
use crate::transcript::TrackedCourses;

pub fn format_passages(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return "No passages".to_string();
    }

    let mut output = String::new();

    for passage in passages {
        output.push_str(&"━".repeat(60));
        output.push('\n');
        output.push_str(&passage.id.blue().bold().to_string());
        output.push_str(&format!(" ({})", passage.kind).bright_black().to_string());
        output.push('\n');
        output.push_str(&passage.text);
        output.push_str("\n\n");
    }

    output
}

pub fn format_context(context: &AssembledContext) -> String {
    let mut output = String::new();

    if context.identifiers.is_empty() {
        output.push_str(&"No course identifiers in question".bright_black().to_string());
    } else {
        output.push_str(&format!("Course identifiers: {}", context.identifiers.join(", ")));
    }
    output.push('\n');

    if context.is_empty() {
        output.push_str("No context retrieved\n");
        return output;
    }

    for (position, fragment) in context.fragments.iter().enumerate() {
        output.push_str(&"━".repeat(60));
        output.push('\n');

        let source = match fragment.source {
            FragmentSource::Keyword => fragment.source.to_string().yellow().bold(),
            FragmentSource::Semantic => fragment.source.to_string().cyan(),
        };
        output.push_str(&format!(
            "[{}] {} {}",
            position + 1,
            source,
            fragment.passage_id.blue()
        ));
        if let Some(score) = fragment.score {
            let score_pct = (score.clamp(0.0, 1.0) * 100.0) as u32;
            output.push_str(&format!(" {}", format!("{}% similar", score_pct).green()));
        }
        output.push('\n');

        let content = if fragment.text.chars().count() > 300 {
            format!("{}...", truncate_chars(&fragment.text, 300))
        } else {
            fragment.text.clone()
        };
        output.push_str(&content);
        output.push_str("\n\n");
    }

    output
}

pub fn format_tracked_courses(tracked: &TrackedCourses) -> String {
    if tracked.is_empty() {
        return "No courses tracked yet. Mention courses or load a transcript."
            .bright_black()
            .to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("Tracked courses ({})", tracked.len()).bold().to_string());
    output.push('\n');
    for course in tracked.iter() {
        output.push_str(&format!("  ✅ {}\n", course));
    }
    output
}

pub fn format_stats(stats: &CorpusStats) -> String {
    let mut output = String::new();

    output.push_str(&"Knowledge Base Statistics".bold().to_string());
    output.push('\n');
    output.push_str(&format!("Total Passages: {}", stats.passages));
    output.push('\n');
    output.push_str(&format!("Total Fragments: {}", stats.fragments));
    output.push('\n');
    output.push_str(&format!(
        "Average Fragment Length: {} chars",
        stats.average_fragment_chars
    ));
    output.push('\n');

    for (kind, count) in &stats.by_kind {
        output.push_str(&format!("  {:<24} {}\n", kind.to_string(), count));
    }

    output.push_str(&format!("Fingerprint: {}", stats.fingerprint.bright_black()));
    output.push('\n');

    output
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::types::PassageKind;
    use crate::retrieval::ContextFragment;

    #[test]
    fn test_format_context_shows_provenance() {
        colored::control::set_override(false);
        let context = AssembledContext {
            identifiers: vec!["MATH302".to_string()],
            fragments: vec![
                ContextFragment {
                    passage_id: "course:MATH302".to_string(),
                    text: "Prerequisites for MATH302: MATH242.".to_string(),
                    source: FragmentSource::Keyword,
                    score: None,
                },
                ContextFragment {
                    passage_id: "plan:year_2".to_string(),
                    text: "Year 2: MATH243, MATH349.".to_string(),
                    source: FragmentSource::Semantic,
                    score: Some(0.42),
                },
            ],
        };

        let output = format_context(&context);
        assert!(output.contains("Course identifiers: MATH302"));
        assert!(output.contains("[1] keyword course:MATH302"));
        assert!(output.contains("[2] semantic plan:year_2 42% similar"));
    }

    #[test]
    fn test_format_empty_tracked_courses() {
        colored::control::set_override(false);
        assert!(format_tracked_courses(&TrackedCourses::new()).starts_with("No courses tracked"));
    }

    #[test]
    fn test_format_stats_lists_kinds() {
        colored::control::set_override(false);
        let stats = CorpusStats {
            passages: 3,
            fragments: 4,
            by_kind: vec![(PassageKind::Course, 3)],
            average_fragment_chars: 120,
            fingerprint: "ab".repeat(32),
        };
        let output = format_stats(&stats);
        assert!(output.contains("Total Fragments: 4"));
        assert!(output.contains("course"));
        assert!(output.contains(&"ab".repeat(32)));
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
