// Enhancement LLM prompt templates and builders.
// All prompts for the enhancement module are defined here.

use crate::models::entry::DiaryEntry;

/// Prior entries quoted in the rewrite prompt.
pub const ENHANCE_HISTORY_WINDOW: usize = 3;
/// Prior entries fed to the context analysis.
pub const ANALYSIS_HISTORY_WINDOW: usize = 5;

pub const ENHANCE_MAX_TOKENS: u32 = 1000;
pub const ANALYSIS_MAX_TOKENS: u32 = 1000;

pub const ENHANCE_SYSTEM: &str = "\
You are a personal diary enhancement assistant. Your task is to:
1. Take simple thoughts and phrases and transform them into well-written diary entries
2. Maintain the original sentiment and meaning
3. Add relevant context based on previous entries when available
4. Keep the personal and intimate nature of a diary entry
5. Use natural, first-person language
6. Preserve any emotional nuances from the original text";

pub const ANALYSIS_SYSTEM: &str = "\
You are a diary analysis assistant. Analyze the user's previous diary entries to:
1. Identify recurring themes
2. Understand emotional patterns
3. Note important people, places, or events
4. Recognize writing style preferences
Return the analysis as structured data that can be used to enhance future entries.";

const ANALYSIS_DELIMITER: &str = "\n---\n";

/// Builds the rewrite prompt. `history` is newest first.
pub fn build_enhance_prompt(content: &str, history: &[DiaryEntry]) -> String {
    let mut prompt = String::new();

    if !history.is_empty() {
        prompt.push_str("Based on previous diary entries:\n");
        for entry in history.iter().take(ENHANCE_HISTORY_WINDOW) {
            prompt.push_str(&format!("- {}\n", entry.content));
        }
        prompt.push('\n');
    }

    prompt.push_str("Please enhance this diary entry while maintaining its personal nature:\n");
    prompt.push_str(content);
    prompt
}

/// Builds the analysis prompt. `history` is newest first.
pub fn build_analysis_prompt(history: &[DiaryEntry]) -> String {
    let entries_text = history
        .iter()
        .take(ANALYSIS_HISTORY_WINDOW)
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join(ANALYSIS_DELIMITER);

    format!("Please analyze these diary entries:\n{entries_text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::EntryContext;

    fn entry(id: i64, content: &str) -> DiaryEntry {
        DiaryEntry {
            id,
            user_id: "u1".to_string(),
            content: content.to_string(),
            enhanced_content: None,
            created_at: format!("2024-05-01T10:00:{id:02}.000000Z"),
            context: EntryContext::new(),
        }
    }

    #[test]
    fn test_enhance_prompt_without_history() {
        let prompt = build_enhance_prompt("rainy day", &[]);
        assert_eq!(
            prompt,
            "Please enhance this diary entry while maintaining its personal nature:\nrainy day"
        );
    }

    #[test]
    fn test_enhance_prompt_quotes_three_newest() {
        let history: Vec<_> = (1..=5).rev().map(|i| entry(i, &format!("day {i}"))).collect();
        let prompt = build_enhance_prompt("today", &history);

        assert!(prompt.starts_with("Based on previous diary entries:\n- day 5\n- day 4\n- day 3\n\n"));
        assert!(!prompt.contains("day 2"));
        assert!(prompt.ends_with("personal nature:\ntoday"));
    }

    #[test]
    fn test_analysis_prompt_joins_with_delimiter() {
        let history = vec![entry(2, "second"), entry(1, "first")];
        assert_eq!(
            build_analysis_prompt(&history),
            "Please analyze these diary entries:\nsecond\n---\nfirst"
        );
    }

    #[test]
    fn test_analysis_prompt_caps_at_five() {
        let history: Vec<_> = (1..=7).rev().map(|i| entry(i, &format!("e{i}"))).collect();
        let prompt = build_analysis_prompt(&history);
        assert!(prompt.contains("e7"));
        assert!(prompt.contains("e3"));
        assert!(!prompt.contains("e2"));
    }
}
