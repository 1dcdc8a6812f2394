//! Forced-choice prompt construction

use crate::items::Item;

/// Instruction appended to every prompt
pub const ANSWER_INSTRUCTION: &str =
    "Select the most pragmatically appropriate option (A or B). Please respond with only 'A' or 'B'.";

/// Build the single user turn for an item, embedding its text verbatim
pub fn build_prompt(item: &Item) -> String {
    format!(
        "Context: {}\n\nA: {}\nB: {}\n\n{}",
        item.context, item.option_a, item.option_b, ANSWER_INSTRUCTION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Label;

    #[test]
    fn test_build_prompt() {
        let item = Item {
            context: "Bunica îți oferă a treia porție de sarmale.".to_string(),
            option_a: "Mulțumesc, sunt sătul.".to_string(),
            option_b: "Nu.".to_string(),
            gold_label: Label::A,
            phenomenon: "politeness".to_string(),
            domain: "family".to_string(),
            role_direction: "junior-senior".to_string(),
        };

        let prompt = build_prompt(&item);
        assert_eq!(
            prompt,
            "Context: Bunica îți oferă a treia porție de sarmale.\n\n\
             A: Mulțumesc, sunt sătul.\n\
             B: Nu.\n\n\
             Select the most pragmatically appropriate option (A or B). Please respond with only 'A' or 'B'."
        );
        assert!(!prompt.contains("politeness"));
    }
}
