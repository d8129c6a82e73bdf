use crate::models::agenda::{AGENDA_ITEM_COUNT, AgendaOutcome, AgendaSource};
use regex::Regex;
use std::sync::LazyLock;

static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^- ([^\r\n]+)").expect("bullet pattern is valid"));

/// Extracts agenda items from free-form completion text.
///
/// Lines starting with `- ` win. When the model ignored the format entirely, the first
/// non-empty lines are used instead. Either way at most [`AGENDA_ITEM_COUNT`] items are kept,
/// and anything short of that is reported as a shortfall.
pub fn parse_agenda(raw: &str) -> AgendaOutcome {
    let bullets: Vec<String> = BULLET_LINE
        .captures_iter(raw)
        .map(|caps| caps[1].trim().to_string())
        .take(AGENDA_ITEM_COUNT)
        .collect();

    if !bullets.is_empty() {
        return AgendaOutcome::new(bullets, AgendaSource::Bullets);
    }

    let lines = raw
        .split('\n')
        .map(|line| line.strip_prefix("- ").unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .take(AGENDA_ITEM_COUNT)
        .map(str::to_string)
        .collect();

    AgendaOutcome::new(lines, AgendaSource::PlainLines)
}

pub fn parse_brief(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn five_bullets_are_stripped_in_order() {
        let raw = "- Discuss budget\n- Review milestones\n- Identify blockers\n- Plan next steps\n- Schedule follow-up";
        let outcome = parse_agenda(raw);
        assert!(!outcome.is_shortfall());
        assert_eq!(outcome.source(), AgendaSource::Bullets);
        assert_eq!(
            outcome.items(),
            ["Discuss budget", "Review milestones", "Identify blockers", "Plan next steps", "Schedule follow-up"]
        );
    }

    #[test]
    fn bullets_ignore_surrounding_chatter() {
        let raw = "Sure! Here is the agenda:\r\n- One\r\n- Two\r\nLet me know if you need more.";
        let outcome = parse_agenda(raw);
        assert_eq!(outcome.items(), ["One", "Two"]);
        assert!(outcome.is_shortfall());
    }

    #[test]
    fn extra_bullets_are_capped() {
        let raw = (1..=7).map(|i| format!("- item {i}")).collect::<Vec<_>>().join("\n");
        let outcome = parse_agenda(&raw);
        assert_eq!(outcome.items().len(), AGENDA_ITEM_COUNT);
        assert_eq!(outcome.items()[4], "item 5");
    }

    #[test]
    fn falls_back_to_plain_lines() {
        let raw = "1. Budget\n\n2. Timeline\n   \n3. Staffing\n4. Risks\n5. Owners\n6. Extra";
        let outcome = parse_agenda(raw);
        assert_eq!(outcome.source(), AgendaSource::PlainLines);
        assert_eq!(outcome.items(), ["1. Budget", "2. Timeline", "3. Staffing", "4. Risks", "5. Owners"]);
    }

    #[test]
    fn indented_dashes_are_not_bullets() {
        let outcome = parse_agenda("  - nested one\n* star item");
        assert_eq!(outcome.source(), AgendaSource::PlainLines);
        assert_eq!(outcome.items(), ["- nested one", "* star item"]);
    }

    #[test]
    fn empty_completion_is_an_empty_shortfall() {
        let outcome = parse_agenda("  \n\n");
        assert!(outcome.is_shortfall());
        assert!(outcome.items().is_empty());
    }

    #[test]
    fn brief_is_trimmed_only() {
        assert_eq!(parse_brief("\n  The team agreed on Q3.  Hiring is open. \n"), "The team agreed on Q3.  Hiring is open.");
    }

    proptest! {
        #[test]
        fn dash_lines_round_trip(items in prop::collection::vec("[A-Za-z0-9][A-Za-z0-9 ,]{0,30}[A-Za-z0-9]", 5)) {
            let raw = items.iter().map(|item| format!("- {item}")).collect::<Vec<_>>().join("\n");
            let outcome = parse_agenda(&raw);
            prop_assert!(!outcome.is_shortfall());
            prop_assert_eq!(outcome.items(), items.as_slice());
        }

        #[test]
        fn never_more_than_five_items(raw in "[a-z\\- \n]{0,200}") {
            prop_assert!(parse_agenda(&raw).items().len() <= AGENDA_ITEM_COUNT);
        }

        #[test]
        fn brief_has_no_outer_whitespace(raw in "\\s{0,4}[a-z .]{0,40}\\s{0,4}") {
            let brief = parse_brief(&raw);
            prop_assert_eq!(brief.as_str(), brief.trim());
        }
    }
}
