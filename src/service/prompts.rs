//! Fixed prompt templates sent to the completion endpoint.

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const AGENDA_MAX_TOKENS: u32 = 200;
pub const BRIEF_MAX_TOKENS: u32 = 150;
pub const TEMPERATURE: f32 = 0.5;

pub fn agenda_prompt(notes: &str) -> String {
    format!(
        r#"
Here are the previous meeting notes:
{notes}

Generate EXACTLY five concise agenda items for the next meeting.
Each item MUST start with "- " (dash + space), with no headings or extra text.

For example:
- Discuss budget, timeline, and staffing
- Review project milestones and deadlines
- Identify resource requirements and blockers
- Plan next steps and assign clear owners
- Schedule the follow-up session
"#
    )
}

pub fn brief_prompt(notes: &str) -> String {
    format!(
        r#"
You are an assistant that summarizes meeting context for the host.
Here are the previous meeting notes:
{notes}

Write a 2–3 sentence briefing highlighting the key points and outstanding items the host should know before this meeting.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_substituted() {
        let prompt = agenda_prompt("Discuss Q3 budget");
        assert!(prompt.contains("Here are the previous meeting notes:\nDiscuss Q3 budget\n"));
        assert!(prompt.contains("EXACTLY five"));

        let prompt = brief_prompt("Hiring plan");
        assert!(prompt.contains("Hiring plan"));
        assert!(prompt.contains("2–3 sentence"));
    }

    #[test]
    fn empty_notes_still_build_a_prompt() {
        assert!(agenda_prompt("").contains("notes:\n\n"));
    }
}
