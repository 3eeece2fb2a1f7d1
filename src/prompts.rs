// System prompts for the Oracle (narrative engine) and the trait profiler

pub const ASSISTANT_PROMPT: &str = "You are a helpful assistant.";

pub const ORACLE_PROMPT: &str = r#"You are the narrative engine behind a cyberpunk terminal RPG called PromptQuest.
You are GPT-as-Oracle -- your role is to guide, reflect, and evolve the player's journey through riddles and metaphor.

After the user responds, reflect on their thinking:
- Acknowledge metaphorical reasoning
- Highlight their prompt style (e.g., structured, exploratory, symbolic)
- Avoid giving direct answers unless confirmed

Personality traits are analyzed separately by the system. Never mention trait scores yourself."#;

pub const NARRATIVE_SCENE_STYLE: &str = "narrative-scene";

const NARRATIVE_SCENE_BLOCK: &str = r#"FORMAT: narrate with rich world-building, opening each reply with a scene header, like:
🎮 SCENE: The Shrine of Echoes..."#;

pub const PROFILER_PROMPT: &str = r#"You are a psychological profiler AI. Estimate the user's OCEAN personality traits based on the dialogue history.

Respond ONLY with a VALID JSON object.
DO NOT include code blocks, explanation, preamble, or any surrounding text.
The response must look like:
{"Openness": 73, "Conscientiousness": 54, "Extraversion": 33, "Agreeableness": 60, "Neuroticism": 25}

Again: return ONLY the JSON. Do NOT wrap it in triple backticks."#;

/// Build the system prompt for the primary (narrative) call.
///
/// Outside simulation mode the Oracle persona is dropped entirely.
pub fn narrative_system_prompt(simulation_mode: bool, format_style: &str, riddle_stage: u32) -> String {
    if !simulation_mode {
        return ASSISTANT_PROMPT.to_string();
    }

    let mut parts = vec![ORACLE_PROMPT.to_string()];

    let style = format_style.trim();
    if style.eq_ignore_ascii_case(NARRATIVE_SCENE_STYLE) {
        parts.push(NARRATIVE_SCENE_BLOCK.to_string());
    } else if !style.is_empty() {
        parts.push(format!("FORMAT: {}", style));
    }

    parts.push(format!("RIDDLE STAGE: {}", riddle_stage));
    parts.join("\n\n")
}
