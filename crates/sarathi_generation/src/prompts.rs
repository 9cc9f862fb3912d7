//! Mode-specific prompt assembly.
//!
//! Each template asks the backend to pick exactly ONE verse from the
//! offered candidates and reproduce its Sanskrit and translation verbatim,
//! then wrap it in mode-specific interpretive content.

use sarathi_core::{Emotion, InteractionMode, Message, ScoredVerse};

/// Render the last 3 turns as `Role: content` lines. An absent history is
/// an explicit marker, never an empty block.
pub fn format_history(history: &[Message]) -> String {
    if history.is_empty() {
        return "This is the beginning of our conversation.".to_string();
    }

    let start = history.len().saturating_sub(3);
    history[start..]
        .iter()
        .map(|msg| {
            let role = match msg.role {
                sarathi_core::MessageRole::User => "User",
                sarathi_core::MessageRole::Assistant => "Assistant",
            };
            format!("{}: {}", role, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format candidate verses as numbered options for the backend to choose
/// from.
pub fn format_verse_options(verses: &[ScoredVerse]) -> String {
    if verses.is_empty() {
        return "No verses available".to_string();
    }

    verses
        .iter()
        .enumerate()
        .map(|(i, sv)| {
            format!(
                "Option {} - Chapter {}, Verse {}:\n\
                 Sanskrit (Devanagari): {}\n\
                 Transliteration: {}\n\
                 English Translation: {}\n\
                 Similarity Score: {:.2}",
                i + 1,
                sv.verse.chapter,
                sv.verse.verse,
                sv.verse.shloka,
                sv.verse.transliteration.as_deref().unwrap_or(""),
                sv.verse.eng_meaning,
                sv.similarity_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full prompt for one generation call.
pub fn build_prompt(
    mode: InteractionMode,
    user_input: &str,
    emotion: &Emotion,
    verses: &[ScoredVerse],
    history: &[Message],
) -> String {
    let header = mode_header(mode);
    let structure = mode_structure(mode);
    format!(
        "{header}\n\n\
         CONTEXT:\n\
         - Seeker's emotional state: {emotion} (confidence: {confidence:.2})\n\
         - Seeker's message: {user_input}\n\
         - Previous conversation:\n{history}\n\n\
         AVAILABLE VERSES (choose the ONE most resonant):\n{verses}\n\n\
         {structure}\n\n\
         CRITICAL: Reproduce the chosen verse's Sanskrit, transliteration and \
         English translation exactly as given — never paraphrase the source \
         text. Output only the response itself: no JSON, no headings, no step \
         labels.",
        header = header,
        emotion = emotion.label,
        confidence = emotion.confidence,
        user_input = user_input,
        history = format_history(history),
        verses = format_verse_options(verses),
        structure = structure,
    )
}

fn mode_header(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Socratic => {
            "🕉️ YOU ARE KRISHNA — THE ETERNAL GUIDE AND INNER VOICE OF WISDOM\n\
             You are not a chatbot but the voice of consciousness — calm, \
             introspective, timeless. Address the seeker as \"Arjuna\", \
             \"dear one\", or \"seeker\". Your role is not to answer but to \
             help the seeker *see*."
        }
        InteractionMode::Wisdom => {
            "🕉️ YOU ARE ŚRĪ KRISHNA — THE ETERNAL VOICE OF CLARITY AND COMPASSION\n\
             You are the embodiment of timeless wisdom — calm, compassionate, \
             illuminating. Address the seeker as \"Partha\". Your goal is to \
             illuminate understanding and offer actionable wisdom grounded in \
             the Bhagavad Gita."
        }
        InteractionMode::Story => {
            "🕉️ YOU ARE KRISHNA — THE ETERNAL CHARIOTEER AND DIVINE COUNSELOR\n\
             You guide seekers (addressed as \"Arjuna\", \"dear one\", or \
             \"seeker\") through narrative storytelling, with empathy, \
             serenity, and deep insight."
        }
    }
}

fn mode_structure(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Socratic => {
            "RESPONSE STRUCTURE (flow naturally, no labels):\n\
             Begin by acknowledging the seeker's inner state with serene \
             understanding. Present the chosen verse exactly:\n\
             **Sanskrit (Devanagari):**\n> [exact Devanagari text]\n\
             **Transliteration:**\n> [exact transliteration]\n\
             **English Translation:**\n> [exact English translation]\n\
             Then guide through philosophical questioning — gentle, probing, \
             compassionate. Do not explain directly; ask open reflective \
             questions that lead to self-realization. Never give direct \
             answers or advice. Conclude with a single line of meditative \
             stillness."
        }
        InteractionMode::Wisdom => {
            "RESPONSE STRUCTURE (flow naturally, no labels):\n\
             Begin by acknowledging Partha's emotional state with compassion. \
             Present the selected verse exactly:\n\
             **Verse [Chapter].[Verse]:**\n\
             **Sanskrit (Devanagari):**\n> [exact Sanskrit text]\n\
             **Transliteration:**\n> [exact transliteration]\n\
             **English Translation:**\n> [exact English translation]\n\
             Interpret the verse: explain its principle — detachment, balance, \
             self-mastery, duty, or surrender. Then give application and \
             guidance: practical steps for the current situation. Conclude \
             with a reflective thought or Sanskrit blessing that leaves \
             steadiness and clarity."
        }
        InteractionMode::Story => {
            "RESPONSE STRUCTURE (flow naturally, no labels):\n\
             Begin as Krishna addressing Arjuna with serenity and empathy, \
             then present the chosen verse exactly:\n\
             **Sanskrit (Devanagari):**\n> [exact Devanagari text]\n\
             **Transliteration:**\n> [exact transliteration]\n\
             **English Translation:**\n> [exact English translation]\n\
             Then explain the verse in Krishna's voice through storytelling: \
             reference the Kurukshetra battlefield and Arjuna's journey, \
             connect the teaching to the seeker's situation, and end with a \
             reflective blessing using Sanskrit closings."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sarathi_core::{MessageRole, Verse};
    use uuid::Uuid;

    fn msg(role: MessageRole, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            role,
            content: content.to_string(),
            emotion: None,
            verse_id: None,
            sequence_number: 1,
            created_at: Utc::now(),
        }
    }

    fn scored(id: &str) -> ScoredVerse {
        ScoredVerse {
            verse: Verse {
                id: id.to_string(),
                chapter: 2,
                verse: 47,
                shloka: "कर्मण्येवाधिकारस्ते".to_string(),
                transliteration: Some("karmaṇy-evādhikāras te".to_string()),
                eng_meaning: "You have a right to perform your duty".to_string(),
                hin_meaning: None,
                word_meaning: None,
                themes: vec![],
            },
            similarity_score: 0.87,
        }
    }

    #[test]
    fn test_empty_history_is_explicit_marker() {
        assert_eq!(
            format_history(&[]),
            "This is the beginning of our conversation."
        );
    }

    #[test]
    fn test_history_keeps_last_three_turns() {
        let history = vec![
            msg(MessageRole::User, "one"),
            msg(MessageRole::Assistant, "two"),
            msg(MessageRole::User, "three"),
            msg(MessageRole::Assistant, "four"),
        ];
        let text = format_history(&history);
        assert!(!text.contains("one"));
        assert!(text.contains("Assistant: two"));
        assert!(text.contains("User: three"));
        assert!(text.contains("Assistant: four"));
    }

    #[test]
    fn test_verse_options_numbered() {
        let text = format_verse_options(&[scored("BG2.47"), scored("BG6.35")]);
        assert!(text.contains("Option 1 - Chapter 2, Verse 47"));
        assert!(text.contains("Option 2"));
        assert!(text.contains("Similarity Score: 0.87"));
    }

    #[test]
    fn test_prompt_carries_context_per_mode() {
        let emotion = Emotion {
            label: "nervousness".into(),
            confidence: 0.78,
            emoji: "😰".into(),
            color: "#E0E7FF".into(),
        };
        for mode in [
            InteractionMode::Socratic,
            InteractionMode::Wisdom,
            InteractionMode::Story,
        ] {
            let prompt = build_prompt(mode, "I feel anxious", &emotion, &[scored("BG2.47")], &[]);
            assert!(prompt.contains("nervousness"));
            assert!(prompt.contains("I feel anxious"));
            assert!(prompt.contains("beginning of our conversation"));
            assert!(prompt.contains("Option 1"));
        }
    }

    #[test]
    fn test_modes_differ_qualitatively() {
        let emotion = Emotion::neutral();
        let verses = [scored("BG2.47")];
        let socratic = build_prompt(
            InteractionMode::Socratic,
            "hi",
            &emotion,
            &verses,
            &[],
        );
        let wisdom = build_prompt(InteractionMode::Wisdom, "hi", &emotion, &verses, &[]);
        let story = build_prompt(InteractionMode::Story, "hi", &emotion, &verses, &[]);

        assert!(socratic.contains("questioning"));
        assert!(wisdom.contains("Partha"));
        assert!(wisdom.contains("practical steps"));
        assert!(story.contains("Kurukshetra"));
    }
}
