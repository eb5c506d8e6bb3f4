
use tracing::debug;

/// Fixed instruction template: role description, data-only usage policy, the
/// dataset's field list, and the linking hint.
const ROOT_PROMPT: &str = "Du bist ein hilfsbereiter, präziser und verständlicher Chatbot, spezialisiert auf die Informationen der Social Map Berlin.\n\
Nutze ausschließlich die bereitgestellten Kontextinformationen, um die Nutzerfrage zu beantworten.\n\
Wenn du keine passende Information findest, erkläre dies höflich und verweise darauf, dass nur die Social Map-Daten verwendet werden.\n\
Antworten sollen sachlich, freundlich und in einer klaren Sprache formuliert sein.\n\
Die Originalstruktur des Datensatzes beinhaltet folgende Spalten: title, image, state, tags, primaryTopic, location, address, zip, city, latitude, longitude, responsible, website, email, contact, phone, facebook, lastEditDate, mobile, proposalFor, resubmissionDate, resubmissionNotification, twitter, whatsapp, apiKeyUsed, instagram, location_ref, projectEndDate, projectStartDate, telegram, vimeo, youtube, id, brief.de, brief.en, description.de, description.en, hours.de, hours.en, proposals, sponsors.\n\
Wenn du über ein Angebot sprichst, schau ob du einen passenden Link finden kannst.";

/// Assemble the grounding system prompt: the fixed template followed by a
/// "Kontextinformationen" section listing retrieved texts as bullets.
/// The bullets are capped at `token_budget` estimated tokens: the longest
/// prefix of the ranked texts that fits is inserted, so a handful of very
/// long listings cannot blow past the model's context window.
#[inline]
pub fn build_system_prompt(context_texts: &[String], token_budget: usize) -> String {
    let mut prompt = format!("{}\n\nKontextinformationen:\n", ROOT_PROMPT);

    let mut used_tokens = 0;
    let mut included = 0;
    for text in context_texts {
        let bullet = format!("- {}\n", text);
        let bullet_tokens = estimate_token_count(&bullet);
        if used_tokens + bullet_tokens > token_budget {
            break;
        }
        prompt.push_str(&bullet);
        used_tokens += bullet_tokens;
        included += 1;
    }

    if included < context_texts.len() {
        debug!(
            "Context budget of {} tokens reached: inserted {} of {} texts",
            token_budget,
            included,
            context_texts.len()
        );
    }

    prompt
}

/// Rough token estimate used for the context budget.
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    // Rough heuristic: 1 token ≈ 0.75 words for running text
    // Add extra tokens for punctuation and special characters
    let word_count = text.split_whitespace().count();
    let punct_count = text.chars().filter(|c| c.is_ascii_punctuation()).count();

    (punct_count as f64).mul_add(0.1, word_count as f64 / 0.75) as usize
}
