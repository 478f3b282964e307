// Prompt templates for group naming.
//
// The model is asked for a bare comma-separated list so the reply can be
// split without any structured parsing.

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt for all naming calls.
pub fn system_prompt() -> String {
    "You are a creative assistant for an HR team running team-building events.\n\
     You invent short, upbeat, workplace-appropriate team names.\n\
     Reply with the names only, separated by commas. No numbering, no quotes, \
     no explanation."
        .to_string()
}

// ---------------------------------------------------------------------------
// User prompt
// ---------------------------------------------------------------------------

/// Build the user message asking for `count` names on `theme`.
pub fn build_naming_prompt(count: usize, theme: &str) -> String {
    let theme = theme.trim();
    let theme = if theme.is_empty() { "General" } else { theme };
    format!(
        "Generate {count} creative and catchy team names for an HR team-building event. \
         Theme: {theme}. Return ONLY the names separated by commas."
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Split a comma-separated reply into at most `count` names.
///
/// Tokens are trimmed and blank tokens dropped. Newlines count as
/// whitespace inside a token, so a reply wrapped across lines still parses.
pub fn parse_candidate_names(reply: &str, count: usize) -> Vec<String> {
    reply
        .split(',')
        .map(|token| token.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|token| !token.is_empty())
        .take(count)
        .collect()
}
