use regex::Regex;

/// Check whether a cast text is a mint command addressed to the bot.
/// The grammar is a leading mention of the bot followed by the word "mint",
/// case-insensitive, with anything after it ignored.
pub fn is_mint_command(text: &str, bot_handle: &str) -> bool {
    let pattern = format!(r"(?i)^\s*@{}\s+mint\b", regex::escape(bot_handle));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}
