//! Reading-time estimate

/// Words per minute assumed by [`reading_time`]
pub const WORDS_PER_MINUTE: u32 = 200;

/// Minutes needed to read `words` words, rounded up
pub fn reading_time(words: usize) -> u32 {
    reading_time_with(words, WORDS_PER_MINUTE)
}

/// Same as [`reading_time`] with a custom reading speed
pub fn reading_time_with(words: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    words.div_ceil(wpm) as u32
}

/// Count whitespace-separated words in a document body
pub fn count_words(body: &str) -> usize {
    body.split_whitespace().count()
}
