// Word counting and duration estimation for pasted scripts.

/// Narration pace used to turn a word count into minutes of footage.
pub const WORDS_PER_MINUTE: usize = 150;

/// Counts maximal whitespace-delimited non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated narration length in minutes, rounded up.
/// An empty script estimates to zero minutes.
pub fn estimated_minutes(text: &str) -> u32 {
    word_count(text).div_ceil(WORDS_PER_MINUTE) as u32
}
