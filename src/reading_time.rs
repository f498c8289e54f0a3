// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Read/listen time estimates derived from summary word counts.

use crate::models::KeyPointGroup;

/// Silent reading speed.
pub const READ_WORDS_PER_MINUTE: usize = 200;
/// Speaking speed, also used by the speech progress estimator.
pub const LISTEN_WORDS_PER_MINUTE: usize = 150;

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in the intro, every group title and every item.
pub fn content_word_count(intro: &str, groups: &[KeyPointGroup]) -> usize {
    groups.iter().fold(word_count(intro), |total, group| {
        total
            + word_count(&group.title)
            + group.items.iter().map(|item| word_count(item)).sum::<usize>()
    })
}

/// Whole minutes at `words_per_minute`, never less than one.
fn minutes_at(words: usize, words_per_minute: usize) -> u32 {
    words.div_ceil(words_per_minute).max(1) as u32
}

/// Estimated minutes to read the content.
pub fn read_time_minutes(intro: &str, groups: &[KeyPointGroup]) -> u32 {
    minutes_at(content_word_count(intro, groups), READ_WORDS_PER_MINUTE)
}

/// Estimated minutes to listen to the content.
pub fn listen_time_minutes(intro: &str, groups: &[KeyPointGroup]) -> u32 {
    minutes_at(content_word_count(intro, groups), LISTEN_WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(title: &str, items: &[&str]) -> KeyPointGroup {
        KeyPointGroup {
            title: title.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_eight_word_example() {
        let groups = vec![group("d e", &["f", "g h"])];
        assert_eq!(content_word_count("a b c", &groups), 8);
        assert_eq!(read_time_minutes("a b c", &groups), 1);
        assert_eq!(listen_time_minutes("a b c", &groups), 1);
    }

    #[test]
    fn test_empty_content_is_one_minute() {
        assert_eq!(read_time_minutes("", &[]), 1);
        assert_eq!(listen_time_minutes("   ", &[]), 1);
    }

    #[test]
    fn test_rounds_up_at_boundaries() {
        let intro_200 = vec!["w"; 200].join(" ");
        let intro_201 = vec!["w"; 201].join(" ");
        assert_eq!(read_time_minutes(&intro_200, &[]), 1);
        assert_eq!(read_time_minutes(&intro_201, &[]), 2);
        assert_eq!(listen_time_minutes(&intro_200, &[]), 2);
        assert_eq!(listen_time_minutes(&vec!["w"; 450].join(" "), &[]), 3);
    }

    #[test]
    fn test_counts_hindi_words() {
        assert_eq!(word_count("इस वीडियो में  महत्वपूर्ण\nजानकारी"), 5);
    }
}
