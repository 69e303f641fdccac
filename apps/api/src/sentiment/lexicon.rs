//! Lexicon-based sentiment scorer, the default `SentimentModel` backend.
//!
//! Counts polarity-bearing words against two fixed word lists, with a
//! simple negation flip for the word immediately following "not"/"no"/
//! "never". Deterministic and dependency-free.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::sentiment::{Sentiment, SentimentModel};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "love", "loved", "like", "liked",
    "helpful", "happy", "wonderful", "fantastic", "best", "enjoy", "enjoyed", "perfect",
    "nice", "useful", "recommend", "satisfied", "impressive", "clear", "easy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "hate", "hated", "dislike", "disliked", "worst",
    "poor", "useless", "confusing", "frustrating", "sad", "angry", "disappointed",
    "disappointing", "broken", "slow", "difficult", "unhappy", "annoying", "wrong",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "don't", "doesn't", "didn't", "isn't"];

pub struct LexiconSentiment;

impl LexiconSentiment {
    fn score(text: &str) -> i32 {
        let mut score = 0;
        let mut negated = false;

        for raw in text.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }

            if NEGATIONS.contains(&word.as_str()) {
                negated = true;
                continue;
            }

            let polarity = if POSITIVE_WORDS.contains(&word.as_str()) {
                1
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                -1
            } else {
                0
            };

            score += if negated { -polarity } else { polarity };
            negated = false;
        }

        score
    }
}

#[async_trait]
impl SentimentModel for LexiconSentiment {
    async fn classify(&self, text: &str) -> Result<Sentiment, AppError> {
        let score = Self::score(text);
        Ok(match score.cmp(&0) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        })
    }
}
