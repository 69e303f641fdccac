//! Quiz input validation and categorical encoding.
//!
//! The 19 answer fields arrive as `question1`..`question19`. All but
//! `question7` and `question8` are integers; those two are strings encoded
//! through fixed vocabularies that must match the vocabularies the model was
//! trained with. The field order of the encoded vector is an external
//! contract with the trained artifact and must never be reordered.

use serde_json::Value;

use crate::errors::AppError;

/// Number of answer fields in a quiz submission.
pub const NUM_QUESTIONS: usize = 19;

/// Zero-based positions of the two categorical fields (question7, question8).
const CATEGORICAL_POSITIONS: [usize; 2] = [6, 7];

/// Vocabulary for question7 (preferred programming area).
/// Codes are fixed by the training run; do not renumber.
pub const QUESTION7_ENCODING: &[(&str, i64)] = &[
    ("R Programming", 0),
    ("Information Security", 1),
    ("Shell Programming", 2),
    ("Machine Learning", 3),
    ("Full Stack", 4),
    ("Hadoop", 5),
    ("Python", 6),
    ("Distro Making", 7),
    ("App Development", 8),
];

/// Vocabulary for question8 (preferred specialization).
pub const QUESTION8_ENCODING: &[(&str, i64)] = &[
    ("Database Security", 0),
    ("System Designing", 1),
    ("Web Technologies", 2),
    ("Machine Learning", 3),
    ("Hacking", 4),
    ("Testing", 5),
    ("Data Science", 6),
    ("Game Development", 7),
    ("Cloud Computing", 8),
];

fn encode_category(
    table: &[(&str, i64)],
    field: &'static str,
    value: &str,
) -> Result<i64, AppError> {
    table
        .iter()
        .find(|(label, _)| *label == value)
        .map(|(_, code)| *code)
        .ok_or_else(|| AppError::UnknownCategory {
            field,
            value: value.to_string(),
        })
}

/// A validated quiz submission: 17 numeric answers plus the two raw
/// categorical answers, still in submission order.
#[derive(Debug, Clone)]
pub struct QuizSubmission {
    numeric: [i64; NUM_QUESTIONS - 2],
    question7: String,
    question8: String,
}

impl QuizSubmission {
    /// Validates presence and type of all 19 fields against the declared
    /// schema. Manual validation over raw JSON keeps malformed bodies on the
    /// 400 path with a field-level message instead of the extractor's
    /// generic rejection.
    pub fn from_value(body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::Validation("request body must be a JSON object".into()))?;

        let mut numeric = [0_i64; NUM_QUESTIONS - 2];
        let mut question7 = String::new();
        let mut question8 = String::new();
        let mut numeric_idx = 0;

        for pos in 0..NUM_QUESTIONS {
            let name = format!("question{}", pos + 1);
            let value = obj
                .get(&name)
                .ok_or_else(|| AppError::Validation(format!("{name} is missing")))?;

            if CATEGORICAL_POSITIONS.contains(&pos) {
                let s = value
                    .as_str()
                    .ok_or_else(|| AppError::Validation(format!("{name} must be a string")))?;
                if pos == CATEGORICAL_POSITIONS[0] {
                    question7 = s.to_string();
                } else {
                    question8 = s.to_string();
                }
            } else {
                numeric[numeric_idx] = value
                    .as_i64()
                    .ok_or_else(|| AppError::Validation(format!("{name} must be an integer")))?;
                numeric_idx += 1;
            }
        }

        Ok(QuizSubmission {
            numeric,
            question7,
            question8,
        })
    }

    /// Encodes the submission into the 19-length feature vector in fixed
    /// field order. An unrecognized categorical value is a hard error; there
    /// is no default code.
    pub fn encode(&self) -> Result<Vec<f64>, AppError> {
        let q7 = encode_category(QUESTION7_ENCODING, "question7", &self.question7)?;
        let q8 = encode_category(QUESTION8_ENCODING, "question8", &self.question8)?;

        let mut features = Vec::with_capacity(NUM_QUESTIONS);
        features.extend(self.numeric[..6].iter().map(|&v| v as f64));
        features.push(q7 as f64);
        features.push(q8 as f64);
        features.extend(self.numeric[6..].iter().map(|&v| v as f64));

        debug_assert_eq!(features.len(), NUM_QUESTIONS);
        Ok(features)
    }
}
