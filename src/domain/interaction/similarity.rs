//! In-process concept identification.
//!
//! Compares a student's answer with the expected concept using a normalized
//! Levenshtein ratio over accent- and case-folded text. No network call.

use serde_json::Value;

use super::results::ConceptIdentificationResult;

/// Similarity at or above which an answer counts as correct.
pub const CORRECT_THRESHOLD: f64 = 0.8;

/// Similarity at or above which a wrong answer is called close.
const CLOSE_THRESHOLD: f64 = 0.5;

const EXPECTED_KEYS: &[&str] = &["concept", "expected"];
const ANSWER_KEYS: &[&str] = &["reponse", "answer"];

/// Evaluates a concept identification locally.
///
/// `expected` is the reference concept. Without one the answer cannot be
/// judged and the result is incorrect with zero similarity.
pub fn identify_concept(expected: Option<&str>, answer: &str) -> ConceptIdentificationResult {
    let Some(expected) = expected.filter(|e| !e.trim().is_empty()) else {
        return ConceptIdentificationResult {
            is_correct: false,
            similarity: 0.0,
            feedback: "No reference concept was provided, so the answer could not be checked."
                .to_string(),
        };
    };

    let similarity = round_to(similarity(expected, answer), 2);
    let is_correct = similarity >= CORRECT_THRESHOLD;
    let feedback = if answer.trim().is_empty() {
        "No answer was given.".to_string()
    } else if is_correct {
        format!("Correct! The concept is \"{}\".", expected.trim())
    } else if similarity >= CLOSE_THRESHOLD {
        format!("Close, but not quite. The expected concept was \"{}\".", expected.trim())
    } else {
        format!("Incorrect. The expected concept was \"{}\".", expected.trim())
    };

    ConceptIdentificationResult {
        is_correct,
        similarity,
        feedback,
    }
}

/// Reads the reference and answer from structured content and evaluates them.
pub fn identify_from_value(content: &Value) -> ConceptIdentificationResult {
    let read = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| content.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
    };
    let expected = read(EXPECTED_KEYS);
    let answer = read(ANSWER_KEYS).unwrap_or_default();
    identify_concept(expected.as_deref(), &answer)
}

/// Normalized similarity in [0, 1]; 1.0 means equal after folding.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = fold(a);
    let b = fold(b);
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

/// Lowercases, strips common Latin diacritics and collapses whitespace.
fn fold(text: &str) -> Vec<char> {
    let mut folded = Vec::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !folded.is_empty() {
            folded.push(' ');
        }
        for c in word.chars().flat_map(char::to_lowercase) {
            match c {
                'æ' => folded.extend(['a', 'e']),
                'œ' => folded.extend(['o', 'e']),
                'ß' => folded.extend(['s', 's']),
                _ => folded.push(strip_accent(c)),
            }
        }
    }
    folded
}

fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
