//! Damerau-Levenshtein edit distance and the length-based tolerance policy.
//!
//! Distances are computed over Unicode scalar values, so a typed word and a
//! dictionary candidate compare the same way regardless of byte length.

/// Compute the Damerau-Levenshtein distance between two strings.
///
/// Insertions, deletions, and substitutions cost 1 each; an adjacent
/// transposition also costs 1. `distance("teh", "the") == 1`.
pub fn distance(a: &str, b: &str) -> usize {
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    let len1 = s1.len();
    let len2 = s2.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut dp = vec![vec![0usize; len2 + 1]; len1 + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        dp[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = usize::from(s1[i - 1] != s2[j - 1]);
            let mut d = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
            // Adjacent transposition (Damerau extension)
            if i > 1 && j > 1 && s1[i - 1] == s2[j - 2] && s1[i - 2] == s2[j - 1] {
                d = d.min(dp[i - 2][j - 2] + cost);
            }
            dp[i][j] = d;
        }
    }

    dp[len1][len2]
}

/// Normalized similarity in `[0.0, 1.0]`; 1.0 means identical.
/// Two empty strings are identical by definition.
pub fn similarity(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - distance(a, b) as f32 / max_len as f32
}

/// Maximum edit distance tolerated when correcting a word of `word_len`
/// characters. Short words get zero tolerance: a one-edit neighbor of a
/// three-letter word is almost never what the user meant.
pub fn max_allowed_distance(word_len: usize) -> usize {
    match word_len {
        0..=3 => 0,
        4..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}
