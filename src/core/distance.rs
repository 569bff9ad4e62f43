/// Levenshtein distance between two strings, counted in chars
///
/// Insertion, deletion and substitution each cost 1. Only one DP row is kept,
/// over the shorter input, so memory is O(min(len(a), len(b))).
///
/// # Example
/// `edit_distance("kitten", "sitting") == 3`
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    edit_distance_chars(&a, &b)
}

pub fn edit_distance_chars(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let cost = if lc == sc { 0 } else { 1 };

            row[j + 1] = (above + 1) // deletion
                .min(row[j] + 1) // insertion
                .min(diagonal + cost); // substitution

            diagonal = above;
        }
    }

    row[short.len()]
}

/// Edit distance expressed as a similarity percentage (0-100)
///
/// `(1 - distance / max_len) * 100`, rounded to two decimals.
/// Two empty strings are identical.
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }

    let distance = edit_distance(a, b) as f64;
    let similarity = (1.0 - distance / max_len as f64) * 100.0;

    (similarity * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_examples() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("docker", "docker"), 0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "sql"), 3);
        assert_eq!(edit_distance("rust", ""), 4);
    }

    #[test]
    fn test_is_symmetric() {
        assert_eq!(edit_distance("kubernetes", "kubernets"), 1);
        assert_eq!(edit_distance("kubernets", "kubernetes"), 1);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(edit_distance("café", "cafe"), 1);
    }

    #[test]
    fn test_similarity_percent() {
        assert_eq!(similarity_percent("", ""), 100.0);
        assert_eq!(similarity_percent("python", "python"), 100.0);
        assert_eq!(similarity_percent("kitten", "sitting"), 57.14);
        assert_eq!(similarity_percent("abc", "xyz"), 0.0);
    }
}
