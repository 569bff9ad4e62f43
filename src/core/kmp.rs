use crate::core::error::MatcherError;

/// Knuth-Morris-Pratt matcher over bytes.
///
/// The failure table is built once per pattern in O(m); each scan is O(n).
/// Inputs are expected to be normalized already, so comparison is bytewise.
#[derive(Debug, Clone)]
pub struct KmpMatcher {
    pattern: Vec<u8>,
    failure: Vec<usize>,
}

impl KmpMatcher {
    pub fn new(pattern: &str) -> Result<Self, MatcherError> {
        if pattern.is_empty() {
            return Err(MatcherError::EmptyPattern);
        }

        let pattern = pattern.as_bytes().to_vec();
        let failure = failure_function(&pattern);

        Ok(Self { pattern, failure })
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Earliest start index of the pattern in `text`
    pub fn find_first(&self, text: &str) -> Option<usize> {
        self.scan(text.as_bytes(), true).into_iter().next()
    }

    /// Start index of every occurrence, overlapping ones included
    pub fn find_all(&self, text: &str) -> Vec<usize> {
        self.scan(text.as_bytes(), false)
    }

    fn scan(&self, text: &[u8], first_only: bool) -> Vec<usize> {
        let m = self.pattern.len();
        let mut found = Vec::new();

        if m > text.len() {
            return found;
        }

        let mut matched = 0;
        for (i, &byte) in text.iter().enumerate() {
            while matched > 0 && byte != self.pattern[matched] {
                matched = self.failure[matched - 1];
            }
            if byte == self.pattern[matched] {
                matched += 1;
            }
            if matched == m {
                found.push(i + 1 - m);
                if first_only {
                    break;
                }
                matched = self.failure[m - 1];
            }
        }

        found
    }
}

/// Prefix function: `failure[i]` is the length of the longest proper prefix of
/// `pattern[..=i]` that is also its suffix.
pub fn failure_function(pattern: &[u8]) -> Vec<usize> {
    let mut failure = vec![0; pattern.len()];
    let mut len = 0;

    for i in 1..pattern.len() {
        while len > 0 && pattern[i] != pattern[len] {
            len = failure[len - 1];
        }
        if pattern[i] == pattern[len] {
            len += 1;
        }
        failure[i] = len;
    }

    failure
}

/// One-shot search for the first occurrence
pub fn kmp_find(text: &str, pattern: &str) -> Result<Option<usize>, MatcherError> {
    Ok(KmpMatcher::new(pattern)?.find_first(text))
}

/// Whole-phrase search over normalized text.
///
/// Matches only at token boundaries, so "java" does not hit "javascript".
/// Returns the byte offset of the phrase inside `joined`.
pub fn find_phrase(joined: &str, phrase: &str) -> Result<Option<usize>, MatcherError> {
    if phrase.is_empty() {
        return Err(MatcherError::EmptyPattern);
    }

    let matcher = KmpMatcher::new(&format!(" {} ", phrase))?;
    let haystack = format!(" {} ", joined);

    // The padded hit starts at the leading space, which sits one byte before
    // the phrase in the padded text, i.e. exactly at its offset in `joined`.
    Ok(matcher.find_first(&haystack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_function() {
        assert_eq!(failure_function(b"aba"), vec![0, 0, 1]);
        assert_eq!(failure_function(b"aabaaab"), vec![0, 1, 0, 1, 2, 2, 3]);
        assert_eq!(failure_function(b"abcd"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_find_all_overlapping() {
        let matcher = KmpMatcher::new("aba").unwrap();
        assert_eq!(matcher.find_all("ababcababa"), vec![0, 5, 7]);
    }

    #[test]
    fn test_find_first_is_earliest() {
        let matcher = KmpMatcher::new("sql").unwrap();
        assert_eq!(matcher.find_first("mysql and sql"), Some(2));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert_eq!(KmpMatcher::new("").unwrap_err(), MatcherError::EmptyPattern);
        assert_eq!(kmp_find("text", ""), Err(MatcherError::EmptyPattern));
    }

    #[test]
    fn test_pattern_longer_than_text() {
        let matcher = KmpMatcher::new("kubernetes").unwrap();
        assert_eq!(matcher.find_first("k8s"), None);
        assert!(matcher.find_all("").is_empty());
    }

    #[test]
    fn test_find_phrase_respects_token_boundaries() {
        let text = "javascript developer with machine learning";
        assert_eq!(find_phrase(text, "java").unwrap(), None);
        assert_eq!(find_phrase(text, "javascript").unwrap(), Some(0));
        assert_eq!(find_phrase(text, "machine learning").unwrap(), Some(26));
        assert_eq!(&text[26..42], "machine learning");
    }

    #[test]
    fn test_find_phrase_at_end_of_text() {
        assert_eq!(find_phrase("postgre sql", "sql").unwrap(), Some(8));
    }
}
