use std::collections::HashSet;

use itertools::Itertools;

/// The SIC codes the scanner targets, in configured order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassificationCodeSet {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl ClassificationCodeSet {
    /// Trims each code and drops blanks and repeats, keeping first-seen order.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ordered: Vec<String> = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .unique()
            .collect();
        let lookup = ordered.iter().cloned().collect();

        ClassificationCodeSet { ordered, lookup }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lookup.contains(code.trim())
    }

    pub fn codes(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ClassificationCodeSet;

    #[test]
    fn keeps_first_seen_order_without_repeats() {
        let codes = ClassificationCodeSet::new(["56302", "56101", " 56302", "", "93290"]);

        assert_eq!(codes.codes(), ["56302", "56101", "93290"]);
        assert_eq!(codes.len(), 3);
    }

    #[test]
    fn membership_ignores_surrounding_whitespace() {
        let codes = ClassificationCodeSet::new(["88910"]);

        assert!(codes.contains("88910"));
        assert!(codes.contains(" 88910 "));
        assert!(!codes.contains("88911"));
    }
}
