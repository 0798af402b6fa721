//! Outcome histogram

use std::collections::BTreeMap;
use std::fmt;

/// Counts of classical register outcomes over a batch of shots
///
/// Keys are register strings, bit 0 first. Counts always sum to
/// [`total`](Histogram::total).
///
/// # Example
/// ```
/// use qshot_sim::Histogram;
///
/// let mut hist = Histogram::new();
/// hist.record("00");
/// hist.record("11");
/// hist.record("11");
///
/// assert_eq!(hist.get("11"), 2);
/// assert_eq!(hist.total(), 3);
/// assert_eq!(hist.to_string(), r#"{"00": 1, "11": 2}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram {
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl Histogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a counts map
    pub fn from_counts(counts: BTreeMap<String, usize>) -> Self {
        let total = counts.values().sum();
        Self { counts, total }
    }

    /// Count one occurrence of `outcome`
    pub fn record(&mut self, outcome: &str) {
        self.add(outcome, 1);
    }

    /// Count `count` occurrences of `outcome`
    pub fn add(&mut self, outcome: &str, count: usize) {
        if count == 0 {
            return;
        }
        match self.counts.get_mut(outcome) {
            Some(existing) => *existing += count,
            None => {
                self.counts.insert(outcome.to_string(), count);
            }
        }
        self.total += count;
    }

    /// Fold another histogram into this one
    pub fn merge(&mut self, other: &Histogram) {
        for (outcome, &count) in &other.counts {
            self.add(outcome, count);
        }
    }

    /// Count for `outcome`, zero if never seen
    pub fn get(&self, outcome: &str) -> usize {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct outcomes seen
    pub fn num_outcomes(&self) -> usize {
        self.counts.len()
    }

    /// Whether no shot was recorded
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Relative frequency of `outcome`
    pub fn probability(&self, outcome: &str) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.get(outcome) as f64 / self.total as f64
        }
    }

    /// Most frequent outcome; ties go to the smallest key
    pub fn most_common(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (outcome, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((outcome.as_str(), count)),
            })
    }

    /// Outcomes by descending count, then ascending key
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut sorted: Vec<_> = self
            .counts
            .iter()
            .map(|(outcome, &count)| (outcome.as_str(), count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }

    /// Outcomes in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .map(|(outcome, &count)| (outcome.as_str(), count))
    }

    /// Underlying counts
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// Relative frequencies in key order
    pub fn to_probabilities(&self) -> BTreeMap<String, f64> {
        self.counts
            .iter()
            .map(|(outcome, &count)| (outcome.clone(), count as f64 / self.total as f64))
            .collect()
    }

    /// Frequency with which classical bit `bit` read 1
    pub fn marginal_one(&self, bit: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let ones: usize = self
            .counts
            .iter()
            .filter(|(outcome, _)| outcome.as_bytes().get(bit) == Some(&b'1'))
            .map(|(_, &count)| count)
            .sum();
        ones as f64 / self.total as f64
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (outcome, count)) in self.counts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{}\": {}", outcome, count)?;
        }
        f.write_str("}")
    }
}

impl<'a> IntoIterator for &'a Histogram {
    type Item = (&'a String, &'a usize);
    type IntoIter = std::collections::btree_map::Iter<'a, String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
