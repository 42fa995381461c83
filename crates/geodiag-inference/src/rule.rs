//! Rule ladders
//!
//! An ordered list of `(predicate, outcome, confidence, tag)` rules; the
//! first rule whose predicate holds decides the result.

use geodiag_core::InferenceResult;

/// A single ladder rung
#[derive(Clone)]
pub struct Rule<I, T> {
    /// Method tag reported when this rule fires
    pub tag: &'static str,
    pub confidence: f64,
    /// `None` makes the rule an explicit "undetermined" outcome
    pub outcome: Option<T>,
    pub predicate: fn(&I) -> bool,
    /// Human-readable rationale for the outcome
    pub explain: fn(&I) -> String,
}

impl<I, T> Rule<I, T> {
    pub fn new(tag: &'static str, confidence: f64, outcome: Option<T>, predicate: fn(&I) -> bool) -> Self {
        Self {
            tag,
            confidence,
            outcome,
            predicate,
            explain: |_| String::new(),
        }
    }

    pub fn with_explain(mut self, explain: fn(&I) -> String) -> Self {
        self.explain = explain;
        self
    }

    pub fn matches(&self, input: &I) -> bool {
        (self.predicate)(input)
    }
}

#[derive(Clone)]
pub struct RuleLadder<I, T> {
    rules: Vec<Rule<I, T>>,
    fallback: Rule<I, T>,
}

impl<I, T: Clone> RuleLadder<I, T> {
    /// `fallback` fires when no rule matches; its predicate is ignored.
    pub fn new(fallback: Rule<I, T>) -> Self {
        Self { rules: Vec::new(), fallback }
    }

    pub fn with_rule(mut self, rule: Rule<I, T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule<I, T>] {
        &self.rules
    }

    pub fn evaluate(&self, input: &I) -> InferenceResult<T> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.matches(input))
            .unwrap_or(&self.fallback);

        let rationale = (rule.explain)(input);
        match &rule.outcome {
            Some(value) => InferenceResult::determined(value.clone(), rule.confidence, rule.tag, rationale),
            None => InferenceResult::undetermined(rule.confidence, rule.tag, rationale),
        }
    }
}

/// Threshold table: the first band whose bound exceeds (or is exceeded by)
/// the measured value gives `(outcome, confidence)`.
#[derive(Debug, Clone, Copy)]
pub struct Band<T: Copy> {
    pub bound: f64,
    pub outcome: T,
    pub confidence: f64,
}

pub const fn band<T: Copy>(bound: f64, outcome: T, confidence: f64) -> Band<T> {
    Band { bound, outcome, confidence }
}

/// First band with `value < bound`, else the last band.
pub fn classify_below<T: Copy>(value: f64, bands: &[Band<T>]) -> Option<(T, f64)> {
    bands
        .iter()
        .find(|b| value < b.bound)
        .or_else(|| bands.last())
        .map(|b| (b.outcome, b.confidence))
}

/// First band with `value > bound`, else the last band.
pub fn classify_above<T: Copy>(value: f64, bands: &[Band<T>]) -> Option<(T, f64)> {
    bands
        .iter()
        .find(|b| value > b.bound)
        .or_else(|| bands.last())
        .map(|b| (b.outcome, b.confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> RuleLadder<i32, &'static str> {
        RuleLadder::new(Rule::new("fallback", 0.1, None, |_| true))
            .with_rule(Rule::new("negative", 0.9, Some("neg"), |v| *v < 0))
            .with_rule(Rule::new("small", 0.7, Some("small"), |v| *v < 10).with_explain(|v| format!("{} < 10", v)))
    }

    #[test]
    fn test_first_match_wins() {
        let r = ladder().evaluate(&-5);
        assert_eq!(r.value, Some("neg"));
        assert_eq!(r.method, "negative");

        let r = ladder().evaluate(&3);
        assert_eq!(r.value, Some("small"));
        assert_eq!(r.rationale, "3 < 10");
    }

    #[test]
    fn test_fallback_is_undetermined() {
        let r = ladder().evaluate(&50);
        assert!(r.value.is_none());
        assert_eq!(r.confidence, 0.1);
        assert_eq!(r.method, "fallback");
    }

    #[test]
    fn test_bands() {
        let bands = [band(0.5, 500u32, 0.8), band(2.0, 2000, 0.7), band(f64::INFINITY, 100000, 0.4)];
        assert_eq!(classify_below(0.1, &bands), Some((500, 0.8)));
        assert_eq!(classify_below(1.0, &bands), Some((2000, 0.7)));
        assert_eq!(classify_below(99.0, &bands), Some((100000, 0.4)));

        let above = [band(10.0, 500u32, 0.7), band(1.0, 2000, 0.6), band(f64::NEG_INFINITY, 50000, 0.4)];
        assert_eq!(classify_above(11.0, &above), Some((500, 0.7)));
        assert_eq!(classify_above(0.0, &above), Some((50000, 0.4)));
    }
}
