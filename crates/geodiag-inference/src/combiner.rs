//! Combines independent `(value, confidence, rationale)` estimates.
use geodiag_core::InferenceResult;

/// One sub-estimator's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate<T> {
    pub value: T,
    pub confidence: f64,
    pub method: String,
    pub rationale: String,
}

impl<T> Estimate<T> {
    pub fn new(value: T, confidence: f64, method: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self { value, confidence, method: method.into(), rationale: rationale.into() }
    }
}

/// Groups estimates by value and keeps the group with the highest average
/// confidence. Ties go to the group that appeared first.
///
/// `None` when there is nothing to combine.
pub fn combine<T: PartialEq + Clone>(estimates: &[Estimate<T>]) -> Option<InferenceResult<T>> {
    let mut groups: Vec<(&T, Vec<&Estimate<T>>)> = Vec::new();
    for est in estimates {
        match groups.iter_mut().find(|(v, _)| *v == &est.value) {
            Some((_, members)) => members.push(est),
            None => groups.push((&est.value, vec![est])),
        }
    }

    let mut best: Option<(&T, &Vec<&Estimate<T>>, f64)> = None;
    for (value, members) in &groups {
        let avg = members.iter().map(|e| e.confidence).sum::<f64>() / members.len() as f64;
        if best.map(|(_, _, b)| avg > b).unwrap_or(true) {
            best = Some((*value, members, avg));
        }
    }

    best.map(|(value, members, avg)| {
        let mut methods: Vec<&str> = Vec::new();
        for m in members.iter().map(|e| e.method.as_str()) {
            if !methods.contains(&m) {
                methods.push(m);
            }
        }
        let rationale = members
            .iter()
            .map(|e| e.rationale.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        InferenceResult::determined(value.clone(), avg, methods.join("+"), rationale)
    })
}
