//! Outcome aggregation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::verdict::{UnanswerableVerdict, Verdict};

/// Per-item outcome: was the answer correct, and did the model abstain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub correct: bool,
    pub abstain: bool,
}

impl Outcome {
    pub fn new(correct: bool, abstain: bool) -> Self {
        Self { correct, abstain }
    }

    /// Neither correct nor an abstention
    pub fn is_hallucination(&self) -> bool {
        !self.correct && !self.abstain
    }
}

impl From<(bool, bool)> for Outcome {
    fn from((correct, abstain): (bool, bool)) -> Self {
        Self { correct, abstain }
    }
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Correct => Outcome::new(true, false),
            Verdict::Abstain => Outcome::new(false, true),
            Verdict::Hallucination => Outcome::new(false, false),
        }
    }
}

impl From<UnanswerableVerdict> for Outcome {
    fn from(verdict: UnanswerableVerdict) -> Self {
        match verdict {
            UnanswerableVerdict::Abstain => Outcome::new(false, true),
            UnanswerableVerdict::Hallucination => Outcome::new(false, false),
        }
    }
}

/// Aggregate rates over a batch of outcomes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub n: usize,
    pub correct: usize,
    pub abstained: usize,
    pub hallucinated: usize,
    pub accuracy: f64,
    pub abstain_rate: f64,
    /// Incorrect and not an abstention
    pub hallucination_rate: f64,
    pub incorrect_rate: f64,
}

/// Fold outcomes into a [`Summary`]. An empty batch yields all-zero rates.
pub fn summarize<I, O>(outcomes: I) -> Summary
where
    I: IntoIterator<Item = O>,
    O: Into<Outcome>,
{
    let (mut n, mut correct, mut abstained, mut hallucinated) = (0usize, 0usize, 0usize, 0usize);

    for outcome in outcomes {
        let o: Outcome = outcome.into();
        n += 1;
        if o.correct {
            correct += 1;
        }
        if o.abstain {
            abstained += 1;
        }
        if o.is_hallucination() {
            hallucinated += 1;
        }
    }

    if n == 0 {
        return Summary::default();
    }

    let total = n as f64;
    Summary {
        n,
        correct,
        abstained,
        hallucinated,
        accuracy: correct as f64 / total,
        abstain_rate: abstained as f64 / total,
        hallucination_rate: hallucinated as f64 / total,
        incorrect_rate: (n - correct) as f64 / total,
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total:         {}", self.n)?;
        writeln!(f, "Correct:       {:6.1}% ({}/{})", self.accuracy * 100.0, self.correct, self.n)?;
        writeln!(f, "Hallucination: {:6.1}% ({}/{})", self.hallucination_rate * 100.0, self.hallucinated, self.n)?;
        write!(f, "Abstain:       {:6.1}% ({}/{})", self.abstain_rate * 100.0, self.abstained, self.n)
    }
}
