//! Weighted option selection.
//!
//! An [`OptionSet`] is built once from (label, weight) input, then one label
//! is drawn from it with probability proportional to its weight. Each option
//! carries the running total of weights up to and including itself; the draw
//! scales a uniform value by the grand total and returns the first option
//! whose running total lies strictly above it.

mod error;
mod random;

pub use error::{SelectionError, SelectionResult};
pub use random::{RandomSource, RngSource, ScriptedSource};

use tracing::debug;

/// One candidate outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedOption {
    label: String,
    weight: f64,
    cumulative_weight: f64,
}

impl WeightedOption {
    /// The option's label, exactly as given.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The option's own weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Sum of the weights of this option and every option before it.
    #[must_use]
    pub const fn cumulative_weight(&self) -> f64 {
        self.cumulative_weight
    }
}

/// A non-empty, ordered, immutable sequence of weighted options.
///
/// Cumulative weights never decrease, and the last one equals the sum of
/// all weights.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    options: Vec<WeightedOption>,
}

impl OptionSet {
    /// Builds a set from (label, weight text) pairs, e.g. file records.
    ///
    /// # Errors
    ///
    /// Fails on an empty label, a weight that is not a number or is
    /// negative/non-finite, a total that overflows, a positive weight too
    /// small to raise the total, or when there are no pairs at all.
    pub fn from_pairs<I, L, W>(pairs: I) -> SelectionResult<Self>
    where
        I: IntoIterator<Item = (L, W)>,
        L: Into<String>,
        W: AsRef<str>,
    {
        let mut builder = Builder::default();
        for (index, (label, raw)) in pairs.into_iter().enumerate() {
            let weight = parse_weight(index, raw.as_ref())?;
            builder.push(index, label.into(), weight)?;
        }
        builder.finish()
    }

    /// Builds a set from a label list and an optional weight list.
    ///
    /// With no weights every option weighs 1, so the first option owns
    /// `[0, 1)` of the draw range like every other one.
    ///
    /// # Errors
    ///
    /// Fails when weights are given but their count differs from the label
    /// count, on any invalid weight or label, or when there are no labels.
    pub fn from_labels<L, W>(labels: &[L], weights: &[W]) -> SelectionResult<Self>
    where
        L: AsRef<str>,
        W: AsRef<str>,
    {
        if weights.is_empty() {
            let mut builder = Builder::default();
            for (index, label) in labels.iter().enumerate() {
                builder.push(index, label.as_ref().to_string(), 1.0)?;
            }
            return builder.finish();
        }

        if labels.len() != weights.len() {
            return Err(SelectionError::MismatchedLength {
                labels: labels.len(),
                weights: weights.len(),
            });
        }
        Self::from_pairs(
            labels
                .iter()
                .map(AsRef::<str>::as_ref)
                .zip(weights.iter().map(AsRef::<str>::as_ref)),
        )
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// True only for a set with no options, which construction rules out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Iterates over the options in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, WeightedOption> {
        self.options.iter()
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.options
            .last()
            .map_or(0.0, WeightedOption::cumulative_weight)
    }

    /// Draws one label, consuming one value from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoSelectableOption`] when every weight is
    /// zero.
    pub fn draw<R>(&self, source: &mut R) -> SelectionResult<&str>
    where
        R: RandomSource + ?Sized,
    {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(SelectionError::NoSelectableOption);
        }

        let x = total * source.next_unit().clamp(0.0, 1.0);
        let chosen = self
            .options
            .iter()
            .find(|option| option.cumulative_weight > x)
            // Rounding can leave x at the total; the last weighted option owns that edge.
            .or_else(|| self.options.iter().rev().find(|option| option.weight > 0.0))
            .ok_or(SelectionError::NoSelectableOption)?;

        debug!(x, total, label = %chosen.label, "option drawn");
        Ok(&chosen.label)
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a WeightedOption;
    type IntoIter = std::slice::Iter<'a, WeightedOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Default)]
struct Builder {
    options: Vec<WeightedOption>,
    running: f64,
}

impl Builder {
    fn push(&mut self, index: usize, label: String, weight: f64) -> SelectionResult<()> {
        if label.is_empty() {
            return Err(SelectionError::EmptyLabel { index });
        }
        let running = self.running + weight;
        if !running.is_finite() {
            return Err(SelectionError::TotalOverflow { index });
        }
        // A positive weight must own a non-empty slice of the draw range.
        if weight > 0.0 && running <= self.running {
            return Err(SelectionError::NegligibleWeight { index });
        }
        self.running = running;
        self.options.push(WeightedOption {
            label,
            weight,
            cumulative_weight: self.running,
        });
        Ok(())
    }

    fn finish(self) -> SelectionResult<OptionSet> {
        if self.options.is_empty() {
            return Err(SelectionError::EmptyInput);
        }
        debug!(
            options = self.options.len(),
            total = self.running,
            "option set built"
        );
        Ok(OptionSet {
            options: self.options,
        })
    }
}

fn parse_weight(index: usize, raw: &str) -> SelectionResult<f64> {
    let weight: f64 = raw.trim().parse().map_err(|_| SelectionError::Parse {
        index,
        raw: raw.to_string(),
    })?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(SelectionError::InvalidWeight {
            index,
            raw: raw.to_string(),
        });
    }
    Ok(weight)
}
