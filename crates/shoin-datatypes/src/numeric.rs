//! 数値データ型の互換性規則

use crate::facet::Facet;
use crate::model::DatatypeModel;
use shoin_core::vocabulary::RDFS_LITERAL;

/// One end of a numeric interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

/// Value space of a numeric datatype, as its min/max facets describe it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericInterval {
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    /// `fractionDigits = 0` somewhere on the restriction chain
    pub integral: bool,
}

impl NumericInterval {
    /// Collects the interval of `uri` from its (inherited) facet values
    pub fn of(model: &DatatypeModel, uri: &str) -> Self {
        let value = |facet: Facet| {
            model
                .facet_value(uri, facet)
                .and_then(|v| v.trim().parse::<f64>().ok())
        };

        let min = tighter_min(
            value(Facet::MinInclusive).map(|value| Bound { value, inclusive: true }),
            value(Facet::MinExclusive).map(|value| Bound { value, inclusive: false }),
        );
        let max = tighter_max(
            value(Facet::MaxInclusive).map(|value| Bound { value, inclusive: true }),
            value(Facet::MaxExclusive).map(|value| Bound { value, inclusive: false }),
        );
        let integral = model
            .facet_value(uri, Facet::FractionDigits)
            .map(|v| v.trim() == "0")
            .unwrap_or(false);

        Self { min, max, integral }
    }

    pub fn contains(&self, value: f64) -> bool {
        if self.integral && value.fract() != 0.0 {
            return false;
        }
        let above_min = match self.min {
            Some(Bound { value: min, inclusive: true }) => value >= min,
            Some(Bound { value: min, inclusive: false }) => value > min,
            None => true,
        };
        let below_max = match self.max {
            Some(Bound { value: max, inclusive: true }) => value <= max,
            Some(Bound { value: max, inclusive: false }) => value < max,
            None => true,
        };
        above_min && below_max
    }

    /// True if some value lies in both intervals
    pub fn intersects(&self, other: &NumericInterval) -> bool {
        let low = tighter_min(self.min, other.min);
        let high = tighter_max(self.max, other.max);
        match (low, high) {
            (Some(low), Some(high)) => {
                if low.value < high.value {
                    // an integral side needs an integer inside the overlap
                    if self.integral || other.integral {
                        let first = if low.inclusive { low.value.ceil() } else { low.value.floor() + 1.0 };
                        return first < high.value || (first == high.value && high.inclusive);
                    }
                    true
                } else {
                    low.value == high.value && low.inclusive && high.inclusive
                }
            }
            _ => true,
        }
    }
}

fn tighter_min(a: Option<Bound>, b: Option<Bound>) -> Option<Bound> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if a.value > b.value || (a.value == b.value && !a.inclusive) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (a, None) => a,
        (None, b) => b,
    }
}

fn tighter_max(a: Option<Bound>, b: Option<Bound>) -> Option<Bound> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if a.value < b.value || (a.value == b.value && !a.inclusive) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (a, None) => a,
        (None, b) => b,
    }
}

/// Compatibility when at least one side is numeric: the universal literal
/// type is compatible with everything, a non-numeric type with no numeric
/// one, and two numeric types iff their value spaces overlap.
pub fn is_compatible(model: &DatatypeModel, a: &str, b: &str) -> bool {
    if a == b || a == RDFS_LITERAL || b == RDFS_LITERAL {
        return true;
    }
    if !(model.numeric(a) && model.numeric(b)) {
        return false;
    }
    NumericInterval::of(model, a).intersects(&NumericInterval::of(model, b))
}

/// Lexical form check against a numeric value space
pub fn is_in_value_space(model: &DatatypeModel, uri: &str, lexical: &str) -> bool {
    match lexical.trim().parse::<f64>() {
        Ok(value) => NumericInterval::of(model, uri).contains(value),
        Err(_) => false,
    }
}
