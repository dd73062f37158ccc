//! Restricted numeric domains.
//!
//! Describes possibly infinite sets of numbers, such as the support of a
//! [`Poisson`](crate::distributions::Poisson) distribution, as a well-known
//! base set with an optional set of excluded values. Membership is decided
//! by a predicate, never by enumeration.
//!
//! # Examples
//! ```
//! use u_discrete::domain::{BaseSet, NumberSet};
//!
//! // Reals without the integers.
//! let non_integers = NumberSet::new(BaseSet::Reals).excluding(NumberSet::new(BaseSet::Integers));
//! assert!(non_integers.contains(2f64.sqrt()));
//! assert!(!non_integers.contains(3.0));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::distributions::DistributionError;

/// A well-known set of numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseSet {
    /// `{0, 1, 2, ...}`
    Naturals,
    /// `{0, -1, -2, ...}`
    NegativeNaturals,
    /// `{1, 2, 3, ...}`
    PositiveNaturals,
    /// `{-1, -2, -3, ...}`
    StrictlyNegativeNaturals,
    /// All integers.
    Integers,
    /// All finite reals.
    Reals,
}

impl BaseSet {
    /// Membership test for the base set alone.
    pub fn contains(self, x: f64) -> bool {
        if !x.is_finite() {
            return false;
        }
        if self == BaseSet::Reals {
            return true;
        }
        if x.fract() != 0.0 {
            return false;
        }
        match self {
            BaseSet::Naturals => x >= 0.0,
            BaseSet::NegativeNaturals => x <= 0.0,
            BaseSet::PositiveNaturals => x > 0.0,
            BaseSet::StrictlyNegativeNaturals => x < 0.0,
            BaseSet::Integers | BaseSet::Reals => true,
        }
    }

    /// Canonical long name, accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            BaseSet::Naturals => "naturals",
            BaseSet::NegativeNaturals => "negative naturals",
            BaseSet::PositiveNaturals => "positive naturals",
            BaseSet::StrictlyNegativeNaturals => "strictly negative naturals",
            BaseSet::Integers => "integers",
            BaseSet::Reals => "reals",
        }
    }
}

impl fmt::Display for BaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BaseSet {
    type Err = DistributionError;

    /// Parses a long name (`"naturals"`) or symbol (`"N"`, `"NN"`, `"N+"`,
    /// `"N-"`, `"Z"`, `"R"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naturals" | "N" => Ok(BaseSet::Naturals),
            "negative naturals" | "NN" => Ok(BaseSet::NegativeNaturals),
            "positive naturals" | "N+" => Ok(BaseSet::PositiveNaturals),
            "strictly negative naturals" | "N-" => Ok(BaseSet::StrictlyNegativeNaturals),
            "integers" | "Z" => Ok(BaseSet::Integers),
            "reals" | "R" => Ok(BaseSet::Reals),
            other => Err(DistributionError::InvalidInput(format!(
                "unknown base set {other:?}; expected one of naturals (N), \
                 negative naturals (NN), positive naturals (N+), \
                 strictly negative naturals (N-), integers (Z), reals (R)"
            ))),
        }
    }
}

/// Values removed from a [`NumberSet`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Exceptions {
    /// Nothing is removed.
    #[default]
    Empty,
    /// A finite list of values.
    Values(Vec<f64>),
    /// Every member of another set.
    Set(Box<NumberSet>),
}

impl Exceptions {
    fn contains(&self, x: f64) -> bool {
        match self {
            Exceptions::Empty => false,
            Exceptions::Values(values) => values.contains(&x),
            Exceptions::Set(set) => set.contains(x),
        }
    }
}

/// A base set minus a set of exceptions.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSet {
    base: BaseSet,
    exceptions: Exceptions,
}

impl NumberSet {
    /// The full base set.
    pub fn new(base: BaseSet) -> Self {
        Self {
            base,
            exceptions: Exceptions::Empty,
        }
    }

    /// `{0, 1, 2, ...}`
    pub fn naturals() -> Self {
        Self::new(BaseSet::Naturals)
    }

    /// Parses `base` as in [`BaseSet::from_str`].
    ///
    /// # Errors
    /// `InvalidInput` for an unknown name.
    pub fn parse(base: &str) -> Result<Self, DistributionError> {
        Ok(Self::new(base.parse()?))
    }

    /// Removes a finite list of values.
    ///
    /// Values outside the base set are accepted and have no effect. Extends
    /// an existing value list; replaces an exclusion set.
    pub fn with_exceptions<I: IntoIterator<Item = f64>>(mut self, values: I) -> Self {
        let mut values: Vec<f64> = values.into_iter().collect();
        if let Exceptions::Values(existing) = self.exceptions {
            values.extend(existing);
        }
        self.exceptions = Exceptions::Values(values);
        self
    }

    /// Removes every member of `other`.
    pub fn excluding(mut self, other: NumberSet) -> Self {
        self.exceptions = Exceptions::Set(Box::new(other));
        self
    }

    /// The base set.
    pub fn base(&self) -> BaseSet {
        self.base
    }

    /// The excluded values.
    pub fn exceptions(&self) -> &Exceptions {
        &self.exceptions
    }

    /// `true` if `x` is in the base set and not excluded. Always `false`
    /// for NaN and infinities.
    pub fn contains(&self, x: f64) -> bool {
        self.base.contains(x) && !self.exceptions.contains(x)
    }
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exceptions {
            Exceptions::Empty => write!(f, "{}", self.base),
            Exceptions::Values(values) => write!(f, "{} \\ {values:?}", self.base),
            Exceptions::Set(set) => write!(f, "{} \\ ({set})", self.base),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn integers_split_into_signed_naturals(k in -1_000_000_i64..1_000_000) {
            let x = k as f64;
            prop_assert!(BaseSet::Integers.contains(x));
            prop_assert_eq!(
                BaseSet::Naturals.contains(x),
                !BaseSet::StrictlyNegativeNaturals.contains(x)
            );
            prop_assert_eq!(
                BaseSet::PositiveNaturals.contains(x),
                !BaseSet::NegativeNaturals.contains(x)
            );
        }

        #[test]
        fn excluding_self_is_empty(x in -1e6_f64..1e6) {
            let s = NumberSet::new(BaseSet::Reals).excluding(NumberSet::new(BaseSet::Reals));
            prop_assert!(!s.contains(x));
        }
    }
}
