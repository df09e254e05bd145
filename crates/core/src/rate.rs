//! Stream-rate translation
//!
//! A borrower pays interest as a continuous per-second stream. The rate of
//! that stream *is* the loan: the outstanding principal is the amount whose
//! yearly interest at the bank's rate equals one year of streaming.
//!
//! `principal = rate * SECONDS_PER_YEAR * BASIS_POINTS / interest_rate`
//!
//! Example: at 200 bps (2%), a stream of 20 tokens/year carries a 1000 token loan.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::amount::Amount;

/// Seconds in a (365 day) year
pub const SECONDS_PER_YEAR: u128 = 31_536_000;

/// Interest rates are expressed in basis points (200 = 2% per year)
pub const BASIS_POINTS: u128 = 10_000;

/// Errors from rate conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("Interest rate must be positive")]
    ZeroInterestRate,

    #[error("Arithmetic overflow converting {0}")]
    Overflow(&'static str),
}

/// A per-second payment stream rate, in debt-token base units per second
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FlowRate(#[serde(with = "crate::serde_str")] u128);

impl FlowRate {
    /// A stopped stream
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(per_second: u128) -> Self {
        Self(per_second)
    }

    /// Base units streamed per second
    #[inline]
    pub const fn per_second(&self) -> u128 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: &FlowRate) -> Option<FlowRate> {
        self.0.checked_add(other.0).map(FlowRate)
    }

    pub fn checked_sub(&self, other: &FlowRate) -> Option<FlowRate> {
        self.0.checked_sub(other.0).map(FlowRate)
    }
}

impl fmt::Display for FlowRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", self.0)
    }
}

/// Direction and size of a principal change implied by a rate change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalDelta {
    /// The borrower streams more: additional principal is lent out
    Borrow(Amount),
    /// The borrower streams less: principal must be paid back
    Repay(Amount),
    Unchanged,
}

/// Converts between payment rates and annual principal at a fixed interest rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTranslator {
    /// Interest rate in basis points
    interest_rate: u32,
}

impl RateTranslator {
    /// Create a translator for the given interest rate (basis points)
    pub fn new(interest_rate: u32) -> Result<Self, RateError> {
        if interest_rate == 0 {
            return Err(RateError::ZeroInterestRate);
        }
        Ok(Self { interest_rate })
    }

    pub fn interest_rate(&self) -> u32 {
        self.interest_rate
    }

    /// Principal carried by a payment stream of `rate`
    pub fn rate_to_annual_principal(&self, rate: FlowRate) -> Result<Amount, RateError> {
        rate.per_second()
            .checked_mul(SECONDS_PER_YEAR)
            .and_then(|v| v.checked_mul(BASIS_POINTS))
            .map(|v| Amount::new(v / u128::from(self.interest_rate)))
            .ok_or(RateError::Overflow("rate to principal"))
    }

    /// Payment rate needed to carry `principal` (rounded down)
    pub fn principal_to_rate(&self, principal: Amount) -> Result<FlowRate, RateError> {
        principal
            .value()
            .checked_mul(u128::from(self.interest_rate))
            .map(|v| FlowRate::new(v / (SECONDS_PER_YEAR * BASIS_POINTS)))
            .ok_or(RateError::Overflow("principal to rate"))
    }

    /// Principal movement implied by a stream going from `old` to `new`
    pub fn principal_delta(&self, old: FlowRate, new: FlowRate) -> Result<PrincipalDelta, RateError> {
        let old_principal = self.rate_to_annual_principal(old)?;
        let new_principal = self.rate_to_annual_principal(new)?;

        Ok(match new_principal.cmp(&old_principal) {
            std::cmp::Ordering::Greater => {
                PrincipalDelta::Borrow(new_principal.abs_diff(&old_principal))
            }
            std::cmp::Ordering::Less => PrincipalDelta::Repay(old_principal.abs_diff(&new_principal)),
            std::cmp::Ordering::Equal => PrincipalDelta::Unchanged,
        })
    }

    /// Principal represented by one base unit of rate.
    ///
    /// `rate_to_annual_principal(principal_to_rate(p))` never exceeds `p` and
    /// never falls more than this amount below it.
    pub fn rounding_tolerance(&self) -> Amount {
        Amount::new((SECONDS_PER_YEAR * BASIS_POINTS).div_ceil(u128::from(self.interest_rate)))
    }
}
