use std::fmt;
use std::ops::{Index, IndexMut};

use serde::Serialize;

/// Operation-sequencing policy. Each policy owns its own chromosome and
/// fitness fields on every individual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Policy {
    #[serde(rename = "FIFO")]
    Fifo,
    #[serde(rename = "LTP")]
    Ltp,
    #[serde(rename = "STP")]
    Stp,
    #[serde(rename = "RR_FIFO")]
    RrFifo,
    #[serde(rename = "RR_LTP")]
    RrLtp,
    #[serde(rename = "RR_ECA")]
    RrEca,
}

pub const POLICY_COUNT: usize = 6;

/// Every policy in its fixed iteration order.
pub const POLICIES: [Policy; POLICY_COUNT] = [
    Policy::Fifo,
    Policy::Ltp,
    Policy::Stp,
    Policy::RrFifo,
    Policy::RrLtp,
    Policy::RrEca,
];

impl Policy {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::Ltp => "LTP",
            Policy::Stp => "STP",
            Policy::RrFifo => "RR_FIFO",
            Policy::RrLtp => "RR_LTP",
            Policy::RrEca => "RR_ECA",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per policy, indexed by the policy tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PerPolicy<T>([T; POLICY_COUNT]);

impl<T> PerPolicy<T> {
    pub fn from_fn(mut f: impl FnMut(Policy) -> T) -> Self {
        Self(POLICIES.map(|p| f(p)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Policy, &T)> {
        POLICIES.iter().copied().zip(self.0.iter())
    }

    /// Exchanges the values stored under two policies.
    pub fn swap(&mut self, a: Policy, b: Policy) {
        self.0.swap(a.index(), b.index());
    }
}

impl<T> Index<Policy> for PerPolicy<T> {
    type Output = T;

    fn index(&self, policy: Policy) -> &T {
        &self.0[policy.index()]
    }
}

impl<T> IndexMut<Policy> for PerPolicy<T> {
    fn index_mut(&mut self, policy: Policy) -> &mut T {
        &mut self.0[policy.index()]
    }
}
