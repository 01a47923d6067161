//! Resource kinds and the resource catalog.
//!
//! The catalog is the single read-only table describing every resource kind
//! the simulator knows about. Its order defines the column order of every
//! per-kind vector and matrix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of resource kinds in the catalog.
pub const KIND_COUNT: usize = 7;

/// A reusable resource type that processes compete for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Cpu,
    Disk,
    Net,
    Mutex,
    Semaphore,
    FdLimit,
    ThreadLimit,
}

impl ResourceKind {
    /// Every kind, in catalog order.
    pub const ALL: [ResourceKind; KIND_COUNT] = [
        ResourceKind::Cpu,
        ResourceKind::Disk,
        ResourceKind::Net,
        ResourceKind::Mutex,
        ResourceKind::Semaphore,
        ResourceKind::FdLimit,
        ResourceKind::ThreadLimit,
    ];

    /// Column index of this kind in the catalog.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry for this kind.
    pub fn def(self) -> &'static ResourceDef {
        &RESOURCE_CATALOG[self.index()]
    }

    /// Short code, e.g. `CPU`.
    pub fn code(self) -> &'static str {
        self.def().code
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        self.def().label
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Static description of a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceDef {
    /// The kind this entry describes.
    pub kind: ResourceKind,
    /// Short code used in logs.
    pub code: &'static str,
    /// Functional category (processing, I/O, synchronization, ...).
    pub functional: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Minimum configurable amount.
    pub min: u32,
    /// Maximum configurable amount.
    pub max: u32,
}

impl ResourceDef {
    /// Clamp an amount into this kind's configurable range.
    pub fn clamp(&self, amount: u32) -> u32 {
        amount.clamp(self.min, self.max)
    }

    /// Check whether an amount lies within this kind's configurable range.
    pub fn contains(&self, amount: u32) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

/// The resource catalog, indexed by [`ResourceKind::index`].
pub const RESOURCE_CATALOG: [ResourceDef; KIND_COUNT] = [
    ResourceDef {
        kind: ResourceKind::Cpu,
        code: "CPU",
        functional: "Processing",
        label: "CPU",
        min: 1,
        max: 16,
    },
    ResourceDef {
        kind: ResourceKind::Disk,
        code: "DISK",
        functional: "I/O",
        label: "Disk",
        min: 1,
        max: 16,
    },
    ResourceDef {
        kind: ResourceKind::Net,
        code: "NET",
        functional: "I/O (communication)",
        label: "Network",
        min: 1,
        max: 16,
    },
    ResourceDef {
        kind: ResourceKind::Mutex,
        code: "MUTEX",
        functional: "Exclusive synchronization",
        label: "Mutex",
        min: 1,
        max: 32,
    },
    ResourceDef {
        kind: ResourceKind::Semaphore,
        code: "SEMAPHORE",
        functional: "Counting synchronization",
        label: "Semaphore",
        min: 1,
        max: 32,
    },
    ResourceDef {
        kind: ResourceKind::FdLimit,
        code: "FD_LIMIT",
        functional: "System resource",
        label: "Open files",
        min: 1,
        max: 64,
    },
    ResourceDef {
        kind: ResourceKind::ThreadLimit,
        code: "THREAD_LIMIT",
        functional: "Concurrency resource",
        label: "Threads per process",
        min: 1,
        max: 64,
    },
];

/// Clamp an amount into the catalog range of `kind`.
pub fn clamp_amount(kind: ResourceKind, amount: u32) -> u32 {
    kind.def().clamp(amount)
}

/// A `(kind, amount)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantity {
    pub kind: ResourceKind,
    pub amount: u32,
}

impl ResourceQuantity {
    pub fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}

/// One amount per resource kind, in catalog order.
///
/// Used for the Available/Work vectors and the rows of the banker's
/// matrices. Kinds that are not configured simply stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceVector([u32; KIND_COUNT]);

impl ResourceVector {
    /// A vector with every component at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A vector with a single unit of `kind`.
    pub fn unit(kind: ResourceKind) -> Self {
        let mut v = Self::zero();
        v[kind] = 1;
        v
    }

    /// Build a vector from `(kind, amount)` pairs. Repeated kinds accumulate.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ResourceKind, u32)>) -> Self {
        let mut v = Self::zero();
        for (kind, amount) in pairs {
            v[kind] += amount;
        }
        v
    }

    /// Count occurrences of each kind in a request sequence.
    pub fn from_kinds<'a>(kinds: impl IntoIterator<Item = &'a ResourceKind>) -> Self {
        Self::from_pairs(kinds.into_iter().map(|&k| (k, 1)))
    }

    /// True if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&x| x == 0)
    }

    /// Component-wise `self <= other`.
    pub fn le(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }

    /// Component-wise sum.
    pub fn plus(&self, other: &Self) -> Self {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
        out
    }

    /// Component-wise difference, saturating at zero.
    pub fn saturating_sub(&self, other: &Self) -> Self {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a = a.saturating_sub(*b);
        }
        out
    }

    /// Component-wise minimum.
    pub fn component_min(&self, other: &Self) -> Self {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a = (*a).min(*b);
        }
        out
    }

    /// Iterate `(kind, amount)` over every catalog kind.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL.iter().map(move |&k| (k, self[k]))
    }
}

impl Index<ResourceKind> for ResourceVector {
    type Output = u32;

    fn index(&self, kind: ResourceKind) -> &u32 {
        &self.0[kind.index()]
    }
}

impl IndexMut<ResourceKind> for ResourceVector {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        &mut self.0[kind.index()]
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, "]")
    }
}
