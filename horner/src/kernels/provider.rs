use std::{
    fmt::{self, Display},
    str::FromStr,
};

use log::{debug, info};

use super::{ScalarKernel, VectorKernel, portable};
use crate::error::HornerErr;

/// A kernel family, selected by name in the worker's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Portable Rust kernels, named `cpp`.
    Primary,
    /// Architecture specific intrinsics kernels, named `asm`.
    Alternate,
}

impl Family {
    /// Returns the name used to select this family.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Primary => "cpp",
            Family::Alternate => "asm",
        }
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = HornerErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpp" => Ok(Family::Primary),
            "asm" => Ok(Family::Alternate),
            other => Err(HornerErr::InvalidSelection(other.to_string())),
        }
    }
}

/// Which of the two entry points of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    Scalar,
    Vector,
}

impl Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Scalar => f.write_str("scalar"),
            KernelKind::Vector => f.write_str("vector"),
        }
    }
}

/// The entry points bound for a single family, either may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelSet {
    scalar: Option<ScalarKernel>,
    vector: Option<VectorKernel>,
}

impl KernelSet {
    /// Creates a new `KernelSet`.
    ///
    /// # Arguments
    /// * `scalar` - The single point entry point, if any.
    /// * `vector` - The block entry point, if any.
    pub fn new(scalar: Option<ScalarKernel>, vector: Option<VectorKernel>) -> Self {
        Self { scalar, vector }
    }

    pub fn scalar(&self) -> Option<ScalarKernel> {
        self.scalar
    }

    pub fn vector(&self) -> Option<VectorKernel> {
        self.vector
    }
}

/// Holds the kernels of both families, bound once at startup.
#[derive(Debug, Clone, Copy)]
pub struct KernelProvider {
    primary: KernelSet,
    alternate: KernelSet,
}

impl KernelProvider {
    /// Binds the kernels available on the running CPU.
    ///
    /// The primary family is always complete. The alternate family binds its
    /// scalar entry point on x86_64 and its vector one only when AVX is
    /// detected; on any other target it stays empty.
    ///
    /// # Returns
    /// A new `KernelProvider` instance.
    pub fn resolve() -> Self {
        let primary = KernelSet::new(Some(portable::scalar), Some(portable::vector));
        let alternate = resolve_alternate();

        info!(
            "kernels bound: {}(scalar={}, vector={}) {}(scalar={}, vector={})",
            Family::Primary,
            primary.scalar.is_some(),
            primary.vector.is_some(),
            Family::Alternate,
            alternate.scalar.is_some(),
            alternate.vector.is_some(),
        );

        Self { primary, alternate }
    }

    /// Builds a provider out of externally supplied kernels.
    ///
    /// # Arguments
    /// * `primary` - The kernels selected by `cpp`.
    /// * `alternate` - The kernels selected by `asm`.
    pub fn from_sets(primary: KernelSet, alternate: KernelSet) -> Self {
        Self { primary, alternate }
    }

    /// Returns the kernels bound for `family`.
    pub fn kernels(&self, family: Family) -> &KernelSet {
        match family {
            Family::Primary => &self.primary,
            Family::Alternate => &self.alternate,
        }
    }

    /// Returns the scalar kernel of `family`.
    ///
    /// # Returns
    /// A `KernelUnavailable` error if it was never bound.
    pub fn scalar(&self, family: Family) -> Result<ScalarKernel, HornerErr> {
        self.kernels(family)
            .scalar
            .ok_or(HornerErr::KernelUnavailable {
                family,
                kind: KernelKind::Scalar,
            })
    }

    /// Returns the vector kernel of `family`.
    ///
    /// # Returns
    /// A `KernelUnavailable` error if it was never bound.
    pub fn vector(&self, family: Family) -> Result<VectorKernel, HornerErr> {
        self.kernels(family)
            .vector
            .ok_or(HornerErr::KernelUnavailable {
                family,
                kind: KernelKind::Vector,
            })
    }
}

#[cfg(target_arch = "x86_64")]
fn resolve_alternate() -> KernelSet {
    use super::x86;

    let vector: Option<VectorKernel> = if is_x86_feature_detected!("avx") {
        Some(x86::vector)
    } else {
        debug!("avx not detected, the asm vector kernel stays unbound");
        None
    };

    KernelSet::new(Some(x86::scalar), vector)
}

#[cfg(not(target_arch = "x86_64"))]
fn resolve_alternate() -> KernelSet {
    debug!("no intrinsics kernels for this target, the asm family stays unbound");
    KernelSet::default()
}
