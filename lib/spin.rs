//! Definitions for angular momentum quantum numbers and related quantities.

use std::{ fmt, str::FromStr, sync::OnceLock };
use regex::Regex;
use crate::error::{ ChainError, ChainResult };

/// A single spin-projection quantum number.
///
/// This type is backed by a single `i32` representing the number of halves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpinProj(i32);

impl SpinProj {
    /// Create a new spin projection from a number of halves.
    pub fn new(m: i32) -> Self { Self(m) }

    /// Return a copy of `self` raised by 1.
    ///
    /// Saturates to the maximum possible value instead of overflowing the
    /// underlying `i32`.
    pub fn raised(self) -> Self { Self(self.0.saturating_add(2)) }

    /// Return a copy of `self` lowered by 1.
    ///
    /// Saturates to the minimum possible value instead of underflowing the
    /// underlying `i32`.
    pub fn lowered(self) -> Self { Self(self.0.saturating_sub(2)) }

    /// Return `self` as a bare number of halves.
    pub fn halves(self) -> i32 { self.0 }

    /// Return `self` as an `f64`.
    ///
    /// This reflects the "true" value of the projection quantum number; i.e.
    /// there is a relative factor of 2 between this and [`Self::halves`].
    pub fn f(self) -> f64 { f64::from(self.0) / 2.0 }

    /// Create a new spin-projection quantum number from a `f64` value, rounding
    /// to the nearest half-integer.
    pub fn from_f64(f: f64) -> Self { Self((2.0 * f).round() as i32) }
}

/// A single total-spin quantum number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpinTotal(u32);

impl SpinTotal {
    /// Spin-1/2.
    pub const HALF: Self = Self(1);

    /// Create a new total spin from a number of halves.
    pub fn new(j: u32) -> Self { Self(j) }

    /// Return `self` as a bare number of halves.
    pub fn halves(self) -> u32 { self.0 }

    /// Return `self` as an `f64`.
    ///
    /// This reflects the "true" numerical value of the total-spin quantum
    /// number; i.e. there is a relative factor of 2 between this and
    /// [`Self::halves`].
    pub fn f(self) -> f64 { f64::from(self.0) / 2.0 }

    /// Number of projection states, `2j + 1`.
    pub fn multiplicity(self) -> usize { self.0 as usize + 1 }

    /// Return an iterator over available [`Spin`] pairs by descending
    /// projection number.
    pub fn iter(self) -> SpinProjections {
        SpinProjections { total: self, next: Some(self.0 as i32) }
    }
}

impl fmt::Display for SpinTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

fn spin_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*(/\s*2)?\s*$")
            .expect("spin label pattern is valid")
    })
}

/// Parses labels of the form `"1/2"`, `"1"`, `"3/2"`, ...
///
/// Spin-0 is rejected since it carries no degrees of freedom.
impl FromStr for SpinTotal {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        let invalid = || ChainError::InvalidSpin(s.to_string());
        let caps = spin_label_pattern().captures(s).ok_or_else(invalid)?;
        let num: u32 = caps[1].parse().map_err(|_| invalid())?;
        let halves
            = if caps.get(2).is_some() {
                num
            } else {
                num.checked_mul(2).ok_or_else(invalid)?
            };
        (halves > 0).then_some(Self(halves)).ok_or_else(invalid)
    }
}

/// A `(total, projection)` spin quantum number pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Spin(SpinTotal, SpinProj);

impl Spin {
    /// Create a new spin if the given spin-projection number is valid for the
    /// given total-spin number.
    pub fn new(j: u32, m: i32) -> Option<Self> {
        let j_i64 = i64::from(j);
        let m_i64 = i64::from(m);
        (
            (-j_i64..=j_i64).contains(&m_i64)
            && m_i64.saturating_sub(j_i64) % 2 == 0
        )
        .then_some(Self(SpinTotal(j), SpinProj(m)))
    }

    /// Return the [spin-projection][SpinProj] quantum number.
    pub fn proj(self) -> SpinProj { self.1 }

    /// Return a copy of `self` with the projection raised by 1, or `None` if
    /// `self` is already [stretched][Self::is_stretched_pos].
    pub fn raised_checked(self) -> Option<Self> {
        (!self.is_stretched_pos()).then(|| Self(self.0, self.1.raised()))
    }

    /// Return a copy of `self` with the projection lowered by 1, or `None` if
    /// `self` is already [stretched][Self::is_stretched_neg].
    pub fn lowered_checked(self) -> Option<Self> {
        (!self.is_stretched_neg()).then(|| Self(self.0, self.1.lowered()))
    }

    /// Return `true` if the projection number saturates the upper end of the
    /// range of available spin values.
    pub fn is_stretched_pos(self) -> bool {
        i64::from(self.1.0) >= i64::from(self.0.0)
    }

    /// Return `true` if the projection number saturates the lower end of the
    /// range of availables spin values.
    pub fn is_stretched_neg(self) -> bool {
        i64::from(self.1.0) <= -i64::from(self.0.0)
    }

    /// Matrix element `<j, m ± 1| S^± |j, m>` in units of ħ.
    ///
    /// Returns zero for a stretched state.
    pub fn ladder(self, raise: bool) -> f64 {
        let j = self.0.f();
        let m = self.1.f();
        let mp = if raise { m + 1.0 } else { m - 1.0 };
        (j * (j + 1.0) - m * mp).max(0.0).sqrt()
    }
}

/// Iterator over spin projection states for a fixed total spin magnitude.
///
/// Projection states are visited in descending order.
#[derive(Copy, Clone, Debug)]
pub struct SpinProjections {
    total: SpinTotal,
    next: Option<i32>,
}

impl Iterator for SpinProjections {
    type Item = Spin;

    fn next(&mut self) -> Option<Self::Item> {
        let m = self.next?;
        let cur = Spin(self.total, SpinProj(m));
        self.next = (!cur.is_stretched_neg()).then_some(m - 2);
        Some(cur)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n
            = self.next
            .map(|m| ((m + self.total.0 as i32) / 2 + 1) as usize)
            .unwrap_or(0);
        (n, Some(n))
    }
}

impl ExactSizeIterator for SpinProjections { }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_labels() {
        assert_eq!("1/2".parse::<SpinTotal>().unwrap(), SpinTotal::HALF);
        assert_eq!("1".parse::<SpinTotal>().unwrap(), SpinTotal::new(2));
        assert_eq!(" 3 / 2 ".parse::<SpinTotal>().unwrap(), SpinTotal::new(3));
        assert!("0".parse::<SpinTotal>().is_err());
        assert!("1/3".parse::<SpinTotal>().is_err());
        assert!("spin".parse::<SpinTotal>().is_err());
        assert_eq!(SpinTotal::new(3).to_string(), "3/2");
        assert_eq!(SpinTotal::new(4).to_string(), "2");
    }

    #[test]
    fn projections() {
        let dn: Vec<i32>
            = SpinTotal::new(3).iter().map(|s| s.proj().halves()).collect();
        assert_eq!(dn, vec![3, 1, -1, -3]);
        let dn: Vec<i32>
            = SpinTotal::new(2).iter().map(|s| s.proj().halves()).collect();
        assert_eq!(dn, vec![2, 0, -2]);
        assert_eq!(SpinTotal::HALF.iter().len(), 2);
        assert_eq!(SpinTotal::new(2).multiplicity(), 3);
    }

    #[test]
    fn ladder_elements() {
        let dn = Spin::new(1, -1).unwrap();
        assert!((dn.ladder(true) - 1.0).abs() < 1e-15);
        assert_eq!(dn.ladder(false), 0.0);
        assert!(dn.lowered_checked().is_none());
        assert_eq!(dn.raised_checked(), Spin::new(1, 1));
        let zero = Spin::new(2, 0).unwrap();
        assert!((zero.ladder(true) - 2.0_f64.sqrt()).abs() < 1e-15);
    }
}
