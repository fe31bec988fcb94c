extern crate num;

use num::PrimInt;
use std::fmt;
use std::hash::Hash;

/// Abstraction layer for the bitwise operations on a determinant bitstring.
/// # Purpose
/// The BitOps trait brings in scope an abstraction layer over the bitwise
/// operations a [Determinant] needs. These operations make the determinant
/// compatible with either a primitive integer type or an arbitrarily large
/// word array ([BitArray]).
/// # Convention
/// Bit $i$ encodes orbital $i$ and is counted from the least significant bit.
pub trait BitOps:
    Copy +
    Eq +
    Ord +
    Hash +
    fmt::Debug +
    Send +
    Sync +
    std::ops::BitAnd<Output = Self> +
    std::ops::BitOr<Output = Self> +
    std::ops::BitXor<Output = Self> +
    std::ops::Not<Output = Self>
{
    /// Number of orbitals the bitstring can hold.
    const CAPACITY: usize;
    /// Returns an owned instance of an all cleared bitstring.
    fn zeros() -> Self;
    /// Provides the number of set bits in the bitstring. This gives the number
    /// of electrons in the bitstring.
    fn count_ones(self) -> u32;
    /// Provides the position of the lowest set bit, or [BitOps::CAPACITY] if
    /// the bitstring is empty. Consistent with [BitOps::check] and [BitOps::flip].
    fn trailing_zeros(self) -> u32;
    /// Returns the truth value at index $i$. Out of bounds indices are never
    /// set.
    fn check(&self, i: usize) -> bool;
    /// Toggles the $i$-th bit. Out of bounds indices are ignored.
    fn flip(&mut self, i: usize);
    /// Bitstring with the bits $\[0, n)$ set.
    fn mask_below(n: usize) -> Self;
}

/// BitWise operations for all primitive ints. All methods are inlined and use
/// built-in methods.
impl<I> BitOps for I
    where I: PrimInt + Hash + fmt::Debug + Send + Sync
{
    const CAPACITY: usize = std::mem::size_of::<I>() * u8::BITS as usize;

    #[inline(always)]
    fn zeros() -> Self {
        I::zero()
    }
    #[inline(always)]
    fn count_ones(self) -> u32 {
        <I as PrimInt>::count_ones(self)
    }
    #[inline(always)]
    fn trailing_zeros(self) -> u32 {
        <I as PrimInt>::trailing_zeros(self)
    }
    #[inline(always)]
    fn check(&self, i: usize) -> bool {
        if i >= Self::CAPACITY {return false;}
        (*self >> i) & I::one() == I::one()
    }
    #[inline(always)]
    fn flip(&mut self, i: usize) {
        if i >= Self::CAPACITY {return;}
        *self = *self ^ (I::one() << i);
    }
    #[inline(always)]
    fn mask_below(n: usize) -> Self {
        if n >= Self::CAPACITY {
            !I::zero()
        } else {
            (I::one() << n) - I::one()
        }
    }
}

/// Word array bitstring, for orbital counts beyond the native integer widths.
/// # Definition
/// Holds $64N$ orbitals. Word $k$ stores the orbitals $\[64k, 64k+64)$, with
/// the same least significant bit first convention as the primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitArray<const N: usize> {
    pub words: [u64; N],
}

// Numeric order, most significant word first, as for the primitive types.
impl<const N: usize> Ord for BitArray<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.words.iter().rev().cmp(other.words.iter().rev())
    }
}

impl<const N: usize> PartialOrd for BitArray<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

const WORD_SIZE: usize = u64::BITS as usize;

impl<const N: usize> BitOps for BitArray<N> {
    const CAPACITY: usize = N * WORD_SIZE;

    fn zeros() -> Self {
        BitArray { words: [0; N] }
    }

    fn count_ones(self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    fn trailing_zeros(self) -> u32 {
        for (k, w) in self.words.iter().enumerate() {
            if *w != 0 {
                return (k * WORD_SIZE) as u32 + w.trailing_zeros();
            }
        }
        Self::CAPACITY as u32
    }

    fn check(&self, i: usize) -> bool {
        if i >= Self::CAPACITY {return false;}
        (self.words[i / WORD_SIZE] >> (i % WORD_SIZE)) & 1 == 1
    }

    fn flip(&mut self, i: usize) {
        if i >= Self::CAPACITY {return;}
        self.words[i / WORD_SIZE] ^= 1 << (i % WORD_SIZE);
    }

    fn mask_below(n: usize) -> Self {
        let mut words = [0; N];
        for (k, w) in words.iter_mut().enumerate() {
            let start = k * WORD_SIZE;
            if n >= start + WORD_SIZE {
                *w = u64::MAX;
            } else if n > start {
                *w = (1 << (n - start)) - 1;
            }
        }
        BitArray { words }
    }
}

impl<const N: usize> std::ops::BitAnd for BitArray<N> {
    type Output = Self;

    fn bitand(self, other: Self) -> Self::Output {
        let mut words = self.words;
        for i in 0..N {
            words[i] &= other.words[i];
        }
        BitArray { words }
    }
}

impl<const N: usize> std::ops::BitOr for BitArray<N> {
    type Output = Self;

    fn bitor(self, other: Self) -> Self::Output {
        let mut words = self.words;
        for i in 0..N {
            words[i] |= other.words[i];
        }
        BitArray { words }
    }
}

impl<const N: usize> std::ops::BitXor for BitArray<N> {
    type Output = Self;

    fn bitxor(self, other: Self) -> Self::Output {
        let mut words = self.words;
        for i in 0..N {
            words[i] ^= other.words[i];
        }
        BitArray { words }
    }
}

impl<const N: usize> std::ops::Not for BitArray<N> {
    type Output = Self;

    fn not(self) -> Self::Output {
        let mut words = self.words;
        for w in words.iter_mut() {
            *w = !*w;
        }
        BitArray { words }
    }
}

/// Mixing function used to derive independent random streams.
#[inline(always)]
pub(crate) fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// The Slater determinant structure. Encodes the occupied spin-orbitals.
/// # Definition
/// The bitstring `bits` has bit $i$ set iff the orbital $i$ is occupied, for
/// $i\in\[0,N_{mo})$. The determinant is the ordered product of creation
/// operators
/// $$
/// \vert D\rangle = a^\dagger_{i_1}a^\dagger_{i_2}\cdots a^\dagger_{i_k}\vert 0\rangle,
/// \quad i_1 < i_2 < \cdots < i_k.
/// $$
/// Two determinants are equal iff both their bits and their width match.
/// # Usage
/// ```rust
/// use fciqmc::Determinant;
/// let det: Determinant<u64> = Determinant::new([5, 0, 2], 8).unwrap();
/// assert_eq!(det.occupied().collect::<Vec<usize>>(), vec![0, 2, 5]);
/// assert_eq!(det.occupation_number(), 3);
/// assert_eq!(format!("{}", det), "|10100100>");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Determinant<T = u128> {
    bits: T,
    nmo: usize,
}

impl<T: BitOps> Determinant<T> {
    /// Builds a determinant from the occupied orbital indices. Repeated indices
    /// are occupied once.
    /// # Errors
    /// * [FciqmcError::CapacityExceeded] if `nmo` does not fit in `T`.
    /// * [FciqmcError::OrbitalOutOfRange] if an index is outside $\[0, N_{mo})$.
    pub fn new<I: IntoIterator<Item = usize>>(occupied: I, nmo: usize) -> Result<Self, crate::FciqmcError> {
        check_capacity::<T>(nmo)?;
        let mut bits = T::zeros();
        for index in occupied {
            if index >= nmo {
                return Err(crate::FciqmcError::OrbitalOutOfRange { index, nmo });
            }
            if !bits.check(index) {
                bits.flip(index);
            }
        }
        Ok(Determinant { bits, nmo })
    }

    /// Rebuilds a determinant from a raw bit pattern.
    /// # Errors
    /// Same as [Determinant::new], a set bit at or above `nmo` is out of range.
    pub fn from_bits(bits: T, nmo: usize) -> Result<Self, crate::FciqmcError> {
        check_capacity::<T>(nmo)?;
        let outside = bits & !T::mask_below(nmo);
        if outside != T::zeros() {
            return Err(crate::FciqmcError::OrbitalOutOfRange {
                index: outside.trailing_zeros() as usize,
                nmo,
            });
        }
        Ok(Determinant { bits, nmo })
    }

    #[inline(always)]
    pub fn bits(&self) -> T {
        self.bits
    }

    /// Number of one-body slots, occupied or not.
    #[inline(always)]
    pub fn nmo(&self) -> usize {
        self.nmo
    }

    #[inline(always)]
    pub fn occupation_number(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Membership test for orbital `index`.
    pub fn is_occupied(&self, index: usize) -> Result<bool, crate::FciqmcError> {
        if index >= self.nmo {
            return Err(crate::FciqmcError::OrbitalOutOfRange { index, nmo: self.nmo });
        }
        Ok(self.bits.check(index))
    }

    /// Ascending sequence of the occupied orbitals. Calling it again restarts
    /// the sequence.
    pub fn occupied(&self) -> Occupied<T> {
        Occupied::new(self.bits)
    }

    pub fn intersection(&self, other: &Self) -> Result<Self, crate::FciqmcError> {
        self.check_width(other)?;
        Ok(Determinant { bits: self.bits & other.bits, nmo: self.nmo })
    }

    pub fn union(&self, other: &Self) -> Result<Self, crate::FciqmcError> {
        self.check_width(other)?;
        Ok(Determinant { bits: self.bits | other.bits, nmo: self.nmo })
    }

    pub fn symmetric_difference(&self, other: &Self) -> Result<Self, crate::FciqmcError> {
        self.check_width(other)?;
        Ok(Determinant { bits: self.bits ^ other.bits, nmo: self.nmo })
    }

    /// Errors with [FciqmcError::WidthMismatch] unless both widths agree.
    pub fn check_width(&self, other: &Self) -> Result<(), crate::FciqmcError> {
        if self.nmo != other.nmo {
            return Err(crate::FciqmcError::WidthMismatch { left: self.nmo, right: other.nmo });
        }
        Ok(())
    }

    /// Moves the electron in `from` to the empty orbital `to`. The caller
    /// guarantees both indices are in range and the occupations are right.
    #[inline(always)]
    pub(crate) fn excite(&self, from: usize, to: usize) -> Self {
        let mut bits = self.bits;
        bits.flip(from);
        bits.flip(to);
        Determinant { bits, nmo: self.nmo }
    }

    /// Number of occupied orbitals strictly between `i` and `j`.
    #[inline(always)]
    pub(crate) fn count_between(&self, i: usize, j: usize) -> u32 {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        (self.bits & T::mask_below(hi) & !T::mask_below(lo + 1)).count_ones()
    }

    /// Stable 64 bits fingerprint of the occupation pattern and width.
    pub fn digest(&self) -> u64 {
        self.occupied()
            .fold(splitmix64(self.nmo as u64), |h, i| splitmix64(h ^ i as u64))
    }
}

fn check_capacity<T: BitOps>(nmo: usize) -> Result<(), crate::FciqmcError> {
    if nmo > T::CAPACITY {
        return Err(crate::FciqmcError::CapacityExceeded { nmo, capacity: T::CAPACITY });
    }
    Ok(())
}

impl<T: BitOps> fmt::Display for Determinant<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "|")?;
        for i in 0..self.nmo {
            write!(f, "{}", if self.bits.check(i) { '1' } else { '0' })?;
        }
        write!(f, ">")
    }
}

/// Iterator over the set bits of a bitstring, lowest first.
#[derive(Debug, Clone)]
pub struct Occupied<T> {
    remaining: T,
}

impl<T: BitOps> Occupied<T> {
    pub(crate) fn new(bits: T) -> Self {
        Occupied { remaining: bits }
    }
}

impl<T: BitOps> Iterator for Occupied<T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let i = self.remaining.trailing_zeros() as usize;
        if i >= T::CAPACITY {
            return None;
        }
        self.remaining.flip(i);
        Some(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl<T: BitOps> ExactSizeIterator for Occupied<T> {}
