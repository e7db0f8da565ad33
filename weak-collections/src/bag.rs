use std::borrow::Borrow;
use std::collections::hash_map;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;

use fxhash::FxHashMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::{Serialize, Serializer};

/// How many occurrences [`Bag::remove`] should take out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// Exactly this many. Taking out more than are present is a bug in the
    /// caller and panics.
    Any(usize),
    /// Every occurrence, however many there are.
    All,
}

/// A multiset: each distinct element together with how many times it occurs.
///
/// Every stored count is at least one. Taking out the last occurrence of an
/// element forgets the element.
pub struct Bag<T> {
    counts: FxHashMap<T, usize>,
}

impl<T: Hash + Eq> Bag<T> {
    pub fn new() -> Self {
        Bag {
            counts: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Bag {
            counts: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Builds a bag from explicit `(element, count)` pairs. Pairs naming the
    /// same element add up. Panics on a zero count.
    pub fn from_counts<I: IntoIterator<Item = (T, usize)>>(counts: I) -> Self {
        let mut bag = Bag::new();
        for (element, occurrences) in counts {
            bag.add_occurrences(element, occurrences);
        }
        bag
    }

    pub fn add(&mut self, element: T) {
        self.add_occurrences(element, 1);
    }

    pub fn add_occurrences(&mut self, element: T, occurrences: usize) {
        assert!(
            occurrences > 0,
            "can only add a positive number of occurrences"
        );
        let count = self.counts.entry(element).or_insert(0);
        *count = count
            .checked_add(occurrences)
            .unwrap_or_else(|| panic!("occurrence count overflows usize"));
    }

    /// Takes occurrences of `element` out of the bag and returns how many were
    /// taken. `Removal::Any(0)` and `Removal::All` on an absent element do
    /// nothing.
    pub fn remove<Q>(&mut self, element: &Q, removal: Removal) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match removal {
            Removal::All => self.counts.remove(element).unwrap_or(0),
            Removal::Any(0) => 0,
            Removal::Any(occurrences) => {
                let current = self.count(element);
                assert!(
                    occurrences <= current,
                    "cannot remove {} occurrences of an element present {} times",
                    occurrences,
                    current
                );
                if occurrences == current {
                    self.counts.remove(element);
                } else if let Some(count) = self.counts.get_mut(element) {
                    *count -= occurrences;
                }
                occurrences
            }
        }
    }

    /// Number of occurrences of `element`; zero if absent.
    pub fn count<Q>(&self, element: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.counts.get(element).copied().unwrap_or(0)
    }

    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.counts.contains_key(element)
    }

    pub fn unique_count(&self) -> usize {
        self.counts.len()
    }

    /// Panics if the sum does not fit in a `usize`.
    pub fn total_count(&self) -> usize {
        self.counts
            .values()
            .try_fold(0usize, |total, &count| total.checked_add(count))
            .unwrap_or_else(|| panic!("total count overflows usize"))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn unique_elements(&self) -> impl Iterator<Item = &T> + '_ {
        self.counts.keys()
    }

    /// Every element repeated by its count. Copies of one element are adjacent;
    /// the order between elements is unspecified.
    pub fn total_elements(&self) -> impl Iterator<Item = &T> + '_ {
        self.counts
            .iter()
            .flat_map(|(element, &count)| std::iter::repeat(element).take(count))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.counts.iter(),
        }
    }
}

impl<T: Hash + Eq> Default for Bag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone> Clone for Bag<T> {
    fn clone(&self) -> Self {
        Bag {
            counts: self.counts.clone(),
        }
    }
}

impl<T: Hash + Eq> PartialEq for Bag<T> {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl<T: Hash + Eq> Eq for Bag<T> {}

impl<T: Debug> Debug for Bag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts.iter()).finish()
    }
}

impl<T: Hash + Eq> FromIterator<T> for Bag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut bag = Bag::new();
        bag.extend(iter);
        bag
    }
}

impl<T: Hash + Eq> Extend<T> for Bag<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

pub struct Iter<'a, T> {
    inner: hash_map::Iter<'a, T, usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, &count)| (element, count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T: Hash + Eq> IntoIterator for &'a Bag<T> {
    type Item = (&'a T, usize);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for Bag<T> {
    type Item = (T, usize);
    type IntoIter = hash_map::IntoIter<T, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

impl<T: Serialize> Serialize for Bag<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.counts.iter())
    }
}

impl<'de, T> Deserialize<'de> for Bag<T>
where
    T: Deserialize<'de> + Hash + Eq,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BagVisitor(PhantomData))
    }
}

struct BagVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for BagVisitor<T>
where
    T: Deserialize<'de> + Hash + Eq,
{
    type Value = Bag<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from elements to positive counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Bag<T>, A::Error> {
        let mut bag = Bag::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((element, occurrences)) = access.next_entry::<T, usize>()? {
            if occurrences == 0 {
                return Err(de::Error::custom("bag counts must be positive"));
            }
            if bag.count(&element).checked_add(occurrences).is_none() {
                return Err(de::Error::custom("bag count overflows usize"));
            }
            bag.add_occurrences(element, occurrences);
        }
        Ok(bag)
    }
}

/// Builds a [`Bag`] from a list of elements or from `element => count` pairs.
///
/// ```
/// use weak_collections::bag;
///
/// let listed = bag![1, 2, 2];
/// let counted = bag! { 1 => 1, 2 => 2 };
/// assert_eq!(listed, counted);
/// ```
#[macro_export]
macro_rules! bag {
    () => {
        $crate::Bag::new()
    };
    ($($element:expr => $count:expr),+ $(,)?) => {
        $crate::Bag::from_counts([$(($element, $count)),+])
    };
    ($($element:expr),+ $(,)?) => {
        ::core::iter::Iterator::collect::<$crate::Bag<_>>(
            ::core::iter::IntoIterator::into_iter([$($element),+]),
        )
    };
}
