//! The contract shared by every protocol element, and the declarative
//! occurrence constraints containers check their contents against.

use alloc::vec;
use alloc::vec::Vec;

use super::{check_len, Error, Result, Violation};

/// Marks a `max` bound that is never exceeded.
pub const UNBOUNDED: usize = usize::MAX;

/// A value with a canonical byte encoding, a decoding, and self-validation.
///
/// Implementors are sum types over their concrete variants. The variant to
/// decode is determined from the leading bytes of a buffer by
/// [`determine_class`](Self::determine_class), a default instance of it is built
/// by [`new_of_class`](Self::new_of_class), and [`load_from`](Self::load_from)
/// fills it in. Callers normally only use [`parse`](Self::parse) and
/// [`save`](Self::save).
///
/// The buffers given to `parse` and `load_from` are the _declared_ extent of the
/// element: an element may consume less than the whole buffer, in which case the
/// trailing octets belong to an enclosing container and are left alone.
pub trait StructuredElement: Sized {
    /// The wire tag that selects a concrete variant.
    type Class: Copy;

    /// Select the concrete variant to instantiate from the leading bytes of `buffer`.
    fn determine_class(buffer: &[u8]) -> Result<Self::Class>;

    /// Construct the default instance of the variant selected by `class`.
    fn new_of_class(class: Self::Class) -> Self;

    /// Fill this element in from `buffer`, and return the number of octets used.
    ///
    /// Must validate the loaded element before returning.
    fn load_from(&mut self, buffer: &[u8]) -> Result<usize>;

    /// Check field-level and containment invariants.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Return the length of the canonical encoding of this element.
    fn buffer_len(&self) -> usize;

    /// Emit the canonical encoding into `buffer`, which must be exactly
    /// [`buffer_len`](Self::buffer_len) octets long.
    ///
    /// Does not validate; use [`save`](Self::save) for that.
    fn emit(&self, buffer: &mut [u8]) -> Result<()>;

    /// Construct an element from `buffer`, returning the number of octets used
    /// alongside it.
    fn parse(buffer: &[u8]) -> Result<(usize, Self)> {
        let class = Self::determine_class(buffer)?;
        let mut element = Self::new_of_class(class);
        let len = element.load_from(buffer)?;
        Ok((len, element))
    }

    /// Construct an element from `buffer[offset..]`, reading at most `length`
    /// octets, or up to the end of the buffer when `length` is `None`.
    fn parse_at(buffer: &[u8], offset: usize, length: Option<usize>) -> Result<(usize, Self)> {
        check_len(buffer, 0, offset)?;
        let available = buffer.len().saturating_sub(offset);
        let length = length.unwrap_or(available);
        check_len(buffer, offset, length)?;
        Self::parse(&buffer[offset..offset + length]).map_err(|err| err.at_offset(offset))
    }

    /// Validate this element and return its canonical encoding.
    fn save(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let mut buffer = vec![0; self.buffer_len()];
        self.emit(&mut buffer)?;
        Ok(buffer)
    }
}

/// A node in a classification hierarchy, used to count contained elements.
///
/// Every class except the root has a parent. An element counts against the quota
/// of the most specific class registered for it, so a subclass instance uses up a
/// superclass's quota unless the subclass is registered itself.
pub trait Classify: Copy + Eq + 'static {
    /// Return the immediately enclosing class, or `None` for the root.
    fn parent(self) -> Option<Self>;

    /// Return a human-readable name, used in validation errors.
    fn name(self) -> &'static str;

    /// Query whether `self` is `ancestor` or one of its descendants.
    fn is_a(self, ancestor: Self) -> bool {
        let mut class = Some(self);
        while let Some(current) = class {
            if current == ancestor {
                return true;
            }
            class = current.parent();
        }
        false
    }
}

/// A `(min, max)` occurrence bound a container places on one class of element.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MayContain<C> {
    pub class: C,
    pub min: usize,
    pub max: usize,
}

impl<C> MayContain<C> {
    pub const fn new(class: C, min: usize, max: usize) -> Self {
        MayContain { class, min, max }
    }

    /// Any number of elements of `class`, including none.
    pub const fn any(class: C) -> Self {
        MayContain::new(class, 0, UNBOUNDED)
    }

    /// At most one element of `class`.
    pub const fn optional(class: C) -> Self {
        MayContain::new(class, 0, 1)
    }

    /// Exactly one element of `class`.
    pub const fn exactly_one(class: C) -> Self {
        MayContain::new(class, 1, 1)
    }

    /// No elements of `class`, even if an enclosing layer allows them.
    pub const fn forbidden(class: C) -> Self {
        MayContain::new(class, 0, 0)
    }
}

/// The allowed contents of one container kind: its own declarations followed by
/// those of all its ancestor kinds.
///
/// Layers are ordered most specific first. When a class is declared in more than
/// one layer, the most specific declaration wins.
#[derive(Debug, Clone, Copy)]
pub struct ContainsTable<C: 'static> {
    container: &'static str,
    layers: &'static [&'static [MayContain<C>]],
}

impl<C: Classify> ContainsTable<C> {
    pub const fn new(container: &'static str, layers: &'static [&'static [MayContain<C>]]) -> Self {
        ContainsTable { container, layers }
    }

    /// Return the name of the container kind.
    pub fn container(&self) -> &'static str {
        self.container
    }

    fn lookup(&self, class: C) -> Option<&'static MayContain<C>> {
        self.layers
            .iter()
            .flat_map(|layer| layer.iter())
            .find(|entry| entry.class == class)
    }

    /// Return the registered class an element of class `class` is counted as, or
    /// `None` if the container may not hold it.
    ///
    /// This is the most specific ancestor of `class` (including itself) that is
    /// declared anywhere in the table. A declaration with `max == 0` forbids it.
    pub fn element_class(&self, class: C) -> Option<C> {
        let mut current = Some(class);
        while let Some(candidate) = current {
            if let Some(entry) = self.lookup(candidate) {
                return if entry.max < 1 { None } else { Some(candidate) };
            }
            current = candidate.parent();
        }
        None
    }

    /// Query whether the container may hold an element of class `class`.
    pub fn may_contain(&self, class: C) -> bool {
        self.element_class(class).is_some()
    }

    /// Iterate over the effective declarations, in declaration order, skipping
    /// the ones overridden by a more specific layer.
    pub fn entries(&self) -> impl Iterator<Item = &'static MayContain<C>> + '_ {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(depth, layer)| layer.iter().map(move |entry| (depth, entry)))
            .filter(move |(depth, entry)| {
                !self.layers[..*depth]
                    .iter()
                    .any(|layer| layer.iter().any(|e| e.class == entry.class))
            })
            .map(|(_, entry)| entry)
    }

    /// Check the classes of a container's elements against the table.
    ///
    /// Every element must classify to a permitted class, and the number of
    /// elements per classified class must lie within its declared bounds.
    /// Declarations are checked in order; the first violation is reported.
    pub fn validate_contains<I>(&self, classes: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
    {
        let mut counters: Vec<(C, usize)> = Vec::new();
        for class in classes {
            let element_class = self.element_class(class).ok_or(Error::Containment {
                container: self.container,
                element: class.name(),
                violation: Violation::NotPermitted,
            })?;

            match counters.iter_mut().find(|(c, _)| *c == element_class) {
                Some((_, count)) => *count += 1,
                None => counters.push((element_class, 1)),
            }
        }

        for entry in self.entries() {
            let count = counters
                .iter()
                .find(|(c, _)| *c == entry.class)
                .map_or(0, |(_, count)| *count);
            if count > entry.max {
                return Err(Error::Containment {
                    container: self.container,
                    element: entry.class.name(),
                    violation: Violation::TooMany(entry.max),
                });
            } else if count < entry.min {
                return Err(Error::Containment {
                    container: self.container,
                    element: entry.class.name(),
                    violation: Violation::TooFew(entry.min),
                });
            }
        }

        Ok(())
    }
}
