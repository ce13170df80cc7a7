use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::monad::Monad;

/// An immutable singly linked list.
///
/// ```text
/// data List a = Empty | Node a (List a)
/// ```
///
/// Each node owns its tail, so two lists never share nodes. `bind` is flat-map: the
/// continuation runs once per element and the resulting lists are concatenated in element
/// order.
///
/// Dropping, cloning, comparing and hashing walk the nodes in a loop, so the length of a list
/// is bounded by memory rather than by the stack.
pub struct List<T> {
    head: Link<T>,
}

type Link<T> = Option<Box<Node<T>>>;

struct Node<T> {
    value: T,
    next: Link<T>,
}

impl<T> List<T> {
    pub fn empty() -> Self {
        List { head: None }
    }

    pub fn singleton(value: T) -> Self {
        List::cons(value, List::empty())
    }

    pub fn cons(value: T, mut tail: List<T>) -> Self {
        List {
            head: Some(Box::new(Node {
                value,
                next: tail.head.take(),
            })),
        }
    }

    /// Builds a list from a plain enumeration, keeping the order.
    pub fn of(items: impl IntoIterator<Item = T>) -> Self {
        items.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn head(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.value)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            node: self.head.as_deref(),
        }
    }

    /// Applies `f` to every element, preserving order and length.
    pub fn fmap<U>(self, f: impl FnMut(T) -> U) -> List<U> {
        self.into_iter().map(f).collect()
    }

    /// Right-associative concatenation: the nodes of `self` are rebuilt in front of `other`.
    pub fn concat(self, other: List<T>) -> List<T> {
        let front: Vec<T> = self.into_iter().collect();
        front
            .into_iter()
            .rev()
            .fold(other, |tail, value| List::cons(value, tail))
    }

    /// Flattens a list of lists, preserving the order of both levels.
    pub fn join(lists: List<List<T>>) -> List<T> {
        let parts: Vec<List<T>> = lists.into_iter().collect();
        parts
            .into_iter()
            .rev()
            .fold(List::empty(), |acc, part| part.concat(acc))
    }

    pub fn try_bind<B, E>(
        self,
        g: impl FnMut(T) -> Result<List<B>, E>,
    ) -> Result<List<B>, E> {
        let parts: List<List<B>> = self.into_iter().map(g).collect::<Result<_, E>>()?;
        Ok(List::join(parts))
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::empty()
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: Hash> Hash for List<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0usize;
        for value in self.iter() {
            value.hash(state);
            len += 1;
        }
        state.write_usize(len);
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Monad for List<T> {
    type Item = T;
    type Wrapped<B> = List<B>;

    fn unit(value: T) -> Self {
        List::singleton(value)
    }

    fn bind<B, G>(self, g: G) -> List<B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(T) -> List<B> + Send + Sync + 'static,
    {
        List::join(self.fmap(g))
    }
}

pub struct Iter<'a, T> {
    node: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.node?;
        self.node = node.next.as_deref();
        Some(&node.value)
    }
}

/// Unlinks nodes front to back; whatever is left drops with the list.
pub struct IntoIter<T> {
    list: List<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = *self.list.head.take()?;
        self.list.head = node.next;
        Some(node.value)
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(List::empty(), |tail, value| List::cons(value, tail))
    }
}

impl<T: fmt::Display> fmt::Display for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "List[")?;
        for (index, value) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl<T: Serialize> Serialize for List<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_keeps_enumeration_order() {
        let list = List::of([1, 2, 3]);
        assert_eq!(
            list,
            List::cons(1, List::cons(2, List::singleton(3)))
        );
        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), Some(&1));
        assert_eq!(list.to_string(), "List[1, 2, 3]");
    }

    #[test]
    fn empty_list_displays_brackets() {
        assert_eq!(List::<i32>::empty().to_string(), "List[]");
        assert!(List::<i32>::of([]).is_empty());
    }

    #[test]
    fn concat_and_join_preserve_order() {
        assert_eq!(List::of([1, 2]).concat(List::of([3])), List::of([1, 2, 3]));
        let nested = List::of([List::of([1]), List::empty(), List::of([2, 3])]);
        assert_eq!(List::join(nested), List::of([1, 2, 3]));
    }

    #[test]
    fn bind_is_flat_map_in_element_order() {
        let result = List::of([1, 2, 3]).bind(|x| List::of([x, x * 10]));
        assert_eq!(result, List::of([1, 10, 2, 20, 3, 30]));
    }

    #[test]
    fn bind_to_empty_drops_elements() {
        let result = List::of([1, 2, 3, 4]).bind(|x| {
            if x % 2 == 0 {
                List::singleton(x)
            } else {
                List::empty()
            }
        });
        assert_eq!(result, List::of([2, 4]));
    }

    #[test]
    fn fmap_preserves_length() {
        let list = List::of(["a", "bb", "ccc"]).fmap(str::len);
        assert_eq!(list, List::of([1, 2, 3]));
    }

    #[test]
    fn long_lists_do_not_recurse() {
        let list = List::of(0..1_000_000u32);
        let copy = list.clone();
        assert_eq!(list, copy);
        assert_ne!(list, List::of(0..999_999u32));
        assert!(format!("{copy:?}").ends_with("999998, 999999]"));
        drop(list);
        assert_eq!(copy.into_iter().last(), Some(999_999));
    }

    #[test]
    fn try_bind_stops_on_first_error() {
        let mut seen = Vec::new();
        let result = List::of([1, 2, 3]).try_bind(|x| {
            seen.push(x);
            if x == 2 { Err("two") } else { Ok(List::singleton(x)) }
        });
        assert_eq!(result, Err("two"));
        assert_eq!(seen, vec![1, 2]);
    }
}
