//! Nested words: linear words with a hierarchical call/return structure.
//!
//! A [`MatchingRelation`] classifies the positions of a word as *internal*,
//! *calls* or *returns* and pairs calls with later returns. Calls without a
//! return (and returns without a call) are *pending*. Matches never cross.
//!
//! A [`NestedWord`] is a word together with a matching relation of the same
//! length. It round-trips through a flat *tagged sequence* in which `<`
//! marks the next symbol as a call and `>` marks the previous symbol as a
//! return.
//!
//! # Examples
//!
//! ```
//! use hpm::nested::NestedWord;
//!
//! let nw = NestedWord::from_tagged_str("<ab>c").unwrap();
//! assert_eq!(nw.len(), 3);
//! assert!(nw.matching().is_call(0));
//! assert!(nw.matching().is_return(1));
//! assert!(nw.matching().is_internal(2));
//! assert_eq!(nw.to_tagged_string(), "<ab>c");
//! ```

use std::collections::BTreeSet;

use crate::helpers::HpmError;

/// The partner of one position, on one side of the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Partner {
    /// The position is not a call (resp. return) on this side.
    Unset,
    /// The position is a call (resp. return) without a partner.
    Pending,
    /// The matched partner position.
    Matched(usize),
}

/// A call/return pair; either side may be pending (`None`).
pub type Match = (Option<usize>, Option<usize>);

/// Call/return structure over the positions `0..len`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MatchingRelation {
    /// Per position: the return partner, when the position is a call.
    return_successors: Vec<Partner>,
    /// Per position: the call partner, when the position is a return.
    call_predecessors: Vec<Partner>,
}

fn crosses(new: Match, existing: Match) -> bool {
    let (i, j) = new;
    let (call, ret) = existing;
    match (i, j, call, ret) {
        // Two pending calls, or two pending returns, never cross.
        (None, _, None, _) | (_, None, _, None) => false,
        (None, None, _, _) | (_, _, None, None) => false,
        // A pending return reaches back to the start; a pending call
        // reaches forward to the end.
        (None, Some(j), Some(call), None) => call < j,
        (None, Some(j), Some(call), Some(ret)) => call < j && j < ret,
        (Some(i), None, None, Some(ret)) => i < ret,
        (Some(i), None, Some(call), Some(ret)) => call < i && i < ret,
        (Some(i), Some(j), None, Some(ret)) => i < ret && ret < j,
        (Some(i), Some(j), Some(call), None) => i < call && call < j,
        (Some(i), Some(j), Some(call), Some(ret)) => {
            (i < call && call <= j && j <= ret) || (call < i && i <= ret && ret <= j)
        }
    }
}

impl MatchingRelation {
    pub fn new(length: usize) -> Self {
        MatchingRelation {
            return_successors: vec![Partner::Unset; length],
            call_predecessors: vec![Partner::Unset; length],
        }
    }

    pub fn len(&self) -> usize {
        self.return_successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.return_successors.is_empty()
    }

    /// Iterate over the positions in order.
    pub fn positions(&self) -> std::ops::Range<usize> {
        0..self.len()
    }

    pub fn is_call(&self, position: usize) -> bool {
        self.return_successors
            .get(position)
            .is_some_and(|partner| *partner != Partner::Unset)
    }

    pub fn is_return(&self, position: usize) -> bool {
        self.call_predecessors
            .get(position)
            .is_some_and(|partner| *partner != Partner::Unset)
    }

    pub fn is_internal(&self, position: usize) -> bool {
        !self.is_call(position) && !self.is_return(position)
    }

    pub fn is_pending(&self, position: usize) -> bool {
        self.return_successors.get(position) == Some(&Partner::Pending)
            || self.call_predecessors.get(position) == Some(&Partner::Pending)
    }

    fn check_position(&self, position: usize) -> Result<(), HpmError> {
        if position >= self.len() {
            return Err(HpmError::Internal(format!(
                "position {position} is out of bounds for length {}",
                self.len()
            )));
        }
        Ok(())
    }

    /// Record a match between a call and a return position. Either side may
    /// be `None`, leaving the other side pending. The new match must not
    /// cross any existing match.
    pub fn set_match(&mut self, call: Option<usize>, ret: Option<usize>) -> Result<Match, HpmError> {
        if call.is_none() && ret.is_none() {
            return Err(HpmError::InvalidInput(
                "at least one side of a match must be an actual position".into(),
            ));
        }
        if let (Some(c), Some(r)) = (call, ret) {
            if c == r {
                return Err(HpmError::InvalidInput(format!(
                    "position {c} cannot be both call and return"
                )));
            }
            if c > r {
                return Err(HpmError::InvalidInput(format!(
                    "nestings only go forward, but position {r} precedes position {c}"
                )));
            }
        }
        for position in [call, ret].into_iter().flatten() {
            self.check_position(position)?;
        }
        for existing in self.matches() {
            if crosses((call, ret), existing) {
                return Err(HpmError::Incomparable(format!(
                    "match ({call:?}, {ret:?}) crosses existing match {existing:?}"
                )));
            }
        }
        self.set_match_unchecked(call, ret);
        Ok((call, ret))
    }

    /// Write both sides of a match without validation. Callers guarantee
    /// positions are in bounds and no crossing can arise.
    fn set_match_unchecked(&mut self, call: Option<usize>, ret: Option<usize>) {
        if let Some(c) = call {
            self.return_successors[c] = match ret {
                Some(r) => Partner::Matched(r),
                None => Partner::Pending,
            };
        }
        if let Some(r) = ret {
            self.call_predecessors[r] = match call {
                Some(c) => Partner::Matched(c),
                None => Partner::Pending,
            };
        }
    }

    /// The match a position belongs to, or `None` for an internal position.
    pub fn get_match(&self, position: usize) -> Result<Option<Match>, HpmError> {
        self.check_position(position)?;
        if self.is_call(position) {
            let ret = match self.return_successors[position] {
                Partner::Matched(r) => Some(r),
                _ => None,
            };
            return Ok(Some((Some(position), ret)));
        }
        if self.is_return(position) {
            let call = match self.call_predecessors[position] {
                Partner::Matched(c) => Some(c),
                _ => None,
            };
            return Ok(Some((call, Some(position))));
        }
        Ok(None)
    }

    /// All matches, pending ones included, ordered.
    pub fn matches(&self) -> BTreeSet<Match> {
        self.positions()
            .filter_map(|position| {
                self.get_match(position)
                    .expect("positions are in bounds by construction")
            })
            .collect()
    }

    /// Call positions whose return is still pending, in order.
    pub fn pending_calls(&self) -> BTreeSet<usize> {
        self.positions()
            .filter(|&position| self.return_successors[position] == Partner::Pending)
            .collect()
    }

    /// Return positions whose call is still pending, in order.
    pub fn pending_returns(&self) -> BTreeSet<usize> {
        self.positions()
            .filter(|&position| self.call_predecessors[position] == Partner::Pending)
            .collect()
    }

    /// Remove the match a call or return position belongs to. Fails on an
    /// internal position.
    pub fn remove_match(&mut self, position: usize) -> Result<(), HpmError> {
        match self.get_match(position)? {
            Some((call, ret)) => {
                if let Some(c) = call {
                    self.return_successors[c] = Partner::Unset;
                }
                if let Some(r) = ret {
                    self.call_predecessors[r] = Partner::Unset;
                }
                Ok(())
            }
            None => Err(HpmError::InvalidInput(format!(
                "position {position} is an internal position"
            ))),
        }
    }

    /// Grow the relation by `length` internal positions.
    pub fn extend(&mut self, length: usize) {
        self.return_successors
            .extend(std::iter::repeat_n(Partner::Unset, length));
        self.call_predecessors
            .extend(std::iter::repeat_n(Partner::Unset, length));
    }

    /// The sub-relation over `[start, end)`. Matches crossing the slice
    /// boundary become pending on the side left outside.
    pub fn slice(&self, start: usize, end: usize) -> Result<MatchingRelation, HpmError> {
        if start > end || end > self.len() {
            return Err(HpmError::InvalidInput(format!(
                "slice {start}..{end} is out of bounds for length {}",
                self.len()
            )));
        }
        let mut sub = MatchingRelation::new(end - start);
        for position in start..end {
            if self.is_call(position) {
                let call = Some(position - start);
                let ret = match self.return_successors[position] {
                    Partner::Matched(r) if r < end => Some(r - start),
                    _ => None,
                };
                sub.set_match_unchecked(call, ret);
            } else if self.is_return(position) {
                // A return whose call lies inside the slice was already
                // written from the call side.
                let outside = match self.call_predecessors[position] {
                    Partner::Matched(c) => c < start,
                    Partner::Pending => true,
                    Partner::Unset => unreachable!("is_return checked"),
                };
                if outside {
                    sub.set_match_unchecked(None, Some(position - start));
                }
            }
        }
        Ok(sub)
    }
}

/// One element of a tagged sequence: a call opener, a return closer, or a
/// plain symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tagged<S> {
    Call,
    Return,
    Symbol(S),
}

/// A word together with a matching relation over its positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NestedWord<S> {
    word: Vec<S>,
    matching: MatchingRelation,
}

impl<S> Default for NestedWord<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> NestedWord<S> {
    pub fn new() -> Self {
        NestedWord {
            word: Vec::new(),
            matching: MatchingRelation::new(0),
        }
    }

    /// Build from a word and a matching relation of equal length.
    pub fn from_parts(word: Vec<S>, matching: MatchingRelation) -> Result<Self, HpmError> {
        if word.len() != matching.len() {
            return Err(HpmError::InvalidInput(format!(
                "word length {} and matching relation length {} differ",
                word.len(),
                matching.len()
            )));
        }
        Ok(NestedWord { word, matching })
    }

    pub fn len(&self) -> usize {
        self.word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    pub fn word(&self) -> &[S] {
        &self.word
    }

    pub fn matching(&self) -> &MatchingRelation {
        &self.matching
    }

    pub fn symbol(&self, position: usize) -> Option<&S> {
        self.word.get(position)
    }

    /// Append symbols as internal positions.
    pub fn add_internals(&mut self, symbols: &[S])
    where
        S: Clone,
    {
        self.word.extend_from_slice(symbols);
        self.matching.extend(symbols.len());
    }

    /// Append symbols as pending call positions.
    pub fn add_calls(&mut self, symbols: &[S])
    where
        S: Clone,
    {
        self.add_internals(symbols);
        for offset in 1..=symbols.len() {
            self.matching
                .set_match_unchecked(Some(self.word.len() - offset), None);
        }
    }

    /// Append symbols as return positions, matching them to the most recent
    /// pending calls first. Returns beyond the pending calls stay pending.
    pub fn add_returns(&mut self, symbols: &[S])
    where
        S: Clone,
    {
        self.add_internals(symbols);
        let pending = self
            .matching
            .pending_calls()
            .into_iter()
            .rev()
            .collect::<Vec<_>>();
        for index in 0..symbols.len() {
            let call = pending.get(index).copied();
            let ret = self.word.len() - symbols.len() + index;
            self.matching.set_match_unchecked(call, Some(ret));
        }
    }

    pub fn add_internal(&mut self, symbol: S)
    where
        S: Clone,
    {
        self.add_internals(std::slice::from_ref(&symbol));
    }

    pub fn add_call(&mut self, symbol: S)
    where
        S: Clone,
    {
        self.add_calls(std::slice::from_ref(&symbol));
    }

    pub fn add_return(&mut self, symbol: S)
    where
        S: Clone,
    {
        self.add_returns(std::slice::from_ref(&symbol));
    }
}

impl<S: Clone> NestedWord<S> {
    /// Parse a tagged sequence: `Call` marks the next symbol as a call,
    /// `Return` marks the previous symbol as a return. Unclosed calls end up
    /// pending.
    pub fn from_tagged(tagged: &[Tagged<S>]) -> Result<Self, HpmError> {
        let word = tagged
            .iter()
            .filter_map(|item| match item {
                Tagged::Symbol(symbol) => Some(symbol.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        let mut matching = MatchingRelation::new(word.len());
        let mut stack: Vec<usize> = Vec::new();
        let mut counter = 0usize;
        for item in tagged {
            match item {
                Tagged::Call => stack.push(counter),
                Tagged::Return => {
                    let call = stack.pop();
                    matching.set_match(call, Some(counter.saturating_sub(1)))?;
                }
                Tagged::Symbol(_) => counter += 1,
            }
        }
        while let Some(call) = stack.pop() {
            matching.set_match(Some(call), None)?;
        }
        NestedWord::from_parts(word, matching)
    }

    /// Flatten to a tagged sequence; inverse of [`NestedWord::from_tagged`].
    pub fn to_tagged(&self) -> Vec<Tagged<S>> {
        let mut tagged = Vec::with_capacity(self.word.len());
        for (position, symbol) in self.word.iter().enumerate() {
            if self.matching.is_call(position) {
                tagged.push(Tagged::Call);
            }
            tagged.push(Tagged::Symbol(symbol.clone()));
            if self.matching.is_return(position) {
                tagged.push(Tagged::Return);
            }
        }
        tagged
    }

    /// Concatenate through the tagged encodings, so pending calls of `self`
    /// can be closed by pending returns of `other`.
    pub fn concat(&self, other: &NestedWord<S>) -> Result<NestedWord<S>, HpmError> {
        let mut tagged = self.to_tagged();
        tagged.extend(other.to_tagged());
        NestedWord::from_tagged(&tagged)
    }

    /// The nested subword over `[start, end)`; matches crossing the
    /// boundary become pending.
    pub fn slice(&self, start: usize, end: usize) -> Result<NestedWord<S>, HpmError> {
        if start > end || end > self.word.len() {
            return Err(HpmError::InvalidInput(format!(
                "slice {start}..{end} is out of bounds for length {}",
                self.word.len()
            )));
        }
        NestedWord::from_parts(self.word[start..end].to_vec(), self.matching.slice(start, end)?)
    }
}

impl NestedWord<char> {
    /// Parse a tagged word like `"<ab>c"`.
    pub fn from_tagged_str(tagged: &str) -> Result<Self, HpmError> {
        let tagged = tagged
            .chars()
            .map(|c| match c {
                '<' => Tagged::Call,
                '>' => Tagged::Return,
                symbol => Tagged::Symbol(symbol),
            })
            .collect::<Vec<_>>();
        NestedWord::from_tagged(&tagged)
    }

    /// Render the tagged word as a string.
    pub fn to_tagged_string(&self) -> String {
        self.to_tagged()
            .iter()
            .map(|item| match item {
                Tagged::Call => '<',
                Tagged::Return => '>',
                Tagged::Symbol(symbol) => *symbol,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_set_match_validation() {
        let mut matching = MatchingRelation::new(4);
        assert!(matching.set_match(None, None).is_err());
        assert!(matching.set_match(Some(1), Some(1)).is_err());
        assert!(matching.set_match(Some(2), Some(1)).is_err());
        assert!(matching.set_match(Some(5), Some(6)).is_err());
        assert!(matching.set_match(Some(0), Some(3)).is_ok());
        assert!(matching.is_call(0));
        assert!(matching.is_return(3));
        assert!(matching.is_internal(1));
    }

    #[test]
    fn test_crossing_closed_matches() {
        // (0, 2) then (1, 3) would interleave.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(0), Some(2)).unwrap();
        assert!(matching.set_match(Some(1), Some(3)).is_err());
        // Nesting inside is fine.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(0), Some(3)).unwrap();
        matching.set_match(Some(1), Some(2)).unwrap();
        // Disjoint matches are fine.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(0), Some(1)).unwrap();
        matching.set_match(Some(2), Some(3)).unwrap();
    }

    #[test]
    fn test_crossing_pending_sides() {
        // A pending call extends to the end: (None, r) crosses (c, None)
        // iff c < r.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(1), None).unwrap();
        assert!(matching.set_match(None, Some(3)).is_err());
        assert!(matching.set_match(None, Some(0)).is_ok());

        // (c, None) crosses a closed match strictly containing c.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(0), Some(3)).unwrap();
        assert!(matching.set_match(Some(1), None).is_err());

        // A pending return before a closed match is fine.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(1), Some(3)).unwrap();
        assert!(matching.set_match(None, Some(0)).is_ok());
        // But not one landing inside it.
        let mut matching = MatchingRelation::new(4);
        matching.set_match(Some(0), Some(3)).unwrap();
        assert!(matching.set_match(None, Some(2)).is_err());
    }

    #[test]
    fn test_no_crossing_invariant() {
        // Whatever subset of attempts succeeds, no two surviving matches
        // cross under the exact rule.
        let attempts = [
            (Some(0), Some(4)),
            (Some(1), Some(3)),
            (Some(2), Some(5)),
            (None, Some(2)),
            (Some(5), None),
            (Some(1), Some(5)),
        ];
        let mut matching = MatchingRelation::new(6);
        for (call, ret) in attempts {
            let _ = matching.set_match(call, ret);
        }
        let matches = matching.matches().into_iter().collect::<Vec<_>>();
        for (index, &a) in matches.iter().enumerate() {
            for &b in &matches[index + 1..] {
                assert!(!crosses(a, b), "{a:?} crosses {b:?}");
            }
        }
    }

    #[test]
    fn test_get_match_and_pending() {
        let mut matching = MatchingRelation::new(5);
        matching.set_match(Some(0), Some(2)).unwrap();
        matching.set_match(Some(3), None).unwrap();
        matching.set_match(None, Some(1)).unwrap();

        assert_eq!(matching.get_match(0).unwrap(), Some((Some(0), Some(2))));
        assert_eq!(matching.get_match(2).unwrap(), Some((Some(0), Some(2))));
        assert_eq!(matching.get_match(3).unwrap(), Some((Some(3), None)));
        assert_eq!(matching.get_match(1).unwrap(), Some((None, Some(1))));
        assert_eq!(matching.get_match(4).unwrap(), None);
        assert!(matching.get_match(9).is_err());

        assert_eq!(matching.pending_calls().into_iter().collect::<Vec<_>>(), vec![3]);
        assert_eq!(matching.pending_returns().into_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(matching.matches().len(), 3);
    }

    #[test]
    fn test_remove_match() {
        let mut matching = MatchingRelation::new(3);
        matching.set_match(Some(0), Some(2)).unwrap();
        matching.remove_match(2).unwrap();
        assert!(matching.is_internal(0));
        assert!(matching.is_internal(2));
        assert!(matching.remove_match(1).is_err());
    }

    #[test]
    fn test_extend() {
        let mut matching = MatchingRelation::new(2);
        matching.set_match(Some(0), Some(1)).unwrap();
        matching.extend(2);
        assert_eq!(matching.len(), 4);
        assert!(matching.is_internal(2));
        assert!(matching.is_internal(3));
        matching.set_match(Some(2), Some(3)).unwrap();
    }

    #[test]
    fn test_slice_matching() {
        let mut matching = MatchingRelation::new(6);
        matching.set_match(Some(0), Some(5)).unwrap();
        matching.set_match(Some(1), Some(2)).unwrap();
        matching.set_match(Some(3), None).unwrap();

        // The inner match survives; the enclosing one loses both sides.
        let sub = matching.slice(1, 4).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.get_match(0).unwrap(), Some((Some(0), Some(1))));
        assert!(sub.is_call(2));
        assert!(sub.is_pending(2));

        // The call at 0 loses its return, the return at 5 loses its call.
        let head = matching.slice(0, 3).unwrap();
        assert_eq!(head.get_match(0).unwrap(), Some((Some(0), None)));
        let tail = matching.slice(4, 6).unwrap();
        assert_eq!(tail.get_match(1).unwrap(), Some((None, Some(1))));

        assert!(matching.slice(2, 9).is_err());
        assert!(matching.slice(4, 2).is_err());
    }

    #[test]
    fn test_tagged_round_trip() {
        for tagged in ["", "abc", "<ab>c", "<a<bc>d>e", "<a<bc", "a>bc", "<ab><cd>"] {
            let nw = NestedWord::from_tagged_str(tagged).unwrap();
            assert_eq!(nw.to_tagged_string(), tagged, "round trip of {tagged:?}");
            let reparsed = NestedWord::from_tagged_str(&nw.to_tagged_string()).unwrap();
            assert_eq!(nw, reparsed);
        }
    }

    #[test]
    fn test_tagged_parsing() {
        let nw = NestedWord::from_tagged_str("<a<bc>d>e").unwrap();
        assert_eq!(nw.word(), &['a', 'b', 'c', 'd', 'e']);
        assert_eq!(nw.matching().get_match(0).unwrap(), Some((Some(0), Some(3))));
        assert_eq!(nw.matching().get_match(1).unwrap(), Some((Some(1), Some(2))));
        assert!(nw.matching().is_internal(4));

        // Unmatched closer becomes a pending return.
        let nw = NestedWord::from_tagged_str("ab>").unwrap();
        assert_eq!(nw.matching().get_match(1).unwrap(), Some((None, Some(1))));
        // Unclosed opener becomes a pending call.
        let nw = NestedWord::from_tagged_str("<ab").unwrap();
        assert_eq!(nw.matching().get_match(0).unwrap(), Some((Some(0), None)));
    }

    #[test]
    fn test_extend_operations() {
        let mut nw = NestedWord::new();
        nw.add_internals(&[10usize, 11]);
        assert!(nw.matching().is_internal(0));

        nw.add_calls(&[20, 21]);
        assert_eq!(
            nw.matching().pending_calls().into_iter().collect::<Vec<_>>(),
            vec![2, 3]
        );

        // One return closes the most recent pending call.
        nw.add_returns(&[30]);
        assert_eq!(nw.matching().get_match(3).unwrap(), Some((Some(3), Some(4))));
        assert_eq!(
            nw.matching().pending_calls().into_iter().collect::<Vec<_>>(),
            vec![2]
        );

        // Two more returns: one closes the remaining call, one stays
        // pending.
        nw.add_returns(&[31, 32]);
        assert_eq!(nw.matching().get_match(2).unwrap(), Some((Some(2), Some(5))));
        assert_eq!(nw.matching().get_match(6).unwrap(), Some((None, Some(6))));
    }

    #[test]
    fn test_concat() {
        let left = NestedWord::from_tagged_str("<ab").unwrap();
        let right = NestedWord::from_tagged_str("c>d").unwrap();
        let joined = left.concat(&right).unwrap();
        assert_eq!(joined.to_tagged_string(), "<abc>d");
        assert_eq!(joined.matching().get_match(0).unwrap(), Some((Some(0), Some(2))));

        let empty = NestedWord::new();
        assert_eq!(empty.concat(&left).unwrap(), left);
    }

    #[test]
    fn test_slice_nested_word() {
        let nw = NestedWord::from_tagged_str("<a<bc>d>e").unwrap();
        let sub = nw.slice(1, 4).unwrap();
        assert_eq!(sub.to_tagged_string(), "<bc>d>");
        // The enclosing match of `a..d` is cut away entirely; slicing off
        // the last symbol leaves its call pending.
        let head = nw.slice(0, 2).unwrap();
        assert_eq!(head.to_tagged_string(), "<a<b");
    }

    #[test]
    fn test_equality_and_hash() {
        let a = NestedWord::from_tagged_str("<ab>c").unwrap();
        let b = NestedWord::from_tagged_str("<ab>c").unwrap();
        let c = NestedWord::from_tagged_str("ab c").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
        assert!(!seen.contains(&c));

        // Same word, different matching: not equal.
        let plain = NestedWord::from_tagged_str("ab").unwrap();
        let called = NestedWord::from_tagged_str("<ab").unwrap();
        assert_ne!(plain, called);
    }

    #[test]
    fn test_from_parts_length_mismatch() {
        assert!(NestedWord::from_parts(vec!['a'], MatchingRelation::new(2)).is_err());
    }
}
