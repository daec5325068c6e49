//! Finite acceptors over [`Word`]s.
//!
//! [`Dfa`] is a plain deterministic finite automaton. [`BiDfa`] partitions
//! its states into *left* and *right* sets and consumes the word from both
//! ends: a left state reads the leftmost remaining symbol, a right state
//! the rightmost. That lets it recognise symmetric languages a DFA cannot,
//! such as `aⁿbⁿ`.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use crate::helpers::HpmError;
use crate::words::Word;

pub type StateId = usize;
pub type SymbolId = usize;

/// Common surface of the finite acceptors.
pub trait FiniteAcceptor<S> {
    /// `(number of states, number of transitions)`.
    fn size(&self) -> (usize, usize);

    /// Whether the acceptor accepts the word.
    fn accept(&self, word: &Word<S>) -> bool;
}

/// Deterministic finite automaton. States and symbols are allocated
/// sequential identifiers; symbols are associated with caller objects.
#[derive(Debug, Clone)]
pub struct Dfa<S> {
    state_count: usize,
    alphabet: Vec<S>,
    symbol_ids: HashMap<S, SymbolId>,
    initial: StateId,
    finals: BTreeSet<StateId>,
    transitions: HashMap<(StateId, SymbolId), StateId>,
}

impl<S: Eq + Hash + Clone> Dfa<S> {
    /// A fresh automaton with a single initial state.
    pub fn new() -> Self {
        Dfa {
            state_count: 1,
            alphabet: Vec::new(),
            symbol_ids: HashMap::new(),
            initial: 0,
            finals: BTreeSet::new(),
            transitions: HashMap::new(),
        }
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    fn check_state(&self, state: StateId) -> Result<(), HpmError> {
        if state >= self.state_count {
            return Err(HpmError::InvalidInput(format!(
                "state {state} is not a valid state"
            )));
        }
        Ok(())
    }

    fn check_symbol(&self, symbol: SymbolId) -> Result<(), HpmError> {
        if symbol >= self.alphabet.len() {
            return Err(HpmError::InvalidInput(format!(
                "symbol {symbol} is not in the alphabet"
            )));
        }
        Ok(())
    }

    pub fn add_state(&mut self) -> StateId {
        self.state_count += 1;
        self.state_count - 1
    }

    pub fn add_states(&mut self, count: usize) -> Vec<StateId> {
        (0..count).map(|_| self.add_state()).collect()
    }

    /// Associate an object with a new symbol of the alphabet.
    pub fn add_symbol(&mut self, symbol: S) -> Result<SymbolId, HpmError> {
        if self.symbol_ids.contains_key(&symbol) {
            return Err(HpmError::InvalidInput(
                "symbol is already part of the alphabet".into(),
            ));
        }
        let id = self.alphabet.len();
        self.symbol_ids.insert(symbol.clone(), id);
        self.alphabet.push(symbol);
        Ok(id)
    }

    pub fn add_symbols(
        &mut self,
        symbols: impl IntoIterator<Item = S>,
    ) -> Result<Vec<SymbolId>, HpmError> {
        symbols
            .into_iter()
            .map(|symbol| self.add_symbol(symbol))
            .collect()
    }

    pub fn symbol_id(&self, symbol: &S) -> Option<SymbolId> {
        self.symbol_ids.get(symbol).copied()
    }

    pub fn set_final(&mut self, state: StateId) -> Result<(), HpmError> {
        self.check_state(state)?;
        self.finals.insert(state);
        Ok(())
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    /// Add the transition `from --symbol--> to`. At most one transition may
    /// leave a state under a given symbol.
    pub fn set_transition(
        &mut self,
        from: StateId,
        to: StateId,
        symbol: SymbolId,
    ) -> Result<(), HpmError> {
        self.check_state(from)?;
        self.check_state(to)?;
        self.check_symbol(symbol)?;
        if self.transitions.contains_key(&(from, symbol)) {
            return Err(HpmError::InvalidInput(format!(
                "there already exists a transition from {from} labelled {symbol}"
            )));
        }
        self.transitions.insert((from, symbol), to);
        Ok(())
    }

    /// The state reached by one transition, or `None` at a dead end.
    pub fn step(&self, state: StateId, symbol: SymbolId) -> Result<Option<StateId>, HpmError> {
        self.check_state(state)?;
        self.check_symbol(symbol)?;
        Ok(self.transitions.get(&(state, symbol)).copied())
    }

    /// Follow a sequence of symbols from a state; `None` as soon as any
    /// transition is missing.
    pub fn follow(
        &self,
        state: StateId,
        symbols: &[SymbolId],
    ) -> Result<Option<StateId>, HpmError> {
        self.check_state(state)?;
        let mut current = state;
        for &symbol in symbols {
            match self.step(current, symbol)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl<S: Eq + Hash + Clone> Default for Dfa<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Eq + Hash + Clone> FiniteAcceptor<S> for Dfa<S> {
    fn size(&self) -> (usize, usize) {
        (self.state_count, self.transitions.len())
    }

    fn accept(&self, word: &Word<S>) -> bool {
        let Some(symbols) = word
            .iter()
            .map(|symbol| self.symbol_id(symbol))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };
        match self.follow(self.initial, &symbols) {
            Ok(Some(state)) => self.is_final(state),
            _ => false,
        }
    }
}

/// Bidirectional deterministic finite automaton.
///
/// States are partitioned into a left and a right set. Left states consume
/// the leftmost remaining symbol of the word, right states the rightmost.
#[derive(Debug, Clone)]
pub struct BiDfa<S> {
    dfa: Dfa<S>,
    left: BTreeSet<StateId>,
    right: BTreeSet<StateId>,
}

impl<S: Eq + Hash + Clone> BiDfa<S> {
    /// A fresh automaton whose single initial state is a left state.
    pub fn new() -> Self {
        let dfa = Dfa::new();
        BiDfa {
            left: BTreeSet::from([dfa.initial()]),
            right: BTreeSet::new(),
            dfa,
        }
    }

    pub fn initial(&self) -> StateId {
        self.dfa.initial()
    }

    pub fn is_left(&self, state: StateId) -> bool {
        self.left.contains(&state)
    }

    pub fn is_right(&self, state: StateId) -> bool {
        self.right.contains(&state)
    }

    pub fn add_left(&mut self) -> StateId {
        let state = self.dfa.add_state();
        self.left.insert(state);
        state
    }

    pub fn add_right(&mut self) -> StateId {
        let state = self.dfa.add_state();
        self.right.insert(state);
        state
    }

    /// Move a state to the other side of the partition.
    pub fn swap(&mut self, state: StateId) -> Result<(), HpmError> {
        if self.left.remove(&state) {
            self.right.insert(state);
            Ok(())
        } else if self.right.remove(&state) {
            self.left.insert(state);
            Ok(())
        } else {
            Err(HpmError::InvalidInput(format!(
                "{state} is not a valid state identifier"
            )))
        }
    }

    pub fn add_symbol(&mut self, symbol: S) -> Result<SymbolId, HpmError> {
        self.dfa.add_symbol(symbol)
    }

    pub fn set_final(&mut self, state: StateId) -> Result<(), HpmError> {
        self.dfa.set_final(state)
    }

    pub fn set_transition(
        &mut self,
        from: StateId,
        to: StateId,
        symbol: SymbolId,
    ) -> Result<(), HpmError> {
        self.dfa.set_transition(from, to, symbol)
    }

    /// Follow a word from a state, consuming the leftmost symbol in left
    /// states and the rightmost in right states. Unknown symbols are an
    /// `InvalidInput`.
    pub fn follow(&self, state: StateId, word: &Word<S>) -> Result<Option<StateId>, HpmError> {
        self.dfa.check_state(state)?;
        let mut current = state;
        let mut front = 0;
        let mut back = word.len();
        while front < back {
            let position = if self.is_left(current) {
                front += 1;
                front - 1
            } else {
                back -= 1;
                back
            };
            let symbol = self.dfa.symbol_id(&word[position]).ok_or_else(|| {
                HpmError::InvalidInput("symbol is not in the alphabet".into())
            })?;
            match self.dfa.step(current, symbol)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl<S: Eq + Hash + Clone> Default for BiDfa<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Eq + Hash + Clone> FiniteAcceptor<S> for BiDfa<S> {
    fn size(&self) -> (usize, usize) {
        self.dfa.size()
    }

    fn accept(&self, word: &Word<S>) -> bool {
        if word.iter().any(|symbol| self.dfa.symbol_id(symbol).is_none()) {
            return false;
        }
        match self.follow(self.initial(), word) {
            Ok(Some(state)) => self.dfa.is_final(state),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfa_creation() {
        let dfa: Dfa<char> = Dfa::new();
        assert_eq!(dfa.size(), (1, 0));
        assert_eq!(dfa.initial(), 0);
        assert!(!dfa.is_final(0));
    }

    #[test]
    fn test_dfa_symbols_and_states() {
        let mut dfa = Dfa::new();
        let symbols = dfa.add_symbols(['a', 'b']).unwrap();
        assert_eq!(symbols, vec![0, 1]);
        assert_eq!(dfa.symbol_id(&'b'), Some(1));
        assert!(dfa.add_symbol('a').is_err());

        let states = dfa.add_states(2);
        assert_eq!(states, vec![1, 2]);
        assert_eq!(dfa.size(), (3, 0));
    }

    #[test]
    fn test_dfa_transitions() {
        // Accepts (ab)*: 0 --a--> 1 --b--> 0, final 0.
        let mut dfa = Dfa::new();
        let a = dfa.add_symbol('a').unwrap();
        let b = dfa.add_symbol('b').unwrap();
        let odd = dfa.add_state();
        dfa.set_transition(0, odd, a).unwrap();
        dfa.set_transition(odd, 0, b).unwrap();
        dfa.set_final(0).unwrap();

        assert!(dfa.set_transition(0, 0, a).is_err());
        assert_eq!(dfa.step(0, a).unwrap(), Some(odd));
        assert_eq!(dfa.step(0, b).unwrap(), None);
        assert!(dfa.step(9, a).is_err());
        assert!(dfa.step(0, 9).is_err());

        assert_eq!(dfa.follow(0, &[a, b, a, b]).unwrap(), Some(0));
        assert_eq!(dfa.follow(0, &[a, a]).unwrap(), None);

        assert!(dfa.accept(&Word::new()));
        assert!(dfa.accept(&Word::from(vec!['a', 'b'])));
        assert!(dfa.accept(&(&Word::from(vec!['a', 'b']) * 5)));
        assert!(!dfa.accept(&Word::from(vec!['a'])));
        assert!(!dfa.accept(&Word::from(vec!['b', 'a'])));
        // A word over unknown symbols is rejected outright.
        assert!(!dfa.accept(&Word::from(vec!['c'])));
    }

    #[test]
    fn test_bidfa_creation() {
        let bidfa: BiDfa<char> = BiDfa::new();
        assert_eq!(bidfa.size(), (1, 0));
        assert!(bidfa.is_left(bidfa.initial()));
        assert!(!bidfa.is_right(bidfa.initial()));
    }

    #[test]
    fn test_bidfa_swap() {
        let mut bidfa: BiDfa<char> = BiDfa::new();
        let state = bidfa.add_right();
        bidfa.swap(state).unwrap();
        assert!(bidfa.is_left(state));
        bidfa.swap(state).unwrap();
        assert!(bidfa.is_right(state));
        assert!(bidfa.swap(9).is_err());
    }

    #[test]
    fn test_bidfa_accepts_a_n_b_n() {
        // Left state 0 consumes an `a` from the front, right state 1
        // consumes a `b` from the back.
        let mut bidfa = BiDfa::new();
        let a = bidfa.add_symbol('a').unwrap();
        let b = bidfa.add_symbol('b').unwrap();
        let right = bidfa.add_right();
        bidfa.set_transition(0, right, a).unwrap();
        bidfa.set_transition(right, 0, b).unwrap();
        bidfa.set_final(0).unwrap();

        assert!(bidfa.accept(&Word::new()));
        assert!(bidfa.accept(&Word::from(vec!['a', 'a', 'b', 'b'])));
        let a10b10 = &(&Word::from(vec!['a']) * 10) + &(&Word::from(vec!['b']) * 10);
        assert!(bidfa.accept(&a10b10));

        assert!(!bidfa.accept(&Word::from(vec!['a'])));
        assert!(!bidfa.accept(&Word::from(vec!['b', 'a'])));
        assert!(!bidfa.accept(&Word::from(vec!['a', 'b', 'b'])));
        assert!(!bidfa.accept(&Word::from(vec!['a', 'b', 'c'])));
    }

    #[test]
    fn test_bidfa_follow() {
        let mut bidfa = BiDfa::new();
        let a = bidfa.add_symbol('a').unwrap();
        let b = bidfa.add_symbol('b').unwrap();
        let right = bidfa.add_right();
        bidfa.set_transition(0, right, a).unwrap();
        bidfa.set_transition(right, 0, b).unwrap();

        assert_eq!(
            bidfa.follow(0, &Word::from(vec!['a', 'b'])).unwrap(),
            Some(0)
        );
        assert_eq!(bidfa.follow(0, &Word::from(vec!['a'])).unwrap(), Some(right));
        // Dead end: a right state with no `a` transition.
        assert_eq!(bidfa.follow(0, &Word::from(vec!['a', 'a'])).unwrap(), None);
        assert!(bidfa.follow(0, &Word::from(vec!['x'])).is_err());
    }
}
