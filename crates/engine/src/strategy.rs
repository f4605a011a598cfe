//! Query strategy algebra
//!
//! Composable predicates over resolved players, used by the compartment's
//! typed queries (`all`, `one`). [`MatchAll`] is the default; richer
//! strategies compose from [`Where`]/[`Playing`] through the combinators
//! on [`QueryStrategyExt`].

use crate::compartment::Compartment;
use crate::player::Player;
use std::marker::PhantomData;

/// Predicate deciding whether a player is acceptable to a typed query
pub trait QueryStrategy {
    /// Whether `player` survives the filter
    fn admits(&self, compartment: &Compartment, player: Player) -> bool;
}

/// Admits every player (the default strategy)
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAll;

impl QueryStrategy for MatchAll {
    fn admits(&self, _compartment: &Compartment, _player: Player) -> bool {
        true
    }
}

/// The match-all strategy
pub fn match_all() -> MatchAll {
    MatchAll
}

/// Admits players satisfying an arbitrary closure
pub struct Where<F>(
    /// The predicate
    pub F,
);

impl<F> QueryStrategy for Where<F>
where
    F: Fn(&Compartment, Player) -> bool,
{
    fn admits(&self, compartment: &Compartment, player: Player) -> bool {
        (self.0)(compartment, player)
    }
}

/// Admits players currently playing a role of type `T`
pub struct Playing<T>(PhantomData<fn() -> T>);

impl<T: 'static> QueryStrategy for Playing<T> {
    fn admits(&self, compartment: &Compartment, player: Player) -> bool {
        compartment.is_playing::<T>(player)
    }
}

/// Strategy admitting players that play a role of type `T`
pub fn playing<T: 'static>() -> Playing<T> {
    Playing(PhantomData)
}

/// Conjunction of two strategies
pub struct And<A, B>(A, B);

impl<A: QueryStrategy, B: QueryStrategy> QueryStrategy for And<A, B> {
    fn admits(&self, compartment: &Compartment, player: Player) -> bool {
        self.0.admits(compartment, player) && self.1.admits(compartment, player)
    }
}

/// Disjunction of two strategies
pub struct Or<A, B>(A, B);

impl<A: QueryStrategy, B: QueryStrategy> QueryStrategy for Or<A, B> {
    fn admits(&self, compartment: &Compartment, player: Player) -> bool {
        self.0.admits(compartment, player) || self.1.admits(compartment, player)
    }
}

/// Negation of a strategy
pub struct Not<A>(A);

impl<A: QueryStrategy> QueryStrategy for Not<A> {
    fn admits(&self, compartment: &Compartment, player: Player) -> bool {
        !self.0.admits(compartment, player)
    }
}

/// Combinators for composing strategies
pub trait QueryStrategyExt: QueryStrategy + Sized {
    /// Both strategies must admit
    fn and<O: QueryStrategy>(self, other: O) -> And<Self, O> {
        And(self, other)
    }

    /// Either strategy may admit
    fn or<O: QueryStrategy>(self, other: O) -> Or<Self, O> {
        Or(self, other)
    }

    /// Invert this strategy
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<S: QueryStrategy + Sized> QueryStrategyExt for S {}
