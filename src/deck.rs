use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Shape, TerritoryId, ALL_TERRITORIES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub territory: TerritoryId,
    pub name: String,
    pub shape: Shape,
}

impl Card {
    pub fn new(territory: TerritoryId) -> Self {
        Card {
            territory,
            name: territory.name().to_string(),
            shape: territory.shape(),
        }
    }
}

/// Draw pile and return point in one sequence. Cards traded in go to the
/// tail and come around again; there is no separate discard pile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    /// One card per catalog territory, in catalog order
    pub fn new() -> Self {
        Deck {
            cards: ALL_TERRITORIES.iter().copied().map(Card::new).collect(),
        }
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Deck {
            cards: cards.into_iter().collect(),
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn add_to_bottom(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}
