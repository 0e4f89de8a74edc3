use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};

use crate::actions::{ClientAction, PlayerId, RoomId};
use crate::battle::{self, BattleReport, MAX_DICE};
use crate::board::{Region, TerritoryId, ALL_TERRITORIES};
use crate::deck::{Card, Deck};
use crate::errors::{GameError, GameResult};
use crate::objectives::{self, ObjectiveId};
use crate::ordered_hashmap::OrderedHashMap;

pub const INITIAL_TRADE_COUNTER: u32 = 2;
pub const MIN_TURN_REINFORCEMENT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub region: Region,
    pub owner: Option<PlayerId>,
    pub armies: u32,
    pub adjacent: Vec<TerritoryId>,
}

impl Territory {
    fn from_catalog(id: TerritoryId) -> Self {
        Territory {
            id,
            name: id.name().to_string(),
            region: id.region(),
            owner: None,
            armies: 0,
            adjacent: id.adjacent().to_vec(),
        }
    }

    pub fn is_owned_by(&self, player_id: &str) -> bool {
        self.owner.as_deref() == Some(player_id)
    }

    pub fn is_adjacent(&self, other: TerritoryId) -> bool {
        self.adjacent.contains(&other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    /// Armies still waiting to be deployed
    pub reinforcements: u32,
    pub objective: Option<ObjectiveId>,
    pub cards: Vec<Card>,
    pub is_bot: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, color: impl Into<String>, is_bot: bool) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            reinforcements: 0,
            objective: None,
            cards: Vec::new(),
            is_bot,
        }
    }

    pub fn has_card(&self, territory: TerritoryId) -> bool {
        self.cards.iter().any(|c| c.territory == territory)
    }
}

/// Who holds the turn after a start or a `finish_turn`, and what they got
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStart {
    pub player_id: PlayerId,
    pub reinforcements: u32,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub battle: BattleReport,
    pub captured: bool,
    /// Armies that followed into the captured territory
    pub moved_in: u32,
    pub card_drawn: Option<TerritoryId>,
}

/// What a successful action did, for the actor's log and scheduling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEffect {
    Deployed {
        territory: TerritoryId,
    },
    Attacked {
        from: TerritoryId,
        to: TerritoryId,
        armies: u32,
        report: AttackReport,
    },
    Moved {
        from: TerritoryId,
        to: TerritoryId,
        armies: u32,
    },
    Traded {
        reward: u32,
    },
    TurnPassed(TurnStart),
}

fn serialize_deck_size<S: Serializer>(deck: &Deck, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(deck.len() as u64)
}

/// Full mutable state of one match. Only the game actor owns and mutates it.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub room_id: RoomId,
    /// Keyed by id, iterated in turn order
    pub players: OrderedHashMap<PlayerId, Player>,
    pub territories: Vec<Territory>,
    pub current_turn: Option<PlayerId>,
    pub turn_number: u32,
    #[serde(rename = "deck_size", serialize_with = "serialize_deck_size")]
    pub deck: Deck,
    pub trade_counter: u32,
}

impl GameState {
    /// Empty match: catalog territories, unshuffled deck, no players
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        GameState {
            room_id: room_id.into(),
            players: OrderedHashMap::new(),
            territories: ALL_TERRITORIES.iter().copied().map(Territory::from_catalog).collect(),
            current_turn: None,
            turn_number: 0,
            deck: Deck::new(),
            trade_counter: INITIAL_TRADE_COUNTER,
        }
    }

    // ---------------------------------------------------------------
    // Setup
    // ---------------------------------------------------------------

    /// Players take turns in the order they were added
    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn turn_order(&self) -> &[PlayerId] {
        self.players.keys()
    }

    /// Shuffles the territories and deals them round-robin, one army each
    pub fn assign_territories<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let order = self.turn_order().to_vec();
        if order.is_empty() {
            return;
        }

        let mut indices: Vec<usize> = (0..self.territories.len()).collect();
        indices.shuffle(rng);

        for (i, index) in indices.into_iter().enumerate() {
            let territory = &mut self.territories[index];
            territory.owner = Some(order[i % order.len()].clone());
            territory.armies = 1;
        }
    }

    pub fn deal_objectives<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let dealt = objectives::deal(rng, self.players.len());
        let order = self.turn_order().to_vec();
        for (player_id, objective) in order.iter().zip(dealt) {
            if let Some(player) = self.players.get_mut(player_id.as_str()) {
                player.objective = Some(objective);
            }
        }
    }

    pub fn shuffle_deck<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck.shuffle(rng);
    }

    /// Picks a random starting player and grants their turn-start reinforcement
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameResult<TurnStart> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let index = rng.gen_range(0..self.players.len());
        let first = self.turn_order()[index].clone();
        self.turn_number = 1;
        self.begin_turn(first)
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.iter().find(|t| t.id == id)
    }

    fn territory_index(&self, id: TerritoryId) -> GameResult<usize> {
        self.territories
            .iter()
            .position(|t| t.id == id)
            .ok_or(GameError::TerritoryNotFound { territory: id })
    }

    pub fn owned_territories<'a>(&'a self, player_id: &'a str) -> impl Iterator<Item = &'a Territory> + 'a {
        self.territories.iter().filter(move |t| t.is_owned_by(player_id))
    }

    pub fn territory_count(&self, player_id: &str) -> u32 {
        self.owned_territories(player_id).count() as u32
    }

    /// True when at least one neighbour belongs to someone else
    pub fn is_border(&self, territory: &Territory) -> bool {
        territory.adjacent.iter().any(|adjacent| {
            self.territory(*adjacent)
                .is_some_and(|neighbor| neighbor.owner != territory.owner)
        })
    }

    /// `max(3, owned / 2)` armies at the start of a turn
    pub fn turn_reinforcement(&self, player_id: &str) -> u32 {
        (self.territory_count(player_id) / 2).max(MIN_TURN_REINFORCEMENT)
    }

    pub fn is_current_turn(&self, player_id: &str) -> bool {
        self.current_turn.as_deref() == Some(player_id)
    }

    // ---------------------------------------------------------------
    // Rule operations
    // ---------------------------------------------------------------

    /// Places exactly one army from the player's pool
    pub fn deploy(&mut self, player_id: &str, territory: TerritoryId) -> GameResult<()> {
        let index = self.territory_index(territory)?;
        let player = self
            .players
            .get(player_id)
            .ok_or_else(|| GameError::player_not_found(player_id))?;

        if player.reinforcements == 0 {
            return Err(GameError::NoReinforcements {
                player_id: player_id.to_string(),
            });
        }
        if !self.territories[index].is_owned_by(player_id) {
            return Err(GameError::not_owner(player_id, territory));
        }

        self.territories[index].armies += 1;
        if let Some(player) = self.players.get_mut(player_id) {
            player.reinforcements -= 1;
        }
        Ok(())
    }

    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        player_id: &str,
        from: TerritoryId,
        to: TerritoryId,
        attacking_armies: u32,
    ) -> GameResult<AttackReport> {
        if !self.players.contains_key(player_id) {
            return Err(GameError::player_not_found(player_id));
        }
        let from_index = self.territory_index(from)?;
        let to_index = self.territory_index(to)?;

        let source = &self.territories[from_index];
        let target = &self.territories[to_index];
        if !source.is_owned_by(player_id) {
            return Err(GameError::not_owner(player_id, from));
        }
        if target.is_owned_by(player_id) {
            return Err(GameError::OwnTerritory {
                player_id: player_id.to_string(),
                territory: to,
            });
        }
        if !source.is_adjacent(to) {
            return Err(GameError::NotAdjacent { from, to });
        }
        if !(1..=MAX_DICE).contains(&attacking_armies) {
            return Err(GameError::invalid_army_count(
                attacking_armies,
                "attacks use between 1 and 3 armies",
            ));
        }
        if source.armies <= attacking_armies {
            return Err(GameError::InsufficientArmies {
                territory: from,
                available: source.armies,
                requested: attacking_armies,
            });
        }

        let defending_armies = target.armies.min(MAX_DICE);
        let battle = battle::resolve(rng, attacking_armies, defending_armies);

        self.territories[from_index].armies =
            self.territories[from_index].armies.saturating_sub(battle.attacker_losses);
        self.territories[to_index].armies =
            self.territories[to_index].armies.saturating_sub(battle.defender_losses);

        let mut report = AttackReport {
            captured: false,
            moved_in: 0,
            card_drawn: None,
            battle,
        };

        if self.territories[to_index].armies == 0 {
            let moved_in = attacking_armies - report.battle.attacker_losses;

            let target = &mut self.territories[to_index];
            target.owner = Some(player_id.to_string());
            target.armies = moved_in;
            let source = &mut self.territories[from_index];
            source.armies = source.armies.saturating_sub(moved_in);

            report.captured = true;
            report.moved_in = moved_in;
            report.card_drawn = self.draw_card_for(player_id);
        }

        Ok(report)
    }

    /// Moves the front card of the deck into the player's hand, if any is left
    fn draw_card_for(&mut self, player_id: &str) -> Option<TerritoryId> {
        let player = self.players.get_mut(player_id)?;
        let card = self.deck.draw()?;
        let territory = card.territory;
        player.cards.push(card);
        Some(territory)
    }

    /// Transfers armies between two adjacent territories of the same player
    pub fn move_armies(
        &mut self,
        player_id: &str,
        from: TerritoryId,
        to: TerritoryId,
        armies: u32,
    ) -> GameResult<()> {
        if !self.players.contains_key(player_id) {
            return Err(GameError::player_not_found(player_id));
        }
        let from_index = self.territory_index(from)?;
        let to_index = self.territory_index(to)?;

        let source = &self.territories[from_index];
        if !source.is_owned_by(player_id) {
            return Err(GameError::not_owner(player_id, from));
        }
        if !self.territories[to_index].is_owned_by(player_id) {
            return Err(GameError::not_owner(player_id, to));
        }
        if !source.is_adjacent(to) {
            return Err(GameError::NotAdjacent { from, to });
        }
        if armies < 1 {
            return Err(GameError::invalid_army_count(armies, "move at least one army"));
        }
        if source.armies <= armies {
            return Err(GameError::InsufficientArmies {
                territory: from,
                available: source.armies,
                requested: armies,
            });
        }

        self.territories[from_index].armies -= armies;
        self.territories[to_index].armies += armies;
        Ok(())
    }

    /// Trades three same-shape cards for `2 × trade_counter` armies.
    ///
    /// The cards go back to the bottom of the deck and the counter grows by
    /// one for everybody.
    pub fn trade(&mut self, player_id: &str, cards: [TerritoryId; 3]) -> GameResult<u32> {
        let [first, second, third] = cards;
        if first == second || first == third || second == third {
            return Err(GameError::DuplicateCards);
        }

        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| GameError::player_not_found(player_id))?;

        if let Some(missing) = cards.iter().find(|card| !player.has_card(**card)) {
            return Err(GameError::CardNotInHand {
                player_id: player_id.to_string(),
                card: *missing,
            });
        }
        if cards.iter().any(|card| card.shape() != first.shape()) {
            return Err(GameError::MismatchedShapes);
        }

        let (traded, kept): (Vec<Card>, Vec<Card>) = player
            .cards
            .drain(..)
            .partition(|card| cards.contains(&card.territory));
        player.cards = kept;

        let reward = 2 * self.trade_counter;
        player.reinforcements += reward;
        self.trade_counter += 1;

        for card in traded {
            self.deck.add_to_bottom(card);
        }
        Ok(reward)
    }

    /// Ends `sender`'s turn and hands it to the next player in turn order
    pub fn next_turn(&mut self, sender: &str) -> GameResult<TurnStart> {
        if !self.is_current_turn(sender) {
            return Err(GameError::not_player_turn(self.current_turn.as_ref(), sender));
        }
        let position = self
            .players
            .position(sender)
            .ok_or_else(|| GameError::player_not_found(sender))?;

        let order = self.turn_order();
        let next = order[(position + 1) % order.len()].clone();
        self.turn_number += 1;
        self.begin_turn(next)
    }

    fn begin_turn(&mut self, player_id: PlayerId) -> GameResult<TurnStart> {
        let reinforcements = self.turn_reinforcement(&player_id);
        let player = self
            .players
            .get_mut(player_id.as_str())
            .ok_or_else(|| GameError::player_not_found(player_id.as_str()))?;

        player.reinforcements += reinforcements;
        let is_bot = player.is_bot;
        self.current_turn = Some(player_id.clone());

        Ok(TurnStart {
            player_id,
            reinforcements,
            is_bot,
        })
    }

    /// Routes an inbound action to the matching rule operation
    pub fn apply<R: Rng + ?Sized>(&mut self, rng: &mut R, action: &ClientAction) -> GameResult<ActionEffect> {
        match action {
            ClientAction::FinishTurn { player_id } => {
                self.next_turn(player_id).map(ActionEffect::TurnPassed)
            }
            ClientAction::Attack {
                player_id,
                from,
                to,
                attacking_armies,
            } => self
                .attack(rng, player_id, *from, *to, *attacking_armies)
                .map(|report| ActionEffect::Attacked {
                    from: *from,
                    to: *to,
                    armies: *attacking_armies,
                    report,
                }),
            ClientAction::TroopAssign {
                player_id,
                territory_id,
            } => self
                .deploy(player_id, *territory_id)
                .map(|()| ActionEffect::Deployed {
                    territory: *territory_id,
                }),
            ClientAction::TroopMove {
                player_id,
                from,
                to,
                moving_armies,
            } => self
                .move_armies(player_id, *from, *to, *moving_armies)
                .map(|()| ActionEffect::Moved {
                    from: *from,
                    to: *to,
                    armies: *moving_armies,
                }),
            ClientAction::Trade {
                player_id,
                card_1,
                card_2,
                card_3,
            } => self
                .trade(player_id, [*card_1, *card_2, *card_3])
                .map(|reward| ActionEffect::Traded { reward }),
        }
    }
}
