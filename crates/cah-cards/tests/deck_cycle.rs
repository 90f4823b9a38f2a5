//! Integration tests: a deck driven through many deal/discard cycles never
//! loses, duplicates, or short-deals a card.

use std::collections::BTreeSet;

use cah_cards::{CardId, Catalog, Deck, DeckError, GameRng, WhiteCard};

fn catalog() -> Catalog {
    Catalog::from_json(
        r#"{
            "packs": {
                "base": {
                    "name": "Base",
                    "description": "",
                    "white": ["a", "b", "c", "d", "e", "f", "g", "h"],
                    "black": [{ "text": "_?", "pick": 1 }, { "text": "_ and _", "pick": 2 }]
                },
                "extra": {
                    "name": "Extra",
                    "description": "",
                    "white": ["a", "i", "j", "k"],
                    "black": [{ "text": "Why _?", "pick": 1 }]
                }
            }
        }"#,
    )
    .unwrap()
}

fn ids(cards: &[WhiteCard]) -> Vec<CardId> {
    cards.iter().map(WhiteCard::id).collect()
}

#[test]
fn test_deal_discard_cycles_conserve_cards() {
    let catalog = catalog();
    let selection = catalog.select(["base", "extra"]).unwrap();
    let all: BTreeSet<CardId> = selection.white_cards().map(WhiteCard::id).collect();
    assert_eq!(all.len(), 12, "duplicate text in two packs is two cards");

    let mut deck = Deck::new(&selection, GameRng::seeded(2024));
    let mut held: Vec<WhiteCard> = deck.deal(7).unwrap();

    for round in 0..50 {
        // Spend two cards, top back up to seven.
        let spent: Vec<WhiteCard> = held.drain(..2).collect();
        deck.discard(spent);
        held.extend(deck.deal(2).unwrap());

        let mut everywhere = ids(&held);
        everywhere.extend(ids(deck.white_draw_pile()));
        everywhere.extend(ids(deck.white_discard_pile()));
        let unique: BTreeSet<CardId> = everywhere.iter().copied().collect();

        assert_eq!(everywhere.len(), 12, "round {round}: card count changed");
        assert_eq!(unique, all, "round {round}: card set changed");
    }
}

#[test]
fn test_deal_between_draw_and_total_succeeds() {
    let catalog = catalog();
    let mut deck = Deck::new(&catalog.select(["base"]).unwrap(), GameRng::seeded(5));
    let first = deck.deal(6).unwrap();
    deck.discard(first);

    // 2 in draw, 6 in discard: 7 > draw but < draw + discard.
    let cards = deck.deal(7).unwrap();
    assert_eq!(cards.len(), 7);
}

#[test]
fn test_deal_beyond_catalog_is_exhausted() {
    let catalog = catalog();
    let mut deck = Deck::new(&catalog.select(["extra"]).unwrap(), GameRng::seeded(5));

    let result = deck.deal(5);

    assert!(matches!(
        result,
        Err(DeckError::Exhausted { needed: 5, available: 4, .. })
    ));
}
