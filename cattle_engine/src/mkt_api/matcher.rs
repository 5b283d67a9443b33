//! Supply/demand matching.
//!
//! A match is simply a record on the other side of the market with the same breed that is still `OPEN`. Matches are
//! not stored; the owners of the matched records are notified and the caller gets a count.
use std::fmt::Display;

use crate::db_types::{Demand, Listing, ListingStatus};

/// The side of the market that posted the new record. Used to label match notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSide {
    Farmer,
    Buyer,
}

impl Display for MarketSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketSide::Farmer => write!(f, "Farmer"),
            MarketSide::Buyer => write!(f, "Buyer"),
        }
    }
}

pub trait Matchable {
    fn breed(&self) -> &str;
    fn owner(&self) -> &str;
    fn status(&self) -> ListingStatus;
}

impl Matchable for Listing {
    fn breed(&self) -> &str {
        &self.breed
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn status(&self) -> ListingStatus {
        self.status
    }
}

impl Matchable for Demand {
    fn breed(&self) -> &str {
        &self.breed
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn status(&self) -> ListingStatus {
        self.status
    }
}

/// Returns every `OPEN` candidate with the given breed, in the order they were supplied.
pub fn find_matches<'a, T: Matchable>(breed: &str, candidates: &'a [T]) -> Vec<&'a T> {
    candidates.iter().filter(|c| c.status() == ListingStatus::Open && c.breed() == breed).collect()
}

pub fn match_message(side: MarketSide, breed: &str) -> String {
    format!("New Match: {side} posted {breed}")
}
