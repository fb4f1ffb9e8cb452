//! Case tests for the transaction factories and builders, plus properties
//! every applied transaction has to satisfy.
//!
//! Expected operation lists are written out in full against the fixtures in
//! [`fixtures`].

mod builder;
mod metadata;

use crate::model::Item;
use crate::transaction::Operation;

pub(crate) fn retain(length: usize) -> Operation {
    Operation::Retain { length }
}

pub(crate) fn replace(remove: Vec<Item>, insert: Vec<Item>) -> Operation {
    Operation::replace(remove, insert)
}
