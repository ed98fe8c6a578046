//! # Row Iterator Protocol
//!
//! Every B-tree operation hands its results back as a lazy iterator of
//! `Result<Row>`. The protocol all producers in this crate follow:
//!
//! - the consumer drives by pulling; nothing is read ahead of the pull
//! - the first `Err` is terminal: every later pull yields `None`
//! - aborting is dropping the iterator; no further page work happens
//! - values borrow from the database memory map and stay valid for the
//!   lifetime of the handle ([`Row::into_owned`] detaches them)
//!
//! [`filter`] is the one combinator the read path needs: it composes a
//! fallible predicate over any row iterator, under the same single-error
//! discipline.

use eyre::Result;

use crate::records::{record_to_owned, Record};
use crate::types::Value;

/// One table row or index entry, with its rowid materialised.
///
/// For table rows the rowid is the B-tree key of the cell the row came
/// from; for index entries it is the final element of the entry payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub rowid: i64,
    pub values: Record<'a>,
}

impl<'a> Row<'a> {
    /// The value at column `index`, if the row has one there.
    pub fn get(&self, index: usize) -> Option<&Value<'a>> {
        self.values.get(index)
    }

    /// Clones the row into fully-owned values, detaching it from the
    /// database handle it was read from.
    pub fn into_owned(self) -> Row<'static> {
        Row {
            rowid: self.rowid,
            values: record_to_owned(&self.values),
        }
    }
}

/// Filters `input` through `predicate`, keeping rows for which it returns
/// `Ok(true)`.
///
/// Source errors and predicate errors are both surfaced as the iterator's
/// single terminal error.
pub fn filter<'a, I, P>(input: I, predicate: P) -> Filter<I, P>
where
    I: Iterator<Item = Result<Row<'a>>>,
    P: FnMut(&Row<'a>) -> Result<bool>,
{
    Filter {
        input,
        predicate,
        done: false,
    }
}

/// Iterator returned by [`filter`].
#[derive(Debug)]
pub struct Filter<I, P> {
    input: I,
    predicate: P,
    done: bool,
}

impl<'a, I, P> Iterator for Filter<I, P>
where
    I: Iterator<Item = Result<Row<'a>>>,
    P: FnMut(&Row<'a>) -> Result<bool>,
{
    type Item = Result<Row<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let row = match self.input.next()? {
                Ok(row) => row,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            match (self.predicate)(&row) {
                Ok(true) => return Some(Ok(row)),
                Ok(false) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
