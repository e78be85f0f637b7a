/*
 *  wakeup.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wakeup scheduler - binary min-heap of pending gadget redraws
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Time-ordered queue of gadget wakeups.
//!
//! Entries with identical wake times pop in the order they were scheduled.

use std::collections::TryReserveError;
use log::debug;
use thiserror::Error;

use crate::timespec::Timestamp;

/// The heap could not grow
#[derive(Debug, Error)]
#[error("error queuing wakeup: {0}")]
pub struct ScheduleError(#[from] TryReserveError);

/// A pending redraw of one gadget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    /// Absolute monotonic wake time
    pub time: Timestamp,

    /// Index of the gadget to tick
    pub gadget: usize,

    seq: u64,
}

impl Wakeup {
    #[inline]
    fn sooner(&self, other: &Wakeup) -> bool {
        (self.time, self.seq) < (other.time, other.seq)
    }
}

#[inline]
fn parent_index(i: usize) -> usize {
    (i - 1) / 2
}

#[inline]
fn nth_child(i: usize, child: usize) -> usize {
    2 * i + child
}

/// Binary min-heap keyed on wake time
#[derive(Debug, Default)]
pub struct WakeupQueue {
    heap: Vec<Wakeup>,
    next_seq: u64,
}

impl WakeupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queue `gadget` to be ticked at `time`
    pub fn schedule(&mut self, time: Timestamp, gadget: usize) -> Result<(), ScheduleError> {
        self.heap.try_reserve(1)?;

        let wake = Wakeup { time, gadget, seq: self.next_seq };
        self.next_seq += 1;
        self.heap.push(wake);

        let mut i = self.heap.len() - 1;
        while i > 0 && self.heap[i].sooner(&self.heap[parent_index(i)]) {
            self.heap.swap(i, parent_index(i));
            i = parent_index(i);
        }

        debug!("queued wakeup for gadget {} at {}.{:09}", gadget, time.secs, time.nanos);
        Ok(())
    }

    /// Earliest pending wakeup, left in place
    pub fn peek(&self) -> Option<&Wakeup> {
        self.heap.first()
    }

    /// Remove and return the earliest pending wakeup
    pub fn pop(&mut self) -> Option<Wakeup> {
        if self.heap.is_empty() {
            return None;
        }
        let ret = self.heap.swap_remove(0);

        let mut i = 0;
        loop {
            let next = self.soonest_child_index(i);
            // nothing below is sooner, heap order restored
            if next == i {
                break;
            }
            self.heap.swap(i, next);
            i = next;
        }

        Some(ret)
    }

    // index of whichever of i and its children wakes first
    fn soonest_child_index(&self, i: usize) -> usize {
        let mut soonest = i;
        for child in 1..=2 {
            let c = nth_child(i, child);
            if c >= self.heap.len() {
                break;
            }
            if self.heap[c].sooner(&self.heap[soonest]) {
                soonest = c;
            }
        }
        soonest
    }
}
