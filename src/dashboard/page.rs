/*
 *  dashboard/page.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Ordered pages of gadgets and the current-page cursor
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

/// Navigation direction through the page sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Gadgets shown together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    gadgets: Vec<usize>,
}

impl Page {
    pub fn new(gadgets: Vec<usize>) -> Self {
        Self { gadgets }
    }

    /// Gadget indices in load order
    pub fn gadgets(&self) -> &[usize] {
        &self.gadgets
    }
}

/// The page sequence produced by the last layout.
///
/// Exactly one page is current whenever any page exists.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    pages: Vec<Page>,
    current: Option<usize>,
}

impl PageSet {
    /// Pages from a layout; the first becomes current
    pub fn new(pages: Vec<Vec<usize>>) -> Self {
        let pages: Vec<Page> = pages.into_iter().map(Page::new).collect();
        let current = if pages.is_empty() { None } else { Some(0) };
        Self { pages, current }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Page> {
        self.current.and_then(|i| self.pages.get(i))
    }

    /// Index of the page adjacent to the current one, or `None` at either end
    pub fn neighbour(&self, direction: Direction) -> Option<usize> {
        let cur = self.current?;
        match direction {
            Direction::Prev => cur.checked_sub(1),
            Direction::Next => Some(cur + 1).filter(|&i| i < self.pages.len()),
        }
    }

    /// Make `index` current; out-of-range indices are ignored
    pub fn set_current(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = Some(index);
        }
    }

    /// Drop every page
    pub fn clear(&mut self) {
        self.pages.clear();
        self.current = None;
    }
}
