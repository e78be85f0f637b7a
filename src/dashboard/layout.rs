/*
 *  dashboard/layout.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Greedy row/page packing of gadgets, centred on screen
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

//! Page/row placement.
//!
//! Gadgets are walked in load order. Each joins the current row while it
//! fits, separated from its left neighbour by [`GADGET_GAP`] columns; when
//! only the gap is missing it is placed flush instead. A gadget that does not
//! fit horizontally starts a new row, and a row that does not fit under the
//! rows already on the page starts a new page.
//!
//! When a row closes, its members are shifted right by
//! `floor((W - row_width) / 2)` and each is pushed down by
//! `ceil((row_height - height) / 2)` so shorter gadgets sit in the middle of
//! a taller row. When a page closes, all of its rows are shifted down by
//! `floor((H - page_height) / 2)`. `W`/`H` are the usable screen size, so the
//! banner rows are added last.

use log::debug;

use crate::dashboard::error::LayoutError;
use crate::dashboard::surface::{Rect, Size};

/// Blank columns between neighbouring gadgets in a row.
///
/// The gap is dropped when it is the only thing stopping a gadget from
/// joining the row.
pub const GADGET_GAP: u16 = 1;

/// Result of a successful layout.
///
/// Both vectors describe the same gadgets: `positions[i]` is where gadget
/// `i` goes, and exactly one entry of `pages` lists `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Gadget indices per page, in load order.
    ///
    /// Never holds an empty page; no gadgets means no pages.
    pub pages: Vec<Vec<usize>>,

    /// Absolute screen rectangle of every gadget, indexed like the input.
    ///
    /// Rectangles already include the centering shifts and the `top` offset,
    /// so they can be handed to the screen as they are.
    pub positions: Vec<Rect>,
}

/// The row being filled
#[derive(Debug, Default)]
struct Row {
    members: Vec<usize>,
    width: u16,
    height: u16,
    // offset from the top of the page
    y: u16,
}

/// The page being filled, holding only closed rows
#[derive(Debug, Default)]
struct PageBuilder {
    members: Vec<usize>,
    // height of the rows already closed on this page
    height: u16,
}

/// Greedy packing state for one layout pass
struct Packer<'a> {
    sizes: &'a [Size],
    usable: Size,
    top: u16,
    positions: Vec<Rect>,
    pages: Vec<Vec<usize>>,
    page: PageBuilder,
    row: Row,
}

impl<'a> Packer<'a> {
    fn new(sizes: &'a [Size], usable: Size, top: u16) -> Self {
        Self {
            sizes,
            usable,
            top,
            positions: sizes.iter().map(|s| Rect::new(0, 0, s.height, s.width)).collect(),
            pages: Vec::new(),
            page: PageBuilder::default(),
            row: Row::default(),
        }
    }

    // column at which gadget `i` would join the open row, if it fits
    fn row_slot(&self, i: usize) -> Option<u16> {
        let width = u32::from(self.sizes[i].width);
        let screen = u32::from(self.usable.width);
        if self.row.members.is_empty() {
            return Some(0);
        }
        let used = u32::from(self.row.width);
        if used + u32::from(GADGET_GAP) + width <= screen {
            Some(self.row.width + GADGET_GAP)
        } else if used + width <= screen {
            Some(self.row.width)
        } else {
            None
        }
    }

    /// Whether a row `row_height` tall still fits under the closed rows
    fn fits_page(&self, row_height: u16) -> bool {
        u32::from(self.page.height) + u32::from(row_height) <= u32::from(self.usable.height)
    }

    /// Put gadget `i` in the open row, closing rows and pages as needed.
    ///
    /// Sizes were checked against the screen up front, so an empty row on an
    /// empty page always takes the gadget and this terminates.
    fn place(&mut self, i: usize) {
        let size = self.sizes[i];
        loop {
            if self.row.members.is_empty() {
                if !self.fits_page(size.height) {
                    self.close_page();
                }
                self.row.y = self.page.height;
            }

            let Some(x) = self.row_slot(i) else {
                self.close_row();
                continue;
            };
            // an empty row always fits once the page has been closed above
            if !self.row.members.is_empty() && !self.fits_page(self.row.height.max(size.height)) {
                self.close_row();
                continue;
            }

            self.positions[i].x = x;
            self.positions[i].y = self.row.y;
            self.row.members.push(i);
            self.row.width = x + size.width;
            self.row.height = self.row.height.max(size.height);
            return;
        }
    }

    /// Center the open row horizontally and vertically center its shorter
    /// members, then add it to the page
    fn close_row(&mut self) {
        if self.row.members.is_empty() {
            return;
        }
        let row = std::mem::take(&mut self.row);
        let shift = (self.usable.width - row.width) / 2;
        for &i in &row.members {
            let pos = &mut self.positions[i];
            pos.x += shift;
            pos.y += (row.height - pos.height).div_ceil(2);
        }
        debug!("row of {} gadgets, {}x{}, shifted {} columns", row.members.len(), row.height, row.width, shift);
        self.page.height += row.height;
        self.page.members.extend(row.members);
    }

    /// Close the open row, center the page vertically below `top` and emit it
    fn close_page(&mut self) {
        self.close_row();
        if self.page.members.is_empty() {
            return;
        }
        let page = std::mem::take(&mut self.page);
        let shift = (self.usable.height - page.height) / 2;
        for &i in &page.members {
            self.positions[i].y += self.top + shift;
        }
        debug!("page {} holds {} gadgets, {} rows tall", self.pages.len(), page.members.len(), page.height);
        self.pages.push(page.members);
    }
}

/// Compute page membership and absolute positions for gadgets of the given
/// sizes on a screen whose usable area is `usable`, starting `top` rows down.
///
/// `top` is the number of rows reserved above the usable area (the banner),
/// so a placement for a full `H`x`W` terminal is computed with
/// `usable = (H - top)x W`.
///
/// # Errors
///
/// Any gadget larger than `usable` in either dimension fails the whole
/// layout with [`LayoutError::TooLarge`] naming the first such gadget.
/// Nothing is partially placed.
///
/// # Example
///
/// ```
/// use constatus::dashboard::{place, Rect, Size};
///
/// // an 8-wide clock and a 1x1 blinker on a 24x80 terminal under a 1-row banner
/// let placement = place(&[Size::new(1, 8), Size::new(1, 1)], Size::new(23, 80), 1).unwrap();
///
/// assert_eq!(placement.pages, vec![vec![0, 1]]);
/// assert_eq!(placement.positions[0], Rect::new(12, 35, 1, 8));
/// assert_eq!(placement.positions[1], Rect::new(12, 44, 1, 1));
/// ```
pub fn place(sizes: &[Size], usable: Size, top: u16) -> Result<Placement, LayoutError> {
    for (gadget, size) in sizes.iter().enumerate() {
        if size.height > usable.height || size.width > usable.width {
            return Err(LayoutError::TooLarge {
                gadget,
                height: size.height,
                width: size.width,
            });
        }
    }

    let mut packer = Packer::new(sizes, usable, top);
    for i in 0..sizes.len() {
        packer.place(i);
    }
    packer.close_page();

    Ok(Placement {
        pages: packer.pages,
        positions: packer.positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sizes(list: &[(u16, u16)]) -> Vec<Size> {
        list.iter().map(|&(h, w)| Size::new(h, w)).collect()
    }

    #[test]
    fn test_two_small_gadgets_share_a_centred_row() {
        // 80x24 terminal, one banner row
        let p = place(&sizes(&[(1, 8), (1, 1)]), Size::new(23, 80), 1).unwrap();
        assert_eq!(p.pages, vec![vec![0, 1]]);
        assert_eq!(p.positions[0], Rect::new(12, 35, 1, 8));
        assert_eq!(p.positions[1], Rect::new(12, 44, 1, 1));
        assert!(p.positions[1].x >= p.positions[0].x + 8 + 1);
    }

    #[test]
    fn test_three_wide_gadgets_wrap_into_two_rows() {
        let p = place(&sizes(&[(1, 40), (1, 40), (1, 40)]), Size::new(23, 80), 1).unwrap();
        assert_eq!(p.pages, vec![vec![0, 1, 2]]);
        // first row is full width, placed flush
        assert_eq!((p.positions[0].x, p.positions[1].x), (0, 40));
        // second row centred on its own
        assert_eq!(p.positions[2].x, 20);
        assert_eq!(p.positions[0].y, p.positions[1].y);
        assert_eq!(p.positions[2].y, p.positions[0].y + 1);
        assert_eq!(p.positions[0].y, 1 + (23 - 2) / 2);
    }

    #[test]
    fn test_too_large_rejects_everything() {
        let err = place(&sizes(&[(1, 8), (24, 8)]), Size::new(23, 80), 1).unwrap_err();
        assert!(matches!(err, LayoutError::TooLarge { gadget: 1, height: 24, .. }));

        let err = place(&sizes(&[(1, 81)]), Size::new(23, 80), 1).unwrap_err();
        assert!(matches!(err, LayoutError::TooLarge { gadget: 0, .. }));
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let p = place(&sizes(&[(23, 80)]), Size::new(23, 80), 1).unwrap();
        assert_eq!(p.positions[0], Rect::new(1, 0, 23, 80));
    }

    #[test]
    fn test_overflowing_rows_start_a_new_page() {
        // three 10-row gadgets, each on its own row, only two rows per page
        let p = place(&sizes(&[(10, 50), (10, 50), (10, 50)]), Size::new(23, 80), 1).unwrap();
        assert_eq!(p.pages, vec![vec![0, 1], vec![2]]);
        assert_eq!(p.positions[0].y, 1 + 1);
        assert_eq!(p.positions[1].y, 1 + 1 + 10);
        assert_eq!(p.positions[2].y, 1 + (23 - 10) / 2);
    }

    #[test]
    fn test_taller_gadget_that_does_not_fit_starts_a_page() {
        // first row is 20 tall; a second row with a 5-row gadget cannot fit
        let p = place(&sizes(&[(20, 10), (5, 10)]), Size::new(23, 10), 1).unwrap();
        assert_eq!(p.pages, vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_joining_row_that_would_grow_too_tall_wraps() {
        // a short row sits below a tall one; a tall newcomer cannot join it
        let p = place(&sizes(&[(15, 80), (2, 10), (10, 10)]), Size::new(23, 80), 1).unwrap();
        assert_eq!(p.pages, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_short_gadget_is_centred_in_taller_row() {
        let p = place(&sizes(&[(5, 10), (2, 10)]), Size::new(23, 80), 1).unwrap();
        let row_top = p.positions[0].y;
        // ceil((5 - 2) / 2) = 2
        assert_eq!(p.positions[1].y, row_top + 2);
    }

    #[test]
    fn test_empty_input_has_no_pages() {
        let p = place(&[], Size::new(23, 80), 1).unwrap();
        assert!(p.pages.is_empty());
        assert!(p.positions.is_empty());
    }

    #[test]
    fn test_zero_sized_screen_rejects_any_gadget() {
        assert!(place(&sizes(&[(1, 1)]), Size::new(0, 0), 1).is_err());
    }

    #[test]
    fn test_row_offset_is_floor_of_slack() {
        for slack in 0..=3u16 {
            let n = 4u16;
            let w = 5u16;
            // n gadgets plus separators, then `slack` spare columns
            let screen_w = n * w + (n - 1) * GADGET_GAP + slack;
            let list: Vec<_> = (0..n).map(|_| (1, w)).collect();
            let p = place(&sizes(&list), Size::new(10, screen_w), 1).unwrap();
            assert_eq!(p.pages.len(), 1);
            assert_eq!(p.positions[0].x, slack / 2, "slack {slack}");
        }
    }

    proptest! {
        #[test]
        fn prop_pages_partition_gadgets(
            list in proptest::collection::vec((1u16..12, 1u16..40), 0..40),
            screen_h in 12u16..40,
            screen_w in 40u16..120,
        ) {
            let input = sizes(&list);
            let usable = Size::new(screen_h - 1, screen_w);
            let Ok(p) = place(&input, usable, 1) else {
                // only oversized gadgets may fail
                prop_assert!(input.iter().any(|s| s.height > usable.height || s.width > usable.width));
                return Ok(());
            };

            let mut seen: Vec<usize> = p.pages.iter().flatten().copied().collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
            prop_assert!(p.pages.iter().all(|page| !page.is_empty()));

            for page in &p.pages {
                for &i in page {
                    let r = p.positions[i];
                    prop_assert!(r.right() <= u32::from(screen_w));
                    prop_assert!(r.y >= 1);
                    prop_assert!(r.bottom() <= u32::from(screen_h));
                }
                // no two gadgets on the same page overlap
                for (a, &i) in page.iter().enumerate() {
                    for &j in &page[a + 1..] {
                        let (ri, rj) = (p.positions[i], p.positions[j]);
                        let disjoint = ri.right() <= u32::from(rj.x)
                            || rj.right() <= u32::from(ri.x)
                            || ri.bottom() <= u32::from(rj.y)
                            || rj.bottom() <= u32::from(ri.y);
                        prop_assert!(disjoint);
                    }
                }
            }
        }
    }
}
