/*
 *  dashboard/drivers/mock.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory screen for testing without a terminal
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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::dashboard::banner::{Banner, BannerStyle};
use crate::dashboard::error::ScreenError;
use crate::dashboard::surface::{Rect, Size, Window};
use crate::dashboard::traits::Screen;

/// Mock screen for testing
///
/// Records every operation and keeps the last composited frame as plain
/// text, one `String` per row. Failures can be injected for window
/// allocation and panel show/hide.
#[derive(Debug, Clone)]
pub struct MockScreen {
    state: Arc<Mutex<MockScreenState>>,
}

/// Internal state for the mock screen (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockScreenState {
    /// Size reported by `size()`
    pub size: Size,

    /// Windows successfully allocated
    pub new_window_count: usize,

    pub show_count: usize,
    pub hide_count: usize,
    pub clear_count: usize,
    pub present_count: usize,

    /// Banner text and style of the last present
    pub last_banner: Option<(String, BannerStyle)>,

    /// Last composited frame, row 0 is the banner
    pub frame: Vec<String>,

    /// Allow this many more window allocations, then fail
    pub fail_new_window_after: Option<usize>,

    /// Fail the next show_panel only
    pub fail_next_show: bool,

    /// Fail the next hide_panel only
    pub fail_next_hide: bool,
}

impl MockScreen {
    pub fn new(size: Size) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockScreenState { size, ..Default::default() })),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockScreenState>> {
        Arc::clone(&self.state)
    }

    /// Simulate a terminal resize
    pub fn set_size(&self, size: Size) {
        self.lock().size = size;
    }

    /// Text of composited row `y` from the last present
    pub fn row(&self, y: usize) -> Option<String> {
        self.lock().frame.get(y).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Screen for MockScreen {
    fn size(&mut self) -> Result<Size, ScreenError> {
        Ok(self.lock().size)
    }

    fn new_window(&mut self, rect: Rect) -> Result<Window, ScreenError> {
        let mut state = self.lock();

        if state.fail_new_window_after.is_some_and(|n| state.new_window_count >= n) {
            return Err(ScreenError::Panel("simulated window allocation failure".into()));
        }
        if rect.bottom() > u32::from(state.size.height) || rect.right() > u32::from(state.size.width) {
            return Err(ScreenError::OutOfBounds {
                y: rect.y,
                x: rect.x,
                height: rect.height,
                width: rect.width,
                screen_height: state.size.height,
                screen_width: state.size.width,
            });
        }

        state.new_window_count += 1;
        Ok(Window::new(rect))
    }

    fn show_panel(&mut self, window: &mut Window) -> Result<(), ScreenError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_next_show) {
            return Err(ScreenError::Panel("simulated show failure".into()));
        }
        state.show_count += 1;
        window.set_visible(true);
        Ok(())
    }

    fn hide_panel(&mut self, window: &mut Window) -> Result<(), ScreenError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_next_hide) {
            return Err(ScreenError::Panel("simulated hide failure".into()));
        }
        state.hide_count += 1;
        window.set_visible(false);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ScreenError> {
        self.lock().clear_count += 1;
        Ok(())
    }

    fn present(&mut self, banner: &Banner, windows: &[&Window]) -> Result<(), ScreenError> {
        let mut state = self.lock();
        let size = state.size;

        let mut rows: Vec<Vec<char>> = (0..size.height)
            .map(|_| vec![' '; usize::from(size.width)])
            .collect();
        if let Some(top) = rows.first_mut() {
            *top = banner.line(size.width).chars().collect();
        }

        for window in windows {
            let rect = window.rect();
            for wy in 0..rect.height {
                let Some(row) = rows.get_mut(usize::from(rect.y) + usize::from(wy)) else {
                    break;
                };
                for (wx, cell) in window.row(wy).iter().enumerate() {
                    if let Some(slot) = row.get_mut(usize::from(rect.x) + wx) {
                        *slot = cell.ch;
                    }
                }
            }
        }

        state.frame = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        state.last_banner = Some((banner.text().to_string(), banner.style()));
        state.present_count += 1;
        Ok(())
    }
}
