/*
 *  dashboard/manager.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dashboard - owns the screen, gadgets and pages; drives bound calls
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

use std::time::Duration;
use log::{debug, error, info, warn};

use crate::dashboard::banner::{Banner, BANNER_ROWS};
use crate::dashboard::error::{LayoutError, ResizeError, ScreenError};
use crate::dashboard::layout;
use crate::dashboard::page::{Direction, PageSet};
use crate::dashboard::registry::{Gadget, Registry};
use crate::dashboard::surface::{Size, Surface, Window};
use crate::dashboard::traits::{Host, Instance, MessageKind, Screen};

/// The running dashboard.
///
/// `Dashboard` owns everything that is on screen: the [`Screen`] backend,
/// the gadget records handed over by the [`Registry`], the pages computed
/// by the layout engine and the banner on the top row.
///
/// # Architecture
///
/// - **Layout**: [`update_layout_and_draw`](Self::update_layout_and_draw)
///   re-reads the screen size, notifies every gadget and re-packs all of
///   them with [`layout::place`]. Windows are allocated for every gadget,
///   and only the current page's windows are shown.
/// - **Pages**: [`navigate`](Self::navigate) hides one page and shows its
///   neighbour, rolling back if the screen refuses.
/// - **Bound calls**: every call into gadget code hands the gadget a
///   [`Host`] that knows which gadget is running, so messages and resize
///   requests are attributed to the right gadget.
///
/// A gadget can only run while its instance is checked out of its record,
/// so calls never nest. A resize request from inside a call re-lays out
/// the screen at once; the redraw waits for [`redraw_if_needed`](Self::redraw_if_needed).
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use constatus::dashboard::components::ClockModule;
/// use constatus::dashboard::drivers::MockScreen;
/// use constatus::dashboard::{Dashboard, ModuleSearch, Registry, Size};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = Registry::new(ModuleSearch::new(None, None));
/// registry.load_module("clock", Rc::new(ClockModule::default()))?;
///
/// let mut dash = Dashboard::new(MockScreen::new(Size::new(24, 80)), registry);
/// dash.update_layout_and_draw()?;
/// dash.present()?;
///
/// assert_eq!(dash.pages().len(), 1);
/// assert_eq!(dash.usable(), Size::new(23, 80));
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// Gadget instances are not `Send`, and neither is the dashboard. It lives
/// on the thread that runs the event loop.
pub struct Dashboard<S: Screen> {
    /// Rendering backend
    screen: S,

    /// Full screen size as of the last layout
    size: Size,

    /// Gadget records in load order; indices are gadget ids
    gadgets: Vec<Gadget>,

    /// Current page set, empty while the layout is failing
    pages: PageSet,

    /// What the top row shows
    banner: Banner,

    // last init-time message, shown once the screen exists
    pending: Option<Banner>,

    /// Set by a resize request, cleared by the next redraw
    need_redraw: bool,

    // bumped whenever the window set is discarded
    layout_epoch: u64,
}

impl<S: Screen> Dashboard<S> {
    /// Take over the gadgets loaded into `registry`.
    ///
    /// Nothing is drawn until [`update_layout_and_draw`](Self::update_layout_and_draw).
    pub fn new(screen: S, registry: Registry) -> Self {
        let (gadgets, pending) = registry.into_parts();
        Self {
            screen,
            size: Size::default(),
            gadgets,
            pages: PageSet::default(),
            banner: Banner::Normal,
            pending,
            need_redraw: false,
            layout_epoch: 0,
        }
    }

    /// The rendering backend
    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    /// Gadget records in load order
    pub fn gadgets(&self) -> &[Gadget] {
        &self.gadgets
    }

    /// Pages from the last successful layout; empty after a failed one
    pub fn pages(&self) -> &PageSet {
        &self.pages
    }

    /// Current banner content
    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    /// Full screen size as of the last layout
    pub fn size(&self) -> Size {
        self.size
    }

    /// Screen area available to gadgets, below the banner
    pub fn usable(&self) -> Size {
        Size::new(self.size.height.saturating_sub(BANNER_ROWS), self.size.width)
    }

    /// Whether a resize request is waiting for the current page to be redrawn
    pub fn needs_redraw(&self) -> bool {
        self.need_redraw
    }

    /// Re-read the screen size, tell every gadget about it, lay everything out
    /// again and draw the current page.
    ///
    /// The banner is reset to normal first. A message queued while modules
    /// were initialising is shown afterwards unless the layout failed.
    ///
    /// # Errors
    ///
    /// Only screen errors from querying the size or clearing. Layout
    /// failures are shown on the banner and are not errors here.
    pub fn update_layout_and_draw(&mut self) -> Result<(), ScreenError> {
        self.size = self.screen.size()?;
        self.screen.clear()?;
        self.banner = Banner::Normal;

        let usable = self.usable();
        info!("screen is {}x{}, {}x{} usable", self.size.height, self.size.width, usable.height, usable.width);

        for idx in 0..self.gadgets.len() {
            self.with_bound(idx, |instance, host, _| instance.resize(host, usable.height, usable.width));
        }

        if self.relayout().is_err() {
            debug!("no pages until the next resize");
        }
        self.draw_current_page();
        self.need_redraw = false;

        if let Some(msg) = self.pending.take() {
            if !self.banner.is_failure() {
                self.banner = msg;
            }
        }
        Ok(())
    }

    /// Discard all pages and windows and place every gadget from scratch.
    ///
    /// Every window is allocated before any gadget record is touched, and the
    /// first page is shown. A failure banner from an earlier attempt is
    /// cleared on success.
    ///
    /// # Errors
    ///
    /// [`LayoutError::TooLarge`] when a gadget does not fit the usable area,
    /// [`LayoutError::Allocation`] or [`LayoutError::Show`] when the screen
    /// refuses. On failure nothing is left on screen and the banner says why.
    pub fn relayout(&mut self) -> Result<(), LayoutError> {
        self.teardown();

        let sizes: Vec<Size> = self.gadgets.iter().map(Gadget::size).collect();
        let placement = match layout::place(&sizes, self.usable(), BANNER_ROWS) {
            Ok(p) => p,
            Err(e) => return Err(self.layout_failed(e)),
        };

        // allocate everything before touching any gadget
        let mut windows = Vec::with_capacity(placement.positions.len());
        for rect in &placement.positions {
            match self.screen.new_window(*rect) {
                Ok(w) => windows.push(w),
                Err(e) => return Err(self.layout_failed(LayoutError::Allocation(e))),
            }
        }

        for ((gadget, rect), window) in self.gadgets.iter_mut().zip(&placement.positions).zip(windows) {
            gadget.x = rect.x;
            gadget.y = rect.y;
            gadget.window = Some(window);
        }
        self.pages = PageSet::new(placement.pages);

        if let Some(first) = self.pages.current_index() {
            if let Err(e) = self.set_page_visible(first, true) {
                return Err(self.layout_failed(LayoutError::Show(e)));
            }
        }

        if self.banner.is_failure() {
            self.banner = Banner::Normal;
        }
        debug!("layout: {} gadgets on {} pages", self.gadgets.len(), self.pages.len());
        Ok(())
    }

    fn layout_failed(&mut self, err: LayoutError) -> LayoutError {
        warn!("layout failed: {}", err);
        self.teardown();
        self.banner = Banner::Failure(err.to_string());
        err
    }

    // release every window and page
    fn teardown(&mut self) {
        for gadget in &mut self.gadgets {
            gadget.window = None;
        }
        self.pages.clear();
        self.layout_epoch += 1;
    }

    fn set_page_visible(&mut self, page: usize, visible: bool) -> Result<(), ScreenError> {
        let Some(page) = self.pages.get(page) else {
            return Ok(());
        };
        for &idx in page.gadgets() {
            let Some(window) = self.gadgets[idx].window.as_mut() else {
                continue;
            };
            if visible {
                self.screen.show_panel(window)?;
            } else {
                self.screen.hide_panel(window)?;
            }
        }
        Ok(())
    }

    /// Step to the neighbouring page.
    ///
    /// Returns whether the current page changed. Stepping past either end
    /// and navigating without pages are no-ops.
    ///
    /// On success the screen is cleared, the banner returns to normal and
    /// the new page is drawn.
    ///
    /// # Errors
    ///
    /// Only from clearing the screen. Show/hide failures are reported on the
    /// banner and leave the previous page showing.
    pub fn navigate(&mut self, direction: Direction) -> Result<bool, ScreenError> {
        let (Some(old), Some(new)) = (self.pages.current_index(), self.pages.neighbour(direction)) else {
            return Ok(false);
        };

        if let Err(e) = self.set_page_visible(old, false) {
            warn!("hiding page {}: {}", old, e);
            self.banner = Banner::Failure("error hiding active gadget set".into());
            if let Err(e) = self.set_page_visible(old, true) {
                error!("could not restore page {}: {}", old, e);
            }
            return Ok(false);
        }

        if let Err(e) = self.set_page_visible(new, true) {
            warn!("showing page {}: {}", new, e);
            self.banner = Banner::Failure("error showing active gadget set".into());
            if let Err(e) = self.set_page_visible(new, false) {
                error!("could not hide page {}: {}", new, e);
            }
            if let Err(e) = self.set_page_visible(old, true) {
                error!("could not restore page {}: {}", old, e);
            }
            return Ok(false);
        }

        self.pages.set_current(new);
        debug!("page {} -> {}", old, new);

        self.screen.clear()?;
        self.banner = Banner::Normal;
        self.draw_current_page();
        Ok(true)
    }

    /// Redraw every gadget on the current page
    pub fn draw_current_page(&mut self) {
        let Some(page) = self.pages.current() else {
            return;
        };
        let members = page.gadgets().to_vec();
        for idx in members {
            self.with_bound(idx, |instance, host, surface| instance.display(host, surface));
        }
    }

    /// Run gadget `idx`'s periodic callback and return its requested delay.
    ///
    /// A gadget that currently has no window draws into a scratch surface.
    /// Returns `None` for an unknown index or a gadget that is already
    /// running.
    pub fn tick(&mut self, idx: usize) -> Option<Duration> {
        self.with_bound(idx, |instance, host, surface| instance.callback(host, surface))
    }

    /// Redraw the current page if a resize request asked for it.
    ///
    /// Returns whether anything was drawn.
    pub fn redraw_if_needed(&mut self) -> Result<bool, ScreenError> {
        if !self.need_redraw {
            return Ok(false);
        }
        self.need_redraw = false;
        self.screen.clear()?;
        self.draw_current_page();
        Ok(true)
    }

    /// Composite the banner and the visible windows.
    ///
    /// This is the single flush per event loop iteration.
    pub fn present(&mut self) -> Result<(), ScreenError> {
        let windows: Vec<&Window> = self
            .gadgets
            .iter()
            .filter_map(|g| g.window.as_ref())
            .filter(|w| w.is_visible())
            .collect();
        self.screen.present(&self.banner, &windows)
    }

    fn with_bound<R>(
        &mut self,
        idx: usize,
        call: impl FnOnce(&mut dyn Instance, &mut dyn Host, &mut dyn Surface) -> R,
    ) -> Option<R> {
        let gadget = self.gadgets.get_mut(idx)?;
        let Some(mut instance) = gadget.instance.take() else {
            error!("{}: called while already running", gadget.name());
            return None;
        };
        let had_window = gadget.window.is_some();
        let mut window = gadget
            .window
            .take()
            .unwrap_or_else(|| Window::offscreen(gadget.height, gadget.width));
        let epoch = self.layout_epoch;

        let ret = {
            let mut host = BoundCall { dash: self, gadget: idx };
            call(instance.as_mut(), &mut host, &mut window)
        };

        let gadget = &mut self.gadgets[idx];
        gadget.instance = Some(instance);
        // a layout during the call already gave this gadget a fresh window
        if had_window && self.layout_epoch == epoch {
            gadget.window = Some(window);
        }
        Some(ret)
    }

    fn gadget_message(&mut self, idx: usize, kind: MessageKind, text: &str) {
        self.banner = Banner::gadget_message(self.gadgets[idx].name(), kind, text);
    }

    // validate, store the new size and re-layout before returning to the gadget
    fn resize_gadget(&mut self, idx: usize, height: u16, width: u16) -> Result<(), ResizeError> {
        let usable = self.usable();
        let refused = if height > usable.height {
            Some(ResizeError::InvalidHeight(height))
        } else if width > usable.width {
            Some(ResizeError::InvalidWidth(width))
        } else {
            None
        };
        if let Some(err) = refused {
            self.gadget_message(idx, MessageKind::Error, &err.to_string());
            return Err(err);
        }

        debug!("{}: resizing to {}x{}", self.gadgets[idx].name(), height, width);
        let gadget = &mut self.gadgets[idx];
        gadget.height = height;
        gadget.width = width;
        self.need_redraw = true;

        self.relayout()?;
        Ok(())
    }
}

// Host handed to gadget `gadget` while it runs
struct BoundCall<'a, S: Screen> {
    dash: &'a mut Dashboard<S>,
    gadget: usize,
}

impl<S: Screen> Host for BoundCall<'_, S> {
    fn report(&mut self, kind: MessageKind, text: &str) {
        self.dash.gadget_message(self.gadget, kind, text);
    }

    fn request_resize(&mut self, height: u16, width: u16) -> Result<(), ResizeError> {
        self.dash.resize_gadget(self.gadget, height, width)
    }
}
