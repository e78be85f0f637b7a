/*
 *  tests/dashboard_integration.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  End-to-end tests: registry -> dashboard -> event loop on a mock screen
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

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use constatus::dashboard::drivers::MockScreen;
use constatus::dashboard::{
    Attr, Banner, Dashboard, EventLoop, Host, InitError, InputSource, Instance, Key, LoopState, Module,
    ModuleDescriptor, ModuleSearch, Rect, Registry, RegistryError, Size, Surface, Window,
};
use constatus::timespec::{Clock, Timestamp};
use constatus::wakeup::WakeupQueue;

/// A gadget that fills itself with one character and counts its ticks
struct Fixed {
    height: u16,
    width: u16,
    delay: Duration,
    fill: char,
    ticks: Rc<Cell<u32>>,
}

impl Fixed {
    fn new(height: u16, width: u16, fill: char) -> Self {
        Self { height, width, delay: Duration::from_secs(1), fill, ticks: Rc::default() }
    }

    fn every(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct FixedInstance {
    delay: Duration,
    fill: char,
    ticks: Rc<Cell<u32>>,
}

impl Module for Fixed {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor { height: self.height, width: self.width }
    }

    fn init(&self, _host: &mut dyn Host) -> Result<Box<dyn Instance>, InitError> {
        Ok(Box::new(FixedInstance { delay: self.delay, fill: self.fill, ticks: Rc::clone(&self.ticks) }))
    }
}

impl Instance for FixedInstance {
    fn display(&mut self, _host: &mut dyn Host, surface: &mut dyn Surface) {
        for y in 0..surface.height() {
            surface.fill(y, 0, surface.width(), self.fill, Attr::NORMAL);
        }
    }

    fn callback(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) -> Duration {
        self.ticks.set(self.ticks.get() + 1);
        self.display(host, surface);
        self.delay
    }
}

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<Timestamp>>);

impl Clock for ManualClock {
    fn now(&self) -> io::Result<Timestamp> {
        Ok(self.0.get())
    }
}

/// Delivers queued keys; with nothing queued, lets the full timeout elapse
struct ScriptedInput {
    clock: ManualClock,
    keys: VecDeque<Key>,
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.keys.is_empty() {
            return Ok(true);
        }
        let now = self.clock.0.get();
        self.clock.0.set(now.saturating_add_duration(timeout));
        Ok(false)
    }

    fn read(&mut self) -> io::Result<Key> {
        Ok(self.keys.pop_front().unwrap_or(Key::Other))
    }
}

fn registry(gadgets: Vec<(&str, Fixed)>) -> Registry {
    let mut reg = Registry::new(ModuleSearch::new(None, None));
    for (name, module) in gadgets {
        reg.load_module(name, Rc::new(module)).unwrap();
    }
    reg
}

fn event_loop(reg: Registry, screen: Size, keys: &[Key]) -> EventLoop<MockScreen, ScriptedInput, ManualClock> {
    let clock = ManualClock::default();
    clock.0.set(Timestamp::new(1_000, 0));
    let input = ScriptedInput { clock: clock.clone(), keys: keys.iter().copied().collect() };
    EventLoop::new(Dashboard::new(MockScreen::new(screen), reg), input, clock)
}

fn rect(dash: &Dashboard<MockScreen>, idx: usize) -> Option<Rect> {
    dash.gadgets()[idx].window().map(Window::rect)
}

#[test]
fn scenario_a_two_small_gadgets_share_a_centered_row() {
    let reg = registry(vec![("wide", Fixed::new(1, 8, 'W')), ("dot", Fixed::new(1, 1, '.'))]);
    let mut el = event_loop(reg, Size::new(24, 80), &[]);
    el.start().unwrap();

    let dash = el.dashboard();
    assert_eq!(dash.pages().len(), 1);
    let wide = rect(dash, 0).unwrap();
    let dot = rect(dash, 1).unwrap();

    assert_eq!(wide.y, dot.y);
    assert!(dot.x >= wide.x + wide.width + 1);
    // a 10-column row centered in 80, a 1-row page centered in 23 rows below the banner
    assert_eq!((wide.y, wide.x), (12, 35));
    assert_eq!((dot.y, dot.x), (12, 44));

    let screen = dash.screen();
    assert_eq!(screen.row(12).map(|r| r[35..45].to_string()), Some("WWWWWWWW .".to_string()));
}

#[test]
fn scenario_b_three_wide_gadgets_take_two_rows() {
    let reg = registry(vec![
        ("a", Fixed::new(1, 40, 'a')),
        ("b", Fixed::new(1, 40, 'b')),
        ("c", Fixed::new(1, 40, 'c')),
    ]);
    let mut el = event_loop(reg, Size::new(24, 80), &[]);
    el.start().unwrap();

    let dash = el.dashboard();
    assert_eq!(dash.pages().len(), 1);
    assert_eq!(rect(dash, 0), Some(Rect::new(11, 0, 1, 40)));
    assert_eq!(rect(dash, 1), Some(Rect::new(11, 40, 1, 40)));
    assert_eq!(rect(dash, 2), Some(Rect::new(12, 20, 1, 40)));
}

#[test]
fn scenario_c_wakeups_pop_in_time_order() {
    let t = Timestamp::new(500, 0);
    let mut queue = WakeupQueue::new();
    queue.schedule(t.saturating_add_duration(Duration::from_secs(3)), 0).unwrap();
    queue.schedule(t.saturating_add_duration(Duration::from_secs(1)), 1).unwrap();
    queue.schedule(t.saturating_add_duration(Duration::from_secs(2)), 2).unwrap();

    let order: Vec<i64> = std::iter::from_fn(|| queue.pop()).map(|w| w.time.secs - t.secs).collect();
    assert_eq!(order, [1, 2, 3]);
}

#[test]
fn scenario_d_zero_delay_runs_again_before_later_gadgets() {
    let busy = Fixed::new(1, 1, '!').every(Duration::ZERO);
    let busy_ticks = Rc::clone(&busy.ticks);
    let idle = Fixed::new(1, 1, '_').every(Duration::from_secs(5));
    let idle_ticks = Rc::clone(&idle.ticks);

    let mut el = event_loop(registry(vec![("idle", idle), ("busy", busy)]), Size::new(24, 80), &[]);
    el.start().unwrap();
    assert_eq!((idle_ticks.get(), busy_ticks.get()), (1, 1));

    for _ in 0..5 {
        assert_eq!(el.step().unwrap(), LoopState::DispatchTick);
        assert_eq!(el.wakeups().peek().map(|w| w.gadget), Some(1));
    }
    assert_eq!(busy_ticks.get(), 6);
    assert_eq!(idle_ticks.get(), 1);
}

#[test]
fn navigation_walks_pages_and_quits() {
    let reg = registry(vec![
        ("p0", Fixed::new(20, 80, '0')),
        ("p1", Fixed::new(20, 80, '1')),
    ]);
    let mut el = event_loop(reg, Size::new(24, 80), &[Key::Right, Key::Right, Key::Left, Key::Quit]);
    el.start().unwrap();
    assert_eq!(el.dashboard().pages().len(), 2);

    el.step().unwrap();
    assert_eq!(el.dashboard().pages().current_index(), Some(1));
    assert_eq!(el.dashboard().screen().row(3).map(|r| r.starts_with('1')), Some(true));

    el.step().unwrap();
    assert_eq!(el.dashboard().pages().current_index(), Some(1));

    el.step().unwrap();
    assert_eq!(el.dashboard().pages().current_index(), Some(0));
    assert_eq!(el.dashboard().screen().row(3).map(|r| r.starts_with('0')), Some(true));

    assert_eq!(el.step().unwrap(), LoopState::Quit);
}

#[test]
fn shrinking_terminal_shows_failure_until_it_grows_back() {
    let reg = registry(vec![("big", Fixed::new(10, 30, 'B'))]);
    let mut el = event_loop(reg, Size::new(24, 80), &[Key::Resize, Key::Resize]);
    el.start().unwrap();
    assert_eq!(el.dashboard().pages().len(), 1);

    el.dashboard().screen().set_size(Size::new(8, 20));
    el.step().unwrap();
    assert!(el.dashboard().pages().is_empty());
    assert!(el.dashboard().banner().is_failure());
    let banner = el.dashboard().screen().row(0).unwrap();
    assert_eq!(banner, "unable to place gadg");

    el.dashboard().screen().set_size(Size::new(24, 80));
    el.step().unwrap();
    assert_eq!(el.dashboard().pages().len(), 1);
    assert_eq!(*el.dashboard().banner(), Banner::Normal);
}

#[test]
fn unknown_module_is_fatal_and_names_directories() {
    let dir = tempfile::tempdir().unwrap();
    let mut reg = Registry::new(ModuleSearch::new(Some(dir.path().to_path_buf()), None));
    let err = reg.load("no_such_gadget").unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }));
    assert!(err.to_string().contains(&dir.path().display().to_string()));
    assert!(reg.is_empty());
}

#[test]
fn builtin_clock_draws_time() {
    let dir = tempfile::tempdir().unwrap();
    let mut reg = Registry::new(ModuleSearch::new(Some(dir.path().to_path_buf()), None));
    reg.load("clock").unwrap();

    let mut el = event_loop(reg, Size::new(24, 80), &[]);
    el.start().unwrap();

    let r = rect(el.dashboard(), 0).unwrap();
    assert_eq!((r.height, r.width), (1, 8));
    let row = el.dashboard().screen().row(usize::from(r.y)).unwrap();
    let text: String = row.chars().skip(usize::from(r.x)).take(8).collect();
    assert_eq!(text.matches(':').count(), 2);
}

// the onoff module library, when the workspace build has produced it
#[cfg(feature = "plugin-system")]
fn built_onoff_library() -> Option<std::path::PathBuf> {
    use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};

    let exe = std::env::current_exe().ok()?;
    // target/<profile>/deps/<test binary>
    let profile_dir = exe.parent()?.parent()?;
    let lib = profile_dir.join(format!("{DLL_PREFIX}constatus_module_onoff{DLL_SUFFIX}"));
    lib.is_file().then_some(lib)
}

#[cfg(feature = "plugin-system")]
#[test]
fn plugin_file_is_resolved_and_drawn() {
    let Some(lib) = built_onoff_library() else {
        eprintln!("onoff module not built; build the workspace to run this test");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(&lib, dir.path().join(ModuleSearch::file_name("onoff"))).unwrap();

    let mut reg = Registry::new(ModuleSearch::new(Some(dir.path().to_path_buf()), None));
    reg.load("onoff").unwrap();
    assert_eq!(reg.gadgets()[0].size(), Size::new(1, 1));

    let mut el = event_loop(reg, Size::new(24, 80), &[]);
    el.start().unwrap();

    assert_eq!(rect(el.dashboard(), 0), Some(Rect::new(12, 39, 1, 1)));
    let row = el.dashboard().screen().row(12).unwrap();
    assert_eq!(row.chars().nth(39), Some('*'));
}
