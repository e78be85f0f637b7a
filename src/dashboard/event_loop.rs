/*
 *  dashboard/event_loop.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Single-threaded loop merging keyboard input with gadget wakeups
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

//! The top-level driver.
//!
//! Each [`EventLoop::step`] peeks the earliest wakeup, waits for input for at
//! most the time remaining until it, and then dispatches either the key that
//! arrived or the due gadget tick. The wait is the only place the loop
//! blocks; gadget calls run to completion in between.

use std::io;
use std::time::Duration;
use log::{debug, error, info};

use crate::dashboard::error::RuntimeError;
use crate::dashboard::manager::Dashboard;
use crate::dashboard::page::Direction;
use crate::dashboard::traits::Screen;
use crate::timespec::{millis_until, Clock, Timestamp};
use crate::wakeup::WakeupQueue;

/// Input the loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Quit,
    /// The terminal changed size
    Resize,
    Left,
    Right,
    Other,
}

/// Blocking source of keys
pub trait InputSource {
    /// Wait up to `timeout` for input; `Ok(false)` means the timeout expired
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Read one pending key
    fn read(&mut self) -> io::Result<Key>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Wait,
    DispatchInput,
    DispatchTick,
    Quit,
}

pub struct EventLoop<S: Screen, I: InputSource, C: Clock> {
    dashboard: Dashboard<S>,
    input: I,
    clock: C,
    wakeups: WakeupQueue,
    state: LoopState,
}

impl<S: Screen, I: InputSource, C: Clock> EventLoop<S, I, C> {
    pub fn new(dashboard: Dashboard<S>, input: I, clock: C) -> Self {
        Self {
            dashboard,
            input,
            clock,
            wakeups: WakeupQueue::new(),
            state: LoopState::Wait,
        }
    }

    pub fn dashboard(&self) -> &Dashboard<S> {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard<S> {
        &mut self.dashboard
    }

    pub fn wakeups(&self) -> &WakeupQueue {
        &self.wakeups
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// First layout and draw, then one callback per gadget to seed the
    /// wakeup queue
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        info!("starting with {} gadgets", self.dashboard.gadgets().len());
        self.dashboard.update_layout_and_draw()?;
        for idx in 0..self.dashboard.gadgets().len() {
            self.tick(idx)?;
        }
        self.dashboard.redraw_if_needed()?;
        self.dashboard.present()?;
        Ok(())
    }

    // run a gadget's callback and queue its next wakeup, anchored at the
    // time the callback was invoked
    fn tick(&mut self, idx: usize) -> Result<(), RuntimeError> {
        let now = self.now()?;
        match self.dashboard.tick(idx) {
            Some(delay) => {
                let wake = now.saturating_add_duration(delay);
                self.wakeups.schedule(wake, idx)?;
            }
            None => error!("gadget {} produced no delay; it will not run again", idx),
        }
        Ok(())
    }

    fn now(&self) -> Result<Timestamp, RuntimeError> {
        self.clock.now().map_err(RuntimeError::Clock)
    }

    /// One WAIT -> dispatch cycle. Returns the state that was dispatched;
    /// `Wait` means the wait ended without anything to do.
    pub fn step(&mut self) -> Result<LoopState, RuntimeError> {
        self.state = LoopState::Wait;

        let deadline = self.wakeups.peek().ok_or(RuntimeError::NoPendingWakeups)?.time;
        let (millis, overflow) = millis_until(deadline, self.now()?);
        let timeout = Duration::from_millis(u64::try_from(millis).unwrap_or(0));

        let ready = match self.input.poll(timeout) {
            Ok(ready) => ready,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                debug!("wait interrupted; retrying");
                return Ok(LoopState::Wait);
            }
            Err(e) => return Err(RuntimeError::Poll(e)),
        };

        if ready {
            self.state = LoopState::DispatchInput;
            let key = match self.input.read() {
                Ok(key) => key,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(LoopState::Wait),
                Err(e) => return Err(RuntimeError::Input(e)),
            };
            if self.handle_key(key)? {
                self.state = LoopState::Quit;
                return Ok(self.state);
            }
        } else if !overflow {
            self.state = LoopState::DispatchTick;
            if let Some(wake) = self.wakeups.pop() {
                self.tick(wake.gadget)?;
            }
        } else {
            // a saturated timeout ran out before the real deadline
            return Ok(LoopState::Wait);
        }

        self.dashboard.redraw_if_needed()?;
        self.dashboard.present()?;
        Ok(self.state)
    }

    // true when the key asks to quit
    fn handle_key(&mut self, key: Key) -> Result<bool, RuntimeError> {
        match key {
            Key::Quit => return Ok(true),
            Key::Resize => self.dashboard.update_layout_and_draw()?,
            Key::Left => {
                self.dashboard.navigate(Direction::Prev)?;
            }
            Key::Right => {
                self.dashboard.navigate(Direction::Next)?;
            }
            Key::Other => {}
        }
        Ok(false)
    }

    /// Start, then step until asked to quit
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.start()?;
        while self.step()? != LoopState::Quit {}
        info!("quit requested");
        Ok(())
    }

    pub fn into_dashboard(self) -> Dashboard<S> {
        self.dashboard
    }
}
