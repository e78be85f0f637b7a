/*
 *  dashboard/drivers/terminal.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Real terminal backend on crossterm: session, screen and keyboard
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

use std::io::{self, Stdout, Write};
use std::sync::OnceLock;
use std::time::Duration;
use log::{debug, info};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};

use crate::dashboard::banner::{Banner, BannerStyle};
use crate::dashboard::error::ScreenError;
use crate::dashboard::event_loop::{InputSource, Key};
use crate::dashboard::surface::{Attr, Rect, Size, Window};
use crate::dashboard::traits::Screen;

/// Raw mode, alternate screen and hidden cursor for the life of the value.
///
/// The terminal is restored by [`TerminalSession::finish`], on drop, or from
/// the panic hook, whichever comes first.
#[derive(Debug)]
pub struct TerminalSession {
    active: bool,
}

impl TerminalSession {
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        // from here on drop restores the terminal
        let session = Self { active: true };

        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        debug!("terminal session started");
        Ok(session)
    }

    /// Restore the terminal, reporting any failure
    pub fn finish(mut self) -> io::Result<()> {
        self.active = false;
        let mut stdout = io::stdout();
        let shown = execute!(stdout, cursor::Show, LeaveAlternateScreen);
        let cooked = terminal::disable_raw_mode();
        info!("terminal session finished");
        shown.and(cooked)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            best_effort_cleanup();
        }
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, ResetColor, cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Screen drawn straight onto the terminal
pub struct TerminalScreen {
    out: Stdout,
    size: Size,
    clear_pending: bool,
}

impl TerminalScreen {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            size: Size::default(),
            clear_pending: true,
        }
    }

    fn draw_banner(&mut self, banner: &Banner) -> io::Result<()> {
        let fg = match banner.style() {
            BannerStyle::Normal | BannerStyle::Info => Color::Black,
            BannerStyle::Error => Color::Yellow,
        };
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            SetBackgroundColor(Color::Red),
            SetForegroundColor(fg)
        )?;
        if banner.style() == BannerStyle::Error {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            self.out,
            Print(banner.line(self.size.width)),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn draw_window(&mut self, window: &Window) -> io::Result<()> {
        let rect = window.rect();
        let mut current = Attr::NORMAL;
        for wy in 0..rect.height {
            queue!(self.out, cursor::MoveTo(rect.x, rect.y + wy))?;
            for cell in window.row(wy) {
                if cell.attr != current {
                    queue!(self.out, SetAttribute(Attribute::Reset))?;
                    if cell.attr.reverse {
                        queue!(self.out, SetAttribute(Attribute::Reverse))?;
                    }
                    if cell.attr.bold {
                        queue!(self.out, SetAttribute(Attribute::Bold))?;
                    }
                    current = cell.attr;
                }
                queue!(self.out, Print(cell.ch))?;
            }
        }
        if current != Attr::NORMAL {
            queue!(self.out, SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }
}

impl Default for TerminalScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for TerminalScreen {
    fn size(&mut self) -> Result<Size, ScreenError> {
        let (cols, rows) = terminal::size()?;
        self.size = Size::new(rows, cols);
        Ok(self.size)
    }

    fn new_window(&mut self, rect: Rect) -> Result<Window, ScreenError> {
        if rect.bottom() > u32::from(self.size.height) || rect.right() > u32::from(self.size.width) {
            return Err(ScreenError::OutOfBounds {
                y: rect.y,
                x: rect.x,
                height: rect.height,
                width: rect.width,
                screen_height: self.size.height,
                screen_width: self.size.width,
            });
        }
        Ok(Window::new(rect))
    }

    fn clear(&mut self) -> Result<(), ScreenError> {
        self.clear_pending = true;
        Ok(())
    }

    fn present(&mut self, banner: &Banner, windows: &[&Window]) -> Result<(), ScreenError> {
        if std::mem::take(&mut self.clear_pending) {
            queue!(self.out, Clear(ClearType::All))?;
        }
        self.draw_banner(banner)?;
        for window in windows {
            self.draw_window(window)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Keyboard and resize events from the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Key> {
        Ok(map_event(event::read()?))
    }
}

/// Map a terminal event to a dashboard key
pub fn map_event(event: Event) -> Key {
    match event {
        Event::Resize(..) => Key::Resize,
        Event::Key(key) => map_key(key),
        _ => Key::Other,
    }
}

fn map_key(key: KeyEvent) -> Key {
    if key.kind == KeyEventKind::Release {
        return Key::Other;
    }
    match key.code {
        KeyCode::Char('q') => Key::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        _ => Key::Other,
    }
}
