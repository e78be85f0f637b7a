/*
 *  dashboard/components/battery.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Linux battery gadget - one charge bar per battery from sysfs
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

//! Battery meter.
//!
//! The gadget asks to be as wide as the screen and one row per battery. Each
//! row is a centered `name: NNN%` label with the charged fraction of the row
//! drawn in reverse video.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, warn};

use crate::dashboard::error::InitError;
use crate::dashboard::surface::{Attr, Surface};
use crate::dashboard::traits::{Host, Instance, Module, ModuleDescriptor};

pub const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

const REFRESH: Duration = Duration::from_secs(1);
const RESIZE_ERROR: &str = "ERROR RESIZE";

#[derive(Debug, Clone)]
pub struct BatteryModule {
    root: PathBuf,
}

impl BatteryModule {
    /// Read power supplies from `root` instead of sysfs
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for BatteryModule {
    fn default() -> Self {
        Self::with_root(POWER_SUPPLY_DIR)
    }
}

impl Module for BatteryModule {
    fn descriptor(&self) -> ModuleDescriptor {
        // real size is requested on the first resize notification
        ModuleDescriptor { height: 1, width: 1 }
    }

    fn init(&self, host: &mut dyn Host) -> Result<Box<dyn Instance>, InitError> {
        let mut batteries = match probe(&self.root) {
            Ok(b) => b,
            Err(e) => {
                warn!("{}: {}", self.root.display(), e);
                host.err("error opening system batteries");
                return Err(InitError::Failed);
            }
        };
        for battery in &mut batteries {
            battery.refresh();
        }
        debug!("{} batteries under {}", batteries.len(), self.root.display());

        Ok(Box::new(BatteryInstance { batteries, resize_error: false }))
    }
}

#[derive(Debug, Clone)]
struct Battery {
    name: String,
    dir: PathBuf,
    // 0.0 ..= 1.0, None when unreadable
    charge: Option<f64>,
}

impl Battery {
    fn refresh(&mut self) {
        self.charge = read_charge(&self.dir);
    }
}

fn read_value(dir: &Path, file: &str) -> Option<f64> {
    fs::read_to_string(dir.join(file)).ok()?.trim().parse().ok()
}

fn read_ratio(dir: &Path, now: &str, full: &str) -> Option<f64> {
    let full = read_value(dir, full)?;
    if full <= 0.0 {
        return None;
    }
    Some(read_value(dir, now)? / full)
}

fn read_charge(dir: &Path) -> Option<f64> {
    let charge = read_value(dir, "capacity")
        .map(|pct| pct / 100.0)
        .or_else(|| read_ratio(dir, "energy_now", "energy_full"))
        .or_else(|| read_ratio(dir, "charge_now", "charge_full"))?;
    Some(charge.clamp(0.0, 1.0))
}

// every power supply whose type is Battery, by name
fn probe(root: &Path) -> io::Result<Vec<Battery>> {
    let mut batteries = Vec::new();
    for entry in fs::read_dir(root)? {
        let dir = entry?.path();
        let is_battery = fs::read_to_string(dir.join("type")).is_ok_and(|t| t.trim() == "Battery");
        if !is_battery {
            continue;
        }
        let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        batteries.push(Battery { name, dir, charge: None });
    }
    batteries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(batteries)
}

struct BatteryInstance {
    batteries: Vec<Battery>,
    resize_error: bool,
}

// centre `label` in a row of `width`, rounding half away from zero
fn centered(label: &str, width: usize) -> Option<String> {
    let len = label.chars().count();
    if len > width {
        return None;
    }
    let start = ((width - len) as f64 / 2.0).round() as usize;
    let mut row = " ".repeat(start);
    row.push_str(label);
    row.push_str(&" ".repeat(width - start - len));
    Some(row)
}

// the first `reverse` columns of `row` in reverse video
fn draw_row(surface: &mut dyn Surface, y: u16, row: &str, reverse: usize) {
    for (x, ch) in row.chars().enumerate() {
        let Ok(col) = u16::try_from(x) else {
            break;
        };
        let attr = if x < reverse { Attr::REVERSE } else { Attr::NORMAL };
        surface.put_char(y, col, ch, attr);
    }
}

fn draw_error_bar(surface: &mut dyn Surface, y: u16, name: &str) {
    let width = usize::from(surface.width());
    let label: String = format!("ERROR: {}", name).chars().take(width).collect();
    let len = label.chars().count();
    let row = format!("{}{}", label, " ".repeat(width - len));
    draw_row(surface, y, &row, len);
}

fn draw_resize_error(surface: &mut dyn Surface) {
    surface.erase();
    let width = usize::from(surface.width());
    let mid = surface.height() / 2;
    let len = RESIZE_ERROR.len();
    let start = if width > len { ((width - len) as f64 / 2.0).round() as usize } else { 0 };

    let mut row = " ".repeat(start);
    row.extend(RESIZE_ERROR.chars().take(width - start));
    let len = row.chars().count();
    row.push_str(&" ".repeat(width - len));
    // from the label to the edge in reverse video
    for (x, ch) in row.chars().enumerate().skip(start) {
        if let Ok(col) = u16::try_from(x) {
            surface.put_char(mid, col, ch, Attr::REVERSE);
        }
    }
}

impl Instance for BatteryInstance {
    fn display(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) {
        if self.resize_error {
            draw_resize_error(surface);
            return;
        }

        let width = usize::from(surface.width());
        if self.batteries.is_empty() {
            if let Some(row) = centered("no batteries", width) {
                draw_row(surface, 0, &row, 0);
            }
            return;
        }

        for (i, battery) in self.batteries.iter().enumerate() {
            let Ok(y) = u16::try_from(i) else {
                break;
            };
            if y >= surface.height() {
                break;
            }

            let Some(charge) = battery.charge else {
                draw_error_bar(surface, y, &battery.name);
                continue;
            };

            let label = format!("{}: {:3.0}%", battery.name, charge * 100.0);
            let Some(row) = centered(&label, width) else {
                host.err(&format!("{} data too wide to fit on screen", battery.name));
                draw_error_bar(surface, y, &battery.name);
                continue;
            };

            let filled = (width as f64 * charge).round() as usize;
            draw_row(surface, y, &row, filled);
        }
    }

    fn callback(&mut self, host: &mut dyn Host, surface: &mut dyn Surface) -> Duration {
        for battery in &mut self.batteries {
            battery.refresh();
        }
        self.display(host, surface);
        REFRESH
    }

    fn resize(&mut self, host: &mut dyn Host, _screen_height: u16, screen_width: u16) {
        let rows = u16::try_from(self.batteries.len().max(1)).unwrap_or(u16::MAX);
        if host.request_resize(rows, screen_width).is_err() {
            host.err("error resizing to fit console");
            self.resize_error = true;
            return;
        }
        self.resize_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::error::ResizeError;
    use crate::dashboard::surface::Window;
    use crate::dashboard::traits::MessageKind;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingHost {
        messages: Vec<String>,
        resizes: Vec<(u16, u16)>,
        refuse: bool,
    }

    impl Host for RecordingHost {
        fn report(&mut self, _kind: MessageKind, text: &str) {
            self.messages.push(text.to_string());
        }

        fn request_resize(&mut self, height: u16, width: u16) -> Result<(), ResizeError> {
            self.resizes.push((height, width));
            if self.refuse { Err(ResizeError::InvalidHeight(height)) } else { Ok(()) }
        }
    }

    fn supply(root: &Path, name: &str, files: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, contents) in files {
            fs::write(dir.join(file), contents).unwrap();
        }
    }

    fn sysfs() -> TempDir {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "BAT0", &[("type", "Battery\n"), ("capacity", "50\n")]);
        supply(root.path(), "BAT1", &[("type", "Battery\n"), ("energy_now", "15000\n"), ("energy_full", "60000\n")]);
        supply(root.path(), "AC", &[("type", "Mains\n"), ("online", "1\n")]);
        root
    }

    #[test]
    fn test_probe_finds_batteries_only() {
        let root = sysfs();
        let found = probe(root.path()).unwrap();
        let names: Vec<&str> = found.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["BAT0", "BAT1"]);
    }

    #[test]
    fn test_charge_sources() {
        let root = sysfs();
        assert_eq!(read_charge(&root.path().join("BAT0")), Some(0.5));
        assert_eq!(read_charge(&root.path().join("BAT1")), Some(0.25));
        assert_eq!(read_charge(&root.path().join("AC")), None);
    }

    #[test]
    fn test_missing_power_supply_dir_fails_init() {
        let root = tempfile::tempdir().unwrap();
        let module = BatteryModule::with_root(root.path().join("absent"));
        let mut host = RecordingHost::default();
        assert!(module.init(&mut host).is_err());
        assert_eq!(host.messages, ["error opening system batteries"]);
    }

    #[test]
    fn test_resize_requests_screen_width() {
        let root = sysfs();
        let module = BatteryModule::with_root(root.path());
        let mut host = RecordingHost::default();
        let mut instance = module.init(&mut host).unwrap();

        instance.resize(&mut host, 23, 40);
        assert_eq!(host.resizes, [(2, 40)]);
    }

    #[test]
    fn test_rows_are_centered_with_charge_bar() {
        let root = sysfs();
        let module = BatteryModule::with_root(root.path());
        let mut host = RecordingHost::default();
        let mut instance = module.init(&mut host).unwrap();
        let mut win = Window::offscreen(2, 20);

        instance.display(&mut host, &mut win);
        // "BAT0:  50%" is 10 wide, centered in 20
        assert_eq!(win.row_text(0), "     BAT0:  50%     ");
        assert_eq!(win.row_text(1), "     BAT1:  25%     ");
        assert!(win.row(0)[9].attr.reverse);
        assert!(!win.row(0)[10].attr.reverse);
        assert!(win.row(1)[4].attr.reverse);
        assert!(!win.row(1)[5].attr.reverse);
    }

    #[test]
    fn test_unreadable_battery_draws_error_bar() {
        let root = sysfs();
        let module = BatteryModule::with_root(root.path());
        let mut host = RecordingHost::default();
        let mut instance = module.init(&mut host).unwrap();
        fs::remove_file(root.path().join("BAT0/capacity")).unwrap();
        let mut win = Window::offscreen(2, 16);

        instance.callback(&mut host, &mut win);
        assert_eq!(win.row_text(0), "ERROR: BAT0     ");
        assert!(win.row(0)[10].attr.reverse);
        assert!(!win.row(0)[11].attr.reverse);
    }

    #[test]
    fn test_label_too_wide_is_reported() {
        let root = sysfs();
        let module = BatteryModule::with_root(root.path());
        let mut host = RecordingHost::default();
        let mut instance = module.init(&mut host).unwrap();
        let mut win = Window::offscreen(2, 8);

        instance.display(&mut host, &mut win);
        assert!(host.messages.contains(&"BAT0 data too wide to fit on screen".to_string()));
        assert_eq!(win.row_text(0), "ERROR: B");
    }

    #[test]
    fn test_refused_resize_shows_error() {
        let root = sysfs();
        let module = BatteryModule::with_root(root.path());
        let mut host = RecordingHost { refuse: true, ..Default::default() };
        let mut instance = module.init(&mut host).unwrap();
        let mut win = Window::offscreen(1, 16);

        instance.resize(&mut host, 23, 16);
        assert_eq!(host.messages, ["error resizing to fit console"]);

        instance.display(&mut host, &mut win);
        assert_eq!(win.row_text(0), "  ERROR RESIZE  ");
        assert!(!win.row(0)[1].attr.reverse);
        assert!(win.row(0)[2].attr.reverse);
        assert!(win.row(0)[15].attr.reverse);
    }
}
