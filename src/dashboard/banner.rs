/*
 *  dashboard/banner.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  The one-line banner across the top of the screen
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

use log::{error, info};

use crate::dashboard::traits::MessageKind;

/// Rows reserved for the banner
pub const BANNER_ROWS: u16 = 1;

pub const BANNER_TEXT: &str = "constatus q:quit <-/->:page";

/// How the banner row is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerStyle {
    Normal,
    Error,
    Info,
}

/// Current banner content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Banner {
    #[default]
    Normal,

    /// Layout or navigation failure
    Failure(String),

    /// Message reported by a gadget, already prefixed with its name
    Message { kind: MessageKind, text: String },
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Normal => BANNER_TEXT,
            Banner::Failure(text) => text,
            Banner::Message { text, .. } => text,
        }
    }

    pub fn style(&self) -> BannerStyle {
        match self {
            Banner::Normal => BannerStyle::Normal,
            Banner::Failure(_) => BannerStyle::Error,
            Banner::Message { kind: MessageKind::Error, .. } => BannerStyle::Error,
            Banner::Message { kind: MessageKind::Info, .. } => BannerStyle::Info,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Banner::Failure(_))
    }

    /// A message reported by gadget `name`, logged as it is built
    pub fn gadget_message(name: &str, kind: MessageKind, text: &str) -> Banner {
        let text = format!("{name}: {text}");
        match kind {
            MessageKind::Error => error!("{}", text),
            MessageKind::Info => info!("{}", text),
        }
        Banner::Message { kind, text }
    }

    /// Banner text truncated or space-padded to exactly `width` characters
    pub fn line(&self, width: u16) -> String {
        let width = usize::from(width);
        let mut line: String = self
            .text()
            .chars()
            .take(width)
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let used = line.chars().count();
        line.extend(std::iter::repeat_n(' ', width - used));
        line
    }
}
