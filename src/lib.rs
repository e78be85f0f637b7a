/*
 *  lib.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
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

//! A terminal dashboard of small gadgets.
//!
//! Gadgets come from modules (built in, or shared libraries loaded by name),
//! are packed into centered rows and pages that fit the terminal, and redraw
//! themselves on their own schedule from a single event loop.

pub mod config;
pub mod timespec;
pub mod wakeup;
pub mod dashboard;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
