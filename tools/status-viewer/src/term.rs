//! Terminal state guards
//!
//! Both guards put the terminal back the way they found it when dropped,
//! so an early `?` return still leaves a usable shell.

use std::io::{self, Write};
use std::mem::MaybeUninit;

use crate::tui::screen;

/// Non-canonical, no-echo input on stdin for as long as the guard lives
pub struct RawMode {
    saved: libc::termios,
}

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        let mut saved = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr fully initialises the struct when it returns 0
        let saved = unsafe {
            if libc::tcgetattr(libc::STDIN_FILENO, saved.as_mut_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }
            saved.assume_init()
        };

        let mut raw = saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        // SAFETY: `raw` is a valid termios copied from the current settings
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        log::debug!("terminal raw mode enabled");
        Ok(Self { saved })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // SAFETY: restores the settings read in `enable`
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.saved);
        }
    }
}

/// Alternate screen buffer on stdout
pub struct AlternateScreen;

impl AlternateScreen {
    pub fn enter() -> io::Result<Self> {
        let mut out = String::new();
        screen::enter_alternate(&mut out);
        let mut stdout = io::stdout();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;
        Ok(Self)
    }
}

impl Drop for AlternateScreen {
    fn drop(&mut self) {
        let mut out = String::new();
        screen::exit_alternate(&mut out);
        let mut stdout = io::stdout();
        let _ = stdout.write_all(out.as_bytes());
        let _ = stdout.flush();
    }
}
