// This file is part of posh, a POSIX-style shell.

//! Shell option flags (`set -e`, `set -u`, ...)

use bitflags::bitflags;

bitflags! {
    /// The shell's `set`-able option flags
    ///
    /// `Clobber`, `Exec`, `Glob` and `Unset` are *permissive* flags: they are
    /// on by default, and their short options (`-C`, `-n`, `-f`, `-u`) turn
    /// them off. The rest default off and their short options turn them on.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Options: u32 {
        /// `-a`: export every variable on assignment
        const ALL_EXPORT = 1 << 0;
        /// `-C`: refuse `>` redirection onto an existing file
        const CLOBBER    = 1 << 1;
        /// `-e`: exit on an unhandled command failure
        const ERR_EXIT   = 1 << 2;
        /// `-n`: read commands without executing them
        const EXEC       = 1 << 3;
        /// `-f`: pathname expansion
        const GLOB       = 1 << 4;
        /// `-m`: job control (background jobs run in their own process group)
        const MONITOR    = 1 << 5;
        /// `-b`: report background job completion asynchronously
        const NOTIFY     = 1 << 6;
        /// `-u`: treat an unset variable expansion as an error
        const UNSET      = 1 << 7;
        /// `-v`: echo input lines as they are read
        const VERBOSE    = 1 << 8;
        /// `-x`: trace each command before executing it
        const XTRACE     = 1 << 9;
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::CLOBBER | Options::EXEC | Options::GLOB | Options::UNSET
    }
}

impl Options {
    #[must_use]
    pub fn all_export(self) -> bool {
        self.contains(Options::ALL_EXPORT)
    }

    #[must_use]
    pub fn clobber(self) -> bool {
        self.contains(Options::CLOBBER)
    }

    #[must_use]
    pub fn errexit(self) -> bool {
        self.contains(Options::ERR_EXIT)
    }

    #[must_use]
    pub fn exec(self) -> bool {
        self.contains(Options::EXEC)
    }

    #[must_use]
    pub fn glob(self) -> bool {
        self.contains(Options::GLOB)
    }

    #[must_use]
    pub fn monitor(self) -> bool {
        self.contains(Options::MONITOR)
    }

    #[must_use]
    pub fn notify(self) -> bool {
        self.contains(Options::NOTIFY)
    }

    /// `set -u` (nounset): whether expanding an unset variable is an error
    #[must_use]
    pub fn nounset(self) -> bool {
        !self.contains(Options::UNSET)
    }

    #[must_use]
    pub fn verbose(self) -> bool {
        self.contains(Options::VERBOSE)
    }

    #[must_use]
    pub fn xtrace(self) -> bool {
        self.contains(Options::XTRACE)
    }
}

/// Whether a short option letter turns its flag on or off
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    On,
    Off,
}

/// Maps a `set -x`-style short option letter to the flag and polarity it
/// sets.
///
/// Returns `None` for an unrecognized letter.
#[must_use]
pub fn parse_short(c: char) -> Option<(Options, State)> {
    use State::{Off, On};
    Some(match c {
        'a' => (Options::ALL_EXPORT, On),
        'b' => (Options::NOTIFY, On),
        'C' => (Options::CLOBBER, Off),
        'e' => (Options::ERR_EXIT, On),
        'f' => (Options::GLOB, Off),
        'm' => (Options::MONITOR, On),
        'n' => (Options::EXEC, Off),
        'u' => (Options::UNSET, Off),
        'v' => (Options::VERBOSE, On),
        'x' => (Options::XTRACE, On),
        _ => return None,
    })
}

/// Renders the short option letters currently "in effect", for `$-`.
///
/// A letter appears when its flag is in the state its short option sets it
/// to: an on-polarity letter (`e`, `x`, ...) appears when its flag is set; an
/// off-polarity letter (`C`, `f`, `n`, `u`) appears when its flag is
/// *cleared*, since that's the state reached by passing that option.
#[must_use]
pub fn dash_flags(options: Options) -> String {
    ['a', 'b', 'C', 'e', 'f', 'm', 'n', 'u', 'v', 'x']
        .into_iter()
        .filter(|&c| {
            let (flag, state) = parse_short(c).expect("every letter above is recognized");
            match state {
                State::On => options.contains(flag),
                State::Off => !options.contains(flag),
            }
        })
        .collect()
}

/// Applies a short option letter's effect to `options`, in-place.
pub fn apply_short(options: &mut Options, c: char) -> bool {
    match parse_short(c) {
        Some((flag, State::On)) => {
            options.insert(flag);
            true
        }
        Some((flag, State::Off)) => {
            options.remove(flag);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let options = Options::default();
        assert!(options.clobber());
        assert!(options.exec());
        assert!(options.glob());
        assert!(!options.nounset());
        assert!(!options.errexit());
        assert!(!options.xtrace());
    }

    #[test]
    fn dash_e_turns_errexit_on() {
        let mut options = Options::default();
        assert!(apply_short(&mut options, 'e'));
        assert!(options.errexit());
    }

    #[test]
    fn dash_u_turns_unset_off_so_nounset_reads_true() {
        let mut options = Options::default();
        assert!(apply_short(&mut options, 'u'));
        assert!(options.nounset());
    }

    #[test]
    fn dash_capital_c_turns_clobber_off() {
        let mut options = Options::default();
        assert!(apply_short(&mut options, 'C'));
        assert!(!options.clobber());
    }

    #[test]
    fn unrecognized_letter_is_rejected() {
        let mut options = Options::default();
        assert!(!apply_short(&mut options, 'q'));
    }

    #[test]
    fn default_dash_flags_is_empty() {
        assert_eq!(dash_flags(Options::default()), "");
    }

    #[test]
    fn dash_flags_reports_toggled_options() {
        let mut options = Options::default();
        apply_short(&mut options, 'e');
        apply_short(&mut options, 'u');
        assert_eq!(dash_flags(options), "eu");
    }
}
