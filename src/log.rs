//! Logger backend agnostic logging

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Cannot select log and defmt features together.");

#[cfg(feature = "defmt")]
#[allow(unused_imports)]
pub(crate) use defmt::{debug, error, info, trace, warn};

#[cfg(feature = "log")]
#[allow(unused_imports)]
pub(crate) use log::{debug, error, info, trace, warn};

// The names must not collide with the built-in `warn` attribute, so the
// macros are defined under a prefix and re-exported with the plain names.
#[cfg(not(any(feature = "defmt", feature = "log")))]
mod noop {
    macro_rules! log_noop {
        ($fmt:literal $(, $arg:expr)* $(,)?) => {{
            $(let _ = &$arg;)*
        }};
    }

    #[allow(unused_imports)]
    pub(crate) use {
        log_noop as debug, log_noop as error, log_noop as info, log_noop as trace,
        log_noop as warn,
    };
}

#[cfg(not(any(feature = "defmt", feature = "log")))]
#[allow(unused_imports)]
pub(crate) use noop::{debug, error, info, trace, warn};
