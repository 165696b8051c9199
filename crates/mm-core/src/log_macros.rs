//! Domain-aware logging macros, following the teacher's `wf_log!` family.
//!
//! Each macro injects a `domain` field so callers don't repeat the string
//! literal. Domains used across the engine: `graph` (dependency-graph
//! construction), `sched` (scheduler/worker lifecycle), `parse`
//! (Matmakefile parsing), `cli` (front-end).
//!
//! ```ignore
//! use mm_core::log_macros::*;
//! mm_info!(graph, target = %name, rules = count, "dependencies calculated");
//! mm_warn!(sched, rule = %id, "rule is dirty but has no ready subscribers");
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! mm_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

#[macro_export]
macro_rules! mm_error {
    ($domain:ident, $($rest:tt)*) => {
        $crate::mm_log!(error, $domain, $($rest)*)
    };
}

#[macro_export]
macro_rules! mm_warn {
    ($domain:ident, $($rest:tt)*) => {
        $crate::mm_log!(warn, $domain, $($rest)*)
    };
}

#[macro_export]
macro_rules! mm_info {
    ($domain:ident, $($rest:tt)*) => {
        $crate::mm_log!(info, $domain, $($rest)*)
    };
}

#[macro_export]
macro_rules! mm_debug {
    ($domain:ident, $($rest:tt)*) => {
        $crate::mm_log!(debug, $domain, $($rest)*)
    };
}

#[allow(unused_macros)]
#[macro_export]
macro_rules! mm_trace {
    ($domain:ident, $($rest:tt)*) => {
        $crate::mm_log!(trace, $domain, $($rest)*)
    };
}
