// TOKEN LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_tokens")]
macro_rules! token_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_tokens"))]
macro_rules! token_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// Extra timer logging
#[macro_export]
#[cfg(feature = "detailed_timers")]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        saying::say!($msg, Green #$time.elapsed());
    };
}

#[macro_export]
#[cfg(not(feature = "detailed_timers"))]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        // Nothing
    };
}

// AST LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_ast")]
macro_rules! ast_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_ast"))]
macro_rules! ast_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// SYMBOL ENTRY / COMPLETION LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_symbols")]
macro_rules! symbol_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_symbols"))]
macro_rules! symbol_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// ATTRIBUTION LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_attribution")]
macro_rules! attribution_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_attribution"))]
macro_rules! attribution_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// TYPE MAPPING LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_type_mapping")]
macro_rules! type_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_type_mapping"))]
macro_rules! type_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// SESSION LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_session")]
macro_rules! session_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_session"))]
macro_rules! session_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// TREE BUILDING LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_trees")]
macro_rules! tree_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_trees"))]
macro_rules! tree_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}
