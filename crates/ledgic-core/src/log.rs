use derive_more::Display;

///
/// Level
///

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Display)]
pub enum Level {
    Debug, // least severe
    Info,
    Ok,
    Warn,
    Error, // most severe
}

///
/// Topic
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Topic {
    Call,
    Config,
    Index,
    Ledger,
    Wire,
}

#[macro_export]
macro_rules! log {
    // =========================================
    // (1) With topic (normal + trailing comma)
    // =========================================
    ($topic:expr, $level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner Some(&$topic.to_string()), $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // (2) No topic (normal + trailing comma)
    // =========================================
    ($level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner None::<&str>, $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // INTERNAL
    // =========================================
    (@inner $topic:expr, $level:expr, $fmt:expr $(, $arg:expr)*) => {{
        let level = $level;
        let topic_opt: Option<&str> = $topic;
        let message = format!($fmt $(, $arg)*);

        let topic_centered = format!("{:^6}", topic_opt.unwrap_or("..."));

        let (color, reset) = match level {
            $crate::log::Level::Ok    => ("\x1b[32m", "\x1b[0m"),
            $crate::log::Level::Info  => ("\x1b[34m", "\x1b[0m"),
            $crate::log::Level::Warn  => ("\x1b[33m", "\x1b[0m"),
            $crate::log::Level::Error => ("\x1b[31m", "\x1b[0m"),
            $crate::log::Level::Debug => ("", ""),
        };

        let label = format!("{color}{:^5}{reset}", level.to_string().to_uppercase());
        let line = format!("{label}|{topic_centered}| {message}");

        $crate::log::__emit(&line);
    }};
}

///
/// Helpers
///

// inside a canister stdout is the replica debug print
#[doc(hidden)]
pub fn __emit(line: &str) {
    #[cfg(target_arch = "wasm32")]
    crate::cdk::println!("{line}");

    #[cfg(not(target_arch = "wasm32"))]
    println!("{line}");
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Topic::Ledger.to_string(), "Ledger");
    }

    #[test]
    fn macro_accepts_both_forms() {
        crate::log!(Topic::Wire, Debug, "encoded {} bytes", 12);
        crate::log!(Info, "no topic, trailing comma {}", 1,);
    }
}
