/// Trace output for the cleanup protocol, compiled in only with the
/// `extra_verbose_debug_logging` feature.
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {
        #[cfg(feature = "extra_verbose_debug_logging")]
        println!(
            "{:?} {}: {}",
            std::thread::current().id(),
            module_path!(),
            format!($($arg)*)
        );
        #[cfg(not(feature = "extra_verbose_debug_logging"))]
        {
            let _ = format_args!($($arg)*);
        }
    };
}
