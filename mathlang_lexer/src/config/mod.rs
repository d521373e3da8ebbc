//! Configuration module for the MathLang lexer
//! Compile-time limits are generated from TOML by build.rs; runtime preferences live in `runtime`

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("MATHLANG_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("MATHLANG_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::{file_processing, lexical, logging};
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(file_processing::MAX_FILE_SIZE > 0);
        assert!(file_processing::MAX_LINE_COUNT > 0);
        assert!(lexical::MAX_TOKEN_COUNT > 0);
        assert!(lexical::MAX_NAME_LENGTH > 0);
        assert!(lexical::MAX_STRING_SIZE > 0);
        assert!(lexical::MAX_NUMBER_LENGTH > 0);
        assert!(logging::LOG_BUFFER_SIZE >= 100);
    }

    #[test]
    fn test_build_info() {
        assert!(build_info::source_info().ends_with(".toml"));
        assert!(!build_info::profile().is_empty());
    }
}
