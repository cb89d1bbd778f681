/// # Project level surfaces around an attribution session
/// The CLI and config file are thin layers, every embedder can drive
/// `CompilerFrontend` directly instead.

// The basic CLI for attributing a set of files
pub mod cli;

// typegraph.toml and the crate wide constants
pub mod settings;
