//! Workspace tooling package. Hosts the rusty-hook pre-commit configuration;
//! the library lives in `crates/droneroute-lib`.
