//! # Screen Binding Generator
//!
//! Derives one framework-binding module per screen class exported by the core
//! authentication SDK, plus an aggregate entry module that re-exports them.
//!
//! ## Pipeline
//!
//! 1. **Declaration index**: names the documentation pipeline considers public.
//! 2. **Screen symbols**: every class exported from the core SDK's screens entry.
//! 3. Per screen, independently:
//!    - inherited instance properties (`inheritance`)
//!    - contract method signatures from `<Screen>Members` (`contract`)
//!    - direct vs utility routing (`utility`)
//!    - referenced type identifiers (`type_deps`)
//!    - module emission (`emit`)
//! 4. **Aggregate index**, written after every screen module.
//! 5. **Post-generation formatter**, once, only when no errors were counted.
//!
//! Source analysis goes through the [`project::DeclarationQuery`] capability,
//! backed by the oxc parser. Nothing here evaluates the SDK at runtime.

pub mod aggregate;
pub mod config;
pub mod contract;
pub mod docs_index;
pub mod emit;
pub mod error;
pub mod format;
pub mod generate;
pub mod inheritance;
pub mod logging;
pub mod naming;
pub mod parse;
pub mod project;
pub mod screens;
pub mod type_deps;
pub mod utility;

#[cfg(test)]
mod parse_tests;

pub use config::{EmitSettings, GeneratorConfig};
pub use error::{Diagnostics, GeneratorError, SkipReason, UnmappedUtility};
pub use format::{NpmScriptFormatter, PostGenerationFormatter};
pub use generate::{generate, GenerationReport, Phase, RunMode, ScreenReport};
pub use project::{DeclarationQuery, FsLoader, MemoryLoader, SourceLoader, SourceProject};
