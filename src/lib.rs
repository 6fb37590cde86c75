//! jerase — Java local-variable type erasure tool
//!
//! A source-to-source transformation that erases the declared type of every
//! local variable to the universal top type (`Object` by default) and
//! reinserts explicit casts where the erased type information is still
//! needed to preserve program meaning.
//!
//! ## Architecture
//!
//! The tool follows a three-phase pipeline:
//!
//! - **parser**: Lexical analysis and parsing of Java source into AST
//! - **erase**: The erasure pass (scope-tracked type rewriting plus
//!   call-site cast reinsertion)
//! - **ast**: Abstract Syntax Tree representation and source printing
//! - **bin**: Command-line interface
//!
//! ## Transformation Flow
//!
//! ```text
//! Java Source → Parser → AST → Type Eraser → Source Printer → Java Source
//! ```
//!
//! A declaration `String s = "a";` becomes `Object s = (String) "a";`, and a
//! later reassignment `s = build();` becomes `s = (String) build();`. Every
//! node kind the eraser does not specifically target passes through the
//! traversal unchanged.

pub mod ast;
pub mod config;
pub mod consts;
pub mod erase;
pub mod error;
pub mod parser;

pub use config::Config;
pub use error::{Error, Result};

use std::path::Path;

/// Transform Java source text without touching the filesystem
///
/// Parses one compilation unit, runs the erasure pass over it, and renders
/// the transformed tree back to source text. Useful for tests and in-memory
/// callers.
pub fn transform(source: &str, config: &Config) -> Result<String> {
    let ast = parser::parse_java(source)?;

    let mut eraser = erase::TypeEraser::new(config);
    let ast = eraser.process(ast)?;

    let mut printer = ast::SourcePrinter::new();
    Ok(printer.print(&ast))
}

/// Transform a Java source file, writing the result to `output`
///
/// This is the main entry point behind the CLI: read → transform → write.
/// There is no partial-write recovery; a failed write leaves the output file
/// in an undefined state.
pub fn transform_file(input: &Path, output: &Path, config: &Config) -> Result<()> {
    eprintln!("📂 JERASE: Transforming file: {}", input.display());

    let source = std::fs::read_to_string(input)?;
    let transformed = transform(&source, config)?;
    std::fs::write(output, transformed.as_bytes())?;

    eprintln!("✅ JERASE: Transformation complete");
    Ok(())
}
