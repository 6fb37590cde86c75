//! Parser module for Java source
//!
//! This module handles lexical analysis and parsing of one Java compilation
//! unit into an AST.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use lexer::{Lexer, LexicalToken, Token};
pub use parser::Parser;

use crate::ast::Ast;
use crate::error::Result;

/// Parse a Java compilation unit into an AST
pub fn parse_java(source: &str) -> Result<Ast> {
    let parser = Parser::new(source)?;
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_class() {
        let source = r#"
package com.example;

public class HelloWorld {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}
"#;

        let ast = parse_java(source).expect("Failed to parse");
        assert_eq!(ast.package_decl.as_ref().map(|p| p.name.as_str()), Some("com.example"));
        assert_eq!(ast.type_decls.len(), 1);
    }

    #[test]
    fn test_parse_with_imports() {
        let source = r#"
package com.example;

import java.util.List;
import java.util.ArrayList;
import static java.util.Collections.emptyList;
import java.io.*;

public class TestClass {
    private List<String> items = new ArrayList<>();
}
"#;

        let ast = parse_java(source).expect("Failed to parse");
        assert_eq!(ast.imports.len(), 4);
        assert!(ast.imports[2].is_static);
        assert!(ast.imports[3].is_wildcard);
    }

    #[test]
    fn test_parse_empty_source() {
        let ast = parse_java("").expect("Failed to parse");
        assert!(ast.type_decls.is_empty());
    }
}
