//! SWC-based parsing of JS/TS/JSX source into an AST.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{FileName, Globals, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// Parse a JS/TS/JSX source string into an AST.
///
/// TSX syntax is a superset of everything we scan, so a single syntax setting
/// covers .js/.jsx/.ts/.tsx inputs. Each call owns its SourceMap so parallel
/// parsing stays thread-safe.
pub fn parse_source(code: String, file_path: &str) -> Result<Module> {
    use swc_common::GLOBALS;

    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e))
    })
}
