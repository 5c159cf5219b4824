//! JavaScript minification using the oxc toolchain.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::TextMinifier;
use crate::config::JsConfig;

/// Minifies classic browser scripts
#[derive(Debug)]
pub struct JsMinifier {
    mangle: bool,
}

impl JsMinifier {
    pub fn new(config: &JsConfig) -> Self {
        Self {
            mangle: config.mangle,
        }
    }
}

impl Default for JsMinifier {
    fn default() -> Self {
        Self::new(&JsConfig::default())
    }
}

impl TextMinifier for JsMinifier {
    fn minify(&self, source: &str) -> Result<String, String> {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

        if parsed.panicked || !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
            return Err(format!("JS parse error: {}", messages.join("; ")));
        }

        let mut program = parsed.program;

        // Top-level names stay intact: other scripts on the page may use them
        let options = MinifierOptions {
            mangle: self.mangle.then(MangleOptions::default),
            compress: Some(CompressOptions::default()),
        };
        let minified = Minifier::new(options).build(&allocator, &mut program);

        let output = Codegen::new()
            .with_options(CodegenOptions::minify())
            .with_scoping(minified.scoping)
            .build(&program);

        Ok(output.code)
    }
}
