//! CSS minification using lightningcss.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use super::TextMinifier;

/// Minifies stylesheets
#[derive(Debug, Default)]
pub struct CssMinifier;

impl TextMinifier for CssMinifier {
    fn minify(&self, source: &str) -> Result<String, String> {
        let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| format!("CSS minify error: {}", e))?;

        let output = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS print error: {}", e))?;

        Ok(output.code)
    }
}
