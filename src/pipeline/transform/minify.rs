//! Minification stages.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Input that fails to
//! parse is passed through unchanged.

use anyhow::Result;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{bool_option, expect_bool};
use crate::log;
use crate::pipeline::stage::{StageContext, Transform};

/// `minify-js`: options `mangle` (default true), `module` (default true).
pub struct MinifyJs;

impl Transform for MinifyJs {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn apply(&self, input: Vec<u8>, config: &toml::Table, ctx: &StageContext) -> Result<Vec<u8>> {
        let Ok(source) = std::str::from_utf8(&input) else {
            log!("minify"; "{} is not valid UTF-8, left unminified", ctx.source.display());
            return Ok(input);
        };
        let mangle = bool_option(config, "mangle", true);
        let module = bool_option(config, "module", true);
        match minify_js(source, mangle, module) {
            Some(code) => Ok(code.into_bytes()),
            None => {
                log!("minify"; "failed to parse {}, left unminified", ctx.source.display());
                Ok(input)
            }
        }
    }

    fn validate(&self, config: &toml::Table) -> Vec<String> {
        ["mangle", "module"]
            .into_iter()
            .filter_map(|key| expect_bool(config, key))
            .collect()
    }
}

/// `minify-css`: no options.
pub struct MinifyCss;

impl Transform for MinifyCss {
    fn name(&self) -> &'static str {
        "minify-css"
    }

    fn apply(&self, input: Vec<u8>, _config: &toml::Table, ctx: &StageContext) -> Result<Vec<u8>> {
        let minified = std::str::from_utf8(&input).ok().and_then(minify_css);
        match minified {
            Some(code) => Ok(code.into_bytes()),
            None => {
                log!("minify"; "failed to parse {}, left unminified", ctx.source.display());
                Ok(input)
            }
        }
    }
}

/// Minify JavaScript source code.
pub fn minify_js(source: &str, mangle: bool, module: bool) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = if module { SourceType::mjs() } else { SourceType::cjs() };
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: mangle.then(MangleOptions::default),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()
        .map(|result| result.code)
}
