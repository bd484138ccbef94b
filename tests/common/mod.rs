// Shared fixtures for the integration tests
#![allow(dead_code)]

use jmmc::ast::builder::*;
use jmmc::ast::Program;
use jmmc::{Compilation, Config};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
}

/// `class Main` holding `methods`, no imports
pub fn class_with(methods: Vec<MethodBuilder>) -> Program {
    program(&[], methods.into_iter().fold(ClassBuilder::new("Main"), ClassBuilder::method).build())
}

/// Messages of every diagnostic the review passes produce
pub fn messages(program: &Program) -> Vec<String> {
    let (_, diagnostics) = jmmc::check(program).expect("symbol table");
    diagnostics.into_iter().map(|d| d.message).collect()
}

pub fn compile_ok(program: Program, config: &Config) -> Compilation {
    init_logging();
    match jmmc::compile(program, config) {
        Ok(compilation) => compilation,
        Err(e) => panic!("compilation failed: {} {:?}", e, e.diagnostics()),
    }
}

/// Trimmed body lines of method `name` in Jasmin output, header excluded
pub fn method_lines<'a>(assembly: &'a str, name: &str) -> Vec<&'a str> {
    let header = format!(" {}(", name);
    assembly
        .lines()
        .skip_while(|line| !(line.starts_with(".method") && line.contains(&header)))
        .skip(1)
        .take_while(|line| *line != ".end method")
        .map(str::trim)
        .collect()
}

/// True when `first` is immediately followed by `second` somewhere in `lines`
pub fn adjacent(lines: &[&str], first: &str, second: &str) -> bool {
    lines.windows(2).any(|pair| pair[0] == first && pair[1] == second)
}
