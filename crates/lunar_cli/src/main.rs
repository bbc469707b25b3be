//! lunar: parse a Lua file and print its syntax tree as JSON.
//!
//! Usage:
//!   lunar [options] <file>
//!
//! Reads from stdin when the file is `-`.

use clap::Parser as ClapParser;
use lunar_core::{Encoding, LuaVersion, Options};
use lunar_diagnostics::Error;
use std::io::Read;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "lunar", about = "A Lua parser producing JSON syntax trees")]
struct Cli {
    /// Lua file to parse, or `-` for stdin.
    #[arg(value_name = "FILE")]
    file: String,

    /// Lua dialect: 5.1, 5.2, 5.3 or LuaJIT.
    #[arg(long = "lua-version", default_value = "5.1")]
    lua_version: String,

    /// String decoding: none, pseudo-latin1 or x-user-defined.
    #[arg(long = "encoding-mode", default_value = "none")]
    encoding_mode: String,

    /// Annotate identifiers with isLocal and collect globals.
    #[arg(long)]
    scope: bool,

    /// Attach line/column locations to nodes.
    #[arg(long)]
    locations: bool,

    /// Attach byte ranges to nodes.
    #[arg(long)]
    ranges: bool,

    /// Do not collect comments.
    #[arg(long = "no-comments")]
    no_comments: bool,

    /// Print the tree on a single line.
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let lua_version: LuaVersion = match cli.lua_version.parse() {
        Ok(version) => version,
        Err(error) => {
            eprintln!("lunar: {}", error);
            return 2;
        }
    };
    let encoding_mode: Encoding = match cli.encoding_mode.parse() {
        Ok(mode) => mode,
        Err(error) => {
            eprintln!("lunar: {}", error);
            return 2;
        }
    };

    let source = match read_source(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("lunar: {}: {}", cli.file, error);
            return 2;
        }
    };

    let options = Options {
        comments: !cli.no_comments,
        scope: cli.scope,
        locations: cli.locations,
        ranges: cli.ranges,
        lua_version,
        encoding_mode,
        extended_identifiers: None,
    };

    match lunar_parser::parse(&source, options) {
        Ok(chunk) => {
            let rendered = if cli.compact {
                serde_json::to_string(&chunk)
            } else {
                serde_json::to_string_pretty(&chunk)
            };
            match rendered {
                Ok(json) => {
                    println!("{}", json);
                    0
                }
                Err(error) => {
                    eprintln!("lunar: failed to serialize tree: {}", error);
                    1
                }
            }
        }
        Err(Error::Syntax(error)) => {
            eprintln!("{}:{}:{}: {}", cli.file, error.line, error.column, error.message);
            1
        }
        Err(error) => {
            eprintln!("lunar: {}", error);
            2
        }
    }
}

fn read_source(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(file)
    }
}
