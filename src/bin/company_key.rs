// src/bin/company_key.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};

use company_match_lib::matching::keys::KeyStrategy;
use company_match_lib::utils::env::{load_env, log_env_source};

#[derive(Parser)]
#[command(author, version, about = "Print the company keys derived from URLs", long_about = None)]
struct KeyArgs {
    /// URLs to normalize; read one per line from stdin when omitted
    urls: Vec<String>,

    /// Only print the key for this strategy (domain_key or token_key)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<KeyStrategy>,
}

fn parse_strategy(value: &str) -> Result<KeyStrategy, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown strategy '{}', expected domain_key or token_key", value))
}

fn write_keys(out: &mut impl Write, url: &str, strategy: Option<KeyStrategy>) -> io::Result<()> {
    match strategy {
        Some(strategy) => writeln!(out, "{}\t{}", url, strategy.extract(url)),
        None => writeln!(
            out,
            "{}\t{}\t{}",
            url,
            KeyStrategy::DomainKey.extract(url),
            KeyStrategy::TokenKey.extract(url)
        ),
    }
}

fn main() -> Result<()> {
    let env_file = load_env();
    env_logger::init();
    log_env_source(env_file.as_deref());
    let args = KeyArgs::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.urls.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read URL from stdin")?;
            let url = line.trim();
            if url.is_empty() {
                continue;
            }
            write_keys(&mut out, url, args.strategy)?;
        }
    } else {
        for url in &args.urls {
            write_keys(&mut out, url, args.strategy)?;
        }
    }

    out.flush()?;
    Ok(())
}
