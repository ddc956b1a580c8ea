//! netbuf - Network Buffer Pool Demo
//!
//! Exercises the pool and its free-list stack from the command line:
//! - `pool` fills a pool, releases slots in and out of acquisition order and
//!   prints the resulting statistics
//! - `stack` reads stack commands from stdin and shows the slot layout,
//!   holes included, after each one

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use netbuf_core::{init_logging, BoundedStack, BufferPool, BufferTag, FrameKind, PoolConfig};
use tracing::info;

fn print_help() {
    println!("netbuf - Network Buffer Pool v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("  netbuf [OPTIONS] [pool|stack]");
    println!();
    println!("COMMANDS:");
    println!("  pool             Fill and drain a pool, then print its statistics (default)");
    println!("  stack            Drive a free-list stack interactively from stdin");
    println!();
    println!("OPTIONS:");
    println!("  --config <FILE>  Load the pool configuration from a JSON file");
    println!("  --json           Print pool statistics as JSON");
    println!("  -h, --help       Print this help message");
    println!("  -v, --version    Print version information");
    println!();
    println!("STACK COMMANDS:");
    println!("  push N, pop, remove N, compact, show, quit");
}

enum Mode {
    Pool,
    Stack,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut config = PoolConfig::default();
    let mut json = false;
    let mut mode = Mode::Pool;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                println!("netbuf {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--config" => {
                let path = args.next().context("--config requires a file path")?;
                config = PoolConfig::from_file(&path)
                    .with_context(|| format!("failed to load configuration from {path}"))?;
            }
            "--json" => json = true,
            "pool" => mode = Mode::Pool,
            "stack" => mode = Mode::Stack,
            _ => {
                eprintln!("error: unrecognized argument '{}'", arg);
                eprintln!("Run 'netbuf --help' for usage information.");
                std::process::exit(1);
            }
        }
    }

    init_logging()?;

    match mode {
        Mode::Pool => run_pool(config, json),
        Mode::Stack => run_stack(config.num_buffers),
    }
}

fn run_pool(config: PoolConfig, json: bool) -> Result<()> {
    let mut pool = BufferPool::with_config(config)?;

    let mut held = Vec::with_capacity(pool.num_buffers());
    while let Some(slot) = pool.acquire() {
        let frame = slot.index().to_le_bytes();
        let len = frame.len().min(pool.buffer_capacity());
        pool.write_checked(slot, &frame[..len])?;
        pool.buffer_mut(slot)?.set_tag(BufferTag {
            if_type: 0,
            if_id: 0,
            id: 0x100 + slot.index(),
            frame_kind: FrameKind::Data,
        });
        held.push(slot);
    }
    pool.update_counters();
    info!(acquired = held.len(), "Pool exhausted");

    // Every second slot goes back out of order, the rest drain from the LRU end.
    for &slot in held.iter().skip(1).step_by(2) {
        pool.release(slot)?;
    }
    while let Some(lru) = pool.least_recently_used() {
        info!(slot = %lru, "Releasing LRU slot");
        pool.release(lru)?;
    }

    let stats = pool.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.print_report();
    }
    Ok(())
}

fn run_stack(capacity: usize) -> Result<()> {
    let mut stack: BoundedStack<u64> = BoundedStack::with_capacity(capacity)?;
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "stack of capacity {capacity}; commands: push N, pop, remove N, compact, show, quit"
    )?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let reply = match (words.next(), words.next()) {
            (None, _) => continue,
            (Some("quit" | "exit"), _) => break,
            (Some("push"), Some(_)) if stack.is_full() => "stack is full".to_string(),
            (Some("push"), Some(arg)) => match arg.parse() {
                Ok(value) => {
                    stack.push(value);
                    format!("pushed {value}")
                }
                Err(_) => format!("not a number: {arg}"),
            },
            (Some("pop"), None) if stack.is_empty() => "stack is empty".to_string(),
            (Some("pop"), None) if !stack.is_sorted() => {
                "stack is fragmented; run compact first".to_string()
            }
            (Some("pop"), None) => format!("popped {}", stack.pop()),
            (Some("remove"), Some(arg)) => match arg.parse::<u64>() {
                Ok(value) => {
                    if stack.remove(&value) {
                        format!("removed {value}")
                    } else {
                        format!("{value} not found")
                    }
                }
                Err(_) => format!("not a number: {arg}"),
            },
            (Some("compact"), None) => {
                stack.compact();
                "compacted".to_string()
            }
            (Some("show"), None) => String::new(),
            (Some(cmd), _) => format!("unknown command: {cmd}"),
        };
        if !reply.is_empty() {
            writeln!(out, "{reply}")?;
        }
        writeln!(out, "{}", render(&stack))?;
    }
    Ok(())
}

fn render(stack: &BoundedStack<u64>) -> String {
    let slots: Vec<String> = stack
        .slots()
        .iter()
        .map(|slot| slot.map_or_else(|| "_".to_string(), |v| v.to_string()))
        .collect();
    format!(
        "[{}] count={} sorted={}",
        slots.join(" "),
        stack.count(),
        stack.is_sorted()
    )
}
