//! A command and alias table with tab completion.
//!
//! Run with `RUST_LOG=radix_map=trace cargo run --example command_table` to
//! see arena growth and node reuse.

use std::sync::Arc;

use radix_map::{Config, Error, RadixMap};
use tracing_subscriber::EnvFilter;

type Handler = Arc<dyn Fn(&[&str]) -> String + Send + Sync>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let commands: RadixMap<Handler> = RadixMap::with_capacity(16);

    let teleport: Handler = Arc::new(|args: &[&str]| format!("teleporting to {}", args.join(" ")));
    let home: Handler = Arc::new(|_: &[&str]| "going home".to_string());
    let help: Handler = Arc::new(|_: &[&str]| "commands: teleport, tp, home, help".to_string());

    commands.insert("teleport", teleport.clone());
    commands.insert("tp", teleport);
    commands.insert("home", home);
    commands.insert("help", help);

    println!("=== Dispatch ===\n");
    for line in ["tp 10 64 -3", "home", "helpme", "help"] {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        match commands.get(name) {
            Some(handler) => println!("{line:>14} -> {}", handler(&args[..])),
            None => println!("{line:>14} -> unknown command"),
        }
    }

    println!("\n=== Completion ===\n");
    for typed in ["t", "he", "h", "x"] {
        let candidates: Vec<String> = commands
            .keys_with_prefix(typed)
            .into_iter()
            .map(|k| String::from_utf8_lossy(&k).into_owned())
            .collect();
        println!("{typed:>3} -> {candidates:?}");
    }

    println!("\n=== Unregister ===\n");
    commands.remove("tp");
    println!("tp registered: {}", commands.contains_key("tp"));
    println!("teleport registered: {}", commands.contains_key("teleport"));
    {
        let tree = commands.read();
        println!(
            "keys: {}, live nodes: {}, free nodes: {}, capacity: {}",
            tree.len(),
            tree.node_count(),
            tree.free_nodes(),
            tree.capacity()
        );
    }

    println!("\n=== Bounded table ===\n");
    let config = Config::default().with_initial_capacity(4).with_max_nodes(8);
    let aliases: RadixMap<&str> = RadixMap::with_config(config).expect("valid config");
    for (alias, target) in [("gm", "gamemode"), ("gmc", "gamemode creative"), ("warp", "warp"), ("spawn", "spawn")] {
        match aliases.try_insert(alias, target) {
            Ok(_) => println!("{alias:>5} -> {target}"),
            Err(err @ Error::CapacityExceeded { .. }) => println!("{alias:>5} rejected: {err}"),
            Err(err) => println!("{alias:>5} failed: {err}"),
        }
    }
}
