use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;
use wwwcraft_persist::download::RecordedDownloads;
use wwwcraft_persist::gateway::SaveGateway;
use wwwcraft_persist::store::FileStore;
use wwwcraft_shared::anchor::{anchors, spawn_point};
use wwwcraft_shared::save::GameSave;

const USAGE: &str = "Usage: save_inspector <index.wwwCraft.json> [#anchor] | save_inspector --store <dir> [#anchor]";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let (source, fragment) = match args.as_slice() {
        [flag, dir] if flag == "--store" => (Source::Store(dir.clone()), String::new()),
        [flag, dir, fragment] if flag == "--store" => (Source::Store(dir.clone()), fragment.clone()),
        [path] if !path.starts_with("--") => (Source::File(path.clone()), String::new()),
        [path, fragment] if !path.starts_with("--") => (Source::File(path.clone()), fragment.clone()),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&source, &fragment) {
        eprintln!("save_inspector error: {err}");
        std::process::exit(1);
    }
}

enum Source {
    File(String),
    Store(String),
}

fn run(source: &Source, fragment: &str) -> Result<(), String> {
    let save = match source {
        Source::File(path) => {
            let raw = fs::read_to_string(path).map_err(|err| format!("failed to read {path}: {err}"))?;
            println!("Save file: {path}");
            GameSave::decode(&raw)
        }
        Source::Store(dir) => {
            let store = FileStore::open(Path::new(dir))
                .map_err(|err| format!("failed to open store {dir}: {err}"))?;
            println!("Local store: {dir}");
            SaveGateway::new(Box::new(store), Box::new(RecordedDownloads::default())).load_local()
        }
    };

    println!("Seed: {}", save.seed);
    match save.position {
        Some(pos) => println!("Position: ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z),
        None => println!("Position: none"),
    }

    println!("Custom blocks: {}", save.blocks.len());
    for block in &save.blocks {
        if block.extra.is_empty() {
            println!("  block @ {block}");
        } else {
            println!("  block @ {block} {}", Value::Object(block.extra.clone()));
        }
    }

    let named: Vec<_> = anchors(&save.blocks).collect();
    println!("Anchors: {}", named.len());
    for (name, pos) in named {
        println!("  #{name} @ ({}, {}, {})", pos.x, pos.y, pos.z);
    }

    if !fragment.is_empty() {
        match spawn_point(&save, fragment) {
            Some(spawn) => println!(
                "Spawn for {fragment}: ({:.2}, {:.2}, {:.2})",
                spawn.x, spawn.y, spawn.z
            ),
            None => println!("Spawn for {fragment}: camera unchanged"),
        }
    }

    Ok(())
}
