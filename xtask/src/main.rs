use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const SCHEMA: &str = "docs/schema/entity-model.json";

fn main() {
    let args: Vec<String> = env::args().collect();

    let result = match args.get(1).map(|s| s.as_str()) {
        Some("generate") => generate(&parse_out_dir(&args[2..]), false),
        Some("check") => check(&parse_out_dir(&args[2..])),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("xtask: {e}");
        std::process::exit(1);
    }
}

fn print_help() {
    eprintln!("Usage: cargo xtask <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate [--out <dir>]  Generate every artifact from {SCHEMA}");
    eprintln!("  check [--out <dir>]     Generate, then check a second run reproduces the files");
    eprintln!("  help                    Show this message");
}

fn parse_out_dir(args: &[String]) -> PathBuf {
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--out" && i + 1 < args.len() {
            return PathBuf::from(&args[i + 1]);
        }
        i += 1;
    }
    PathBuf::from("target/generated")
}

/// Run the entitygen binary with every output under `out_dir`.
fn generate(out_dir: &Path, check_only: bool) -> Result<(), String> {
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut cmd = Command::new(cargo);
    cmd.args(["run", "--quiet", "-p", "entitygen", "--"])
        .arg("--schema")
        .arg(SCHEMA)
        .arg("--out")
        .arg(out_dir.join("go/model_gen.go"))
        .arg("--openapi")
        .arg(out_dir.join("openapi/entity-model.yaml"))
        .arg("--sql-postgres")
        .arg(out_dir.join("sql/postgres.sql"))
        .arg("--sql-sqlite")
        .arg(out_dir.join("sql/sqlite.sql"));
    if check_only {
        cmd.arg("--check");
    }

    let status = cmd
        .status()
        .map_err(|e| format!("Failed to run cargo: {e}"))?;
    if !status.success() {
        return Err(format!("entitygen exited with {status}"));
    }
    if !check_only {
        println!("Generated artifacts in {}", out_dir.display());
    }
    Ok(())
}

fn check(out_dir: &Path) -> Result<(), String> {
    generate(out_dir, false)?;
    generate(out_dir, true)?;
    println!("Generation is reproducible");
    Ok(())
}
