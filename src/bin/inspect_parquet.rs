use anyhow::{Context, Result};
use bytes::Bytes;
use pqscope::inspect::{all_row_group_stats, read_footer};
use pqscope::{try_parse, ParseOptions};
use std::{env, fs, path::Path, process::exit};

fn main() {
    // Expect a path to a Parquet file, optionally followed by --all-row-groups.
    let args: Vec<String> = env::args().collect();
    let (file_path, all_groups) = match args.as_slice() {
        [_, path] => (path, false),
        [_, path, flag] if flag == "--all-row-groups" => (path, true),
        _ => {
            eprintln!("Usage: {} <PARQUET_FILE> [--all-row-groups]", args[0]);
            exit(1);
        }
    };

    match inspect_parquet(Path::new(file_path), all_groups) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}

/// Run the full pipeline over a local file and render the report as JSON.
/// With `all_groups`, the statistics of every row group are added under
/// `row_groups`.
fn inspect_parquet(path: &Path, all_groups: bool) -> Result<String> {
    let bytes = Bytes::from(
        fs::read(path).with_context(|| format!("reading {}", path.display()))?,
    );

    let report = try_parse(bytes.clone(), ParseOptions::default())
        .with_context(|| format!("parsing {}", path.display()))?;
    let mut json = serde_json::to_value(&report)?;

    if all_groups {
        let footer = read_footer(&bytes)?;
        let groups = all_row_group_stats(footer.parquet())?;
        json["row_groups"] = serde_json::to_value(groups)?;
    }

    Ok(serde_json::to_string_pretty(&json)?)
}
