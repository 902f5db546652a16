use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::{path::Path, thread};

use crate::{
    api::public_api_report,
    collector::collect_entries,
    config::{Config, Options},
    golden::{golden_path, verify_golden, write_golden},
    types::{EntryResult, RunResult},
};

/// Renders every entry of `cfg`, writing or verifying golden files when asked.
///
/// Any hard failure of one entry fails the whole run.
pub fn run_public_api_check(mut cfg: Config) -> Result<RunResult> {
    info!("Starting public API run");
    cfg.initialize()?;
    let root = cfg.root()?.clone();
    let options = cfg.options()?;

    let entries = collect_entries(&root, &cfg.entries)?;
    if entries.is_empty() {
        warn!("No declaration files found in {:?}", cfg.entries);
        return Err(anyhow!("No declaration files found in {:?}", cfg.entries));
    }
    info!("Processing {} entry files in parallel", entries.len());

    let results = entries
        .par_iter()
        .map(|entry| {
            debug!("Thread {:?} processing: {}", thread::current().id(), entry.display());
            run_entry(&cfg, &root, &options, entry)
        })
        .collect::<Result<Vec<_>>>()?;

    let run = RunResult { entries: results };
    info!("Public API run complete. {} entries, {} warnings", run.entries.len(), run.warning_count());
    Ok(run)
}

fn run_entry(cfg: &Config, root: &Path, options: &Options, entry: &Path) -> Result<EntryResult> {
    let report = public_api_report(entry, options).with_context(|| format!("failed to render {}", entry.display()))?;
    let rel_entry = entry.strip_prefix(root).unwrap_or(entry).to_string_lossy().to_string();

    let mut result = EntryResult { entry: rel_entry, report, golden: None, verification: None };
    if let Some(dir) = &cfg.out_dir {
        let golden = golden_path(&root.join(dir), root, entry);
        write_golden(&golden, &result.report.render())?;
        result.golden = Some(golden);
    } else if let Some(dir) = &cfg.verify_dir {
        let golden = golden_path(&root.join(dir), root, entry);
        let verification = verify_golden(&golden, &result.report.render())?;
        debug!("{}: {:?}", result.entry, verification);
        result.verification = Some(verification);
        result.golden = Some(golden);
    }
    Ok(result)
}
