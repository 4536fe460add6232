//! Command-line entry point
//!
//! Two subcommands mirror the two batch stages of the pipeline: `cloze`
//! extracts agreement cloze examples, `features` builds the per-language
//! word-feature tables. Output directories are refreshed on every run; the
//! stages are idempotent.

use agreebank::config::{self, LANGUAGES, Language};
use agreebank::{extract, lexicon};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "agreebank", about = "Agreement cloze examples from Universal Dependencies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract agreement cloze examples from UD corpora
    Cloze {
        /// Directory holding the UD_* treebank directories
        #[arg(long, default_value = "data/universaldependencies")]
        ud_dir: PathBuf,
        /// Output directory, refreshed on every run
        #[arg(long, default_value = "data/cloze")]
        out_dir: PathBuf,
        /// Restrict the run to the named languages
        #[arg(long = "language")]
        languages: Vec<String>,
    },
    /// Build per-language word-feature tables from UD and UniMorph
    Features {
        /// Directory holding the UD_* treebank directories
        #[arg(long, default_value = "data/universaldependencies")]
        ud_dir: PathBuf,
        /// Directory holding UniMorph inventories, one {code}/{code} per language
        #[arg(long, default_value = "data/unimorph")]
        unimorph_dir: PathBuf,
        /// Output directory, refreshed on every run
        #[arg(long, default_value = "data/features")]
        out_dir: PathBuf,
        /// Restrict the run to the named languages
        #[arg(long = "language")]
        languages: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Cloze {
            ud_dir,
            out_dir,
            languages,
        } => {
            let selection = select(&languages)?;
            refresh(&out_dir)?;
            extract::run(&selection, &ud_dir, &out_dir)?;
        }
        Command::Features {
            ud_dir,
            unimorph_dir,
            out_dir,
            languages,
        } => {
            let selection = select(&languages)?;
            refresh(&out_dir)?;
            lexicon::run(&selection, &ud_dir, &unimorph_dir, &out_dir)?;
        }
    }
    Ok(())
}

/// Resolve language names to configuration; empty selection means all
fn select(names: &[String]) -> anyhow::Result<Vec<Language>> {
    if names.is_empty() {
        return Ok(LANGUAGES.to_vec());
    }
    names
        .iter()
        .map(|name| match config::language(name) {
            Some(language) => Ok(*language),
            None => bail!("unknown language: {}", name),
        })
        .collect()
}

/// Create a brand new directory at `path`, removing any previous contents
fn refresh(path: &Path) -> anyhow::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("removing {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(())
}
