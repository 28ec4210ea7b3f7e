// steno-vop: command-line front end for the alignment library.
//
// Usage:
//   steno-vop tokenize <IPA>
//   steno-vop align <IPA> <BRIEF>
//   steno-vop elide <BRIEF> <IPA>
//   steno-vop batch <ENTRIES.json>
//   steno-vop fragments <PHONEME>
//
// Global flags: `--theory plover|phoenix`, `--theory-file FILE` (a theory
// JSON in the same shape as `data/*.json`), `--max-expansions N`,
// `--no-memo`. Log verbosity follows `RUST_LOG` (default `steno_vop=info`).
//
// `batch` reads a JSON array of `{"brief", "pronunciation"}` objects and
// prints one JSON outcome per entry, in input order.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use steno_vop_align::{
    AlignConfig, Aligner, BriefEntry, KnowledgeBase, Theory, elide_batch, elide_short_vowels,
    tokenize,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "steno-vop")]
#[command(about = "Align IPA pronunciations with steno briefs and elide short vowels")]
struct Args {
    /// Embedded theory table to align with
    #[arg(long, global = true, default_value = "plover")]
    theory: Theory,

    /// Load the theory table from a JSON file instead
    #[arg(long, global = true, value_name = "FILE")]
    theory_file: Option<PathBuf>,

    /// Give up on an alignment after this many search expansions
    #[arg(long, global = true)]
    max_expansions: Option<usize>,

    /// Disable deduplication of already-expanded search states
    #[arg(long, global = true)]
    no_memo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a pronunciation into phoneme tokens
    Tokenize { ipa: String },
    /// Show which chord fragment writes each phoneme
    Align { ipa: String, brief: String },
    /// Drop short unstressed vowels from a multi-chord brief
    Elide { brief: String, ipa: String },
    /// Run vowel elision over a JSON file of entries
    Batch { entries: PathBuf },
    /// List the key fragments the theory allows for one phoneme
    Fragments { phoneme: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("steno_vop=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let kb = match &args.theory_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading theory file {}", path.display()))?;
            KnowledgeBase::from_json(&json)
                .with_context(|| format!("loading theory file {}", path.display()))?
        }
        None => KnowledgeBase::for_theory(args.theory),
    };
    info!(theory = kb.name(), pairs = kb.len(), "loaded theory");

    let mut config = AlignConfig::default();
    if let Some(limit) = args.max_expansions {
        config.max_expansions = limit;
    }
    config.memoize = !args.no_memo;
    let aligner = Aligner::with_config(&kb, config);

    match args.command {
        Command::Tokenize { ipa } => {
            let tokens = tokenize(&ipa)?;
            println!("{}", tokens.join(" "));
        }
        Command::Align { ipa, brief } => {
            let alignment = aligner
                .align_brief(&ipa, &brief)
                .with_context(|| format!("aligning {brief} with {ipa}"))?;
            for (chord, group) in brief.split('/').zip(alignment.chord_groups()) {
                let tokens: Vec<String> = group.iter().map(ToString::to_string).collect();
                println!("{chord}: {}", tokens.join(" "));
            }
            println!("syllables: {}", alignment.syllables().join(" | "));
            info!(expansions = alignment.expansions(), "aligned");
        }
        Command::Elide { brief, ipa } => {
            println!("{}", elide_short_vowels(&brief, &ipa, &aligner)?);
        }
        Command::Batch { entries } => {
            let json = std::fs::read_to_string(&entries)
                .with_context(|| format!("reading {}", entries.display()))?;
            let entries: Vec<BriefEntry> =
                serde_json::from_str(&json).context("parsing batch entries")?;
            let outcomes = elide_batch(&entries, aligner.knowledge_base(), &aligner.config());
            info!(entries = entries.len(), "batch complete");
            for outcome in &outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }
        }
        Command::Fragments { phoneme } => {
            let kb = aligner.knowledge_base();
            let fragments: Vec<String> = kb
                .fragments_for(&phoneme)
                .map(|fragment| fragment.render())
                .collect();
            if fragments.is_empty() {
                anyhow::bail!("theory {} has no fragments for {phoneme:?}", kb.name());
            }
            println!("{}", fragments.join(" "));
        }
    }

    Ok(())
}
