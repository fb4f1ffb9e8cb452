use anyhow::{Context, Result, bail};
use linear_doc_config::Config;
use linear_doc_engine::{Document, Transaction, model::invariants};
use std::{
    env,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process,
};

/// Where the journal comes from and whether to verify after each step.
struct Replay {
    document_path: PathBuf,
    journal_path: PathBuf,
    verify_balance: bool,
}

impl Replay {
    fn from_args(args: &[String], config: Option<Config>) -> Result<Self> {
        let verify_balance = config.as_ref().is_some_and(|c| c.verify_balance);

        match args {
            [_, document, journal] => Ok(Self {
                document_path: PathBuf::from(document),
                journal_path: PathBuf::from(journal),
                verify_balance,
            }),
            [_, document] => match config {
                Some(config) => Ok(Self {
                    document_path: PathBuf::from(document),
                    journal_path: config.journal_path,
                    verify_balance,
                }),
                None => bail!(
                    "No journal given and no config file found at {}",
                    Config::config_path().display()
                ),
            },
            _ => bail!("Wrong number of arguments"),
        }
    }
}

fn load_document(path: &Path) -> Result<Document> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Document::from_bytes(&bytes).with_context(|| format!("Invalid document {}", path.display()))
}

/// Apply every non-blank line of `journal` as a transaction, in order.
fn replay<R: BufRead>(doc: &mut Document, journal: R, verify_balance: bool) -> Result<usize> {
    let mut applied = 0;
    for (index, line) in journal.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let tx: Transaction = serde_json::from_str(&line)
            .with_context(|| format!("Journal line {line_number} is not a transaction"))?;
        let patch = doc
            .apply(&tx)
            .with_context(|| format!("Journal line {line_number} does not apply"))?;
        log::info!(
            "line {line_number}: version {} length {:+} changed {:?}{}",
            patch.version,
            patch.length_difference,
            patch.changed,
            if patch.metadata_changed { " (metadata)" } else { "" }
        );
        if verify_balance {
            invariants::validate(doc.data(), doc.metadata(), doc.store().len())
                .with_context(|| format!("Journal line {line_number} left the document broken"))?;
        }
        applied += 1;
    }
    Ok(applied)
}

fn run(args: &[String]) -> Result<()> {
    let config = Config::load()
        .with_context(|| format!("Failed to load {}", Config::config_path().display()))?;
    let replay_args = Replay::from_args(args, config)?;
    let mut doc = load_document(&replay_args.document_path)?;

    let journal = std::fs::File::open(&replay_args.journal_path).with_context(|| {
        format!("Failed to open journal {}", replay_args.journal_path.display())
    })?;
    let applied = replay(
        &mut doc,
        BufReader::new(journal),
        replay_args.verify_balance,
    )?;
    log::info!(
        "Applied {applied} transactions from {}",
        replay_args.journal_path.display()
    );

    let mut stdout = io::stdout().lock();
    stdout.write_all(&doc.to_bytes()?)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        eprintln!(
            "Usage: {} <document.json> [journal.jsonl]",
            args.first().map(String::as_str).unwrap_or("linear-doc-cli")
        );
        process::exit(1);
    }
}
