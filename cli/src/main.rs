//! hushpoll CLI - drive anonymous commit-reveal polls locally
//!
//! Commands:
//! - init: create a registry state file with an operator
//! - roster: build a membership tree from a roster file
//! - create-poll / commit / prove / reveal / batch-reveal / resolve
//! - show / tally: inspect polls
//! - hash / identity: compute protocol values off-line
//!
//! Registry state persists between invocations in a JSON snapshot
//! (default `hushpoll.json`). Proofs use the in-process digest backend;
//! a real proving toolchain would slot in behind the same verifier trait.

use clap::{Parser, Subcommand};
use hushpoll_core::field::Fe;
use hushpoll_core::hash;
use hushpoll_core::merkle::MembershipTree;
use hushpoll_core::registry::PollRegistry;
use hushpoll_core::reveal::RevealProcessor;
use hushpoll_core::verifier::{DigestVerifier, PublicInputs};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

mod types;

use types::{RevealBundle, RosterOutput};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "hushpoll")]
#[command(about = "Anonymous commit-reveal polls", long_about = None)]
struct Cli {
    /// Registry state file
    #[arg(long, global = true, default_value = "hushpoll.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh registry state file
    Init {
        /// Operator identity allowed to create and resolve polls
        #[arg(short, long)]
        operator: String,
    },

    /// Build a membership tree from a roster file (one secret per line)
    Roster {
        /// Roster file of identity secrets
        #[arg(short, long)]
        members: PathBuf,

        /// Output file for the root and per-member paths
        #[arg(short, long, default_value = "roster.json")]
        output: PathBuf,
    },

    /// Create a poll (operator only)
    CreatePoll {
        #[arg(short, long)]
        question: String,

        /// Poll options; pass at least twice
        #[arg(short = 'o', long = "option")]
        options: Vec<String>,

        /// Commit deadline (RFC3339 or unix seconds)
        #[arg(long)]
        commit_end: String,

        /// Reveal deadline (RFC3339 or unix seconds)
        #[arg(long)]
        reveal_end: String,

        /// Membership root from `hushpoll roster`
        #[arg(long)]
        root: String,

        /// Caller identity; defaults to the configured operator
        #[arg(long)]
        caller: Option<String>,

        /// Override the clock (RFC3339 or unix seconds)
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a commitment during the commit phase
    Commit {
        #[arg(short, long)]
        poll: u64,

        /// Commitment hash (decimal or 0x-hex)
        #[arg(short, long)]
        commitment: String,

        #[arg(long)]
        at: Option<String>,
    },

    /// Generate a reveal bundle with the digest proof backend
    Prove {
        #[arg(short, long)]
        poll: u64,

        /// Option index being voted for
        #[arg(short, long)]
        choice: u32,

        /// Per-poll secret bound into the commitment
        #[arg(short, long)]
        secret: String,

        /// Identity secret bound into the nullifier
        #[arg(short, long)]
        identity: String,

        /// Output bundle file
        #[arg(short, long, default_value = "reveal.json")]
        output: PathBuf,
    },

    /// Submit a reveal bundle
    Reveal {
        #[arg(short, long)]
        poll: u64,

        /// Bundle file from `hushpoll prove`
        #[arg(short, long, default_value = "reveal.json")]
        bundle: PathBuf,

        #[arg(long)]
        at: Option<String>,
    },

    /// Submit a batch of reveal bundles, all-or-nothing
    BatchReveal {
        #[arg(short, long)]
        poll: u64,

        /// JSON file holding an array of bundles
        #[arg(short, long)]
        bundles: PathBuf,

        #[arg(long)]
        at: Option<String>,
    },

    /// Record the poll outcome (operator only, after the reveal window)
    Resolve {
        #[arg(short, long)]
        poll: u64,

        /// Index of the correct option
        #[arg(short, long)]
        correct: u32,

        #[arg(long)]
        caller: Option<String>,

        #[arg(long)]
        at: Option<String>,
    },

    /// Show one poll, or all polls
    Show {
        #[arg(short, long)]
        poll: Option<u64>,

        #[arg(long)]
        at: Option<String>,
    },

    /// Print the tally of a poll
    Tally {
        #[arg(short, long)]
        poll: u64,
    },

    /// Compute commitment and nullifier for given inputs
    Hash {
        #[arg(short, long)]
        poll: u64,

        #[arg(short, long)]
        choice: u32,

        #[arg(short, long)]
        secret: String,

        #[arg(short, long)]
        identity: String,
    },

    /// Derive an identity secret from a handle and salt
    Identity {
        #[arg(long)]
        handle: String,

        #[arg(long, default_value = "hushpoll")]
        salt: String,
    },

    /// Mint a fresh random per-poll secret
    Secret,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Init { operator } => cmd_init(&cli.state, &operator),
        Commands::Roster { members, output } => cmd_roster(&members, &output),
        Commands::CreatePoll {
            question,
            options,
            commit_end,
            reveal_end,
            root,
            caller,
            at,
        } => cmd_create_poll(
            &cli.state,
            &question,
            options,
            &commit_end,
            &reveal_end,
            &root,
            caller,
            at,
        ),
        Commands::Commit {
            poll,
            commitment,
            at,
        } => cmd_commit(&cli.state, poll, &commitment, at),
        Commands::Prove {
            poll,
            choice,
            secret,
            identity,
            output,
        } => cmd_prove(&cli.state, poll, choice, &secret, &identity, &output),
        Commands::Reveal { poll, bundle, at } => cmd_reveal(&cli.state, poll, &bundle, at),
        Commands::BatchReveal { poll, bundles, at } => {
            cmd_batch_reveal(&cli.state, poll, &bundles, at)
        }
        Commands::Resolve {
            poll,
            correct,
            caller,
            at,
        } => cmd_resolve(&cli.state, poll, correct, caller, at),
        Commands::Show { poll, at } => cmd_show(&cli.state, poll, at),
        Commands::Tally { poll } => cmd_tally(&cli.state, poll),
        Commands::Hash {
            poll,
            choice,
            secret,
            identity,
        } => cmd_hash(poll, choice, &secret, &identity),
        Commands::Identity { handle, salt } => {
            println!("{}", hash::derive_identity_secret(&handle, &salt));
            Ok(())
        }
        Commands::Secret => {
            println!("{}", hash::random_secret());
            Ok(())
        }
    }
}

fn cmd_init(state: &Path, operator: &str) -> CliResult<()> {
    if state.exists() {
        return Err(format!("state file {:?} already exists", state).into());
    }
    save_registry(state, &PollRegistry::new(operator))?;
    println!("Initialized registry at {:?} (operator: {})", state, operator);
    Ok(())
}

fn cmd_roster(members: &Path, output: &Path) -> CliResult<()> {
    let raw = fs::read_to_string(members)?;
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    let secrets = lines
        .iter()
        .map(|l| Fe::parse(l))
        .collect::<Result<Vec<Fe>, _>>()?;

    let tree = MembershipTree::build(&secrets)?;
    let out = RosterOutput::from_tree(&tree, &lines);
    fs::write(output, serde_json::to_string_pretty(&out)?)?;

    println!("Members: {}", tree.member_count());
    println!("Root:    {}", tree.root());
    println!("Paths written to {:?}", output);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_create_poll(
    state: &Path,
    question: &str,
    options: Vec<String>,
    commit_end: &str,
    reveal_end: &str,
    root: &str,
    caller: Option<String>,
    at: Option<String>,
) -> CliResult<()> {
    let mut registry = load_registry(state)?;
    let caller = caller.unwrap_or_else(|| registry.operator().to_string());
    let commit_end = parse_timestamp(commit_end)?;
    let reveal_end = parse_timestamp(reveal_end)?;
    let root = Fe::parse(root)?;
    let now = now_or(at)?;

    let id = registry.create_poll(&caller, question, options, commit_end, reveal_end, root, now)?;
    save_registry(state, &registry)?;

    println!("Poll {} created", id);
    println!("  commit phase ends: {}", commit_end);
    println!("  reveal phase ends: {}", reveal_end);
    println!("  membership root:   {}", root);
    Ok(())
}

fn cmd_commit(state: &Path, poll: u64, commitment: &str, at: Option<String>) -> CliResult<()> {
    let mut registry = load_registry(state)?;
    let commitment = Fe::parse(commitment)?;
    let fresh = registry.record_commit(poll, commitment, now_or(at)?)?;
    save_registry(state, &registry)?;

    if fresh {
        println!("Commitment recorded for poll {}", poll);
    } else {
        println!("Commitment was already recorded for poll {}", poll);
    }
    Ok(())
}

fn cmd_prove(
    state: &Path,
    poll: u64,
    choice: u32,
    secret: &str,
    identity: &str,
    output: &Path,
) -> CliResult<()> {
    let registry = load_registry(state)?;
    let record = registry.get_poll(poll)?;
    let secret = Fe::parse(secret)?;
    let identity = Fe::parse(identity)?;

    let commitment = hash::commitment(choice, secret);
    let nullifier = hash::nullifier(identity, poll);
    let statement = PublicInputs::new(commitment, nullifier, poll, record.membership_root);
    let proof = DigestVerifier::new().prove(&statement);

    let bundle = RevealBundle {
        poll_id: poll,
        choice,
        commitment,
        nullifier,
        proof: format!("0x{}", hex::encode(&proof)),
        public_inputs: statement.as_array().to_vec(),
    };
    fs::write(output, serde_json::to_string_pretty(&bundle)?)?;

    println!("Commitment: {}", commitment);
    println!("Nullifier:  {}", nullifier);
    println!("Bundle written to {:?}", output);
    Ok(())
}

fn cmd_reveal(state: &Path, poll: u64, bundle: &Path, at: Option<String>) -> CliResult<()> {
    let mut registry = load_registry(state)?;
    let bundle: RevealBundle = serde_json::from_str(&fs::read_to_string(bundle)?)?;
    let request = bundle.to_request()?;

    let processor = RevealProcessor::new(DigestVerifier::new());
    processor.reveal(&mut registry, poll, &request, now_or(at)?)?;
    save_registry(state, &registry)?;

    println!("Vote revealed on poll {} (choice {})", poll, request.choice);
    println!("Tally: {:?}", registry.get_tally(poll)?);
    Ok(())
}

fn cmd_batch_reveal(state: &Path, poll: u64, bundles: &Path, at: Option<String>) -> CliResult<()> {
    let mut registry = load_registry(state)?;
    let bundles: Vec<RevealBundle> = serde_json::from_str(&fs::read_to_string(bundles)?)?;

    let mut choices = Vec::with_capacity(bundles.len());
    let mut commitments = Vec::with_capacity(bundles.len());
    let mut nullifiers = Vec::with_capacity(bundles.len());
    let mut proofs = Vec::with_capacity(bundles.len());
    let mut inputs = Vec::with_capacity(bundles.len());
    for bundle in &bundles {
        let request = bundle.to_request()?;
        choices.push(request.choice);
        commitments.push(request.commitment);
        nullifiers.push(request.nullifier);
        proofs.push(request.proof);
        inputs.push(request.public_inputs);
    }

    let processor = RevealProcessor::new(DigestVerifier::new());
    let applied = processor.batch_reveal(
        &mut registry,
        poll,
        &choices,
        &commitments,
        &nullifiers,
        &proofs,
        &inputs,
        now_or(at)?,
    )?;
    save_registry(state, &registry)?;

    println!("Applied {} reveals to poll {}", applied, poll);
    println!("Tally: {:?}", registry.get_tally(poll)?);
    Ok(())
}

fn cmd_resolve(
    state: &Path,
    poll: u64,
    correct: u32,
    caller: Option<String>,
    at: Option<String>,
) -> CliResult<()> {
    let mut registry = load_registry(state)?;
    let caller = caller.unwrap_or_else(|| registry.operator().to_string());
    registry.resolve(&caller, poll, correct, now_or(at)?)?;
    save_registry(state, &registry)?;

    println!("Poll {} resolved (correct option: {})", poll, correct);
    Ok(())
}

fn cmd_show(state: &Path, poll: Option<u64>, at: Option<String>) -> CliResult<()> {
    let registry = load_registry(state)?;
    let now = now_or(at)?;

    let print_poll = |p: &hushpoll_core::poll::Poll| {
        println!("Poll {}: {}", p.id, p.question);
        println!("  phase:   {}", p.phase(now));
        println!("  options: {:?}", p.options);
        println!("  tally:   {:?}", p.tally);
        println!("  root:    {}", p.membership_root);
        match p.correct_option {
            Some(option) if p.resolved => println!("  outcome: option {}", option),
            _ => println!("  outcome: not recorded"),
        }
    };

    match poll {
        Some(id) => print_poll(registry.get_poll(id)?),
        None => {
            for p in registry.polls() {
                print_poll(p);
            }
        }
    }
    Ok(())
}

fn cmd_tally(state: &Path, poll: u64) -> CliResult<()> {
    let registry = load_registry(state)?;
    let record = registry.get_poll(poll)?;
    for (option, count) in record.options.iter().zip(&record.tally) {
        println!("{:>8}  {}", count, option);
    }
    println!("{:>8}  total", record.total_reveals());
    Ok(())
}

fn cmd_hash(poll: u64, choice: u32, secret: &str, identity: &str) -> CliResult<()> {
    let secret = Fe::parse(secret)?;
    let identity = Fe::parse(identity)?;
    println!("Commitment: {}", hash::commitment(choice, secret));
    println!("Nullifier:  {}", hash::nullifier(identity, poll));
    Ok(())
}

fn load_registry(state: &Path) -> CliResult<PollRegistry> {
    let raw =
        fs::read_to_string(state).map_err(|e| format!("cannot read state file {:?}: {e}", state))?;
    Ok(serde_json::from_str(&raw)?)
}

fn save_registry(state: &Path, registry: &PollRegistry) -> CliResult<()> {
    fs::write(state, serde_json::to_string_pretty(registry)?)?;
    Ok(())
}

/// Accepts unix seconds or an RFC3339 timestamp.
fn parse_timestamp(raw: &str) -> CliResult<i64> {
    if let Ok(seconds) = raw.parse::<i64>() {
        return Ok(seconds);
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(raw)
        .map_err(|e| format!("invalid timestamp {:?}: {e}", raw))?;
    Ok(parsed.timestamp())
}

fn now_or(at: Option<String>) -> CliResult<i64> {
    match at {
        Some(raw) => parse_timestamp(&raw),
        None => Ok(chrono::Utc::now().timestamp()),
    }
}
