//! Demo harness for the ledger core and consensus crates. Drives the library
//! through its public entry points only; outcomes are logged, never fatal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use qledger_consensus::{Ballot, ChannelTransport, FinalizeOutcome, Node, NodeId, PeerRegistry};
use qledger_core::constants::{BLOCK_VERSION, DEFAULT_MAX_POW_ATTEMPTS};
use qledger_core::mine::{mine_block, mine_block_parallel};
use qledger_core::{unix_now, Block, Chain, Difficulty, Keypair, Transaction};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "qledger")]
#[command(about = "Mine and finalize blocks on an in-process ledger")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign two transactions, mine one block and append it to a local chain
    Demo {
        /// Leading zero hex characters required of the block hash
        #[arg(long, default_value_t = 3)]
        difficulty: u32,
        /// Attempt budget for the nonce search
        #[arg(long, default_value_t = DEFAULT_MAX_POW_ATTEMPTS)]
        max_attempts: u64,
    },
    /// Mine a block and put it to a vote across simulated replica nodes
    Simulate {
        /// Number of consensus nodes
        #[arg(long, default_value_t = 10)]
        nodes: usize,
        /// Leading zero hex characters required of the block hash
        #[arg(long, default_value_t = 3)]
        difficulty: u32,
        /// Random demo transactions per block
        #[arg(long, default_value_t = 5)]
        transactions: usize,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo {
            difficulty,
            max_attempts,
        } => demo(difficulty, max_attempts),
        Command::Simulate {
            nodes,
            difficulty,
            transactions,
        } => simulate(nodes, difficulty, transactions),
    }
}

fn demo(difficulty: u32, max_attempts: u64) -> Result<()> {
    let keypair = Keypair::generate();
    let public_key = keypair.public_key();

    let mut tx1 = Transaction::create("alice", vec!["bob".to_string()], 100.0)?;
    tx1.sign(&keypair)?;
    let mut tx2 = Transaction::create("bob", vec!["carol".to_string(), "dave".to_string()], 50.0)?;
    tx2.sign(&keypair)?;

    let mut chain = Chain::new();
    let template = Block::new(
        BLOCK_VERSION,
        chain.tip().hash.clone(),
        vec![tx1, tx2],
        Difficulty(difficulty),
        unix_now(),
    );

    let mut mined = match mine_block(template, max_attempts) {
        Ok(block) => block,
        Err(err) => {
            warn!(%err, "mining gave up; lower the difficulty or raise the budget");
            return Ok(());
        }
    };
    mined.sign(&keypair)?;

    for tx in &mined.transactions {
        info!(
            hash = %tx.hash,
            signature_ok = tx.verify_signature(&public_key),
            hash_ok = tx.verify_hash(),
            "transaction verified"
        );
    }
    info!(
        hash = %mined.hash,
        signature_ok = mined.verify_signature(&public_key),
        merkle_ok = mined.verify_merkle_root(),
        "block verified"
    );

    match chain.append(mined) {
        Ok(()) => info!(height = chain.len() - 1, "block appended"),
        Err(err) => warn!(%err, "block rejected"),
    }

    for block in chain.iter() {
        println!("{block}");
    }
    Ok(())
}

fn simulate(total_nodes: usize, difficulty: u32, tx_count: usize) -> Result<()> {
    let mut rng = rand::thread_rng();
    let signer = Keypair::generate();

    let mut txs = Vec::with_capacity(tx_count);
    for i in 0..tx_count {
        let mut tx = Transaction::create(
            format!("sender-{i}"),
            vec![format!("receiver-{i}")],
            rng.gen_range(1.0..100.0),
        )?;
        tx.sign(&signer)?;
        txs.push(tx);
    }

    let ids: Vec<NodeId> = (0..total_nodes).map(|i| format!("node-{i}")).collect();
    let mut registry = PeerRegistry::new();
    let mut keypairs = Vec::with_capacity(total_nodes);
    for id in &ids {
        let keypair = Keypair::generate();
        registry.insert(id.clone(), keypair.public_key());
        keypairs.push(keypair);
    }
    let registry = Arc::new(registry);
    let nodes: Vec<Node> = ids
        .iter()
        .zip(keypairs)
        .map(|(id, keypair)| {
            Node::new(id.clone(), keypair, registry.clone())
                .with_block_signer(signer.public_key())
        })
        .collect();
    let transport = ChannelTransport::new(&ids);

    // The leader mines against its replica's tip; every replica shares the
    // deterministic genesis, so the candidate links onto all of them.
    let leader = &nodes[0];
    let template = Block::new(
        BLOCK_VERSION,
        leader.tip_hash(),
        txs,
        Difficulty(difficulty),
        unix_now(),
    );
    let mut candidate = mine_block_parallel(template, u64::MAX)?;
    candidate.sign(&signer)?;
    info!(nonce = candidate.nonce, hash = %candidate.hash, "leader mined candidate");

    for node in &nodes {
        let ballot = node.receive_block(&candidate, &ids, &transport);
        if ballot == Ballot::Reject {
            warn!(node = %node.id(), "node rejected the candidate");
        }
    }
    for node in &nodes {
        for vote in transport.drain(node.id()) {
            if let Err(err) = node.receive_vote(vote) {
                warn!(node = %node.id(), %err, "vote discarded");
            }
        }
    }

    let mut finalized = 0usize;
    for node in &nodes {
        match node.finalize(&candidate, total_nodes) {
            Ok(FinalizeOutcome::Finalized { assents }) => {
                finalized += 1;
                info!(node = %node.id(), assents, height = node.chain_len() - 1, "finalized");
            }
            Ok(FinalizeOutcome::QuorumNotReached { assents, quorum }) => {
                info!(node = %node.id(), assents, quorum, "quorum not reached");
            }
            Err(err) => warn!(node = %node.id(), %err, "finalize failed"),
        }
    }
    info!(finalized, total_nodes, "simulation complete");
    Ok(())
}
