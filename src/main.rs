use anyhow::Result;
use tracing::info;

use fiverow_engine::PatternEvaluator;
use fiverow_protocol::ProtocolEngine;

fn main() -> Result<()> {
    // stdout carries protocol replies only
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("fiverow starting");
    ProtocolEngine::new(PatternEvaluator::new()).run()?;
    Ok(())
}
