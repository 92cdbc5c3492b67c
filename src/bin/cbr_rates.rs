//! Small CLI that prints recent central-bank rates for a currency code.

use anyhow::Context;

use exchange_gateway::clients::CbrClient;

const SHOWN_DAYS: usize = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = std::env::args().nth(1).unwrap_or_else(|| "usd".to_string());

    let client = CbrClient::new();
    let entries = client
        .fetch(&code)
        .await
        .with_context(|| format!("fetching rates for {code}"))?;

    let start = entries.len().saturating_sub(SHOWN_DAYS);
    for entry in &entries[start..] {
        println!("{}  {}", entry.date, entry.close);
    }

    Ok(())
}
