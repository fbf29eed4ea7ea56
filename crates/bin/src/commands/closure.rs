//! Closure command - expands the delegation closure of a set of identities.

use entrust::Identity;
use serde_json::json;

use super::build_resolver;
use crate::cli::ClosureArgs;

/// Compute and print the delegation closure
pub async fn run(args: &ClosureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = build_resolver(&args.lookup)?;
    let initial: Vec<Identity> = args
        .identities
        .iter()
        .map(|identity| Identity::from(identity.as_str()))
        .collect();

    let closure = resolver.all_delegators(&initial).await?;

    if args.json {
        let body = json!({
            "chains": closure.value,
            "ttl": closure.ttl,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for chain in &closure.value {
            println!("{chain}");
        }
        println!("ttl: {}", closure.ttl);
    }
    Ok(())
}
