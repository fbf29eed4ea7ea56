//! Check command - transitive delegation authorization query.

use entrust::Identity;
use serde_json::json;

use super::build_resolver;
use crate::cli::CheckArgs;

/// Ask whether the delegator transitively authorizes the delegate.
///
/// Returns the verdict so `main` can reflect it in the exit code.
pub async fn run(args: &CheckArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let resolver = build_resolver(&args.lookup)?;
    let delegate = Identity::from(args.delegate.as_str());
    let delegator = Identity::from(args.delegator.as_str());

    let verdict = resolver.check_delegator(&delegate, &delegator).await?;

    if args.json {
        let body = json!({
            "authorized": verdict.value,
            "ttl": verdict.ttl,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else if verdict.value {
        println!("authorized (ttl: {})", verdict.ttl);
    } else {
        println!("not authorized (ttl: {})", verdict.ttl);
    }
    Ok(verdict.value)
}
