// Count command - extract the item collection from a response body

use anyhow::Result;

use crate::assert::extract;
use crate::cli::args::CountArgs;
use crate::utils::FileUtils;

pub fn handle_count(args: &CountArgs) -> Result<()> {
    let body = FileUtils::read_file(&args.body)?;
    let extraction = extract(&body)?;

    if args.is_json() {
        let output = serde_json::json!({
            "count": extraction.len(),
            "path": extraction.path(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if extraction.path().is_empty() {
        println!("{} items", extraction.len());
    } else {
        println!("{} items at {}", extraction.len(), extraction.path());
    }

    Ok(())
}
