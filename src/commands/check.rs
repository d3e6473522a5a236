//! Validate content without writing anything

use anyhow::Result;

use crate::error::BuildError;
use crate::Site;

/// Load and validate every post, printing a summary.
///
/// Validation failures are printed one per line before the error is returned.
pub fn run(site: &Site) -> Result<()> {
    match site.load_content() {
        Ok(collection) => {
            println!(
                "{} posts OK ({} published, {} drafts)",
                collection.len(),
                collection.published().len(),
                collection.drafts().len()
            );
            Ok(())
        }
        Err(BuildError::Validation(errors)) => {
            for error in &errors {
                eprintln!("  {}", error);
            }
            Err(BuildError::Validation(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}
