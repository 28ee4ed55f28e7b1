//! List site content

use std::collections::BTreeMap;

use crate::content::ContentLoader;
use crate::error::Result;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(&site.config, &site.source_dir);
    let outcome = loader.load()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", outcome.documents.len());
            for doc in &outcome.documents {
                println!(
                    "  {} - {} [{}]",
                    doc.date.format("%Y-%m-%d"),
                    doc.title,
                    doc.id
                );
            }
        }
        "tag" | "tags" => {
            let mut tags: BTreeMap<&str, usize> = BTreeMap::new();
            for doc in &outcome.documents {
                for tag in &doc.tags {
                    *tags.entry(tag).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            tracing::error!("unknown type: {}. Available: post, tag", content_type);
        }
    }

    if !outcome.issues.is_empty() {
        println!("Skipped ({}):", outcome.issues.len());
        for issue in &outcome.issues {
            println!("  {}", issue);
        }
    }

    Ok(())
}
