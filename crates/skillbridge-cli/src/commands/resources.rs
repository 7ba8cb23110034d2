//! Mentor-uploaded class material.

use anyhow::{anyhow, Result};
use comfy_table::Cell;

use skillbridge_core::mentorship::{ResourceKind, ResourceUpload};

use super::{table, Context};

pub async fn list(ctx: &Context, topic_id: &str) -> Result<()> {
    let (service, _) = ctx.service()?;
    let resources = service.resources(topic_id).await?;
    if resources.is_empty() {
        println!("No resources for {topic_id} yet.");
        return Ok(());
    }

    let mut t = table(["Type", "Title", "Mentor", "URL"]);
    for r in &resources {
        t.add_row(vec![
            Cell::new(r.kind),
            Cell::new(&r.title),
            Cell::new(&r.mentor_name),
            Cell::new(&r.url),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn upload(ctx: &Context, topic_id: &str, title: &str, url: &str, kind: &str) -> Result<()> {
    let kind: ResourceKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let upload = ResourceUpload::new(title, url, topic_id)?.with_kind(kind);

    let (service, _) = ctx.service()?;
    service.upload_resource(&upload).await?;
    println!("Uploaded {} to {}", upload.title, upload.topic_id);
    Ok(())
}
