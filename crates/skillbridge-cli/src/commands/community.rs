//! The `skillbridge community` commands.

use anyhow::Result;
use comfy_table::Cell;

use skillbridge_core::community::{NewPost, NewReply};

use super::{table, Context};
use crate::CommunityCommand;

pub async fn execute(ctx: &Context, command: CommunityCommand) -> Result<()> {
    let (service, config) = ctx.service()?;

    match command {
        CommunityCommand::List { topic } => {
            let posts = service.community_posts(&topic).await?;
            if posts.is_empty() {
                println!("No posts yet. Start one with: skillbridge community post {topic}");
                return Ok(());
            }
            let mut t = table(["Post", "Title", "Author", "Replies"]);
            for post in &posts {
                t.add_row(vec![
                    Cell::new(&post.id),
                    Cell::new(&post.title),
                    Cell::new(&post.author_name),
                    Cell::new(post.reply_count),
                ]);
            }
            println!("{t}");
        }
        CommunityCommand::Post {
            topic,
            title,
            content,
        } => {
            let post = NewPost::new(&topic, &title, &content, config.display_name.clone())?;
            service.create_post(&post).await?;
            println!("Posted \"{}\" to {topic}", post.title);
        }
        CommunityCommand::Show { post } => {
            let detail = service.post_detail(&post).await?;
            println!("{}", detail.post.title);
            println!("by {}\n", detail.post.author_name);
            println!("{}\n", detail.post.content);
            if detail.replies.is_empty() {
                println!("No replies.");
            }
            for reply in &detail.replies {
                println!("  {}: {}", reply.author_name, reply.content);
            }
        }
        CommunityCommand::Reply { post, text } => {
            let reply = NewReply::new(&text, config.display_name.clone())?;
            service.reply_to_post(&post, &reply).await?;
            println!("Replied to {post}");
        }
    }
    Ok(())
}
