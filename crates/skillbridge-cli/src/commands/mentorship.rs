//! Mentors, mentor applications and mentorship requests.

use anyhow::{anyhow, bail, Result};
use comfy_table::Cell;

use skillbridge_core::engine::LearningService;
use skillbridge_core::mentorship::{
    MentorApplication, MentorshipRequest, MentorshipRequestDraft, RequestStatus,
};
use skillbridge_core::LearningError;

use super::{table, Context};
use crate::MentorshipCommand;

pub async fn mentors(ctx: &Context, topic_id: &str) -> Result<()> {
    let (service, _) = ctx.service()?;
    let mentors = service.mentors(topic_id).await?;
    if mentors.is_empty() {
        println!("No mentors for {topic_id} yet.");
        return Ok(());
    }

    let mut t = table(["Mentor", "Name", "Rating", "Bio"]);
    for m in &mentors {
        t.add_row(vec![
            Cell::new(&m.uid),
            Cell::new(&m.name),
            Cell::new(format!("{:.1}", m.rating)),
            Cell::new(&m.bio),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn execute(ctx: &Context, command: MentorshipCommand) -> Result<()> {
    let (service, _) = ctx.service()?;

    match command {
        MentorshipCommand::Apply { topic, topics, bio } => {
            let application = match (topic, topics) {
                (Some(topic_id), _) => {
                    let board = service.lesson_board(&topic_id).await?;
                    let name = topic_name(&service, &topic_id).await;
                    service
                        .graduation_application(&board, &name)
                        .ok_or_else(|| {
                            anyhow!("finish every hard lesson in {name} before applying as its graduate")
                        })?
                        .with_bio(&bio)
                }
                (None, Some(csv)) => MentorApplication::manual(&bio, &csv)?,
                (None, None) => bail!("pass --topic to apply as a graduate, or --topics with --bio"),
            };
            service.apply_as_mentor(&application).await?;
            println!("Mentor application sent for {}", application.topics.join(", "));
        }
        MentorshipCommand::Request {
            mentor,
            topic,
            message,
        } => {
            if message.trim().is_empty() {
                return Err(LearningError::MissingField("message").into());
            }
            let draft = MentorshipRequestDraft {
                mentor_id: mentor,
                topic_name: topic_name(&service, &topic).await,
                topic_id: topic,
                message: message.trim().to_string(),
            };
            service.request_mentorship(&draft).await?;
            println!("Request sent to {}", draft.mentor_id);
        }
        MentorshipCommand::Dashboard => {
            let requests = service.mentor_dashboard().await?;
            print_requests(&requests, "Student", |r| r.student_name.as_deref());
        }
        MentorshipCommand::Respond { request, decision } => {
            let to: RequestStatus = decision.parse().map_err(|e: String| anyhow!(e))?;
            let status = service.respond_by_id(&request, to).await?;
            println!("Request {request} {status}");
        }
        MentorshipCommand::Sent => {
            let requests = service.sent_requests().await?;
            print_requests(&requests, "Mentor", |r| r.mentor_id.as_deref());
        }
    }
    Ok(())
}

/// Display name of a topic, falling back to its id.
async fn topic_name(service: &LearningService, topic_id: &str) -> String {
    service
        .browse_topics("")
        .await
        .ok()
        .and_then(|views| views.into_iter().find(|v| v.topic.id == topic_id))
        .map(|v| v.topic.name)
        .unwrap_or_else(|| topic_id.to_string())
}

fn print_requests(
    requests: &[MentorshipRequest],
    who: &str,
    party: impl Fn(&MentorshipRequest) -> Option<&str>,
) {
    if requests.is_empty() {
        println!("No requests.");
        return;
    }
    let mut t = table(["Request", who, "Topic", "Status", "Message"]);
    for r in requests {
        t.add_row(vec![
            Cell::new(&r.id),
            Cell::new(party(r).unwrap_or("-")),
            Cell::new(&r.topic_name),
            Cell::new(r.status),
            Cell::new(&r.message),
        ]);
    }
    println!("{t}");
}
