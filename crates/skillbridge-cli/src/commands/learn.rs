//! Topic browsing, lessons and assessments.

use anyhow::{anyhow, Result};
use comfy_table::Cell;

use skillbridge_core::assessment::{AnswerSheet, NextStep};
use skillbridge_core::model::{ContentBlock, Lesson};

use super::{table, Context};

pub async fn topics(ctx: &Context, search: Option<String>) -> Result<()> {
    let (service, _) = ctx.service()?;

    match search {
        Some(query) => {
            let views = service.browse_topics(&query).await?;
            if views.is_empty() {
                println!("No topics match \"{query}\".");
                return Ok(());
            }
            let mut t = table(["Topic", "Name", "Description", "For you"]);
            for view in &views {
                t.add_row(vec![
                    Cell::new(&view.topic.id),
                    Cell::new(&view.topic.name),
                    Cell::new(&view.topic.description),
                    Cell::new(if view.for_you { "yes" } else { "" }),
                ]);
            }
            println!("{t}");
        }
        None => {
            let feed = service.home().await?;
            println!("{}", feed.title);
            if feed.topics.is_empty() {
                println!("No topics available.");
                return Ok(());
            }
            let mut t = table(["Topic", "Name", "Description"]);
            for topic in &feed.topics {
                t.add_row(vec![
                    Cell::new(&topic.id),
                    Cell::new(&topic.name),
                    Cell::new(&topic.description),
                ]);
            }
            println!("{t}");
        }
    }
    Ok(())
}

pub async fn lessons(ctx: &Context, topic_id: &str) -> Result<()> {
    let (service, _) = ctx.service()?;
    let board = service.lesson_board(topic_id).await?;
    if board.lessons.is_empty() {
        println!("No lessons for {topic_id}.");
        return Ok(());
    }

    let mut t = table(["#", "Lesson", "Title", "Difficulty", "XP", "State"]);
    for state in board.states() {
        let label = if state.completed {
            "done"
        } else if state.locked {
            "locked"
        } else {
            "open"
        };
        t.add_row(vec![
            Cell::new(state.lesson.order),
            Cell::new(&state.lesson.id),
            Cell::new(&state.lesson.title),
            Cell::new(state.lesson.difficulty),
            Cell::new(state.lesson.xp),
            Cell::new(label),
        ]);
    }
    println!("{t}");

    match board.resume_target() {
        Some(next) => println!("Continue with: {} ({})", next.title, next.id),
        None => println!("Topic finished."),
    }
    if board.can_graduate() {
        println!("You can apply as a mentor: skillbridge mentorship apply --topic {topic_id}");
    }
    Ok(())
}

pub async fn courses(ctx: &Context) -> Result<()> {
    let (service, _) = ctx.service()?;
    let courses = service.my_courses().await?;
    if courses.is_empty() {
        println!("No courses started yet.");
        return Ok(());
    }

    let mut t = table(["Topic", "Completed", "Progress", "Next"]);
    for course in &courses {
        t.add_row(vec![
            Cell::new(&course.topic_name),
            Cell::new(format!("{}/{}", course.completed_count, course.total_lessons)),
            Cell::new(format!("{:.0}%", course.percent * 100.0)),
            Cell::new(course.next_lesson_id.as_deref().unwrap_or("finished")),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn lesson(ctx: &Context, topic_id: &str, lesson_id: &str) -> Result<()> {
    let (service, _) = ctx.service()?;
    let board = service.lesson_board(topic_id).await?;
    let lesson = service.open_lesson(&board, lesson_id).await?;
    print_lesson(&lesson);
    Ok(())
}

pub async fn submit(ctx: &Context, topic_id: &str, lesson_id: &str, answers: &[String]) -> Result<()> {
    let (service, _) = ctx.service()?;
    let board = service.lesson_board(topic_id).await?;
    let lesson = service.open_lesson(&board, lesson_id).await?;

    let mut sheet = AnswerSheet::new();
    for raw in answers {
        let (question, option) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("answers look like QUESTION=OPTION, got {raw:?}"))?;
        sheet.select(question.trim(), option.trim())?;
    }

    let response = service.submit_assessment(&lesson, &mut sheet).await?;
    println!(
        "{}: {} (score {:.0}%, +{} XP)",
        lesson.title,
        response.status,
        response.score * 100.0,
        response.xp_earned
    );

    match service.next_step(&response) {
        NextStep::Advance { next_lesson_id } => {
            println!("Next lesson: skillbridge lesson {topic_id} {next_lesson_id}");
        }
        NextStep::TopicFinished => println!("You finished every lesson in this topic."),
        NextStep::Review(remedial) => {
            println!("Review before retrying:\n");
            print_lesson(&remedial.into_lesson(&lesson));
        }
        NextStep::Retry => println!("Not passed yet. Try again."),
    }
    Ok(())
}

fn print_lesson(lesson: &Lesson) {
    println!("{} [{}, {} XP]\n", lesson.title, lesson.difficulty, lesson.xp);

    for block in &lesson.content {
        match block {
            ContentBlock::Paragraph { text } => println!("{text}\n"),
            ContentBlock::Image { url } => println!("[image] {url}\n"),
            ContentBlock::Quiz(quiz) => {
                println!("Practice: {}", quiz.question_text);
                for option in &quiz.options {
                    println!("  ({}) {}", option.id, option.text);
                }
                if let Some(explanation) = &quiz.explanation {
                    println!("  Hint: {explanation}");
                }
                println!();
            }
        }
    }

    if let Some(assessment) = &lesson.assessment {
        println!(
            "Assessment ({} questions, pass at {:.0}%):",
            assessment.questions.len(),
            assessment.passing_score * 100.0
        );
        for q in &assessment.questions {
            println!("  {}: {}", q.id, q.question_text);
            for option in &q.options {
                println!("    ({}) {}", option.id, option.text);
            }
        }
    }
}
