//! "Save the date" invitations for an event's guests.
//!
//! Reads guest emails and the planned date; never changes booking state.

use chrono::{Datelike, NaiveDate, Weekday};
use lettre::message::{Mailbox, MultiPart};
use lettre::Message;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{EventId, UserId};
use crate::services::events;
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub name: String,
    pub fullname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveTheDate {
    pub women: Person,
    pub man: Person,
    pub label: String,
    pub day: &'static str,
    pub date: String,
    pub year: String,
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn person(fullname: &str) -> AppResult<Person> {
    let fullname = fullname.trim();
    let name = fullname
        .split_whitespace()
        .next()
        .ok_or_else(|| AppError::Validation("full name must not be empty".to_string()))?;
    Ok(Person {
        name: name.to_string(),
        fullname: fullname.to_string(),
    })
}

fn initial(person: &Person) -> char {
    person.fullname.chars().next().unwrap_or_default()
}

pub fn save_the_date(
    women_fullname: &str,
    man_fullname: &str,
    date: NaiveDate,
) -> AppResult<SaveTheDate> {
    let women = person(women_fullname)?;
    let man = person(man_fullname)?;
    let label = format!("{}&{}", initial(&women), initial(&man));
    Ok(SaveTheDate {
        label,
        women,
        man,
        day: weekday_name(date.weekday()),
        date: date.format("%m/%d").to_string(),
        year: date.format("%Y").to_string(),
    })
}

const HTML_TEMPLATE: &str = "save_the_date.html.tera";
const TEXT_TEMPLATE: &str = "save_the_date.txt.tera";

/// Invitation templates, compiled into the binary.
pub fn templates() -> AppResult<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (
            HTML_TEMPLATE,
            include_str!("../../templates/save_the_date.html.tera"),
        ),
        (
            TEXT_TEMPLATE,
            include_str!("../../templates/save_the_date.txt.tera"),
        ),
    ])
    .map_err(|e| AppError::Internal(format!("failed to initialize tera: {e}")))?;
    tera.autoescape_on(vec![".html.tera"]);
    Ok(tera)
}

fn render(tera: &Tera, name: &str, context: &Context) -> AppResult<String> {
    tera.render(name, context)
        .map_err(|e| AppError::Internal(format!("failed to render {name}: {e}")))
}

pub fn render_body(tera: &Tera, card: &SaveTheDate) -> AppResult<MultiPart> {
    let context = Context::from_serialize(card)
        .map_err(|e| AppError::Internal(format!("invitation context: {e}")))?;
    Ok(MultiPart::alternative_plain_html(
        render(tera, TEXT_TEMPLATE, &context)?,
        render(tera, HTML_TEMPLATE, &context)?,
    ))
}

pub fn compose(tera: &Tera, from: &Mailbox, to: &str, card: &SaveTheDate) -> AppResult<Message> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| AppError::Validation(format!("invalid guest email {to}: {e}")))?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject("Wedding invitation")
        .multipart(render_body(tera, card)?)
        .map_err(|e| AppError::Mail(e.to_string()))
}

/// Sends one invitation per guest that has an email. Returns how many were sent.
pub async fn send_invitations(
    state: &AppState,
    caller: UserId,
    event_id: EventId,
    women_fullname: &str,
    man_fullname: &str,
) -> AppResult<usize> {
    let event = events::owned_event(state, caller, event_id).await?;
    let date = event.date_planned.ok_or_else(|| {
        AppError::Validation("event has no planned date to invite guests to".to_string())
    })?;
    let card = save_the_date(women_fullname, man_fullname, date)?;
    let tera = templates()?;
    let from: Mailbox = state
        .config
        .mail
        .from
        .parse()
        .map_err(|e| AppError::Internal(format!("MAIL_FROM is not a valid mailbox: {e}")))?;

    let guests = state.store.guests(event_id).await?;
    let mut sent = 0;
    for guest in &guests {
        let Some(email) = guest.email.as_deref().filter(|e| !e.is_empty()) else {
            continue;
        };
        match compose(&tera, &from, email, &card) {
            Ok(message) => {
                state.mailer.send(message).await?;
                sent += 1;
            }
            Err(e) => warn!(guest_id = guest.id, error = %e, "invitation skipped"),
        }
    }

    info!(event_id, sent, guests = guests.len(), "invitations sent");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_carries_names_initials_and_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let card = save_the_date("Maria Popescu", "Ion Rusu", date).unwrap();

        assert_eq!(card.women.name, "Maria");
        assert_eq!(card.man.fullname, "Ion Rusu");
        assert_eq!(card.label, "M&I");
        assert_eq!(card.day, "Saturday");
        assert_eq!(card.date, "06/14");
        assert_eq!(card.year, "2025");
    }

    #[test]
    fn blank_name_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        assert!(matches!(
            save_the_date("   ", "Ion Rusu", date),
            Err(AppError::Validation(_))
        ));
    }

    fn rendered_html(card: &SaveTheDate) -> String {
        let tera = templates().unwrap();
        let context = Context::from_serialize(card).unwrap();
        render(&tera, HTML_TEMPLATE, &context).unwrap()
    }

    #[test]
    fn html_is_escaped() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let card = save_the_date("<Maria>", "Ion & Co", date).unwrap();
        let html = rendered_html(&card);
        assert!(html.contains("&lt;Maria&gt;"));
        assert!(!html.contains("<Maria>"));
        assert!(html.contains("Ion &amp; Co"));
    }

    #[test]
    fn both_parts_carry_the_card() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let card = save_the_date("Maria Popescu", "Ion Rusu", date).unwrap();
        let tera = templates().unwrap();
        let context = Context::from_serialize(&card).unwrap();

        let text = render(&tera, TEXT_TEMPLATE, &context).unwrap();
        assert_eq!(
            text.trim_end(),
            "You are invited to our wedding! Maria & Ion, Saturday, 06/14 2025"
        );
        let html = render(&tera, HTML_TEMPLATE, &context).unwrap();
        assert!(html.contains("<h1>M&amp;I</h1>"));
        assert!(html.contains("Maria Popescu &amp; Ion Rusu"));
    }

    #[test]
    fn compose_builds_message_for_guest() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let card = save_the_date("Maria Popescu", "Ion Rusu", date).unwrap();
        let from: Mailbox = "Banquet <noreply@banquet.local>".parse().unwrap();
        let tera = templates().unwrap();

        let message = compose(&tera, &from, "guest@example.com", &card).unwrap();
        let to: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["guest@example.com".to_string()]);

        assert!(compose(&tera, &from, "not an email", &card).is_err());
    }
}
