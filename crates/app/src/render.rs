use chrono::{DateTime, Utc};

use crate::composer::Composer;
use crate::dom::{Document, DomError, Element, MountSelector};
use discrail_core::domain::discussion::{Author, Comment, Discussion, Reply};
use discrail_core::types::relative_time::format_relative;
use discrail_infra::DiscussionError;

pub const SECTION_ID: &str = "comments";
pub const EMPTY_PLACEHOLDER: &str = "No comments yet";
pub const FALLBACK_MESSAGE: &str = "Comments are unavailable right now.";

/// Builds `<section id="comments">` for a fetched thread. Bodies become text
/// nodes and are escaped on output.
pub fn render_section(discussion: &Discussion, now: DateTime<Utc>) -> Element {
    let mut section = Element::new("section")
        .attr("id", SECTION_ID)
        .child(render_header(discussion));
    if discussion.is_empty() {
        section.append(Element::new("p").class("comments-empty").text(EMPTY_PLACEHOLDER));
        return section;
    }
    for comment in &discussion.comments {
        section.append(render_comment(comment, now));
    }
    section
}

/// Mounts the thread with its composer as the section's last child. Calling
/// this twice on the same document mounts a second section.
pub fn render_thread(
    doc: &mut Document,
    mount: &MountSelector,
    discussion: &Discussion,
    composer: &Composer,
    compose_action: &str,
    now: DateTime<Utc>,
) -> Result<(), DomError> {
    let mut section = render_section(discussion, now);
    section.append(composer.form(compose_action));
    doc.mount(mount, section)
}

/// Mounts a single message in place of the thread. Returns whether anything
/// was mounted; with `show_fallback` off the page stays untouched.
pub fn render_failure(
    doc: &mut Document,
    mount: &MountSelector,
    err: &DiscussionError,
    show_fallback: bool,
) -> Result<bool, DomError> {
    if !show_fallback {
        return Ok(false);
    }
    let section = Element::new("section")
        .attr("id", SECTION_ID)
        .attr("data-error-kind", format!("{:?}", err.kind()))
        .child(
            Element::new("p")
                .class("comments-unavailable")
                .text(FALLBACK_MESSAGE),
        );
    doc.mount(mount, section)?;
    Ok(true)
}

fn render_header(discussion: &Discussion) -> Element {
    let mut header = Element::new("header")
        .class("discussion")
        .child(Element::new("h2").text(discussion.title.as_str()));
    if !discussion.body.trim().is_empty() {
        header.append(
            Element::new("p")
                .class("discussion-body")
                .text(discussion.body.as_str()),
        );
    }
    header
}

fn render_comment(comment: &Comment, now: DateTime<Utc>) -> Element {
    let mut replies = Element::new("div").class("replies");
    for reply in &comment.replies {
        replies.append(render_reply(reply));
    }
    Element::new("article")
        .class("comment")
        .attr("data-comment-id", comment.id.as_str())
        .child(avatar(&comment.author))
        .child(author(&comment.author))
        .child(
            Element::new("time")
                .class("ago")
                .attr("datetime", comment.created_at.to_rfc3339())
                .text(format_relative(comment.created_at, now)),
        )
        .child(
            Element::new("div")
                .class("comment-body")
                .text(comment.body.as_str()),
        )
        .child(replies)
}

fn render_reply(reply: &Reply) -> Element {
    Element::new("div")
        .class("reply")
        .attr("data-reply-id", reply.id.as_str())
        .child(avatar(&reply.author))
        .child(author(&reply.author))
        .child(Element::new("div").class("reply-body").text(reply.body.as_str()))
}

fn avatar(author: &Author) -> Element {
    Element::new("img")
        .class("avatar")
        .attr("src", author.avatar_url.as_str())
        .attr("alt", author.login.as_str())
        .attr("loading", "lazy")
}

fn author(author: &Author) -> Element {
    Element::new("span").class("author").text(author.login.as_str())
}
