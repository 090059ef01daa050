use std::io::Write;

use forum_client::CommentNode;

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Writes the expanded part of a forest as an indented tree
pub fn forest(out: &mut impl Write, nodes: &[CommentNode], indent: usize) -> std::io::Result<()> {
    let pad = "    ".repeat(indent);
    for n in nodes {
        let c = &n.comment;
        write!(
            out,
            "{pad}- [{}] {} ({})",
            c.id,
            c.user_name,
            c.created_at.format("%Y-%m-%d %H:%M")
        )?;
        if c.is_edited() {
            write!(out, " (edited)")?;
        }
        writeln!(out, ": {}", first_line(&c.content))?;
        if let Some(url) = c.image_url.as_ref().or(c.file_url.as_ref()) {
            writeln!(out, "{pad}  attachment: {url}")?;
        }

        if n.expanded {
            forest(out, &n.children, indent + 1)?;
        }
        let hidden = match n.expanded {
            true => n.remaining_replies(),
            false => n.reply_count.max(n.children.len() as u64),
        };
        if hidden > 0 {
            let s = if hidden == 1 { "reply" } else { "replies" };
            writeln!(out, "{pad}    ({hidden} more {s})")?;
        }
    }
    Ok(())
}
