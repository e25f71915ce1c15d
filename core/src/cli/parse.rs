use crate::command::Command;


/// Parse command words into a typed Command.
///
/// The first word is the command name or one of its aliases; the rest are
/// its arguments. Arguments are expected WITHOUT the program name or chat
/// prefix (i.e., `["info", "Loc1"]`, not `["!info", "Loc1"]`).
pub fn parse_args(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'infobot help' for usage.".into());
    }

    match canonical_command(args[0]) {
        Some("add") => parse_add(args),
        Some("edit") => parse_edit(args),
        Some("delete") => parse_delete(args),
        Some("info") => parse_info(args),
        Some("list") => Ok(Command::List),
        Some("media_add") => parse_media_add(args),
        Some("status") => parse_status(args),
        Some("on") => Ok(Command::On { name: require_name(args, "on")? }),
        Some("off") => Ok(Command::Off { name: require_name(args, "off")? }),
        Some("no_status") => Ok(Command::NoStatus { name: require_name(args, "no_status")? }),
        Some("undo") => Ok(Command::Undo),
        Some("help") => parse_help(args),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


/// Map a command name or alias to its canonical name.
pub fn canonical_command(word: &str) -> Option<&'static str> {
    let name = match word.to_lowercase().as_str() {
        "add" | "new" | "create" => "add",
        "edit" => "edit",
        "delete" | "remove" => "delete",
        "info" | "search" | "get" => "info",
        "list" | "all" => "list",
        "media_add" => "media_add",
        "status" | "state" => "status",
        "on" => "on",
        "off" => "off",
        "no_status" => "no_status",
        "undo" | "redo" | "revert" => "undo",
        "help" => "help",
        _ => return None,
    };
    Some(name)
}


/// Tokenize one chat-style line.
///
/// A leading `prefix` is stripped if present. Words are separated by
/// whitespace; a double-quoted run is one word with the quotes removed.
/// An unterminated quote runs to the end of the line.
pub fn split_line(line: &str, prefix: &str) -> Vec<String> {
    let line = line.trim();
    let line = if prefix.is_empty() {
        line
    } else {
        line.strip_prefix(prefix).unwrap_or(line)
    };

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `add <name> [FIELD=VALUE $ FIELD=VALUE ...]`
fn parse_add(args: &[&str]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("Usage: add <name> [FIELD=VALUE $ FIELD=VALUE ...]".into());
    }
    Ok(Command::Add {
        name: args[1].into(),
        assignments: args[2..].join(" "),
    })
}

/// `edit <entry> <field> [value...]`; no value words clears the field.
fn parse_edit(args: &[&str]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("Usage: edit <entry> <field> [value...]".into());
    }
    Ok(Command::Edit {
        entry: args[1].into(),
        field: args[2].into(),
        value: args[3..].join(" "),
    })
}

/// `delete <name>`
fn parse_delete(args: &[&str]) -> Result<Command, String> {
    Ok(Command::Delete { name: require_name(args, "delete")? })
}

/// `info <name>`
fn parse_info(args: &[&str]) -> Result<Command, String> {
    Ok(Command::Info { name: require_name(args, "info")? })
}

/// `media_add <name> <label> <url>`
fn parse_media_add(args: &[&str]) -> Result<Command, String> {
    if args.len() < 4 {
        return Err("Usage: media_add <name> <label> <url>".into());
    }
    Ok(Command::MediaAdd {
        name: args[1].into(),
        label: args[2..args.len() - 1].join(" "),
        url: args[args.len() - 1].into(),
    })
}

/// `status <name>`
fn parse_status(args: &[&str]) -> Result<Command, String> {
    Ok(Command::Status { name: require_name(args, "status")? })
}

/// `help [topic]`
fn parse_help(args: &[&str]) -> Result<Command, String> {
    let topic = if args.len() > 1 {
        Some(args[1..].join(" "))
    } else {
        None
    };
    Ok(Command::Help { topic })
}


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The single `<name>` argument of `command`.
fn require_name(args: &[&str], command: &str) -> Result<String, String> {
    match args.get(1) {
        Some(name) => Ok(name.to_string()),
        None => Err(format!("Usage: {} <name>", command)),
    }
}
