//! Help system: usage text for every infobot command.
//!
//! Three levels of detail:
//!
//! 1. **Overview** (`help`): every command with a one-line summary
//! 2. **Group help** (`help lights`): commands within a group
//! 3. **Command help** (`help add`): detailed usage for one command
//!
//! Aliases resolve to their command, so `help search` shows `info`.

use crate::cli::parse::canonical_command;


/// Generate help text for a given topic.
///
/// - `None` → overview
/// - `Some("entries")` → the entry commands
/// - `Some("add")` or an alias → detailed help for that command
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => {
            let t = t.trim();
            if let Some(text) = canonical_command(t).and_then(command_help) {
                return text;
            }
            if let Some(text) = group_help(&t.to_lowercase()) {
                return text;
            }
            format!("Unknown help topic: '{}'. Run 'help' for a list of commands.", t)
        }
    }
}


fn overview() -> String {
    "\
infobot — named entries with typed fields, a status light, and one-step undo

Entry commands:
  add <name> [F=V $ F=V ...]     Create an entry (aliases: new, create)
  edit <entry> <field> [value]   Change one field
  delete <name>                  Remove an entry (alias: remove)
  info <name>                    Show an entry (aliases: search, get)
  list                           List entries with status (alias: all)
  media_add <name> <label> <url> Attach a media link

Status commands:
  status <name>                  Show an entry's status (alias: state)
  on <name>                      Mark an entry on
  off <name>                     Mark an entry off
  no_status <name>               Clear an entry's status

History commands:
  undo                           Swap in the previous state (aliases: redo, revert)

  help [topic]                   Show help (this message, or help on a topic)

Run 'help <command>' for detailed help on a command.
Run 'help <group>' for help on a group (entries, lights, history)."
        .into()
}


fn group_help(group: &str) -> Option<String> {
    let text = match group {
        "entries" | "entry" => "\
Entry commands — create and inspect named entries

  add <name> [FIELD=VALUE $ FIELD=VALUE ...]
    Create an entry. Fields left out start empty.

  edit <entry> <field> [value...]
    Set one field. The field may be given by any of its aliases.

  delete <name>
    Remove an entry.

  info <name>
    Show the entry's non-empty fields and its media links. If no entry
    has that name, the closest names are suggested.

  list
    All entries with a status light.

  media_add <name> <label...> <url>
    Append a labelled link to the entry's media.",

        "lights" | "statuses" => "\
Status commands — a three-state light on each entry

  status <name>        Show the entry's status
  on <name>            Set status to on   (\u{1F7E2})
  off <name>           Set status to off  (\u{1F534})
  no_status <name>     Clear status       (\u{26AA})",

        "history" => "\
History commands — one level of undo

  undo
    Swap the current entries with the snapshot taken before the last
    change. Running undo again swaps back, so it also works as redo.",

        _ => return None,
    };
    Some(text.into())
}


fn command_help(command: &str) -> Option<String> {
    let text = match command {
        "add" => "\
add — create an entry

Usage: add <name> [FIELD=VALUE $ FIELD=VALUE ...]
Aliases: new, create

Assignments are separated by '$'. Each one splits on its first '=', so
values may contain '='. A field given without '=' is set empty. Field names
are matched case-insensitively against their aliases. If any field is
unknown, nothing is created.

Examples:
  add Loc1
  add Loc1 l=Roomy $ r=9-5
  add Loc1 l $ r=9-5
  add Loc2 info=key=value",

        "edit" => "\
edit — change one field of an entry

Usage: edit <entry> <field> [value...]

<field> may be any alias of the field. The rest of the line is the value;
with nothing after <field>, the field is cleared.

Example:
  edit Loc1 instr turn left at the well",

        "delete" => "\
delete — remove an entry

Usage: delete <name>
Alias: remove",

        "info" => "\
info — show an entry

Usage: info <name>
Aliases: search, get

Shows every non-empty field and the entry's media links. On a miss, the
closest existing names are suggested.",

        "list" => "\
list — list all entries

Usage: list
Alias: all

Each entry is shown with its status light: \u{1F7E2} on, \u{1F534} off,
\u{26AA} unset.",

        "media_add" => "\
media_add — attach a media link

Usage: media_add <name> <label...> <url>

The last word is the url; the words before it form the label.",

        "status" => "\
status — show an entry's status

Usage: status <name>
Alias: state",

        "on" => "\
on — set an entry's status to on

Usage: on <name>",

        "off" => "\
off — set an entry's status to off

Usage: off <name>",

        "no_status" => "\
no_status — clear an entry's status

Usage: no_status <name>",

        "undo" => "\
undo — swap in the previous state

Usage: undo
Aliases: redo, revert

Only one level is kept. A second undo restores what the first one replaced.",

        "help" => "\
help — show help information

Usage: help [topic]

  help            # overview
  help add        # detailed help for add
  help status     # detailed help for status
  help history    # the history group",

        _ => return None,
    };
    Some(text.into())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_every_command() {
        let text = help_text(None);
        for cmd in [
            "add", "edit", "delete", "info", "list", "media_add",
            "status", "on", "off", "no_status", "undo", "help",
        ] {
            assert!(text.contains(cmd), "overview is missing {}", cmd);
        }
    }

    #[test]
    fn command_help_all_commands_covered() {
        for cmd in [
            "add", "edit", "delete", "info", "list", "media_add",
            "status", "on", "off", "no_status", "undo", "help",
        ] {
            assert!(command_help(cmd).is_some(), "Missing command help for: {}", cmd);
        }
    }

    #[test]
    fn alias_resolves_to_command_help() {
        assert!(help_text(Some("search")).starts_with("info"));
        assert!(help_text(Some("revert")).starts_with("undo"));
        assert!(help_text(Some("create")).starts_with("add"));
        assert!(help_text(Some("new")).starts_with("add"));
    }

    #[test]
    fn group_help_entries() {
        let text = help_text(Some("entries"));
        assert!(text.contains("media_add"));
    }

    #[test]
    fn command_wins_over_group() {
        assert!(help_text(Some("status")).starts_with("status — show"));
    }

    #[test]
    fn group_help_lights() {
        assert!(help_text(Some("lights")).contains("no_status"));
    }

    #[test]
    fn group_help_history() {
        assert!(help_text(Some("History")).contains("redo"));
    }

    #[test]
    fn unknown_topic() {
        assert!(help_text(Some("bogus")).contains("Unknown help topic"));
    }
}
