use std::sync::Arc;

use tracing::{debug, warn};

use crate::cli::assign::parse_assignments;
use crate::cli::parse::{parse_args, split_line};
use crate::command::Command;
use crate::error::{ErrorKind, StartupError, StoreError};
use crate::help::help_text;
use crate::namespace::{FileBackend, Namespace, RecordStore, StorageBackend};
use crate::schema::FieldSchema;
use crate::suggest::suggest;
use crate::types::config::Settings;
use crate::types::protocol::Response;
use crate::types::record::{Record, Status, MEDIA_FIELD, STATUS_FIELD};


/// Command dispatcher. Owns the settings and the record store and turns
/// every command into a `Response`.
///
/// `execute` takes `&self`: the store serializes work per namespace, so one
/// `Sys` can serve concurrent callers.
pub struct Sys {
    settings: Settings,
    store: RecordStore,
}


impl Sys {
    pub fn new(settings: Settings, schema: FieldSchema, backend: Arc<dyn StorageBackend>) -> Sys {
        let store = RecordStore::new(backend, Arc::new(schema));
        Sys { settings, store }
    }

    /// Load the schema named by `settings` and open its save directory.
    pub fn from_settings(settings: Settings) -> Result<Sys, StartupError> {
        let schema = FieldSchema::load(&settings.fields_path)?;
        let backend = FileBackend::new(&settings.save_dir)?;
        debug!(
            fields = schema.fields().len(),
            save_dir = %backend.save_dir().display(),
            "dispatcher ready"
        );
        Ok(Sys::new(settings, schema, Arc::new(backend)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The single dispatch method. Every command enters here.
    pub fn execute(&self, ns: &Namespace, cmd: Command) -> Response {
        debug!(namespace = %ns, command = ?cmd, "execute");
        let result = match cmd {
            Command::Add { name, assignments } => self.cmd_add(ns, &name, &assignments),
            Command::Edit { entry, field, value } => self.cmd_edit(ns, &entry, &field, &value),
            Command::Delete { name } => self.cmd_delete(ns, &name),
            Command::Info { name } => return self.cmd_info(ns, &name),
            Command::List => self.cmd_list(ns),
            Command::MediaAdd { name, label, url } => self.cmd_media_add(ns, &name, &label, &url),
            Command::Status { name } => self.cmd_status(ns, &name),
            Command::On { name } => self.cmd_set_status(ns, &name, Status::On),
            Command::Off { name } => self.cmd_set_status(ns, &name, Status::Off),
            Command::NoStatus { name } => self.cmd_set_status(ns, &name, Status::Unset),
            Command::Undo => self.cmd_undo(ns),
            Command::Help { topic } => Ok(help_text(topic.as_deref())),
        };
        match result {
            Ok(output) => Response::ok(output),
            Err(e) => self.error_response(ns, e),
        }
    }

    /// Tokenize and parse a chat-style line, then execute it.
    pub fn execute_line(&self, ns: &Namespace, line: &str) -> Response {
        let words = split_line(line, &self.settings.prefix);
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        match parse_args(&refs) {
            Ok(cmd) => self.execute(ns, cmd),
            Err(message) => {
                warn!(namespace = %ns, line, %message, "rejected command line");
                Response::error(ErrorKind::InvalidCommand, message)
            }
        }
    }

    // -------------------------------------------------------------------
    // Entry commands
    // -------------------------------------------------------------------

    fn cmd_add(&self, ns: &Namespace, name: &str, assignments: &str) -> Result<String, StoreError> {
        let fields = parse_assignments(assignments, self.store.schema())?;
        self.store.create(ns, name, &fields)?;
        Ok("New entry saved!".into())
    }

    fn cmd_edit(
        &self,
        ns: &Namespace,
        entry: &str,
        field: &str,
        value: &str,
    ) -> Result<String, StoreError> {
        self.store.edit(ns, entry, field, value)?;
        Ok(format!("Successfully updated the entry: {}", entry))
    }

    fn cmd_delete(&self, ns: &Namespace, name: &str) -> Result<String, StoreError> {
        self.store.delete(ns, name)?;
        Ok(format!("Successfully removed the entry: {}", name))
    }

    /// Render one entry, or miss with suggestions drawn from the names
    /// that do exist.
    fn cmd_info(&self, ns: &Namespace, name: &str) -> Response {
        let entries = match self.store.get(ns) {
            Ok(entries) => entries,
            Err(e) => return self.error_response(ns, e),
        };
        match entries.get(name) {
            Some(record) => Response::ok(self.render_record(name, record)),
            None => {
                let suggestions = suggest(
                    entries.names(),
                    name,
                    self.settings.suggestion_limit,
                    self.settings.suggestion_order,
                );
                warn!(namespace = %ns, entry = name, ?suggestions, "lookup missed");
                Response::Error {
                    kind: ErrorKind::EntryNotFound,
                    message: StoreError::EntryNotFound(name.to_string()).to_string(),
                    suggestions,
                }
            }
        }
    }

    fn cmd_list(&self, ns: &Namespace) -> Result<String, StoreError> {
        let listed = self.store.list(ns)?;
        if listed.is_empty() {
            return Ok("No entries yet.".into());
        }
        let lines: Vec<String> = listed
            .iter()
            .map(|(name, symbol)| format!("{}\t{}", name, symbol))
            .collect();
        Ok(lines.join("\n"))
    }

    fn cmd_media_add(
        &self,
        ns: &Namespace,
        name: &str,
        label: &str,
        url: &str,
    ) -> Result<String, StoreError> {
        self.store.add_media(ns, name, label, url)?;
        Ok(format!("Added media to {}", name))
    }

    // -------------------------------------------------------------------
    // Status commands
    // -------------------------------------------------------------------

    fn cmd_status(&self, ns: &Namespace, name: &str) -> Result<String, StoreError> {
        let status = self.store.lookup(ns, name)?.status();
        let label = match status {
            Status::Unset => "no status",
            other => other.as_field(),
        };
        Ok(format!("{}: {} {}", name, label, status.symbol()))
    }

    fn cmd_set_status(&self, ns: &Namespace, name: &str, status: Status) -> Result<String, StoreError> {
        self.store.set_status(ns, name, status)?;
        Ok(format!("{} {}", status.symbol(), name))
    }

    // -------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------

    fn cmd_undo(&self, ns: &Namespace) -> Result<String, StoreError> {
        self.store.undo(ns)?;
        Ok("Restored the previous state. Run undo again to switch back.".into())
    }

    // -------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------

    /// Name and status, then every non-empty field in schema order, then
    /// the media links.
    fn render_record(&self, name: &str, record: &Record) -> String {
        let mut lines = vec![format!("{} {}", name, record.status().symbol())];
        for field in self.store.schema().field_names() {
            if field == STATUS_FIELD || field == MEDIA_FIELD {
                continue;
            }
            match record.get(field) {
                Some(value) if !value.is_empty() => lines.push(format!("{}: {}", field, value)),
                _ => {}
            }
        }
        let media = record.media();
        if !media.is_empty() {
            lines.push("Media:".into());
            lines.extend(media.iter().map(|item| format!("  {}", item)));
        }
        lines.join("\n")
    }

    fn error_response(&self, ns: &Namespace, e: StoreError) -> Response {
        if let StoreError::EntryAlreadyExists(name) = &e {
            warn!(namespace = %ns, entry = %name, "entry already exists");
            let message = format!(
                "The entry {} already exists! Use `{}edit {}` instead.",
                name, self.settings.prefix, name
            );
            return Response::error(e.kind(), message);
        }
        // Storage failures were already logged by the store.
        if e.kind() != ErrorKind::StorageIoError {
            warn!(namespace = %ns, error = %e, "request rejected");
        }
        Response::from(e)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::backend::Slot;
    use crate::namespace::MemoryBackend;
    use crate::schema::tests::test_schema;
    use crate::types::config::SuggestionOrder;

    fn test_sys() -> (Sys, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let sys = Sys::new(Settings::default(), test_schema(), backend.clone());
        (sys, backend)
    }

    fn ok(resp: Response) -> String {
        match resp {
            Response::Ok { output } => output,
            other => panic!("expected Ok, got {:?}", other),
        }
    }

    fn err(resp: Response) -> (ErrorKind, String, Vec<String>) {
        match resp {
            Response::Error { kind, message, suggestions } => (kind, message, suggestions),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn end_to_end_add_info_delete() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "!add Loc2 l=Attic"));
        ok(sys.execute_line(&ns, "!add Loc1 l=Roomy $ r=9-5"));

        let info = ok(sys.execute_line(&ns, "!info Loc1"));
        assert!(info.contains("Location: Roomy"));
        assert!(info.contains("Rates: 9-5"));
        assert!(!info.contains("Info:"));

        ok(sys.execute_line(&ns, "!delete Loc1"));
        let (kind, message, suggestions) = err(sys.execute_line(&ns, "!info Loc1"));
        assert_eq!(kind, ErrorKind::EntryNotFound);
        assert_eq!(message, "no entry named: Loc1");
        assert_eq!(suggestions, vec!["Loc2".to_string()]);
    }

    #[test]
    fn info_miss_on_empty_namespace_has_no_suggestions() {
        let (sys, _) = test_sys();
        let (kind, _, suggestions) = err(sys.execute(&"g1".into(), Command::Info { name: "x".into() }));
        assert_eq!(kind, ErrorKind::EntryNotFound);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn suggestions_follow_settings() {
        let backend = Arc::new(MemoryBackend::new());
        let settings = Settings {
            suggestion_limit: 1,
            suggestion_order: SuggestionOrder::LeastSimilarFirst,
            ..Settings::default()
        };
        let sys = Sys::new(settings, test_schema(), backend);
        let ns = Namespace::from("g1");
        for line in ["add Cellar", "add Zzz", "add Cellar2"] {
            ok(sys.execute_line(&ns, line));
        }
        let (_, _, suggestions) = err(sys.execute_line(&ns, "info Cellar1"));
        assert_eq!(suggestions, vec!["Zzz".to_string()]);
    }

    #[test]
    fn add_collision_hints_at_edit() {
        let (sys, backend) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add X"));
        let writes = backend.write_count();
        let (kind, message, _) = err(sys.execute_line(&ns, "add X l=a"));
        assert_eq!(kind, ErrorKind::EntryAlreadyExists);
        assert_eq!(message, "The entry X already exists! Use `!edit X` instead.");
        assert_eq!(backend.write_count(), writes);
    }

    #[test]
    fn add_with_unknown_field_creates_nothing() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        let (kind, message, _) = err(sys.execute_line(&ns, "add X l=a $ colour=red"));
        assert_eq!(kind, ErrorKind::FieldNotFound);
        assert_eq!(message, "unknown field name: colour");
        assert!(sys.store().get(&ns).unwrap().is_empty());
    }

    #[test]
    fn add_with_bare_field_sets_it_empty() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add X l $ r=9-5"));
        let record = sys.store().lookup(&ns, "X").unwrap();
        assert_eq!(record.get("Location"), Some(""));
        assert_eq!(record.get("Rates"), Some("9-5"));
    }

    #[test]
    fn add_with_bare_unknown_word_is_unknown_field() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        let (kind, message, _) = err(sys.execute_line(&ns, "add X oops"));
        assert_eq!(kind, ErrorKind::FieldNotFound);
        assert_eq!(message, "unknown field name: oops");
        assert!(sys.store().get(&ns).unwrap().is_empty());
    }

    #[test]
    fn add_and_create_aliases() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "!new X l=a"));
        ok(sys.execute_line(&ns, "!create Y l=a"));
        let entries = sys.store().get(&ns).unwrap();
        assert!(entries.contains("X") && entries.contains("Y"));
    }

    #[test]
    fn edit_without_value_clears_field() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add Z l=Cellar"));
        ok(sys.execute_line(&ns, "!edit Z l"));
        assert_eq!(sys.store().lookup(&ns, "Z").unwrap().get("Location"), Some(""));
    }

    #[test]
    fn edit_via_alias_and_multiword_value() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add X"));
        ok(sys.execute_line(&ns, "edit X instr go left at the well"));
        let record = sys.store().lookup(&ns, "X").unwrap();
        assert_eq!(record.get("Instructions"), Some("go left at the well"));
    }

    #[test]
    fn status_commands_and_listing() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        for line in ["add A", "add B", "add C", "on A", "off B"] {
            ok(sys.execute_line(&ns, line));
        }
        let listing = ok(sys.execute_line(&ns, "all"));
        assert_eq!(listing, "A\t\u{1F7E2}\nB\t\u{1F534}\nC\t\u{26AA}");

        assert_eq!(ok(sys.execute_line(&ns, "state A")), "A: on \u{1F7E2}");
        ok(sys.execute_line(&ns, "no_status A"));
        assert_eq!(ok(sys.execute_line(&ns, "status A")), "A: no status \u{26AA}");
        let (kind, _, _) = err(sys.execute_line(&ns, "on Missing"));
        assert_eq!(kind, ErrorKind::EntryNotFound);
    }

    #[test]
    fn list_empty_namespace() {
        let (sys, _) = test_sys();
        assert_eq!(ok(sys.execute(&"g1".into(), Command::List)), "No entries yet.");
    }

    #[test]
    fn media_shows_in_info() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add X"));
        ok(sys.execute_line(&ns, "media_add X front door http://x/1.png"));
        let info = ok(sys.execute_line(&ns, "info X"));
        assert!(info.ends_with("Media:\n  front door http://x/1.png"));
    }

    #[test]
    fn undo_toggles_through_dispatcher() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add X"));
        ok(sys.execute_line(&ns, "delete X"));
        ok(sys.execute_line(&ns, "undo"));
        assert!(sys.store().get(&ns).unwrap().contains("X"));
        ok(sys.execute_line(&ns, "redo"));
        assert!(!sys.store().get(&ns).unwrap().contains("X"));
    }

    #[test]
    fn storage_failure_becomes_error_response() {
        let (sys, backend) = test_sys();
        let ns = Namespace::from("g1");
        ok(sys.execute_line(&ns, "add X"));
        backend.fail_writes_to(Some(Slot::Current));
        let (kind, _, _) = err(sys.execute_line(&ns, "add Y"));
        assert_eq!(kind, ErrorKind::StorageIoError);
    }

    #[test]
    fn bad_lines_are_invalid_commands() {
        let (sys, _) = test_sys();
        let ns = Namespace::from("g1");
        assert_eq!(err(sys.execute_line(&ns, "!explode")).0, ErrorKind::InvalidCommand);
        assert_eq!(err(sys.execute_line(&ns, "!")).0, ErrorKind::InvalidCommand);
        assert_eq!(err(sys.execute_line(&ns, "!edit X")).0, ErrorKind::InvalidCommand);
    }

    #[test]
    fn help_is_always_ok() {
        let (sys, _) = test_sys();
        let out = ok(sys.execute_line(&"g1".into(), "help add"));
        assert!(out.contains("Usage: add"));
    }

    #[test]
    fn from_settings_loads_schema_and_save_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fields = dir.path().join("fields.json");
        std::fs::write(&fields, crate::schema::tests::TEST_SCHEMA).unwrap();
        let settings = Settings {
            save_dir: dir.path().join("data"),
            fields_path: fields,
            ..Settings::default()
        };
        let sys = Sys::from_settings(settings).unwrap();
        ok(sys.execute_line(&"My Guild".into(), "add X l=a"));
        assert!(dir.path().join("data").join("My%20Guild.json").exists());
    }

    #[test]
    fn from_settings_fails_without_schema() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            save_dir: dir.path().join("data"),
            fields_path: dir.path().join("missing.json"),
            ..Settings::default()
        };
        assert!(matches!(Sys::from_settings(settings), Err(StartupError::Schema(_))));
    }
}
