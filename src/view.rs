use std::fmt;

use url::Url;

use crate::store::{Entry, EntryId};

pub const MASTER_ID: &str = "master";
pub const TABLE_ID: &str = "tiny_table";
pub const INPUT_ID: &str = "name_input";
pub const TRANSPARENT_CLASS: &str = "transparent";
pub const DELETE_LABEL: &str = "X";

/// Reflects store state on screen.
///
/// Handlers call into the renderer after every successful mutation; the
/// service calls `create_table` when the connection opens and `teardown`
/// when it closes.
pub trait Renderer {
    fn create_table(&mut self, entries: &[Entry]);

    fn insert_row(&mut self, entry: &Entry);

    fn delete_row(&mut self, id: EntryId);

    /// Replace the whole view with a warning. Terminal.
    fn teardown(&mut self, url: &Url);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Master { created: bool, rows: Vec<Entry> },
    Closed { warning: String },
}

/// Headless model of the demo page: the `master` div holding the
/// `tiny_table` table and the `name_input` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    page: Page,
}

impl Default for HtmlTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTable {
    pub fn new() -> Self {
        HtmlTable {
            page: Page::Master {
                created: false,
                rows: Vec::new(),
            },
        }
    }

    pub fn rows(&self) -> &[Entry] {
        match &self.page {
            Page::Master { rows, .. } => rows,
            Page::Closed { .. } => &[],
        }
    }

    pub fn row(&self, id: EntryId) -> Option<&Entry> {
        self.rows().iter().find(|row| row.id == id)
    }

    pub fn is_created(&self) -> bool {
        matches!(self.page, Page::Master { created: true, .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.page, Page::Closed { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match &self.page {
            Page::Closed { warning } => Some(warning),
            Page::Master { .. } => None,
        }
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }

    fn rows_mut(&mut self) -> Option<&mut Vec<Entry>> {
        match &mut self.page {
            Page::Master { rows, .. } => Some(rows),
            Page::Closed { .. } => None,
        }
    }
}

impl Renderer for HtmlTable {
    fn create_table(&mut self, entries: &[Entry]) {
        match &mut self.page {
            Page::Master { created, rows } => {
                *created = true;
                *rows = entries.to_vec();
            }
            Page::Closed { .. } => {
                log::warn!("view is closed, not creating the table")
            }
        }
    }

    fn insert_row(&mut self, entry: &Entry) {
        match self.rows_mut() {
            Some(rows) => rows.push(entry.clone()),
            None => log::warn!("view is closed, dropping row {}", entry.id),
        }
    }

    fn delete_row(&mut self, id: EntryId) {
        match self.rows_mut() {
            Some(rows) => match rows.iter().position(|row| row.id == id) {
                Some(index) => {
                    rows.remove(index);
                }
                None => log::warn!("no row {} to delete", id),
            },
            None => log::warn!("view is closed, not deleting row {}", id),
        }
    }

    fn teardown(&mut self, url: &Url) {
        let url = url.as_str().trim_end_matches('/');
        self.page = Page::Closed {
            warning: format!("{} is closed.", url),
        };
    }
}

impl fmt::Display for HtmlTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.page {
            Page::Closed { warning } => writeln!(
                f,
                "<p style=\"text-align:center;color:red;\">{}</p>",
                escape(warning)
            ),
            Page::Master { created, rows } => {
                writeln!(f, "<div id=\"{}\">", MASTER_ID)?;
                writeln!(f, "  <table id=\"{}\">", TABLE_ID)?;
                if *created {
                    writeln!(
                        f,
                        "    <thead><tr><td><b>ID</b></td><td><b>Name</b></td></tr></thead>"
                    )?;
                    writeln!(f, "    <tbody>")?;
                    for row in rows {
                        writeln!(
                            f,
                            "      <tr id=\"{id}\"><td>{id}</td><td>{name}</td>\
                             <td class=\"{class}\"><input type=\"button\" \
                             value=\"{label}\" data-delete=\"{id}\"></td></tr>",
                            id = row.id,
                            name = escape(&row.name),
                            class = TRANSPARENT_CLASS,
                            label = DELETE_LABEL,
                        )?;
                    }
                    writeln!(f, "    </tbody>")?;
                }
                writeln!(f, "  </table>")?;
                writeln!(
                    f,
                    "  <form><input type=\"text\" id=\"{}\">\
                     <input type=\"button\" value=\"Submit\"></form>",
                    INPUT_ID
                )?;
                writeln!(f, "</div>")
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, name: &str) -> Entry {
        Entry {
            id: EntryId(id),
            name: name.to_owned(),
        }
    }

    #[test]
    fn rows_follow_inserts_and_deletes() {
        let mut view = HtmlTable::new();
        view.create_table(&[entry(0, "Jacoby"), entry(1, "Andrew")]);
        view.insert_row(&entry(2, "Miklos"));
        view.delete_row(EntryId(1));

        let ids: Vec<u64> = view.rows().iter().map(|row| row.id.0).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(view.row(EntryId(2)).map(|r| r.name.as_str()), Some("Miklos"));
    }

    #[test]
    fn deleting_missing_row_is_ignored() {
        let mut view = HtmlTable::new();
        view.create_table(&[entry(0, "Jacoby")]);
        view.delete_row(EntryId(7));
        assert_eq!(view.rows().len(), 1);
    }

    #[test]
    fn teardown_is_terminal() {
        let mut view = HtmlTable::new();
        view.create_table(&[entry(0, "Jacoby")]);
        view.teardown(&Url::parse("ws://localhost:8000").unwrap());

        assert!(view.is_closed());
        assert_eq!(view.warning(), Some("ws://localhost:8000 is closed."));

        view.insert_row(&entry(1, "Andrew"));
        view.create_table(&[entry(0, "Jacoby")]);
        assert!(view.rows().is_empty());
        assert!(view.is_closed());
    }

    #[test]
    fn html_has_row_and_delete_control() {
        let mut view = HtmlTable::new();
        view.create_table(&[entry(3, "<b>Bob</b>")]);
        let html = view.to_html();

        assert!(html.contains("<div id=\"master\">"));
        assert!(html.contains("<table id=\"tiny_table\">"));
        assert!(html.contains("<tr id=\"3\"><td>3</td>"));
        assert!(html.contains("&lt;b&gt;Bob&lt;/b&gt;"));
        assert!(html.contains("<td class=\"transparent\"><input type=\"button\" value=\"X\""));
        assert!(html.contains("id=\"name_input\""));
    }

    #[test]
    fn html_before_open_has_no_body() {
        let html = HtmlTable::new().to_html();
        assert!(!html.contains("<tbody>"));
        assert!(html.contains("<table id=\"tiny_table\">"));
    }

    #[test]
    fn closed_html_is_only_the_warning() {
        let mut view = HtmlTable::new();
        view.teardown(&Url::parse("ws://example.org:9000/").unwrap());
        assert_eq!(
            view.to_html(),
            "<p style=\"text-align:center;color:red;\">ws://example.org:9000 is closed.</p>\n"
        );
    }
}
